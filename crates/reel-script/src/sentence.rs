//! Sentence splitting on end-of-sentence punctuation.

/// Split a script into sentences using `.`, `!` and `?` as terminators.
///
/// The terminator stays attached to its sentence. Consecutive terminators
/// (`?!`, `...`) stay with the sentence they close. A script with no
/// terminator at all is returned as a single sentence.
pub fn split_sentences(script: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut current = String::new();
    let mut chars = script.chars().peekable();

    while let Some(c) = chars.next() {
        current.push(c);
        if is_terminator(c) {
            // Absorb any run of terminators into the same sentence
            while let Some(&next) = chars.peek() {
                if is_terminator(next) {
                    current.push(next);
                    chars.next();
                } else {
                    break;
                }
            }
            push_trimmed(&mut sentences, &mut current);
        }
    }
    push_trimmed(&mut sentences, &mut current);

    sentences
}

fn is_terminator(c: char) -> bool {
    matches!(c, '.' | '!' | '?')
}

fn push_trimmed(sentences: &mut Vec<String>, current: &mut String) {
    let trimmed = current.trim();
    if !trimmed.is_empty() {
        sentences.push(trimmed.to_string());
    }
    current.clear();
}
