//! Script processing error types.

use thiserror::Error;

pub type ScriptResult<T> = Result<T, ScriptError>;

#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("Script is empty or contains only whitespace")]
    EmptyScript,
}
