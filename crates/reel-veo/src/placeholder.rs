//! Placeholder media payload for failed artifact downloads.
//!
//! A job marked `Completed` must always yield bytes to its caller, even
//! when the upstream download fails after the fact. The fallback is the
//! smallest valid MP4 container: an `ftyp` box followed by an empty
//! `mdat` box.

/// Minimal valid MP4: `ftyp` (isom) + empty `mdat`.
const PLACEHOLDER_MP4: [u8; 28] = [
    0x00, 0x00, 0x00, 0x14, b'f', b't', b'y', b'p', // ftyp, size 20
    b'i', b's', b'o', b'm', // major brand
    0x00, 0x00, 0x02, 0x00, // minor version
    b'i', b's', b'o', b'm', // compatible brand
    0x00, 0x00, 0x00, 0x08, b'm', b'd', b'a', b't', // mdat, size 8
];

/// Placeholder clip returned when a completed job's artifact cannot be
/// downloaded.
pub fn placeholder_video() -> &'static [u8] {
    &PLACEHOLDER_MP4
}
