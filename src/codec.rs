//! Message text codec
//!
//! Message text is stored percent-encoded, the same quoting legacy `taint.db`
//! files use, so old rows keep deduplicating against new syncs. Only ASCII
//! alphanumerics and `_ . - ~ /` are left as-is.

use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

/// Bytes that are escaped on write
const QUOTE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'_')
    .remove(b'.')
    .remove(b'-')
    .remove(b'~')
    .remove(b'/');

/// Encode message text for storage
pub fn encode_text(text: &str) -> String {
    utf8_percent_encode(text, QUOTE_SET).to_string()
}

/// Decode stored message text
///
/// Text without escapes passes through unchanged. Invalid UTF-8 produced by a
/// malformed escape sequence is replaced lossily rather than failing the read.
pub fn decode_text(stored: &str) -> String {
    percent_decode_str(stored).decode_utf8_lossy().into_owned()
}
