//! Storage key codec
//!
//! Derives a storage key from a user-supplied filename and recovers the
//! original filename from a stored key. Keys look like
//! `1718000000123_report.pdf`: the upload time in epoch milliseconds, an
//! underscore, then the filename exactly as submitted.

use chrono::Utc;

/// Derive a storage key for an uploaded filename.
///
/// The filename is not sanitized or altered beyond the prefix concatenation;
/// character restrictions are the backend's concern. Two uploads of the same
/// filename within the same millisecond produce the same key and the later
/// write wins. That collision window is accepted, not corrected.
pub fn encode(original_filename: &str) -> String {
    encode_at(Utc::now().timestamp_millis(), original_filename)
}

/// Derive a storage key for a filename at a fixed timestamp.
pub fn encode_at(epoch_millis: i64, original_filename: &str) -> String {
    format!("{epoch_millis}_{original_filename}")
}

/// Recover the display name from a storage key.
///
/// Strips a `<digits>_` prefix when present. Keys that were not produced by
/// [`encode`] (objects that predate this front end, for example) come back
/// unchanged, so they degrade to showing the raw key.
pub fn decode(key: &str) -> &str {
    match key.split_once('_') {
        Some((prefix, rest))
            if !prefix.is_empty()
                && !rest.is_empty()
                && prefix.bytes().all(|b| b.is_ascii_digit()) =>
        {
            rest
        }
        _ => key,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_at_concatenates() {
        assert_eq!(
            encode_at(1_700_000_000_000, "report.pdf"),
            "1700000000000_report.pdf"
        );
    }

    #[test]
    fn test_encode_is_decodable() {
        let key = encode("report.pdf");
        assert_eq!(decode(&key), "report.pdf");

        let (prefix, rest) = key.split_once('_').unwrap();
        assert!(prefix.bytes().all(|b| b.is_ascii_digit()));
        assert_eq!(rest, "report.pdf");
    }

    #[test]
    fn test_encode_does_not_sanitize() {
        let key = encode_at(1, "weird name (1) copy.tar.gz");
        assert_eq!(decode(&key), "weird name (1) copy.tar.gz");
    }

    #[test]
    fn test_decode_keeps_underscores_in_name() {
        assert_eq!(decode("1700000000000_my_notes.txt"), "my_notes.txt");
        assert_eq!(decode("10_20_file"), "20_file");
    }

    #[test]
    fn test_decode_is_identity_for_foreign_keys() {
        assert_eq!(decode("plain.txt"), "plain.txt");
        assert_eq!(decode("_leading.txt"), "_leading.txt");
        assert_eq!(decode("12a_b.txt"), "12a_b.txt");
        assert_eq!(decode("123_"), "123_");
        assert_eq!(decode(""), "");
    }
}
