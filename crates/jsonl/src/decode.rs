//! Line decoding shared by [`Stream`](crate::Stream) and the bulk codec.

use crate::error::{Error, Result};
use crate::options::{BlankLines, DecodeOptions};
use serde::de::DeserializeOwned;

/// Strips one trailing `\n` or `\r\n`.
pub(crate) fn strip_terminator(line: &str) -> &str {
    match line.strip_suffix('\n') {
        Some(body) => body.strip_suffix('\r').unwrap_or(body),
        None => line,
    }
}

/// Decodes one line, terminator included or not.
///
/// Returns `Ok(None)` for a blank line the options say to skip.
pub(crate) fn decode_line<T>(
    line: &str,
    line_number: usize,
    options: &DecodeOptions,
) -> Result<Option<T>>
where
    T: DeserializeOwned,
{
    let content = strip_terminator(line);
    if options.blank_lines == BlankLines::Skip && content.trim().is_empty() {
        tracing::trace!(line_number, "skipping blank line");
        return Ok(None);
    }

    serde_json::from_str(content)
        .map(Some)
        .map_err(|source| Error::Decode {
            line_number,
            content: content.to_string(),
            source,
        })
}

/// Decodes one raw line as read from a handle.
///
/// A line that is not valid UTF-8 is a decode error on that line; its
/// content is reported with invalid bytes replaced by U+FFFD.
pub(crate) fn decode_bytes<T>(
    line: &[u8],
    line_number: usize,
    options: &DecodeOptions,
) -> Result<Option<T>>
where
    T: DeserializeOwned,
{
    match std::str::from_utf8(line) {
        Ok(text) => decode_line(text, line_number, options),
        Err(utf8) => Err(Error::Decode {
            line_number,
            content: strip_terminator(&String::from_utf8_lossy(line)).to_string(),
            source: <serde_json::Error as serde::de::Error>::custom(utf8),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::{json, Value};

    #[rstest]
    #[case::lf("{}\n", "{}")]
    #[case::crlf("{}\r\n", "{}")]
    #[case::bare("{}", "{}")]
    #[case::only_one_terminator("{}\n\n", "{}\n")]
    #[case::lone_cr_kept("{}\r", "{}\r")]
    fn strip_terminator_removes_one_line_ending(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(strip_terminator(input), expected);
    }

    #[test]
    fn decodes_value_with_terminator() {
        let value: Option<Value> =
            decode_line("{\"a\":1}\n", 1, &DecodeOptions::default()).unwrap();
        assert_eq!(value, Some(json!({"a": 1})));
    }

    #[test]
    fn decodes_typed_record() {
        #[derive(serde::Deserialize, Debug, PartialEq)]
        struct Hand {
            name: String,
            wins: Vec<Vec<String>>,
        }

        let line = r#"{"name":"May","wins":[]}"#;
        let hand: Option<Hand> = decode_line(line, 3, &DecodeOptions::default()).unwrap();
        assert_eq!(
            hand,
            Some(Hand {
                name: "May".to_string(),
                wins: vec![],
            })
        );
    }

    #[rstest]
    #[case::empty("\n")]
    #[case::spaces("   \n")]
    #[case::tabs_crlf("\t\r\n")]
    fn blank_lines_rejected_by_default(#[case] line: &str) {
        let err = decode_line::<Value>(line, 4, &DecodeOptions::default()).unwrap_err();
        match err {
            Error::Decode { line_number, .. } => assert_eq!(line_number, 4),
            other => panic!("expected decode error, got {other:?}"),
        }
    }

    #[rstest]
    #[case::empty("\n")]
    #[case::spaces("   \n")]
    #[case::no_terminator("")]
    fn blank_lines_skipped_on_request(#[case] line: &str) {
        let options = DecodeOptions::default().blank_lines(BlankLines::Skip);
        let value = decode_line::<Value>(line, 1, &options).unwrap();
        assert!(value.is_none());
    }

    #[test]
    fn malformed_line_reports_content_without_terminator() {
        let err = decode_line::<Value>("{\"a\":\n", 9, &DecodeOptions::default()).unwrap_err();
        match err {
            Error::Decode {
                line_number,
                content,
                ..
            } => {
                assert_eq!(line_number, 9);
                assert_eq!(content, "{\"a\":");
            }
            other => panic!("expected decode error, got {other:?}"),
        }
    }

    #[test]
    fn raw_line_decodes_like_text() {
        let value: Option<Value> =
            decode_bytes(b"{\"k\":\"\xc3\xa9\"}\r\n", 1, &DecodeOptions::default()).unwrap();
        assert_eq!(value, Some(json!({"k": "\u{e9}"})));
    }

    #[rstest]
    #[case::lone_bytes(b"\xff\xfe\n", "\u{fffd}\u{fffd}")]
    #[case::inside_string(b"\"a\xc3\"\n", "\"a\u{fffd}\"")]
    #[case::no_terminator(b"\x80", "\u{fffd}")]
    fn invalid_utf8_is_a_decode_error_with_lossy_content(
        #[case] line: &[u8],
        #[case] expected: &str,
    ) {
        let err = decode_bytes::<Value>(line, 5, &DecodeOptions::default()).unwrap_err();
        match err {
            Error::Decode {
                line_number,
                content,
                ..
            } => {
                assert_eq!(line_number, 5);
                assert_eq!(content, expected);
            }
            other => panic!("expected decode error, got {other:?}"),
        }
    }

    #[test]
    fn invalid_utf8_is_not_blank() {
        let options = DecodeOptions::default().blank_lines(BlankLines::Skip);
        assert!(decode_bytes::<Value>(b"\xff\n", 1, &options).is_err());
    }

    #[test]
    fn type_mismatch_in_record_is_a_decode_error() {
        let err = decode_line::<u32>("\"seven\"", 1, &DecodeOptions::default()).unwrap_err();
        assert!(matches!(err, Error::Decode { .. }));
    }
}
