//! Whole-document conversion between record sequences and JSONL text.
//!
//! Use these when the document fits comfortably in memory; use
//! [`Stream`](crate::Stream) to process records one at a time.
//!
//! Both directions are all-or-nothing: a failure anywhere returns an error
//! and no partial text or sequence.

use crate::decode::decode_line;
use crate::encode::encode_into;
use crate::error::{Error, Result};
use crate::options::{DecodeOptions, EncodeOptions};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde::ser::{self, Impossible, Serializer as _};

/// Encodes every element of `records` on its own line.
///
/// See [`generate_with`].
///
/// # Errors
///
/// See [`generate_with`].
pub fn generate<S: Serialize + ?Sized>(records: &S) -> Result<String> {
    generate_with(records, &EncodeOptions::default())
}

/// Encodes every element of `records` on its own line with `options`.
///
/// `records` must serialize as a sequence: a `Vec`, slice, array, tuple or a
/// JSON array value. Lines are joined by a single `\n` and the last line is
/// **not** terminated, unlike [`Stream::append`](crate::Stream::append),
/// which terminates every record.
///
/// # Errors
///
/// [`Error::TypeMismatch`] when `records` is not a sequence, reported before
/// any element is encoded. [`Error::Encode`] with the element's index when
/// one element cannot be encoded.
///
/// # Examples
///
/// ```
/// use serde_json::json;
///
/// let text = jsonl::generate(&json!([{"a": 1}, {"b": 2}]))?;
/// assert_eq!(text, "{\"a\":1}\n{\"b\":2}");
///
/// let err = jsonl::generate("not a list").unwrap_err();
/// assert_eq!(err.to_string(), "can't generate from string");
/// # Ok::<(), jsonl::Error>(())
/// ```
pub fn generate_with<S: Serialize + ?Sized>(records: &S, options: &EncodeOptions) -> Result<String> {
    let bytes = records.serialize(Document { options })?;
    String::from_utf8(bytes).map_err(Error::encode)
}

/// Decodes every line of `text` into a record.
///
/// See [`parse_with`].
///
/// # Errors
///
/// See [`parse_with`].
pub fn parse<T: DeserializeOwned>(text: &str) -> Result<Vec<T>> {
    parse_with(text, &DecodeOptions::default())
}

/// Decodes every line of `text` into a record with `options`.
///
/// Lines end at `\n` (a preceding `\r` is tolerated). A final line without a
/// terminator still counts; the empty remainder after a final `\n` does not.
///
/// # Errors
///
/// [`Error::Decode`] with the 1-based line number and content of the first
/// malformed line.
///
/// # Examples
///
/// ```
/// use serde_json::{json, Value};
///
/// let records: Vec<Value> = jsonl::parse("{\"a\":1}\n{\"b\":2}\n")?;
/// assert_eq!(records, vec![json!({"a": 1}), json!({"b": 2})]);
/// # Ok::<(), jsonl::Error>(())
/// ```
pub fn parse_with<T: DeserializeOwned>(text: &str, options: &DecodeOptions) -> Result<Vec<T>> {
    let mut records = Vec::new();
    for (index, line) in text.split_inclusive('\n').enumerate() {
        if let Some(record) = decode_line(line, index + 1, options)? {
            records.push(record);
        }
    }
    Ok(records)
}

/// Top-level serializer that accepts only sequences.
///
/// Every other shape is refused with [`Error::TypeMismatch`] without looking
/// inside the value.
struct Document<'o> {
    options: &'o EncodeOptions,
}

/// Collects the lines of a sequence accepted by [`Document`].
struct Lines<'o> {
    options: &'o EncodeOptions,
    out: Vec<u8>,
    count: usize,
}

impl Lines<'_> {
    fn push<T: Serialize + ?Sized>(&mut self, record: &T) -> Result<()> {
        if self.count > 0 {
            self.out.push(b'\n');
        }
        encode_into(record, self.options, &mut self.out).map_err(|err| err.at_index(self.count))?;
        self.count += 1;
        Ok(())
    }
}

fn mismatch<T>(actual: &'static str) -> Result<T> {
    Err(Error::TypeMismatch { actual })
}

impl<'o> ser::Serializer for Document<'o> {
    type Ok = Vec<u8>;
    type Error = Error;
    type SerializeSeq = Lines<'o>;
    type SerializeTuple = Lines<'o>;
    type SerializeTupleStruct = Lines<'o>;
    type SerializeTupleVariant = Impossible<Vec<u8>, Error>;
    type SerializeMap = Impossible<Vec<u8>, Error>;
    type SerializeStruct = Impossible<Vec<u8>, Error>;
    type SerializeStructVariant = Impossible<Vec<u8>, Error>;

    fn serialize_bool(self, _v: bool) -> Result<Vec<u8>> {
        mismatch("boolean")
    }

    fn serialize_i8(self, _v: i8) -> Result<Vec<u8>> {
        mismatch("integer")
    }

    fn serialize_i16(self, _v: i16) -> Result<Vec<u8>> {
        mismatch("integer")
    }

    fn serialize_i32(self, _v: i32) -> Result<Vec<u8>> {
        mismatch("integer")
    }

    fn serialize_i64(self, _v: i64) -> Result<Vec<u8>> {
        mismatch("integer")
    }

    fn serialize_i128(self, _v: i128) -> Result<Vec<u8>> {
        mismatch("integer")
    }

    fn serialize_u8(self, _v: u8) -> Result<Vec<u8>> {
        mismatch("integer")
    }

    fn serialize_u16(self, _v: u16) -> Result<Vec<u8>> {
        mismatch("integer")
    }

    fn serialize_u32(self, _v: u32) -> Result<Vec<u8>> {
        mismatch("integer")
    }

    fn serialize_u64(self, _v: u64) -> Result<Vec<u8>> {
        mismatch("integer")
    }

    fn serialize_u128(self, _v: u128) -> Result<Vec<u8>> {
        mismatch("integer")
    }

    fn serialize_f32(self, _v: f32) -> Result<Vec<u8>> {
        mismatch("float")
    }

    fn serialize_f64(self, _v: f64) -> Result<Vec<u8>> {
        mismatch("float")
    }

    fn serialize_char(self, _v: char) -> Result<Vec<u8>> {
        mismatch("string")
    }

    fn serialize_str(self, _v: &str) -> Result<Vec<u8>> {
        mismatch("string")
    }

    fn serialize_bytes(self, _v: &[u8]) -> Result<Vec<u8>> {
        mismatch("bytes")
    }

    fn serialize_none(self) -> Result<Vec<u8>> {
        mismatch("null")
    }

    fn serialize_some<T: ?Sized + Serialize>(self, value: &T) -> Result<Vec<u8>> {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<Vec<u8>> {
        mismatch("null")
    }

    fn serialize_unit_struct(self, name: &'static str) -> Result<Vec<u8>> {
        mismatch(name)
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
    ) -> Result<Vec<u8>> {
        mismatch("enum")
    }

    fn serialize_newtype_struct<T: ?Sized + Serialize>(
        self,
        _name: &'static str,
        value: &T,
    ) -> Result<Vec<u8>> {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T: ?Sized + Serialize>(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _value: &T,
    ) -> Result<Vec<u8>> {
        mismatch("enum")
    }

    fn serialize_seq(self, _len: Option<usize>) -> Result<Lines<'o>> {
        Ok(Lines {
            options: self.options,
            out: Vec::new(),
            count: 0,
        })
    }

    fn serialize_tuple(self, len: usize) -> Result<Lines<'o>> {
        self.serialize_seq(Some(len))
    }

    fn serialize_tuple_struct(self, _name: &'static str, len: usize) -> Result<Lines<'o>> {
        self.serialize_seq(Some(len))
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleVariant> {
        mismatch("enum")
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<Self::SerializeMap> {
        mismatch("map")
    }

    fn serialize_struct(self, name: &'static str, _len: usize) -> Result<Self::SerializeStruct> {
        mismatch(name)
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStructVariant> {
        mismatch("enum")
    }
}

impl ser::SerializeSeq for Lines<'_> {
    type Ok = Vec<u8>;
    type Error = Error;

    fn serialize_element<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<()> {
        self.push(value)
    }

    fn end(self) -> Result<Vec<u8>> {
        Ok(self.out)
    }
}

impl ser::SerializeTuple for Lines<'_> {
    type Ok = Vec<u8>;
    type Error = Error;

    fn serialize_element<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<()> {
        self.push(value)
    }

    fn end(self) -> Result<Vec<u8>> {
        Ok(self.out)
    }
}

impl ser::SerializeTupleStruct for Lines<'_> {
    type Ok = Vec<u8>;
    type Error = Error;

    fn serialize_field<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<()> {
        self.push(value)
    }

    fn end(self) -> Result<Vec<u8>> {
        Ok(self.out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::BlankLines;
    use rstest::rstest;
    use serde::Deserialize;
    use serde_json::{json, Value};
    use std::collections::BTreeMap;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Hand {
        name: String,
        wins: Vec<Vec<String>>,
    }

    fn wins(pairs: &[(&str, &str)]) -> Vec<Vec<String>> {
        pairs
            .iter()
            .map(|(hand, card)| vec![(*hand).to_string(), (*card).to_string()])
            .collect()
    }

    fn poker_hands() -> Vec<Hand> {
        vec![
            Hand {
                name: "Gilbert".to_string(),
                wins: wins(&[("straight", "7\u{2663}"), ("one pair", "10\u{2665}")]),
            },
            Hand {
                name: "Alexa".to_string(),
                wins: wins(&[("two pair", "4\u{2660}"), ("two pair", "9\u{2660}")]),
            },
            Hand {
                name: "May".to_string(),
                wins: vec![],
            },
            Hand {
                name: "Deloise".to_string(),
                wins: wins(&[("three of a kind", "5\u{2663}")]),
            },
        ]
    }

    #[test]
    fn parses_two_records() {
        let records: Vec<Value> = parse("{\"a\":1}\n{\"b\":2}\n").unwrap();
        assert_eq!(records, vec![json!({"a": 1}), json!({"b": 2})]);
    }

    #[test]
    fn regenerated_text_has_no_trailing_newline_and_reparses() {
        let records: Vec<Value> = parse("{\"a\":1}\n{\"b\":2}\n").unwrap();
        let text = generate(&records).unwrap();
        assert_eq!(text, "{\"a\":1}\n{\"b\":2}");
        assert_eq!(parse::<Value>(&text).unwrap(), records);
    }

    #[test]
    fn empty_inputs() {
        assert_eq!(generate(&Vec::<Value>::new()).unwrap(), "");
        assert_eq!(generate(&json!([])).unwrap(), "");
        assert!(parse::<Value>("").unwrap().is_empty());
    }

    #[test]
    fn generate_accepts_slices_arrays_and_tuples() {
        let slice: &[u32] = &[1, 2];
        assert_eq!(generate(slice).unwrap(), "1\n2");
        assert_eq!(generate(&[true, false]).unwrap(), "true\nfalse");
        assert_eq!(generate(&(1, "two", [3])).unwrap(), "1\n\"two\"\n[3]");
        assert_eq!(generate(&Some(vec![json!(null)])).unwrap(), "null");
    }

    #[rstest]
    #[case::string(json!("not a list"), "string")]
    #[case::map(json!({"a": 1}), "map")]
    #[case::integer(json!(3), "integer")]
    #[case::float(json!(1.5), "float")]
    #[case::boolean(json!(true), "boolean")]
    #[case::null(json!(null), "null")]
    fn generate_rejects_non_sequences(#[case] input: Value, #[case] actual: &str) {
        match generate(&input).unwrap_err() {
            Error::TypeMismatch { actual: reported } => assert_eq!(reported, actual),
            other => panic!("expected type mismatch, got {other:?}"),
        }
    }

    #[test]
    fn generate_rejects_plain_str_and_structs() {
        let err = generate("not a list").unwrap_err();
        assert_eq!(err.to_string(), "can't generate from string");

        let err = generate(&poker_hands()[0]).unwrap_err();
        assert_eq!(err.to_string(), "can't generate from Hand");

        let mut map = BTreeMap::new();
        map.insert("k", 1);
        assert!(matches!(
            generate(&map).unwrap_err(),
            Error::TypeMismatch { actual: "map" }
        ));
    }

    #[test]
    fn type_guard_runs_before_elements_are_encoded() {
        #[derive(Serialize)]
        struct Wrapper {
            bad: f64,
        }
        let err = generate(&Wrapper { bad: f64::NAN }).unwrap_err();
        assert!(matches!(err, Error::TypeMismatch { actual: "Wrapper" }));
    }

    #[test]
    fn encode_error_reports_element_index() {
        let values = vec![1.0, 2.0, f64::INFINITY, 4.0];
        match generate(&values).unwrap_err() {
            Error::Encode { index, .. } => assert_eq!(index, Some(2)),
            other => panic!("expected encode error, got {other:?}"),
        }
    }

    #[test]
    fn line_count_matches_record_count() {
        let hands = poker_hands();
        let text = generate(&hands).unwrap();
        assert_eq!(text.split('\n').count(), hands.len());
    }

    #[test]
    fn typed_round_trip() {
        let hands = poker_hands();
        let text = generate(&hands).unwrap();
        let back: Vec<Hand> = parse(&text).unwrap();
        assert_eq!(back, hands);
    }

    #[test]
    fn first_parsed_record_equals_direct_decode() {
        let source = generate(&poker_hands()).unwrap();
        let first_line = source.split('\n').next().unwrap();
        let parsed: Vec<Value> = parse(&source).unwrap();
        let direct: Value = serde_json::from_str(first_line).unwrap();
        assert_eq!(parsed[0], direct);
    }

    #[test]
    fn generate_with_options_applies_to_every_element() {
        let options = EncodeOptions::default().ascii_only(true).sort_keys(true);
        let records: Vec<Value> = parse("{\"z\":\"\u{e9}\",\"a\":0}\n{\"y\":1,\"b\":2}\n").unwrap();
        let text = generate_with(&records, &options).unwrap();
        assert_eq!(text, "{\"a\":0,\"z\":\"\\u00e9\"}\n{\"b\":2,\"y\":1}");
    }

    #[test]
    fn generate_with_indent_spans_lines() {
        let options = EncodeOptions::default().indent("  ");
        let text = generate_with(&json!([{"a": 1}]), &options).unwrap();
        assert_eq!(text, "{\n  \"a\": 1\n}");
    }

    #[test]
    fn parse_reports_malformed_line() {
        let err = parse::<Value>("{\"a\":1}\n{\"b\":\n{\"c\":3}\n").unwrap_err();
        match err {
            Error::Decode {
                line_number,
                content,
                ..
            } => {
                assert_eq!(line_number, 2);
                assert_eq!(content, "{\"b\":");
            }
            other => panic!("expected decode error, got {other:?}"),
        }
    }

    #[test]
    fn parse_blank_line_policy() {
        let text = "1\n\n2\n";
        let err = parse::<u8>(text).unwrap_err();
        assert!(matches!(err, Error::Decode { line_number: 2, .. }));

        let options = DecodeOptions::default().blank_lines(BlankLines::Skip);
        assert_eq!(parse_with::<u8>(text, &options).unwrap(), vec![1, 2]);
    }

    #[test]
    fn parse_tolerates_crlf_and_missing_final_newline() {
        let records: Vec<Value> = parse("[1]\r\n[2]\r\n[3]").unwrap();
        assert_eq!(records, vec![json!([1]), json!([2]), json!([3])]);
    }
}
