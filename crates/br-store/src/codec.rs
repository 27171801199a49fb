//! Length-delimited record framing.
//!
//! Each record is a varint byte length followed by the protobuf-encoded
//! message. Framed records can be appended to one stream back to back and
//! decoded sequentially without a separate framing pass. A report file holds
//! exactly one framed record, which [`decode_single`] enforces.

use std::io::{self, Write};

use prost::Message;

/// Errors produced while decoding a framed record.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// The input holds no bytes at all.
    #[error("record is empty")]
    Empty,

    /// Bad length prefix, truncated body, or malformed message.
    #[error("malformed record: {0}")]
    Decode(#[from] prost::DecodeError),

    /// Bytes remain after the single expected record.
    #[error("{0} unexpected bytes after record")]
    TrailingBytes(usize),
}

/// Appends one framed record to `out`, returning the number of bytes written.
///
/// # Examples
///
/// ```
/// use br_core::Metadata;
/// use br_store::codec::{read_delimited, write_delimited};
///
/// let mut stream = Vec::new();
/// let first = Metadata { analysis_date: Some(1), ..Metadata::default() };
/// let second = Metadata { analysis_date: Some(2), ..Metadata::default() };
/// write_delimited(&mut stream, &first).unwrap();
/// write_delimited(&mut stream, &second).unwrap();
///
/// let mut cursor = stream.as_slice();
/// assert_eq!(read_delimited::<Metadata>(&mut cursor).unwrap(), first);
/// assert_eq!(read_delimited::<Metadata>(&mut cursor).unwrap(), second);
/// assert!(cursor.is_empty());
/// ```
pub fn write_delimited<M: Message, W: Write>(out: &mut W, message: &M) -> io::Result<usize> {
    let bytes = message.encode_length_delimited_to_vec();
    out.write_all(&bytes)?;
    Ok(bytes.len())
}

/// Decodes the next framed record and advances `cursor` past it.
pub fn read_delimited<M: Message + Default>(cursor: &mut &[u8]) -> Result<M, CodecError> {
    if cursor.is_empty() {
        return Err(CodecError::Empty);
    }
    Ok(M::decode_length_delimited(cursor)?)
}

/// Decodes a buffer that must contain exactly one framed record.
pub fn decode_single<M: Message + Default>(bytes: &[u8]) -> Result<M, CodecError> {
    let mut cursor = bytes;
    let message = read_delimited(&mut cursor)?;
    if !cursor.is_empty() {
        return Err(CodecError::TrailingBytes(cursor.len()));
    }
    Ok(message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use br_core::{ComponentRef, Issue, Issues, Metadata};

    fn sample_issues() -> Issues {
        Issues::for_component(
            ComponentRef::new(1),
            vec![Issue::new("ISSUE_A").with_line(50), Issue::new("ISSUE_B")],
        )
    }

    #[test]
    fn test_single_record() {
        let issues = sample_issues();
        let mut bytes = Vec::new();
        let written = write_delimited(&mut bytes, &issues).expect("write");
        assert_eq!(written, bytes.len());

        let decoded: Issues = decode_single(&bytes).expect("decode");
        assert_eq!(decoded, issues);
    }

    #[test]
    fn test_default_message_still_framed() {
        let mut bytes = Vec::new();
        write_delimited(&mut bytes, &Metadata::default()).expect("write");
        assert_eq!(bytes, vec![0]);

        let decoded: Metadata = decode_single(&bytes).expect("decode");
        assert_eq!(decoded, Metadata::default());
    }

    #[test]
    fn test_empty_input() {
        let err = decode_single::<Metadata>(&[]).expect_err("empty");
        assert!(matches!(err, CodecError::Empty));
    }

    #[test]
    fn test_truncated_body() {
        let mut bytes = Vec::new();
        write_delimited(&mut bytes, &sample_issues()).expect("write");
        bytes.truncate(bytes.len() - 3);

        let err = decode_single::<Issues>(&bytes).expect_err("truncated");
        assert!(matches!(err, CodecError::Decode(_)));
    }

    #[test]
    fn test_trailing_bytes() {
        let mut bytes = Vec::new();
        write_delimited(&mut bytes, &sample_issues()).expect("write");
        bytes.extend_from_slice(&[1, 2]);

        let err = decode_single::<Issues>(&bytes).expect_err("trailing");
        assert!(matches!(err, CodecError::TrailingBytes(2)));
    }

    #[test]
    fn test_bad_length_prefix() {
        // Unterminated varint.
        let err = decode_single::<Metadata>(&[0xff, 0xff]).expect_err("bad prefix");
        assert!(matches!(err, CodecError::Decode(_)));
    }
}
