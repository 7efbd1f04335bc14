//! Record Data Structure
//!
//! This module defines the `Record` type: the fundamental unit of data in
//! driftlog, comparable to a Kafka message or a WAL entry.
//!
//! ## Structure
//! - **value**: the payload, arbitrary bytes the log never interprets
//! - **offset**: unique, monotonically increasing ID within the log
//!
//! The offset is assigned by the log at append time; whatever the producer
//! put in the field is overwritten.
//!
//! ## Wire format
//! Records are stored as protobuf messages (`value = 1`, `offset = 2`),
//! encoded with a derived [`prost::Message`] (no build-time codegen). The
//! encoding is deterministic, length-self-delimiting once framed by the
//! store, and forward compatible: unknown fields written by a newer version
//! are skipped on decode.
//!
//! `bytes::Bytes` backs the payload so slicing a decoded record never
//! copies.

use bytes::Bytes;

/// A single record in the log.
#[derive(Clone, PartialEq, Eq, prost::Message)]
pub struct Record {
    /// Opaque payload bytes.
    #[prost(bytes = "bytes", tag = "1")]
    pub value: Bytes,

    /// Offset of this record within the log. Stamped on append.
    #[prost(uint64, tag = "2")]
    pub offset: u64,
}

impl Record {
    /// A record ready to append. The offset is left at zero; the log
    /// overwrites it.
    pub fn new(value: impl Into<Bytes>) -> Self {
        Self {
            value: value.into(),
            offset: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use prost::Message;

    #[test]
    fn test_new_leaves_offset_unset() {
        let rec = Record::new("hello");
        assert_eq!(rec.value, Bytes::from("hello"));
        assert_eq!(rec.offset, 0);
    }

    #[test]
    fn test_encode_decode_roundtrip() {
        let rec = Record {
            value: Bytes::from("payload"),
            offset: 1234,
        };
        let encoded = rec.encode_to_vec();
        let decoded = Record::decode(&encoded[..]).unwrap();
        assert_eq!(decoded, rec);
    }

    #[test]
    fn test_roundtrip_empty_value() {
        let rec = Record::new(Bytes::new());
        let encoded = rec.encode_to_vec();
        // both fields are at their defaults, so the encoding is empty
        assert!(encoded.is_empty());
        let decoded = Record::decode(&encoded[..]).unwrap();
        assert_eq!(decoded, rec);
    }

    #[test]
    fn test_roundtrip_binary_value() {
        let rec = Record {
            value: Bytes::from(vec![0u8, 1, 2, 255, 254, 253]),
            offset: u64::MAX,
        };
        let decoded = Record::decode(&rec.encode_to_vec()[..]).unwrap();
        assert_eq!(decoded, rec);
    }

    #[test]
    fn test_decode_rejects_truncated_input() {
        let rec = Record {
            value: Bytes::from(vec![7u8; 64]),
            offset: 9,
        };
        let encoded = rec.encode_to_vec();
        assert!(Record::decode(&encoded[..encoded.len() - 1]).is_err());
    }

    #[test]
    fn test_encoded_len_matches_encoding() {
        let rec = Record {
            value: Bytes::from("abc"),
            offset: 300,
        };
        assert_eq!(rec.encoded_len(), rec.encode_to_vec().len());
    }
}
