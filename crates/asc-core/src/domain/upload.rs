//! Upload operation descriptors.
//!
//! The service answers an upload reservation with a list of operations, each
//! naming a byte range of the local file and a pre-signed destination for it.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One chunk transfer: send bytes `[offset, offset + length)` to `url`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadOperation {
    /// HTTP method, usually `PUT`.
    pub method: String,
    /// Pre-signed destination URL.
    pub url: String,
    /// First byte of the chunk within the source file.
    pub offset: u64,
    /// Chunk size in bytes.
    pub length: u64,
    /// Headers to send verbatim with the chunk.
    #[serde(default, rename = "requestHeaders", with = "request_headers")]
    pub headers: BTreeMap<String, String>,
}

impl UploadOperation {
    /// Create an operation with no extra headers.
    pub fn new(method: impl Into<String>, url: impl Into<String>, offset: u64, length: u64) -> Self {
        Self {
            method: method.into(),
            url: url.into(),
            offset,
            length,
            headers: BTreeMap::new(),
        }
    }

    /// Add a request header.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// One past the last byte of the chunk.
    pub const fn end(&self) -> u64 {
        self.offset.saturating_add(self.length)
    }
}

/// Why a set of operations does not partition a file.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PartitionError {
    #[error("no upload operations for a {size} byte file")]
    Empty { size: u64 },

    #[error("upload operation {index} has zero length")]
    ZeroLength { index: usize },

    #[error("gap in upload operations: bytes {start}..{end} are not covered")]
    Gap { start: u64, end: u64 },

    #[error("upload operations overlap at byte {offset}")]
    Overlap { offset: u64 },

    #[error("upload operations cover {covered} bytes but the file has {size}")]
    SizeMismatch { covered: u64, size: u64 },
}

/// Check that `operations` cover `[0, size)` exactly once.
///
/// The upload executor does not call this; callers that want to reject a
/// malformed reservation before sending any bytes can.
pub fn check_partition(operations: &[UploadOperation], size: u64) -> Result<(), PartitionError> {
    if operations.is_empty() {
        return if size == 0 {
            Ok(())
        } else {
            Err(PartitionError::Empty { size })
        };
    }

    if let Some(index) = operations.iter().position(|op| op.length == 0) {
        return Err(PartitionError::ZeroLength { index });
    }

    let mut ranges: Vec<(u64, u64)> = operations.iter().map(|op| (op.offset, op.end())).collect();
    ranges.sort_unstable();

    let mut cursor = 0u64;
    for (start, end) in ranges {
        if start > cursor {
            return Err(PartitionError::Gap { start: cursor, end: start });
        }
        if start < cursor {
            return Err(PartitionError::Overlap { offset: start });
        }
        cursor = end;
    }

    if cursor == size {
        Ok(())
    } else {
        Err(PartitionError::SizeMismatch { covered: cursor, size })
    }
}

/// `requestHeaders` travels as a list of `{name, value}` pairs.
mod request_headers {
    use std::collections::BTreeMap;

    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    #[derive(Serialize, Deserialize)]
    struct Header {
        name: String,
        value: String,
    }

    pub fn serialize<S: Serializer>(
        headers: &BTreeMap<String, String>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        let list: Vec<Header> = headers
            .iter()
            .map(|(name, value)| Header {
                name: name.clone(),
                value: value.clone(),
            })
            .collect();
        list.serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<BTreeMap<String, String>, D::Error> {
        let list: Option<Vec<Header>> = Option::deserialize(deserializer)?;
        Ok(list
            .unwrap_or_default()
            .into_iter()
            .map(|h| (h.name, h.value))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn op(offset: u64, length: u64) -> UploadOperation {
        UploadOperation::new("PUT", format!("https://upload.example/{offset}"), offset, length)
    }

    #[test]
    fn test_decodes_service_shape() {
        let json = r#"{
            "method": "PUT",
            "url": "https://upload.example/part-1",
            "length": 1024,
            "offset": 2048,
            "requestHeaders": [
                {"name": "Content-Type", "value": "application/octet-stream"}
            ]
        }"#;

        let decoded: UploadOperation = serde_json::from_str(json).unwrap();
        assert_eq!(decoded.method, "PUT");
        assert_eq!(decoded.offset, 2048);
        assert_eq!(decoded.end(), 3072);
        assert_eq!(
            decoded.headers.get("Content-Type").map(String::as_str),
            Some("application/octet-stream")
        );
    }

    #[test]
    fn test_missing_or_null_headers_decode_empty() {
        let json = r#"{"method":"PUT","url":"u","length":1,"offset":0,"requestHeaders":null}"#;
        let decoded: UploadOperation = serde_json::from_str(json).unwrap();
        assert!(decoded.headers.is_empty());

        let json = r#"{"method":"PUT","url":"u","length":1,"offset":0}"#;
        let decoded: UploadOperation = serde_json::from_str(json).unwrap();
        assert!(decoded.headers.is_empty());
    }

    #[test]
    fn test_headers_encode_as_list() {
        let encoded = serde_json::to_value(op(0, 1).with_header("X-Part", "1")).unwrap();
        assert_eq!(
            encoded["requestHeaders"],
            serde_json::json!([{"name": "X-Part", "value": "1"}])
        );
    }

    #[test]
    fn test_partition_accepts_exact_cover_in_any_order() {
        let ops = vec![op(10, 5), op(0, 10), op(15, 1)];
        assert_eq!(check_partition(&ops, 16), Ok(()));
    }

    #[test]
    fn test_partition_rejects_gap() {
        let ops = vec![op(0, 10), op(12, 4)];
        assert_eq!(
            check_partition(&ops, 16),
            Err(PartitionError::Gap { start: 10, end: 12 })
        );
    }

    #[test]
    fn test_partition_rejects_overlap() {
        let ops = vec![op(0, 10), op(8, 8)];
        assert_eq!(
            check_partition(&ops, 16),
            Err(PartitionError::Overlap { offset: 8 })
        );
    }

    #[test]
    fn test_partition_rejects_short_or_long_cover() {
        assert_eq!(
            check_partition(&[op(0, 10)], 16),
            Err(PartitionError::SizeMismatch { covered: 10, size: 16 })
        );
        assert_eq!(
            check_partition(&[op(0, 20)], 16),
            Err(PartitionError::SizeMismatch { covered: 20, size: 16 })
        );
    }

    #[test]
    fn test_partition_rejects_zero_length_and_empty() {
        assert_eq!(
            check_partition(&[op(0, 0)], 0),
            Err(PartitionError::ZeroLength { index: 0 })
        );
        assert_eq!(check_partition(&[], 5), Err(PartitionError::Empty { size: 5 }));
        assert_eq!(check_partition(&[], 0), Ok(()));
    }
}
