//! Exchange record encoding.
//!
//! A record is one line of comma-separated integer identities. The native
//! loader splits on commas and reads each field as an integer; nothing else
//! (no spaces, no trailing separator) is accepted.

use crate::error::ValidationError;

/// Encodes integer fields as a record.
#[must_use]
pub fn encode_record(fields: &[i64]) -> String {
    fields
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

/// Decodes a record back into its integer fields.
///
/// Returns `ValidationError::MalformedRecord` for empty records and fields
/// that are not integers.
pub fn decode_record(record: &str) -> Result<Vec<i64>, ValidationError> {
    if record.is_empty() {
        return Err(ValidationError::MalformedRecord {
            record: record.to_string(),
            reason: "empty record".to_string(),
        });
    }
    record
        .split(',')
        .map(|field| {
            field.parse::<i64>().map_err(|e| ValidationError::MalformedRecord {
                record: record.to_string(),
                reason: format!("field '{field}': {e}"),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode() {
        assert_eq!(encode_record(&[2, 3, 5]), "2,3,5");
        assert_eq!(encode_record(&[-1]), "-1");
    }

    #[test]
    fn test_decode() {
        assert_eq!(decode_record("2,3,5").unwrap(), vec![2, 3, 5]);
        assert_eq!(decode_record("7").unwrap(), vec![7]);
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(decode_record("").is_err());
        assert!(decode_record("2,,3").is_err());
        assert!(decode_record("2, 3").is_err());
        assert!(matches!(
            decode_record("b1"),
            Err(ValidationError::MalformedRecord { ref record, .. }) if record == "b1"
        ));
    }
}
