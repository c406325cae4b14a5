//! Protocol error types
//!
//! Encoder problems are value-typed: an unsupported record yields an empty
//! sentence list, never an error. What remains here is payload-level
//! (armoring) and frame-level (upstream decode) failure.

use thiserror::Error;

/// Errors from payload armoring and dearmoring
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// Character outside the AIS armor alphabet
    #[error("character {0:?} is not in the AIS 6-bit armor alphabet")]
    InvalidArmorChar(char),
}

/// Errors from decoding an upstream frame
///
/// Per-frame decode errors are recoverable: the caller counts them and keeps
/// receiving.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// Frame is not valid JSON, or a field has the wrong type
    ///
    /// Numeric fields encoded as strings land here: the provider contract is
    /// JSON numbers, and string coercion is rejected rather than guessed at.
    #[error("malformed frame: {0}")]
    Malformed(#[from] serde_json::Error),

    /// Frame parsed but carries no `MetaData` object
    #[error("frame has no MetaData object")]
    MissingMetadata,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_armor_char_display() {
        let err = ProtocolError::InvalidArmorChar('~');
        assert!(err.to_string().contains('~'));
    }

    #[test]
    fn test_malformed_frame_display() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = DecodeError::from(json_err);
        assert!(err.to_string().starts_with("malformed frame"));
    }

    #[test]
    fn test_missing_metadata_display() {
        assert!(DecodeError::MissingMetadata.to_string().contains("MetaData"));
    }
}
