//! Store error taxonomy.
//!
//! [`StoreError`] is the single error type surfaced by every storage
//! operation. Variants map one-to-one onto the failure modes of the
//! persistence pipeline: encode, write, read, decode. Nothing is retried
//! inside this layer; the allocation engine decides how to react.

/// Errors returned by the prefix storage layer.
///
/// Each variant carries a message identifying the failed operation. The
/// two intentional non-errors of the contract — updating or deleting a
/// CIDR that has no row — never surface here; they succeed silently and
/// are only visible as `debug` trace events.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A prefix could not be serialized to its stored document form.
    ///
    /// Indicates a programming defect rather than a transient condition;
    /// retrying will not help.
    #[error("unable to encode prefix: {0}")]
    Encode(String),

    /// A stored document could not be parsed back into a prefix.
    ///
    /// Data corruption, schema drift, or a document written by an
    /// incompatible version of this layer.
    #[error("unable to decode prefix: {0}")]
    Decode(String),

    /// No row exists for the requested CIDR.
    #[error("prefix not found: {0}")]
    NotFound(String),

    /// A lookup or bulk query failed.
    #[error("unable to read prefix: {0}")]
    Read(String),

    /// The begin/execute/commit sequence of a mutation failed.
    ///
    /// Includes constraint violations that escape the create race
    /// handling, connection loss mid-transaction, and commit failures.
    #[error("prefix transaction failed: {0}")]
    Transaction(String),
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn messages_identify_the_operation() {
        let err = StoreError::NotFound("10.0.0.0/24".to_string());
        assert_eq!(err.to_string(), "prefix not found: 10.0.0.0/24");

        let err = StoreError::Encode("key must be a string".to_string());
        assert!(err.to_string().starts_with("unable to encode prefix:"));

        let err = StoreError::Transaction("connection reset".to_string());
        assert!(err.to_string().contains("connection reset"));
    }
}
