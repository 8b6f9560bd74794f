//! codec
//!
//! Argument bundle decoding and normalization.
//!
//! # Wire Format
//!
//! The orchestrator encodes the argument mapping as CBOR and then as
//! standard base64 so it survives a command line. [`decode`] reverses both
//! steps and [`encode`] applies them.
//!
//! # Normalization
//!
//! [`normalize`] rewrites double quotes to single quotes in the `sql`
//! argument only. Templated queries arrive with double-quoted literals that
//! the downstream SQL engines reject.
//!
//! # Example
//!
//! ```
//! use serde_json::json;
//! use taskshim::codec::{decode, encode, normalize};
//! use taskshim::core::types::Arguments;
//!
//! let args = Arguments::try_from(json!({"sql": "SELECT \"a\""})).unwrap();
//! let wire = encode(&args).unwrap();
//! let decoded = normalize(decode(&wire).unwrap());
//! assert_eq!(decoded.get_str("sql"), Some("SELECT 'a'"));
//! ```

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde_json::Value;
use thiserror::Error;

use crate::core::types::Arguments;

/// Argument name that carries an embedded query string.
pub const SQL_KEY: &str = "sql";

/// Errors from decoding an argument bundle.
#[derive(Debug, Error)]
pub enum CodecError {
    /// The text layer is not valid base64.
    #[error("argument bundle is not valid base64: {0}")]
    Encoding(#[from] base64::DecodeError),

    /// The decoded bytes are not a valid CBOR payload.
    #[error("argument bundle payload is not valid CBOR: {0}")]
    Payload(#[from] serde_cbor::Error),

    /// The payload decoded, but its root is not a mapping.
    #[error("argument bundle must decode to a mapping of names to values, got {0}")]
    NotAMapping(&'static str),
}

/// Decode an encoded argument bundle into an argument mapping.
///
/// # Errors
///
/// - [`CodecError::Encoding`] if the text is not base64
/// - [`CodecError::Payload`] if the bytes are not a CBOR value
/// - [`CodecError::NotAMapping`] if the root value is not a mapping
pub fn decode(encoded: &str) -> Result<Arguments, CodecError> {
    let bytes = STANDARD.decode(encoded.trim())?;
    let value: Value = serde_cbor::from_slice(&bytes)?;
    Arguments::try_from(value).map_err(|other| CodecError::NotAMapping(kind_of(&other)))
}

/// Encode an argument mapping into the text-safe wire format.
pub fn encode(args: &Arguments) -> Result<String, CodecError> {
    let bytes = serde_cbor::to_vec(args)?;
    Ok(STANDARD.encode(bytes))
}

/// Replace double quotes with single quotes in the `sql` argument.
///
/// Every other argument passes through unchanged, as does an `sql` argument
/// whose value is not a string.
pub fn normalize(mut args: Arguments) -> Arguments {
    if let Some(Value::String(sql)) = args.get_mut(SQL_KEY) {
        if sql.contains('"') {
            tracing::info!("Replacing double quotes with single quotes in the sql parameter");
            *sql = sql.replace('"', "'");
        }
    }
    args
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a sequence",
        Value::Object(_) => "a mapping",
    }
}
