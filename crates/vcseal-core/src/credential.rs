//! The credential document model.
//!
//! A Verifiable Credential is treated as an opaque JSON object. The codec
//! only cares that it is an object and, at verification time, that the four
//! required top-level fields are present. No deeper schema is enforced.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::CodecError;

/// Top-level fields a credential must carry to be accepted at verification.
pub const REQUIRED_FIELDS: [&str; 4] = ["@context", "type", "issuer", "credentialSubject"];

/// A Verifiable Credential document: a JSON object, otherwise opaque.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VerifiableCredential(Map<String, Value>);

impl VerifiableCredential {
    /// Wrap a JSON value. Fails unless the value is an object.
    pub fn from_value(value: Value) -> Result<Self, CodecError> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            other => Err(CodecError::MalformedVc(format!(
                "credential must be a JSON object, got {}",
                json_type_name(&other)
            ))),
        }
    }

    /// Parse a credential from a JSON string.
    pub fn from_json_str(s: &str) -> Result<Self, CodecError> {
        let value: Value =
            serde_json::from_str(s).map_err(|e| CodecError::MalformedVc(e.to_string()))?;
        Self::from_value(value)
    }

    /// The underlying key-value map.
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Convert back into a plain JSON value.
    pub fn to_value(&self) -> Value {
        Value::Object(self.0.clone())
    }

    /// Look up a top-level field.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Required top-level fields that are absent from this document.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        REQUIRED_FIELDS
            .iter()
            .filter(|f| !self.0.contains_key(**f))
            .copied()
            .collect()
    }

    /// Whether all required top-level fields are present.
    pub fn is_complete(&self) -> bool {
        self.missing_fields().is_empty()
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_value_requires_object() {
        assert!(VerifiableCredential::from_value(json!({"issuer": "x"})).is_ok());
        assert!(VerifiableCredential::from_value(json!("not an object")).is_err());
        assert!(VerifiableCredential::from_value(json!([1, 2])).is_err());
    }

    #[test]
    fn test_missing_fields() {
        let vc = VerifiableCredential::from_value(json!({
            "@context": ["https://www.w3.org/2018/credentials/v1"],
            "issuer": "did:example:123"
        }))
        .unwrap();

        assert_eq!(vc.missing_fields(), vec!["type", "credentialSubject"]);
        assert!(!vc.is_complete());
    }

    #[test]
    fn test_complete_credential() {
        let vc = VerifiableCredential::from_json_str(
            r#"{
                "@context": ["https://www.w3.org/2018/credentials/v1"],
                "type": ["VerifiableCredential"],
                "issuer": "did:example:123",
                "credentialSubject": {"id": "did:example:456"}
            }"#,
        )
        .unwrap();

        assert!(vc.is_complete());
        assert_eq!(vc.get("issuer"), Some(&json!("did:example:123")));
    }

    #[test]
    fn test_invalid_json_rejected() {
        assert!(VerifiableCredential::from_json_str("{not json").is_err());
    }
}
