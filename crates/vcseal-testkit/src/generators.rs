//! Proptest generators for credential documents.

use proptest::prelude::*;
use serde_json::{Map, Value};

use vcseal_core::VerifiableCredential;

/// Generate a JSON scalar.
fn scalar() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(|n| Value::Number(n.into())),
        any::<u64>().prop_map(|n| Value::Number(n.into())),
        // Finite floats only; JSON has no NaN or infinities
        prop::num::f64::NORMAL.prop_map(|f| {
            serde_json::Number::from_f64(f)
                .map(Value::Number)
                .unwrap_or(Value::Null)
        }),
        "[a-zA-Z0-9 @:/._-]{0,16}".prop_map(Value::String),
    ]
}

/// Generate an arbitrary JSON value with bounded depth and width.
pub fn json_value() -> impl Strategy<Value = Value> {
    scalar().prop_recursive(3, 48, 5, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..5).prop_map(Value::Array),
            prop::collection::btree_map("[a-z@][a-zA-Z0-9_]{0,7}", inner, 0..5).prop_map(|m| {
                Value::Object(m.into_iter().collect::<Map<String, Value>>())
            }),
        ]
    })
}

/// Generate a credential carrying all required fields plus arbitrary extras.
pub fn credential() -> impl Strategy<Value = VerifiableCredential> {
    (
        json_value(),
        prop::collection::btree_map("[a-z][a-zA-Z0-9_]{0,7}", json_value(), 0..4),
        "[a-z0-9:._-]{1,24}",
    )
        .prop_map(|(subject, extras, issuer)| {
            let mut map = Map::new();
            map.insert(
                "@context".into(),
                serde_json::json!(["https://www.w3.org/2018/credentials/v1"]),
            );
            map.insert("type".into(), serde_json::json!(["VerifiableCredential"]));
            map.insert("issuer".into(), Value::String(format!("did:example:{issuer}")));
            map.insert("credentialSubject".into(), subject);
            for (k, v) in extras {
                map.insert(k, v);
            }
            VerifiableCredential::from_value(Value::Object(map))
                .expect("generated credential is an object")
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    proptest! {
        #[test]
        fn generated_credentials_are_complete(vc in credential()) {
            prop_assert!(vc.is_complete());
        }

        #[test]
        fn generated_values_canonicalize(vc in credential()) {
            prop_assert!(vcseal_core::canonical_bytes(&vc).is_ok());
        }
    }
}
