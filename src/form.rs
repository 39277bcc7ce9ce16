//! Bracket-style form encoding.
//!
//! The Mifiel API reads nested form parameters the Rails way:
//! `signatories[0][email]=...`. These helpers turn typed values into
//! ordered `(name, value)` pairs and stay independent of the transport.

use crate::types::Signatory;
use serde_json::Value;

/// Ordered form fields.
pub type FormFields = Vec<(String, String)>;

/// Encode signatories as `signatories[<i>][<field>]` pairs.
///
/// Indices are 0-based in slice order; fields keep each signatory's
/// insertion order.
pub fn encode_signatories(signatories: &[Signatory]) -> FormFields {
    signatories
        .iter()
        .enumerate()
        .flat_map(|(index, signatory)| {
            signatory
                .fields()
                .iter()
                .map(move |(field, value)| {
                    (format!("signatories[{}][{}]", index, field), value.clone())
                })
        })
        .collect()
}

/// Flatten an arbitrary JSON value under `prefix` into form pairs.
///
/// Objects nest by key, arrays by index, nulls are dropped and scalars are
/// written as text.
pub fn flatten(prefix: &str, value: &Value, out: &mut FormFields) {
    match value {
        Value::Null => {}
        Value::Bool(b) => out.push((prefix.to_string(), b.to_string())),
        Value::Number(n) => out.push((prefix.to_string(), n.to_string())),
        Value::String(s) => out.push((prefix.to_string(), s.clone())),
        Value::Array(items) => {
            for (index, item) in items.iter().enumerate() {
                flatten(&format!("{}[{}]", prefix, index), item, out);
            }
        }
        Value::Object(map) => {
            for (key, item) in map {
                flatten(&format!("{}[{}]", prefix, key), item, out);
            }
        }
    }
}

/// Flatten the top-level keys of a JSON object into form pairs.
pub fn flatten_object(object: &serde_json::Map<String, Value>) -> FormFields {
    let mut out = FormFields::new();
    for (key, value) in object {
        flatten(key, value, &mut out);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_encode_single_signatory() {
        let fields = encode_signatories(&[Signatory::new().email("a@b.com")]);
        assert_eq!(
            fields,
            vec![("signatories[0][email]".to_string(), "a@b.com".to_string())]
        );
    }

    #[test]
    fn test_encode_preserves_order() {
        let signatories = vec![
            Signatory::new().email("some@email.com").tax_id("ASDD543412ERP"),
            Signatory::new().email("some@email1.com").tax_id("ASDD543413ERP"),
        ];
        let names: Vec<String> = encode_signatories(&signatories)
            .into_iter()
            .map(|(name, _)| name)
            .collect();
        assert_eq!(
            names,
            vec![
                "signatories[0][email]",
                "signatories[0][tax_id]",
                "signatories[1][email]",
                "signatories[1][tax_id]",
            ]
        );
    }

    #[test]
    fn test_encode_empty() {
        assert!(encode_signatories(&[]).is_empty());
    }

    #[test]
    fn test_flatten_nested() {
        let mut out = FormFields::new();
        flatten(
            "meta",
            &json!({"tags": ["a", "b"], "count": 2, "draft": false, "gone": null}),
            &mut out,
        );
        assert!(out.contains(&("meta[tags][0]".to_string(), "a".to_string())));
        assert!(out.contains(&("meta[tags][1]".to_string(), "b".to_string())));
        assert!(out.contains(&("meta[count]".to_string(), "2".to_string())));
        assert!(out.contains(&("meta[draft]".to_string(), "false".to_string())));
        assert!(!out.iter().any(|(name, _)| name == "meta[gone]"));
    }

    #[test]
    fn test_flatten_object_top_level() {
        let object = json!({"id": "doc-1", "callback_url": "https://x"});
        let fields = flatten_object(object.as_object().unwrap());
        assert!(fields.contains(&("id".to_string(), "doc-1".to_string())));
        assert!(fields.contains(&("callback_url".to_string(), "https://x".to_string())));
    }
}
