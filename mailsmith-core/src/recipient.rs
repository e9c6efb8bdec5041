use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

/// Canonical recipient accepted by email providers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct RecipientEntry {
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl RecipientEntry {
    /// Returns `None` when the address is empty after trimming.
    pub fn new(email: &str, name: Option<String>) -> Option<Self> {
        let email = email.trim();
        if email.is_empty() {
            return None;
        }
        Some(Self {
            email: email.to_owned(),
            name,
        })
    }
}

/// Recipients as clients send them: a comma-separated string or a list of
/// bare addresses and `{email, name}` objects.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RecipientsInput {
    Single(String),
    List(Vec<Value>),
    Other(Value),
}

impl From<&str> for RecipientsInput {
    fn from(value: &str) -> Self {
        Self::Single(value.to_owned())
    }
}

impl From<Value> for RecipientsInput {
    fn from(value: Value) -> Self {
        match value {
            Value::String(list) => Self::Single(list),
            Value::Array(items) => Self::List(items),
            other => Self::Other(other),
        }
    }
}

impl RecipientsInput {
    /// Converts the input into canonical entries, silently dropping anything unusable.
    pub fn normalize(&self) -> Vec<RecipientEntry> {
        match self {
            RecipientsInput::Single(list) => list
                .split(',')
                .filter_map(|email| RecipientEntry::new(email, None))
                .collect(),
            RecipientsInput::List(items) => items.iter().filter_map(list_item).collect(),
            RecipientsInput::Other(_) => vec![],
        }
    }
}

fn list_item(item: &Value) -> Option<RecipientEntry> {
    match item {
        Value::String(email) => RecipientEntry::new(email, None),
        Value::Object(fields) => {
            let email = fields.get("email")?.as_str()?;
            let name = fields.get("name").and_then(Value::as_str).map(str::to_owned);
            RecipientEntry::new(email, name)
        }
        _ => None,
    }
}

pub fn normalize(input: &RecipientsInput) -> Vec<RecipientEntry> {
    input.normalize()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn entry(email: &str, name: Option<&str>) -> RecipientEntry {
        RecipientEntry {
            email: email.to_string(),
            name: name.map(str::to_string),
        }
    }

    fn parse(value: Value) -> RecipientsInput {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_comma_separated_string() {
        let recipients = normalize(&"a@x.com, , b@y.com".into());
        assert_eq!(
            recipients,
            vec![entry("a@x.com", None), entry("b@y.com", None)]
        );
    }

    #[test]
    fn test_blank_string() {
        assert!(normalize(&" , ,".into()).is_empty());
        assert!(normalize(&"".into()).is_empty());
    }

    #[test]
    fn test_mixed_list() {
        let input = parse(json!([
            {"email": "a@x.com", "name": "A"},
            "b@y.com",
            {"name": "no-email"}
        ]));

        assert_eq!(
            normalize(&input),
            vec![entry("a@x.com", Some("A")), entry("b@y.com", None)]
        );
    }

    #[test]
    fn test_list_skips_unusable_elements() {
        let input = parse(json!([
            42,
            null,
            ["nested@x.com"],
            {"email": ""},
            {"email": null, "name": "Nobody"},
            "   ",
            {"email": " c@z.com "}
        ]));

        assert_eq!(normalize(&input), vec![entry("c@z.com", None)]);
    }

    #[test]
    fn test_other_shapes_yield_nothing() {
        assert!(normalize(&parse(json!(12))).is_empty());
        assert!(normalize(&parse(json!({"email": "a@x.com"}))).is_empty());
        assert!(normalize(&parse(json!(true))).is_empty());
    }

    #[test]
    fn test_from_value_matches_deserialization() {
        let value = json!(["a@x.com", {"email": "b@y.com", "name": "B"}]);
        assert_eq!(
            normalize(&RecipientsInput::from(value.clone())),
            normalize(&parse(value))
        );
        assert_eq!(
            normalize(&RecipientsInput::from(json!("a@x.com,b@y.com"))).len(),
            2
        );
    }

    #[test]
    fn test_name_is_omitted_when_absent() {
        let serialized = serde_json::to_value(entry("a@x.com", None)).unwrap();
        assert_eq!(serialized, json!({"email": "a@x.com"}));
    }
}
