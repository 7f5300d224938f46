//! HAL JSON envelopes.

use axum::http::header;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use serde_json::{json, Map, Value};

/// `{ "_embedded": value, "_links": { name: { "href": .. } } }`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Hal {
    #[serde(rename = "_embedded")]
    pub embedded: Value,
    #[serde(rename = "_links")]
    pub links: Map<String, Value>,
}

impl Hal {
    pub fn new(embedded: impl Serialize, self_href: impl Into<String>) -> Self {
        let mut links = Map::new();
        links.insert("self".to_string(), json!({ "href": self_href.into() }));
        Self {
            embedded: serde_json::to_value(embedded).unwrap_or(Value::Null),
            links,
        }
    }

    /// Empty document answered for values that do not exist yet.
    pub fn empty() -> Self {
        Self {
            embedded: Value::Null,
            links: Map::new(),
        }
    }

    #[must_use]
    pub fn with_link(mut self, name: &str, href: impl Into<String>) -> Self {
        self.links
            .insert(name.to_string(), json!({ "href": href.into() }));
        self
    }
}

impl IntoResponse for Hal {
    fn into_response(self) -> Response {
        let body = serde_json::to_vec(&self).unwrap_or_default();
        ([(header::CONTENT_TYPE, "application/hal+json")], body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hal_shape() {
        let hal = Hal::new(json!({"amount": "5"}), "/token/a/account/b")
            .with_link("token", "/token/a");
        let v = serde_json::to_value(&hal).unwrap();

        assert_eq!(v["_embedded"]["amount"], "5");
        assert_eq!(v["_links"]["self"]["href"], "/token/a/account/b");
        assert_eq!(v["_links"]["token"]["href"], "/token/a");
    }

    #[test]
    fn test_empty_hal() {
        let v = serde_json::to_value(Hal::empty()).unwrap();
        assert_eq!(v, json!({"_embedded": null, "_links": {}}));
    }
}
