use serde::{Deserialize, Serialize};

/// A quote as it travels over the wire and as it lives in the
/// `quotes` table. `is_liked` is computed per request for the
/// requesting user and never persisted, so row mapping leaves it at
/// its default.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Quote {
    pub id: i64,
    pub quote: String,
    pub author: String,
    #[serde(default)]
    pub tags: Option<String>,
    #[serde(default)]
    pub likes: i64,
    #[serde(default, rename = "isLiked")]
    #[sqlx(default)]
    pub is_liked: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_body_fills_defaults() {
        let quote: Quote =
            serde_json::from_str(r#"{"id": 1, "quote": "A", "author": "B"}"#).unwrap();

        assert_eq!(quote.tags, None);
        assert_eq!(quote.likes, 0);
        assert!(!quote.is_liked);
    }

    #[test]
    fn is_liked_is_camel_case_on_the_wire() {
        let quote = Quote {
            id: 1,
            quote: "A".to_string(),
            author: "B".to_string(),
            tags: None,
            likes: 1,
            is_liked: true,
        };

        let json = serde_json::to_value(&quote).unwrap();
        assert_eq!(json["isLiked"], serde_json::json!(true));
        assert!(json.get("is_liked").is_none());
    }
}
