//! Chat reply classification
//!
//! The backend's chat reply is shapeless JSON; this module pins it down
//! into a fixed set of renderable variants through an ordered predicate
//! chain. The precedence order is behaviourally significant and must not
//! be rearranged: tabular data wins over text, text over an error
//! message, and anything else degrades to the unknown-reply notice.

use serde_json::{Map, Value};

pub const UNKNOWN_REPLY: &str = "An unknown error occurred or no valid response received.";

/// A table row: column name to cell value, in the backend's key order.
pub type TableRow = Map<String, Value>;

/// What a conversation entry renders as.
#[derive(Debug, Clone, PartialEq)]
pub enum MessageBody {
    Text(String),
    Table(Vec<TableRow>),
}

/// Classify a backend chat reply, first match wins:
///
/// 1. `response` is a non-empty array whose first element is an object:
///    a table; each element contributes its object as a row.
/// 2. `response` is a string: plain text.
/// 3. `message` is a string: an error text.
/// 4. anything else: the unknown-reply notice.
pub fn classify(reply: &Value) -> MessageBody {
    if let Some(Value::Array(items)) = reply.get("response") {
        if items.first().is_some_and(Value::is_object) {
            let rows = items
                .iter()
                // Rows past the first may be malformed; they render as
                // blank cells rather than failing the whole table.
                .map(|item| item.as_object().cloned().unwrap_or_default())
                .collect();
            return MessageBody::Table(rows);
        }
    }

    if let Some(Value::String(text)) = reply.get("response") {
        return MessageBody::Text(text.clone());
    }

    if let Some(Value::String(message)) = reply.get("message") {
        return MessageBody::Text(format!("Error: {}", message));
    }

    MessageBody::Text(UNKNOWN_REPLY.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn row_array_becomes_a_table() {
        let reply = json!({"response": [{"a": 1, "b": 2}, {"a": 3, "b": 4}]});
        match classify(&reply) {
            MessageBody::Table(rows) => {
                assert_eq!(rows.len(), 2);
                assert_eq!(rows[0]["a"], json!(1));
                assert_eq!(rows[1]["b"], json!(4));
            }
            other => panic!("expected table, got {:?}", other),
        }
    }

    #[test]
    fn string_response_becomes_text() {
        let reply = json!({"response": "hello"});
        assert_eq!(classify(&reply), MessageBody::Text("hello".to_string()));
    }

    #[test]
    fn message_field_becomes_error_text() {
        let reply = json!({"message": "bad input"});
        assert_eq!(
            classify(&reply),
            MessageBody::Text("Error: bad input".to_string())
        );
    }

    #[test]
    fn empty_reply_is_the_unknown_notice() {
        assert_eq!(
            classify(&json!({})),
            MessageBody::Text(UNKNOWN_REPLY.to_string())
        );
    }

    #[test]
    fn empty_array_is_not_a_table() {
        // No first row to derive columns from; falls through the chain.
        let reply = json!({"response": [], "message": "nothing matched"});
        assert_eq!(
            classify(&reply),
            MessageBody::Text("Error: nothing matched".to_string())
        );
    }

    #[test]
    fn array_of_primitives_is_not_a_table() {
        let reply = json!({"response": ["a", "b"]});
        assert_eq!(
            classify(&reply),
            MessageBody::Text(UNKNOWN_REPLY.to_string())
        );
    }

    #[test]
    fn table_wins_over_message() {
        let reply = json!({"response": [{"a": 1}], "message": "ignored"});
        assert!(matches!(classify(&reply), MessageBody::Table(_)));
    }

    #[test]
    fn malformed_later_rows_degrade_to_empty() {
        let reply = json!({"response": [{"a": 1}, "stray"]});
        match classify(&reply) {
            MessageBody::Table(rows) => {
                assert_eq!(rows.len(), 2);
                assert!(rows[1].is_empty());
            }
            other => panic!("expected table, got {:?}", other),
        }
    }

    #[test]
    fn non_string_response_with_no_message_is_unknown() {
        let reply = json!({"response": 42});
        assert_eq!(
            classify(&reply),
            MessageBody::Text(UNKNOWN_REPLY.to_string())
        );
    }
}
