//! Minimal Atlassian Document Format helpers. Jira v3 takes rich text
//! (descriptions, comments, worklog comments) as ADF documents.

use serde_json::{json, Value};

/// Wraps plain text in a single-paragraph ADF document.
pub fn paragraph_document(text: &str) -> Value {
    json!({
        "type": "doc",
        "version": 1,
        "content": [
            {
                "type": "paragraph",
                "content": [{ "type": "text", "text": text }]
            }
        ]
    })
}

/// Flattens the top-level blocks of an ADF document: each block's text nodes
/// are concatenated, blocks are joined with a single space.
pub fn plain_text(document: &Value) -> String {
    document
        .get("content")
        .and_then(Value::as_array)
        .map(|blocks| {
            blocks
                .iter()
                .map(|block| {
                    block
                        .get("content")
                        .and_then(Value::as_array)
                        .map(|parts| {
                            parts
                                .iter()
                                .filter_map(|part| part.get("text").and_then(Value::as_str))
                                .collect::<String>()
                        })
                        .unwrap_or_default()
                })
                .collect::<Vec<_>>()
                .join(" ")
        })
        .unwrap_or_default()
}
