//! Per-kind document rewrites applied before typed decoding.
//!
//! Some kinds put the same logical content in different places depending on
//! the subtype. A normalizer moves it to one canonical place so the typed
//! shape has a single field to read. Normalizers are idempotent: a document
//! that is already canonical comes back unchanged.

use serde_json::{Map, Value};

use crate::payloads::message::SUBTYPE_MESSAGE_DELETED;

/// Key holding canonical message content.
const MESSAGE_KEY: &str = "message";

/// Root keys that mark a message as carrying content.
const CONTENT_KEYS: [&str; 6] = ["text", "user", "bot_id", "blocks", "attachments", "files"];

/// Envelope keys never copied into the canonical content.
const ENVELOPE_ONLY_KEYS: [&str; 3] = ["message", "previous_message", "root"];

/// Canonicalize a `message` document.
///
/// - A document that already has a `message` key (object or `null`) is
///   returned as is. Edits arrive in this form.
/// - A deletion gets an explicit `"message": null`.
/// - A plain post has its root fields copied under `message`.
pub fn message(doc: Value) -> Value {
    let Value::Object(mut root) = doc else {
        return doc;
    };
    if root.contains_key(MESSAGE_KEY) {
        return Value::Object(root);
    }

    if is_deletion(&root) {
        let _ = root.insert(MESSAGE_KEY.to_owned(), Value::Null);
        return Value::Object(root);
    }

    let content: Map<String, Value> = root
        .iter()
        .filter(|(key, _)| !ENVELOPE_ONLY_KEYS.contains(&key.as_str()))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();
    let _ = root.insert(MESSAGE_KEY.to_owned(), Value::Object(content));
    Value::Object(root)
}

fn is_deletion(root: &Map<String, Value>) -> bool {
    if root.get("subtype").and_then(Value::as_str) == Some(SUBTYPE_MESSAGE_DELETED) {
        return true;
    }
    !CONTENT_KEYS.iter().any(|key| root.contains_key(*key))
}
