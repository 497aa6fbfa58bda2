//! Structural validation for documents arriving from outside (files, clipboard, network).
//!
//! Runs on the raw JSON value before deserialization so errors can name the offending path.

use crate::model::MindMapDocument;
use crate::{Error, Result};
use serde::Deserialize;
use serde_json::Value;

/// Maximum accepted nesting depth for imported node trees.
pub const MAX_IMPORT_DEPTH: usize = 100;

/// Raw JSON nesting accepted by [`read_json_value`]: three levels per node covers both the native
/// `{ children: [..] }` shape and XMind's `{ children: { attached: [..] } }`, plus wrappers.
pub const MAX_JSON_NESTING: usize = 3 * (MAX_IMPORT_DEPTH + 1) + 8;

/// Parses untrusted JSON bytes into a [`Value`].
///
/// A byte scan rejects input nested deeper than [`MAX_JSON_NESTING`] up front; the parser itself
/// then runs without serde_json's fixed recursion limit, which is lower than a 100-level tree
/// needs.
pub fn read_json_value(bytes: &[u8]) -> Result<Value> {
    check_json_nesting(bytes, MAX_JSON_NESTING)?;
    let mut de = serde_json::Deserializer::from_slice(bytes);
    de.disable_recursion_limit();
    let value = Value::deserialize(&mut de)?;
    de.end()?;
    Ok(value)
}

fn check_json_nesting(bytes: &[u8], limit: usize) -> Result<()> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;
    for &b in bytes {
        if in_string {
            match b {
                _ if escaped => escaped = false,
                b'\\' => escaped = true,
                b'"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match b {
            b'"' => in_string = true,
            b'{' | b'[' => {
                depth += 1;
                if depth > limit {
                    return Err(Error::DepthExceeded {
                        path: "$".to_string(),
                        max_depth: MAX_IMPORT_DEPTH,
                    });
                }
            }
            b'}' | b']' => depth = depth.saturating_sub(1),
            _ => {}
        }
    }
    Ok(())
}

/// Validates a raw document value and deserializes it.
pub fn parse_document_value(value: &Value) -> Result<MindMapDocument> {
    validate_document_value(value)?;
    Ok(MindMapDocument::deserialize(value)?)
}

/// Checks that `value` carries `id`, `name` and a well-formed `root` node.
pub fn validate_document_value(value: &Value) -> Result<()> {
    let Some(obj) = value.as_object() else {
        return Err(Error::invalid("$", "document must be a JSON object"));
    };
    if !obj.get("id").is_some_and(Value::is_string) {
        return Err(Error::invalid("$.id", "missing document id"));
    }
    if !obj.get("name").is_some_and(Value::is_string) {
        return Err(Error::invalid("$.name", "missing document name"));
    }
    let Some(root) = obj.get("root") else {
        return Err(Error::invalid("$.root", "missing root node"));
    };
    validate_node_value(root, "$.root", 0)
}

/// Checks a node and its descendants: every node needs a string `id`, a string `text` and a
/// `children` array, and nesting may not exceed [`MAX_IMPORT_DEPTH`].
pub fn validate_node_value(value: &Value, path: &str, depth: usize) -> Result<()> {
    if depth > MAX_IMPORT_DEPTH {
        return Err(Error::DepthExceeded {
            path: path.to_string(),
            max_depth: MAX_IMPORT_DEPTH,
        });
    }
    let Some(obj) = value.as_object() else {
        return Err(Error::invalid(path, "node must be a JSON object"));
    };
    if !obj.get("id").is_some_and(Value::is_string) {
        return Err(Error::invalid(format!("{path}.id"), "missing node id"));
    }
    if !obj.get("text").is_some_and(Value::is_string) {
        return Err(Error::invalid(format!("{path}.text"), "missing node text"));
    }
    let Some(children) = obj.get("children").and_then(Value::as_array) else {
        return Err(Error::invalid(
            format!("{path}.children"),
            "children must be an array",
        ));
    };
    for (i, child) in children.iter().enumerate() {
        validate_node_value(child, &format!("{path}.children[{i}]"), depth + 1)?;
    }
    Ok(())
}
