//! Rich-text content tree as produced by the editor.

use serde::{Deserialize, Serialize};

/// A formatting mark applied to a text node (bold, italic, link, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mark {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attrs: Option<serde_json::Value>,
}

/// One node of the document tree.
///
/// Node types are kept as strings so unknown editor extensions survive a
/// round trip through the server untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentNode {
    #[serde(rename = "type", default = "doc_kind")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub marks: Vec<Mark>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attrs: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub content: Vec<ContentNode>,
}

fn doc_kind() -> String {
    "doc".to_string()
}

impl Default for ContentNode {
    fn default() -> Self {
        Self::doc(Vec::new())
    }
}

impl ContentNode {
    pub fn doc(content: Vec<ContentNode>) -> Self {
        Self::block("doc", content)
    }

    pub fn paragraph(content: Vec<ContentNode>) -> Self {
        Self::block("paragraph", content)
    }

    pub fn heading(level: u8, content: Vec<ContentNode>) -> Self {
        let mut node = Self::block("heading", content);
        node.attrs = Some(serde_json::json!({ "level": level }));
        node
    }

    pub fn block(kind: &str, content: Vec<ContentNode>) -> Self {
        Self {
            kind: kind.to_string(),
            text: None,
            marks: Vec::new(),
            attrs: None,
            content,
        }
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self {
            kind: "text".to_string(),
            text: Some(text.into()),
            marks: Vec::new(),
            attrs: None,
            content: Vec::new(),
        }
    }

    pub fn with_mark(mut self, kind: &str) -> Self {
        self.marks.push(Mark {
            kind: kind.to_string(),
            attrs: None,
        });
        self
    }

    /// True when the tree carries no text at all.
    pub fn is_empty(&self) -> bool {
        self.text.as_deref().is_none_or(str::is_empty) && self.content.iter().all(Self::is_empty)
    }

    /// Parse a stored JSON value, treating `null` or garbage as an empty document.
    pub fn from_json_lossy(value: serde_json::Value) -> Self {
        if value.is_null() {
            return Self::default();
        }
        serde_json::from_value(value).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Unreadable post content, using empty document");
            Self::default()
        })
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_object_is_empty_doc() {
        let node: ContentNode = serde_json::from_str("{}").unwrap();
        assert_eq!(node.kind, "doc");
        assert!(node.is_empty());
    }

    #[test]
    fn test_editor_json_parses_and_keeps_unknown_nodes() {
        let raw = serde_json::json!({
            "type": "doc",
            "content": [
                { "type": "callout", "attrs": { "tone": "info" }, "content": [
                    { "type": "text", "text": "Heads up", "marks": [{ "type": "bold" }] }
                ]}
            ]
        });

        let node: ContentNode = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(node.content[0].kind, "callout");
        assert_eq!(node.content[0].content[0].marks[0].kind, "bold");
        assert_eq!(node.to_json(), raw);
    }

    #[test]
    fn test_null_content_is_lossy_default() {
        assert_eq!(
            ContentNode::from_json_lossy(serde_json::Value::Null),
            ContentNode::default()
        );
        assert_eq!(
            ContentNode::from_json_lossy(serde_json::json!(42)),
            ContentNode::default()
        );
    }
}
