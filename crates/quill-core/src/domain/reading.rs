//! Word count and read-time estimation.

use super::content::ContentNode;

/// Average reading speed used for the read-time label.
pub const WORDS_PER_MINUTE: usize = 200;

/// Collect the plain text of a content tree, depth first.
///
/// Every text payload is followed by a single space; the result is trimmed.
pub fn extract_text(node: &ContentNode) -> String {
    fn walk(node: &ContentNode, out: &mut String) {
        if node.kind == "text" {
            if let Some(text) = node.text.as_deref().filter(|t| !t.is_empty()) {
                out.push_str(text);
                out.push(' ');
            }
        }
        for child in &node.content {
            walk(child, out);
        }
    }

    let mut out = String::new();
    walk(node, &mut out);
    out.trim().to_string()
}

/// Number of whitespace-delimited, non-empty tokens.
pub fn count_words(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Format the read-time label for a word count: `"< 1m"` or `"{n}m"`.
pub fn read_time_label(word_count: usize) -> String {
    let minutes = word_count.div_ceil(WORDS_PER_MINUTE);
    if minutes < 1 {
        "< 1m".to_string()
    } else {
        format!("{minutes}m")
    }
}

impl ContentNode {
    pub fn word_count(&self) -> usize {
        count_words(&extract_text(self))
    }

    pub fn read_time(&self) -> String {
        read_time_label(self.word_count())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(n: usize) -> String {
        vec!["word"; n].join(" ")
    }

    #[test]
    fn test_read_time_boundaries() {
        assert_eq!(read_time_label(0), "< 1m");
        assert_eq!(read_time_label(1), "1m");
        assert_eq!(read_time_label(200), "1m");
        assert_eq!(read_time_label(201), "2m");
        assert_eq!(read_time_label(1000), "5m");
    }

    #[test]
    fn test_extract_text_walks_nested_nodes() {
        let doc = ContentNode::doc(vec![
            ContentNode::heading(2, vec![ContentNode::text("Why context")]),
            ContentNode::paragraph(vec![
                ContentNode::text("switching").with_mark("italic"),
                ContentNode::text("hurts"),
            ]),
            ContentNode::block(
                "bulletList",
                vec![ContentNode::block(
                    "listItem",
                    vec![ContentNode::paragraph(vec![ContentNode::text("focus")])],
                )],
            ),
        ]);

        assert_eq!(extract_text(&doc), "Why context switching hurts focus");
        assert_eq!(doc.word_count(), 5);
    }

    #[test]
    fn test_count_words_ignores_extra_whitespace() {
        assert_eq!(count_words(""), 0);
        assert_eq!(count_words("   \n\t "), 0);
        assert_eq!(count_words("  one\ttwo \n three  "), 3);
    }

    #[test]
    fn test_read_time_from_content() {
        let doc = ContentNode::doc(vec![ContentNode::paragraph(vec![ContentNode::text(
            words(201),
        )])]);
        assert_eq!(doc.read_time(), "2m");
        assert_eq!(ContentNode::default().read_time(), "< 1m");
    }

    #[test]
    fn test_recompute_on_unchanged_content_is_stable() {
        let doc = ContentNode::doc(vec![
            ContentNode::paragraph(vec![ContentNode::text(words(150))]),
            ContentNode::paragraph(vec![ContentNode::text(words(150))]),
        ]);
        let first = doc.read_time();
        let reparsed: ContentNode = serde_json::from_value(doc.to_json()).unwrap();
        assert_eq!(reparsed.read_time(), first);
        assert_eq!(first, "2m");
    }
}
