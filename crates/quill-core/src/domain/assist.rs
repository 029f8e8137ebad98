//! AI writing assistance: modes, instruction templates and how results are
//! folded back into the document.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Characters of trailing text sent with an explicit assist action.
pub const EXPLICIT_CONTEXT_CHARS: usize = 500;

/// Characters of trailing text sent with a passive completion.
pub const SUGGESTION_CONTEXT_CHARS: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssistMode {
    /// Write an opening paragraph from the title alone.
    Draft,
    /// Continue the trailing text.
    Complete,
    /// Rewrite a selected span.
    Rewrite,
    Expand,
    Summarize,
    /// Generic "improve or complete" used for unrecognized modes.
    Improve,
}

impl AssistMode {
    /// Lenient parse: anything unknown falls back to [`AssistMode::Improve`].
    pub fn parse(mode: Option<&str>) -> Self {
        match mode.map(str::trim) {
            Some("draft") => AssistMode::Draft,
            Some("complete") => AssistMode::Complete,
            Some("rewrite") => AssistMode::Rewrite,
            Some("expand") => AssistMode::Expand,
            Some("summarize") => AssistMode::Summarize,
            _ => AssistMode::Improve,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AssistMode::Draft => "draft",
            AssistMode::Complete => "complete",
            AssistMode::Rewrite => "rewrite",
            AssistMode::Expand => "expand",
            AssistMode::Summarize => "summarize",
            AssistMode::Improve => "improve",
        }
    }

    /// Instruction text for this mode.
    pub fn instructions(&self, title: Option<&str>) -> String {
        let title = title.map(str::trim).filter(|t| !t.is_empty());
        let titled = title
            .map(|t| format!("The blog post is titled: \"{t}\"\n\n"))
            .unwrap_or_default();

        match self {
            AssistMode::Draft => format!(
                "You are an expert blog writer helping to draft professional content.\n\n\
                 The user wants to write a blog post with this title: \"{}\"\n\n\
                 Write an engaging opening paragraph (3-4 sentences) that:\n\
                 - Hooks the reader immediately\n\
                 - Sets up the topic clearly\n\
                 - Uses a professional but conversational tone\n\
                 - Avoids clichés and generic openings\n\n\
                 Only provide the opening paragraph, no headings or titles. \
                 Do not use markdown formatting. Return plain text only.",
                title.unwrap_or_default()
            ),
            AssistMode::Complete => format!(
                "You are a helpful writing assistant for a professional blog.\n\n{titled}\
                 Continue the following text naturally and seamlessly. Write 1-2 sentences \
                 that flow naturally from what's written. Do not repeat the input text, only \
                 provide the continuation. Keep the same tone and style. Do not use markdown \
                 formatting.\n\nText to continue:"
            ),
            AssistMode::Rewrite => format!(
                "You are an expert editor helping improve blog content.\n\n{titled}\
                 Rewrite the following text to be:\n\
                 - Clearer and more engaging\n\
                 - More professional but still conversational\n\
                 - Better structured with improved flow\n\
                 - Free of redundancy and filler words\n\n\
                 Keep the same core meaning. Only return the improved text, no explanations. \
                 Do not use markdown formatting. Return plain text only.\n\nText to improve:"
            ),
            AssistMode::Expand => format!(
                "You are a helpful writing assistant for a professional blog.\n\n{titled}\
                 Expand the following text with more detail, examples, or explanation. Keep \
                 the same tone and style. Write 2-3 additional paragraphs. Do not use markdown \
                 formatting.\n\nText to expand:"
            ),
            AssistMode::Summarize => "You are a helpful writing assistant. Summarize the \
                 following text into a concise 1-2 sentence summary. Do not use markdown \
                 formatting.\n\nText to summarize:"
                .to_string(),
            AssistMode::Improve => format!(
                "You are a helpful writing assistant for a professional blog.\n\n{titled}\
                 Help improve or complete the following text:"
            ),
        }
    }

    /// Full provider prompt: instructions, then the user text if any.
    pub fn render(&self, title: Option<&str>, prompt: Option<&str>) -> String {
        let instructions = self.instructions(title);
        match prompt.filter(|p| !p.trim().is_empty()) {
            Some(prompt) => format!("{instructions}\n\n{prompt}"),
            None => instructions,
        }
    }
}

impl fmt::Display for AssistMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Remove markdown residue the provider sometimes emits despite instructions.
pub fn strip_markup(text: &str) -> String {
    text.chars()
        .filter(|c| !matches!(c, '*' | '#' | '`'))
        .collect::<String>()
        .trim()
        .to_string()
}

/// Last `n` characters of `text`, on a char boundary.
pub fn tail_chars(text: &str, n: usize) -> &str {
    let count = text.chars().count();
    if count <= n {
        return text;
    }
    let start = text
        .char_indices()
        .nth(count - n)
        .map(|(i, _)| i)
        .unwrap_or(0);
    &text[start..]
}

/// A request to the completion endpoint as built by the editor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssistRequest {
    pub prompt: String,
    pub title: String,
    pub mode: AssistMode,
}

impl AssistRequest {
    /// Request for an explicit toolbar action.
    ///
    /// Sends the selection when there is one, otherwise the document's
    /// trailing text. An empty document always asks for a draft.
    pub fn explicit(
        mode: AssistMode,
        selection: Option<&str>,
        document_text: &str,
        title: &str,
    ) -> Self {
        let prompt = match selection.filter(|s| !s.trim().is_empty()) {
            Some(selected) => selected.to_string(),
            None => tail_chars(document_text, EXPLICIT_CONTEXT_CHARS).to_string(),
        };
        let mode = if document_text.trim().is_empty() {
            AssistMode::Draft
        } else {
            mode
        };

        Self {
            prompt,
            title: title.to_string(),
            mode,
        }
    }

    /// Request for a passive end-of-paragraph suggestion.
    pub fn suggestion(document_text: &str, title: &str) -> Self {
        Self {
            prompt: tail_chars(document_text, SUGGESTION_CONTEXT_CHARS).to_string(),
            title: title.to_string(),
            mode: AssistMode::Complete,
        }
    }
}

/// How a completion is folded back into the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Insertion {
    /// Replace the current selection with the text.
    ReplaceSelection(String),
    /// Insert the text at the cursor.
    InsertAtCursor(String),
}

impl Insertion {
    pub fn for_completion(mode: AssistMode, had_selection: bool, completion: &str) -> Self {
        if mode == AssistMode::Rewrite && had_selection {
            Insertion::ReplaceSelection(completion.to_string())
        } else {
            Insertion::InsertAtCursor(format!(" {completion}"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_falls_back_to_improve() {
        assert_eq!(AssistMode::parse(Some("rewrite")), AssistMode::Rewrite);
        assert_eq!(AssistMode::parse(Some("poem")), AssistMode::Improve);
        assert_eq!(AssistMode::parse(None), AssistMode::Improve);
    }

    #[test]
    fn test_render_interpolates_title_and_prompt() {
        let rendered = AssistMode::Complete.render(Some("Deep Work"), Some("Focus is rare."));
        assert!(rendered.contains("The blog post is titled: \"Deep Work\""));
        assert!(rendered.ends_with("Text to continue:\n\nFocus is rare."));

        let untitled = AssistMode::Expand.render(None, None);
        assert!(!untitled.contains("titled"));
        assert!(untitled.ends_with("Text to expand:"));

        let draft = AssistMode::Draft.render(Some("Deep Work"), None);
        assert!(draft.contains("this title: \"Deep Work\""));
    }

    #[test]
    fn test_strip_markup() {
        assert_eq!(
            strip_markup("  **Bold** and *italic* # `code`\n"),
            "Bold and italic  code"
        );
    }

    #[test]
    fn test_tail_chars_respects_char_boundaries() {
        assert_eq!(tail_chars("héllo", 3), "llo");
        assert_eq!(tail_chars("héllo", 4), "éllo");
        assert_eq!(tail_chars("hi", 10), "hi");
    }

    #[test]
    fn test_explicit_request_prefers_selection() {
        let text = "x".repeat(800);
        let req = AssistRequest::explicit(AssistMode::Rewrite, Some("fix me"), &text, "T");
        assert_eq!(req.prompt, "fix me");
        assert_eq!(req.mode, AssistMode::Rewrite);

        let req = AssistRequest::explicit(AssistMode::Expand, None, &text, "T");
        assert_eq!(req.prompt.len(), EXPLICIT_CONTEXT_CHARS);
    }

    #[test]
    fn test_explicit_request_on_empty_document_drafts() {
        let req = AssistRequest::explicit(AssistMode::Rewrite, None, "   ", "Launch notes");
        assert_eq!(req.mode, AssistMode::Draft);
        assert_eq!(req.title, "Launch notes");
    }

    #[test]
    fn test_insertion_rules() {
        assert_eq!(
            Insertion::for_completion(AssistMode::Rewrite, true, "Better."),
            Insertion::ReplaceSelection("Better.".to_string())
        );
        assert_eq!(
            Insertion::for_completion(AssistMode::Rewrite, false, "Better."),
            Insertion::InsertAtCursor(" Better.".to_string())
        );
        assert_eq!(
            Insertion::for_completion(AssistMode::Complete, true, "More."),
            Insertion::InsertAtCursor(" More.".to_string())
        );
    }
}
