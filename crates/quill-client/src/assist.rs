//! Explicit writing-assistant actions from the editor toolbar.

use quill_core::domain::{AssistMode, AssistRequest, Insertion};
use quill_core::ports::{CompletionGateway, GatewayError};

/// Run `mode` over the selection (or the document's tail) and describe how
/// the result goes back into the document.
pub async fn assist(
    completer: &dyn CompletionGateway,
    mode: AssistMode,
    selection: Option<&str>,
    document_text: &str,
    title: &str,
) -> Result<Insertion, GatewayError> {
    let had_selection = selection.is_some_and(|s| !s.trim().is_empty());
    let request = AssistRequest::explicit(mode, selection, document_text, title);

    let completion = completer
        .complete(&request)
        .await
        .inspect_err(|e| tracing::warn!(mode = request.mode.as_str(), error = %e, "AI assist failed"))?;

    Ok(Insertion::for_completion(request.mode, had_selection, &completion))
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;

    struct Echo {
        seen: Mutex<Vec<AssistRequest>>,
        reply: Result<String, GatewayError>,
    }

    impl Echo {
        fn replying(reply: Result<String, GatewayError>) -> Self {
            Self {
                seen: Mutex::new(Vec::new()),
                reply,
            }
        }
    }

    #[async_trait]
    impl CompletionGateway for Echo {
        async fn complete(&self, request: &AssistRequest) -> Result<String, GatewayError> {
            self.seen.lock().unwrap().push(request.clone());
            self.reply.clone()
        }
    }

    #[tokio::test]
    async fn test_rewrite_replaces_selection() {
        let echo = Echo::replying(Ok("Sharper sentence.".to_string()));
        let insertion = assist(&echo, AssistMode::Rewrite, Some("Dull sentence."), "Dull sentence. More.", "T")
            .await
            .unwrap();

        assert_eq!(insertion, Insertion::ReplaceSelection("Sharper sentence.".to_string()));
        assert_eq!(echo.seen.lock().unwrap()[0].prompt, "Dull sentence.");
    }

    #[tokio::test]
    async fn test_empty_document_drafts() {
        let echo = Echo::replying(Ok("An opening paragraph.".to_string()));
        let insertion = assist(&echo, AssistMode::Expand, None, "", "Deep Work")
            .await
            .unwrap();

        assert_eq!(
            insertion,
            Insertion::InsertAtCursor(" An opening paragraph.".to_string())
        );
        assert_eq!(echo.seen.lock().unwrap()[0].mode, AssistMode::Draft);
    }

    #[tokio::test]
    async fn test_errors_propagate() {
        let echo = Echo::replying(Err(GatewayError::NotConfigured));
        let result = assist(&echo, AssistMode::Complete, None, "Some text", "").await;
        assert_eq!(result, Err(GatewayError::NotConfigured));
    }
}
