//! Text rewriting through an external assistant.
//!
//! The assistant runs off the interaction thread. A request yields a
//! [`PendingRewrite`] that the host polls (or awaits); the finished text is
//! handed back to [`Editor::apply_rewrite`], which re-checks that the target
//! object still exists before touching it.
//!
//! [`Editor::apply_rewrite`]: crate::state::Editor::apply_rewrite

use futures::FutureExt;
use futures::future::BoxFuture;
use futures::task::{Context, Poll, noop_waker_ref};
use thiserror::Error;

use crate::element::ObjectId;

#[derive(Debug, Error)]
pub enum AssistantError {
    #[error("text assistant is not configured: {0}")]
    NotConfigured(String),

    #[error("text assistant request failed: {0}")]
    Request(String),

    #[error("text assistant request was cancelled")]
    Cancelled,
}

/// What to ask the assistant to do with a text object's content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RewriteAction {
    Rewrite,
    Summarize,
    TranslateToSpanish,
}

impl RewriteAction {
    pub const ALL: [RewriteAction; 3] = [
        RewriteAction::Rewrite,
        RewriteAction::Summarize,
        RewriteAction::TranslateToSpanish,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            RewriteAction::Rewrite => "Rewrite with AI",
            RewriteAction::Summarize => "Summarize with AI",
            RewriteAction::TranslateToSpanish => "Translate to Spanish",
        }
    }

    pub fn prompt(&self, text: &str) -> String {
        match self {
            RewriteAction::Rewrite => format!("Rewrite the following text:\n\n{text}"),
            RewriteAction::Summarize => format!("Summarize the following text:\n\n{text}"),
            RewriteAction::TranslateToSpanish => format!("Translate the following text into Spanish:\n\n{text}"),
        }
    }
}

/// A remote text model.
pub trait TextAssistant {
    /// Starts a completion for `prompt`. Must not block.
    fn complete(&self, prompt: String) -> BoxFuture<'static, Result<String, AssistantError>>;
}

/// The usable part of an assistant reply: trimmed, or `None` when blank.
pub fn clean_response(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_owned())
}

/// An in-flight rewrite of one text object.
pub struct PendingRewrite {
    target: ObjectId,
    action: RewriteAction,
    future: BoxFuture<'static, Result<String, AssistantError>>,
}

impl PendingRewrite {
    pub fn new(target: ObjectId, action: RewriteAction, future: BoxFuture<'static, Result<String, AssistantError>>) -> Self {
        Self { target, action, future }
    }

    pub fn target(&self) -> ObjectId {
        self.target
    }

    pub fn action(&self) -> RewriteAction {
        self.action
    }

    /// Polls once without blocking; `Some` once the assistant has answered.
    ///
    /// Meant to be called every frame. Do not poll again after it returned `Some`.
    pub fn try_complete(&mut self) -> Option<Result<String, AssistantError>> {
        let mut cx = Context::from_waker(noop_waker_ref());
        match self.future.poll_unpin(&mut cx) {
            Poll::Ready(result) => Some(result),
            Poll::Pending => None,
        }
    }

    /// Waits for the assistant's answer.
    pub async fn finish(self) -> (ObjectId, Result<String, AssistantError>) {
        (self.target, self.future.await)
    }
}

impl std::fmt::Debug for PendingRewrite {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PendingRewrite")
            .field("target", &self.target)
            .field("action", &self.action)
            .finish_non_exhaustive()
    }
}
