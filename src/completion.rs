use crate::events::CompletionPayload;
use crate::ghost::{GhostSession, Resolution};
use crate::scene::SceneApi;
use crate::types::MediaKind;

/// Why an event was left alone
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IgnoreReason {
    /// Event belongs to another canvas
    ScopeMismatch,
    /// Payload carries the other media kind
    KindMismatch,
    /// Correlation id was already completed
    AlreadyResolved,
}

/// Result of handing one event to a listener
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CompletionOutcome {
    Replaced,
    Appended,
    Ignored(IgnoreReason),
    /// Malformed payload, logged and dropped
    Dropped,
}

/// Filters completions for one canvas and one media kind and applies the
/// survivors to a [`GhostSession`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompletionListener {
    scope: String,
    kind: MediaKind,
}

impl CompletionListener {
    pub fn new(scope: impl Into<String>, kind: MediaKind) -> Self {
        Self {
            scope: scope.into(),
            kind,
        }
    }

    pub fn images(scope: impl Into<String>) -> Self {
        Self::new(scope, MediaKind::Image)
    }

    pub fn videos(scope: impl Into<String>) -> Self {
        Self::new(scope, MediaKind::Video)
    }

    pub fn scope(&self) -> &str {
        &self.scope
    }

    pub fn kind(&self) -> MediaKind {
        self.kind
    }

    /// Never panics; every failure degrades to a logged outcome.
    pub fn handle(
        &self,
        event: &impl CompletionPayload,
        session: &mut GhostSession,
        scene: &mut impl SceneApi,
    ) -> CompletionOutcome {
        if event.scope() != self.scope {
            log::debug!(
                "{} completion for canvas {} ignored on {}",
                self.kind.as_str(),
                event.scope(),
                self.scope
            );
            return CompletionOutcome::Ignored(IgnoreReason::ScopeMismatch);
        }

        if event.media_kind() != self.kind {
            log::debug!(
                "{} payload ignored by {} listener",
                event.media_kind().as_str(),
                self.kind.as_str()
            );
            return CompletionOutcome::Ignored(IgnoreReason::KindMismatch);
        }

        let completion = match event.to_completion() {
            Ok(completion) => completion,
            Err(e) => {
                log::warn!("dropping {} completion: {}", self.kind.as_str(), e);
                return CompletionOutcome::Dropped;
            }
        };

        match session.complete(completion, scene) {
            Resolution::Replaced => CompletionOutcome::Replaced,
            Resolution::Appended => CompletionOutcome::Appended,
            Resolution::AlreadyResolved => CompletionOutcome::Ignored(IgnoreReason::AlreadyResolved),
        }
    }
}
