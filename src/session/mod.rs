//! Chat session state
//!
//! A [`ChatSession`] ties together the conversation history, the session
//! statistics, the request parameters and the credential for one user. It is
//! the only place that turns a submitted line of text into a completion call:
//!
//! 1. the user message is committed to the history,
//! 2. the last `history_window` messages are sent through the
//!    [`CompletionClient`],
//! 3. on success the assistant reply is appended and the stats are updated.
//!
//! A failed call leaves the user message in place and touches nothing else,
//! so [`ChatSession::resend`] can retry without duplicating it.

pub mod conversation;
pub mod stats;

pub use conversation::{ContextInfo, ConversationStore};
pub use stats::SessionStats;

use std::time::{Duration, Instant};

use crate::credentials::Credential;
use crate::error::CompletionError;
use crate::providers::{CompletionClient, RequestParameters, TokenUsage};

/// Default number of most recent messages sent with each request
pub const DEFAULT_HISTORY_WINDOW: usize = 20;

/// Result of one successful exchange
#[derive(Debug, Clone, PartialEq)]
pub struct Exchange {
    /// Assistant reply as appended to the history
    pub reply: String,
    /// Wall-clock time spent waiting for the endpoint
    pub elapsed: Duration,
    /// Tokens added to the session stats
    pub tokens: u64,
    /// Provider-reported usage, if any
    pub usage: Option<TokenUsage>,
}

/// Per-user chat state
#[derive(Debug, Clone)]
pub struct ChatSession {
    conversation: ConversationStore,
    stats: SessionStats,
    params: RequestParameters,
    credential: Option<Credential>,
    history_window: usize,
}

impl ChatSession {
    /// Create an empty session
    ///
    /// A `history_window` of zero is raised to one so the message being
    /// submitted is always sent.
    ///
    /// # Examples
    ///
    /// ```
    /// use chatrelay::providers::{ModelSpec, RequestParameters};
    /// use chatrelay::session::ChatSession;
    ///
    /// let params = RequestParameters::with_defaults(ModelSpec::new("GPT-4", "openai/gpt-4"));
    /// let session = ChatSession::new(params, 20);
    /// assert!(session.conversation().is_empty());
    /// assert!(!session.has_credential());
    /// ```
    pub fn new(params: RequestParameters, history_window: usize) -> Self {
        tracing::info!(
            "Starting chat session: model={}, history_window={}",
            params.model().api_id,
            history_window
        );
        Self {
            conversation: ConversationStore::new(),
            stats: SessionStats::new(),
            params,
            credential: None,
            history_window: history_window.max(1),
        }
    }

    /// Builder-style credential setter
    pub fn with_credential(mut self, credential: Credential) -> Self {
        self.set_credential(Some(credential));
        self
    }

    /// Replace or remove the session credential
    pub fn set_credential(&mut self, credential: Option<Credential>) {
        self.credential = credential.filter(|c| !c.is_empty());
    }

    /// Whether a usable credential is set
    pub fn has_credential(&self) -> bool {
        self.credential.is_some()
    }

    /// Submit a user message and wait for the assistant reply
    ///
    /// The user message is committed before the call is made.
    ///
    /// # Errors
    ///
    /// Returns the [`CompletionError`] from the client. On error the
    /// assistant message is not appended and the stats are unchanged.
    pub async fn submit(
        &mut self,
        client: &CompletionClient,
        text: impl Into<String>,
    ) -> Result<Exchange, CompletionError> {
        let text = text.into();
        self.conversation.push_user(text.clone());
        self.exchange(client, &text).await
    }

    /// Retry the latest user message if it has no reply yet
    ///
    /// Returns `None` when there is nothing to retry.
    pub async fn resend(
        &mut self,
        client: &CompletionClient,
    ) -> Option<Result<Exchange, CompletionError>> {
        if !self.conversation.has_unanswered_user_message() {
            return None;
        }
        let text = self.conversation.last()?.content.clone();
        tracing::debug!("Resending unanswered user message");
        Some(self.exchange(client, &text).await)
    }

    async fn exchange(
        &mut self,
        client: &CompletionClient,
        user_text: &str,
    ) -> Result<Exchange, CompletionError> {
        let started = Instant::now();
        let result = client
            .complete(
                self.conversation.windowed(self.history_window),
                &self.params,
                self.credential.as_ref(),
            )
            .await;
        let elapsed = started.elapsed();

        let completion = result.map_err(|e| {
            stats::record_completion_error(e.kind());
            e
        })?;

        self.conversation.push_assistant(completion.content.clone());
        let tokens = self.stats.record_exchange(
            user_text,
            &completion.content,
            elapsed.as_secs_f64(),
            &self.params.model().api_id,
            completion.usage,
        );

        Ok(Exchange {
            reply: completion.content,
            elapsed,
            tokens,
            usage: completion.usage,
        })
    }

    /// Remove all messages; stats, parameters and credential are kept
    pub fn clear_conversation(&mut self) {
        self.conversation.clear();
    }

    /// Zero the session stats; the conversation is kept
    pub fn reset_stats(&mut self) {
        self.stats.reset();
    }

    /// Conversation history
    pub fn conversation(&self) -> &ConversationStore {
        &self.conversation
    }

    /// Session statistics
    pub fn stats(&self) -> &SessionStats {
        &self.stats
    }

    /// Current request parameters
    pub fn params(&self) -> &RequestParameters {
        &self.params
    }

    /// Mutable request parameters; setters validate their input
    pub fn params_mut(&mut self) -> &mut RequestParameters {
        &mut self.params
    }

    /// Number of recent messages sent per request
    pub fn history_window(&self) -> usize {
        self.history_window
    }

    /// Estimated context usage of the next request, when the model's
    /// context window is known
    pub fn context_info(&self) -> Option<ContextInfo> {
        self.params
            .model()
            .context_window
            .map(|max| self.conversation.context_info(self.history_window, max))
    }
}
