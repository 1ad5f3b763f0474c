//! Conversation history storage
//!
//! [`ConversationStore`] keeps every message of a session in insertion order.
//! Storage is never truncated; only the view handed to the completion client
//! is bounded, via [`ConversationStore::windowed`].

use crate::providers::{Message, Role};

/// Information about how much of a model's context window a request uses
///
/// Token figures are estimates (see [`estimate_tokens`]); they are meant for
/// display, not for enforcing limits.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContextInfo {
    /// Maximum tokens available for this context
    pub max_tokens: usize,
    /// Estimated tokens used by the windowed history
    pub used_tokens: usize,
    /// Tokens remaining in the context window
    pub remaining_tokens: usize,
    /// Percentage of context window used (0.0-100.0)
    pub percentage_used: f64,
}

impl ContextInfo {
    /// Create a new ContextInfo instance
    ///
    /// # Examples
    ///
    /// ```
    /// use chatrelay::session::conversation::ContextInfo;
    ///
    /// let context = ContextInfo::new(8192, 1000);
    /// assert_eq!(context.remaining_tokens, 7192);
    /// assert!(context.percentage_used > 12.0 && context.percentage_used < 13.0);
    /// ```
    pub fn new(max_tokens: usize, used_tokens: usize) -> Self {
        let used_tokens = used_tokens.min(max_tokens);
        let remaining_tokens = max_tokens - used_tokens;
        let percentage_used = if max_tokens == 0 {
            0.0
        } else {
            (used_tokens as f64 / max_tokens as f64) * 100.0
        };

        Self {
            max_tokens,
            used_tokens,
            remaining_tokens,
            percentage_used,
        }
    }
}

/// Ordered message history for one session
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConversationStore {
    messages: Vec<Message>,
}

impl ConversationStore {
    /// Creates an empty store
    ///
    /// # Examples
    ///
    /// ```
    /// use chatrelay::session::ConversationStore;
    ///
    /// let store = ConversationStore::new();
    /// assert!(store.is_empty());
    /// ```
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with `messages` (e.g. from an import)
    pub fn from_messages(messages: Vec<Message>) -> Self {
        Self { messages }
    }

    /// Adds a message to the end of the history
    pub fn append(&mut self, message: Message) {
        self.messages.push(message);
    }

    /// Adds a timestamped user message
    ///
    /// # Examples
    ///
    /// ```
    /// use chatrelay::session::ConversationStore;
    ///
    /// let mut store = ConversationStore::new();
    /// store.push_user("Hello, assistant!");
    /// assert_eq!(store.len(), 1);
    /// ```
    pub fn push_user(&mut self, content: impl Into<String>) {
        self.append(Message::user(content));
    }

    /// Adds a timestamped assistant message
    pub fn push_assistant(&mut self, content: impl Into<String>) {
        self.append(Message::assistant(content));
    }

    /// The last `n` messages, oldest first
    ///
    /// Returns the whole history when it holds `n` or fewer messages, and an
    /// empty slice when `n` is zero.
    ///
    /// # Examples
    ///
    /// ```
    /// use chatrelay::session::ConversationStore;
    ///
    /// let mut store = ConversationStore::new();
    /// for i in 0..5 {
    ///     store.push_user(format!("message {}", i));
    /// }
    /// let window = store.windowed(2);
    /// assert_eq!(window.len(), 2);
    /// assert_eq!(window[0].content, "message 3");
    /// assert_eq!(window[1].content, "message 4");
    /// ```
    pub fn windowed(&self, n: usize) -> &[Message] {
        let start = self.messages.len().saturating_sub(n);
        &self.messages[start..]
    }

    /// Removes every message
    pub fn clear(&mut self) {
        tracing::debug!("Clearing conversation ({} messages)", self.messages.len());
        self.messages.clear();
    }

    /// All messages, oldest first
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Most recent message
    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// Returns the number of messages in the conversation
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Returns true if the conversation has no messages
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Number of messages with the given role
    pub fn count_role(&self, role: Role) -> usize {
        self.messages.iter().filter(|m| m.role == role).count()
    }

    /// True when the latest message is a user message with no reply yet
    pub fn has_unanswered_user_message(&self) -> bool {
        matches!(self.last(), Some(m) if m.role == Role::User)
    }

    /// Estimated context usage of the last `window` messages
    ///
    /// # Examples
    ///
    /// ```
    /// use chatrelay::session::ConversationStore;
    ///
    /// let mut store = ConversationStore::new();
    /// store.push_user("Hello");
    ///
    /// let context = store.context_info(20, 8192);
    /// assert_eq!(context.max_tokens, 8192);
    /// assert!(context.used_tokens > 0);
    /// ```
    pub fn context_info(&self, window: usize, model_context_window: usize) -> ContextInfo {
        let used_tokens = self
            .windowed(window)
            .iter()
            .map(|m| estimate_tokens(&m.content))
            .sum();
        ContextInfo::new(model_context_window, used_tokens)
    }
}

/// Estimates token count for a string using a simple heuristic
///
/// Uses characters / 4, which approximates GPT tokenization for English text.
pub fn estimate_tokens(text: &str) -> usize {
    (text.chars().count() + 3) / 4
}
