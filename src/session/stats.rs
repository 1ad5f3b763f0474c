//! Session statistics
//!
//! [`SessionStats`] accumulates per-session counters from every successful
//! exchange: messages, tokens, response latency, and the set of models used.
//! Each recorded exchange is also mirrored to the `metrics` facade so a
//! process-wide exporter can observe all sessions.
//!
//! # Metrics
//!
//! - `chat_exchanges_total`: Counter of successful exchanges by model
//! - `chat_response_seconds`: Histogram of response latency by model
//! - `chat_tokens_total`: Counter of tokens recorded by model
//! - `chat_errors_total`: Counter of failed completions by error kind
//!
//! # Token accounting
//!
//! Provider-reported `usage.total_tokens` is used whenever the response
//! carries it. Otherwise the count is estimated as 1.3 tokens per
//! whitespace-separated word, which is approximate.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use metrics::{counter, histogram, increment_counter};
use serde::{Deserialize, Serialize};

use crate::providers::TokenUsage;

/// Tokens per word used by the fallback estimate
const TOKENS_PER_WORD: f64 = 1.3;

/// Running counters for one session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionStats {
    message_count: u64,
    token_count: u64,
    response_times: Vec<f64>,
    models_used: BTreeSet<String>,
    session_start: DateTime<Utc>,
}

impl Default for SessionStats {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStats {
    /// Fresh counters starting now
    ///
    /// # Examples
    ///
    /// ```
    /// use chatrelay::session::SessionStats;
    ///
    /// let stats = SessionStats::new();
    /// assert_eq!(stats.message_count(), 0);
    /// assert_eq!(stats.average_latency(), 0.0);
    /// ```
    pub fn new() -> Self {
        Self {
            message_count: 0,
            token_count: 0,
            response_times: Vec::new(),
            models_used: BTreeSet::new(),
            session_start: Utc::now(),
        }
    }

    /// Record one completed user/assistant exchange
    ///
    /// Adds two messages, the latency, the model id, and either the
    /// provider-reported token total or the word-count estimate. Returns the
    /// number of tokens added.
    ///
    /// # Examples
    ///
    /// ```
    /// use chatrelay::session::SessionStats;
    ///
    /// let mut stats = SessionStats::new();
    /// stats.record_exchange("hi", "hello there", 1.0, "openai/gpt-4", None);
    /// stats.record_exchange("again", "ok", 3.0, "openai/gpt-4", None);
    /// assert_eq!(stats.message_count(), 4);
    /// assert_eq!(stats.average_latency(), 2.0);
    /// assert_eq!(stats.models_used().len(), 1);
    /// ```
    pub fn record_exchange(
        &mut self,
        user_text: &str,
        assistant_text: &str,
        elapsed_seconds: f64,
        model_id: &str,
        usage: Option<TokenUsage>,
    ) -> u64 {
        let elapsed_seconds = if elapsed_seconds.is_finite() {
            elapsed_seconds.max(0.0)
        } else {
            0.0
        };
        let tokens = match usage.map(|u| u.effective_total()) {
            Some(total) if total > 0 => u64::try_from(total).unwrap_or(u64::MAX),
            _ => estimate_exchange_tokens(user_text, assistant_text),
        };

        self.message_count += 2;
        self.token_count = self.token_count.saturating_add(tokens);
        self.response_times.push(elapsed_seconds);
        self.models_used.insert(model_id.to_string());

        increment_counter!("chat_exchanges_total", "model" => model_id.to_string());
        histogram!("chat_response_seconds", elapsed_seconds, "model" => model_id.to_string());
        counter!("chat_tokens_total", tokens, "model" => model_id.to_string());

        tracing::debug!(
            model = model_id,
            elapsed_seconds,
            tokens,
            estimated = usage.is_none(),
            "Recorded exchange"
        );

        tokens
    }

    /// Mean response time in seconds; 0.0 before the first exchange
    pub fn average_latency(&self) -> f64 {
        if self.response_times.is_empty() {
            return 0.0;
        }
        self.total_latency() / self.response_times.len() as f64
    }

    /// Sum of all response times in seconds
    pub fn total_latency(&self) -> f64 {
        self.response_times.iter().sum()
    }

    /// Quickest recorded response
    pub fn fastest_response(&self) -> Option<f64> {
        self.response_times.iter().copied().reduce(f64::min)
    }

    /// Slowest recorded response
    pub fn slowest_response(&self) -> Option<f64> {
        self.response_times.iter().copied().reduce(f64::max)
    }

    /// Time since the session (or the last reset) started
    pub fn session_duration(&self) -> chrono::Duration {
        Utc::now() - self.session_start
    }

    /// Zero every counter and restart the session clock
    pub fn reset(&mut self) {
        tracing::info!(
            "Resetting session stats after {} exchanges",
            self.response_times.len()
        );
        *self = Self::new();
    }

    /// Messages counted (two per exchange)
    pub fn message_count(&self) -> u64 {
        self.message_count
    }

    /// Tokens counted, reported or estimated
    pub fn token_count(&self) -> u64 {
        self.token_count
    }

    /// Response times in seconds, in recording order
    pub fn response_times(&self) -> &[f64] {
        &self.response_times
    }

    /// Distinct model ids used, sorted
    pub fn models_used(&self) -> &BTreeSet<String> {
        &self.models_used
    }

    /// When counting started
    pub fn session_start(&self) -> DateTime<Utc> {
        self.session_start
    }

    /// Number of exchanges recorded
    pub fn exchange_count(&self) -> usize {
        self.response_times.len()
    }
}

/// Count a failed completion in the process-wide metrics
///
/// Session counters are deliberately left alone on failure.
pub fn record_completion_error(kind: &str) {
    increment_counter!("chat_errors_total", "kind" => kind.to_string());
}

/// Approximate token count of an exchange: `round(words * 1.3)`
///
/// The two texts are counted as separate word sequences.
///
/// # Examples
///
/// ```
/// use chatrelay::session::stats::estimate_exchange_tokens;
///
/// // 10 words * 1.3 = 13
/// assert_eq!(estimate_exchange_tokens("one two three four five", "six seven eight nine ten"), 13);
/// assert_eq!(estimate_exchange_tokens("", ""), 0);
/// ```
pub fn estimate_exchange_tokens(user_text: &str, assistant_text: &str) -> u64 {
    let words = user_text.split_whitespace().count() + assistant_text.split_whitespace().count();
    (words as f64 * TOKENS_PER_WORD).round() as u64
}

/// Initializes the metrics exporter for Prometheus
///
/// When the `prometheus` feature is enabled, this function sets up the
/// Prometheus metrics exporter on its default listen address. When
/// disabled, it's a no-op.
pub fn init_metrics_exporter() {
    #[cfg(feature = "prometheus")]
    {
        use metrics_exporter_prometheus::PrometheusBuilder;
        let builder = PrometheusBuilder::new();
        let _ = builder.install().map_err(|e| {
            tracing::warn!("Failed to install Prometheus exporter: {}", e);
        });
    }
}
