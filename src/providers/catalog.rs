//! Model catalogs
//!
//! A catalog is the read-only list of models the host offers in its picker.
//! [`StaticCatalog`] ships presets for the two supported providers; hosts
//! with their own list implement [`ModelCatalog`] directly.

use crate::providers::{ModelCategory, ModelSpec, ProviderKind};

/// Source of the models a session may choose from
pub trait ModelCatalog: Send + Sync {
    /// All models, in display order
    fn list_models(&self) -> Vec<ModelSpec>;

    /// Look up a model by its API identifier
    fn find(&self, api_id: &str) -> Option<ModelSpec> {
        self.list_models().into_iter().find(|m| m.api_id == api_id)
    }

    /// Look up a model by API identifier or, failing that, display name
    /// (case-insensitive)
    fn resolve(&self, name: &str) -> Option<ModelSpec> {
        self.find(name).or_else(|| {
            self.list_models()
                .into_iter()
                .find(|m| m.display_name.eq_ignore_ascii_case(name))
        })
    }

    /// First model in the catalog, used when nothing is configured
    fn default_model(&self) -> Option<ModelSpec> {
        self.list_models().into_iter().next()
    }
}

/// Fixed, in-memory catalog
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
    models: Vec<ModelSpec>,
}

impl StaticCatalog {
    /// Catalog over `models`
    pub fn new(models: Vec<ModelSpec>) -> Self {
        Self { models }
    }

    /// Models offered through OpenRouter
    ///
    /// # Examples
    ///
    /// ```
    /// use chatrelay::providers::{ModelCatalog, StaticCatalog};
    ///
    /// let catalog = StaticCatalog::openrouter();
    /// assert_eq!(catalog.default_model().unwrap().api_id, "openai/gpt-3.5-turbo");
    /// assert!(catalog.find("openai/gpt-4").is_some());
    /// ```
    pub fn openrouter() -> Self {
        Self::new(vec![
            ModelSpec::new("GPT-3.5 Turbo", "openai/gpt-3.5-turbo")
                .with_context_window(16_385)
                .with_category(ModelCategory::Fast),
            ModelSpec::new("GPT-4", "openai/gpt-4")
                .with_context_window(8_192)
                .with_category(ModelCategory::General),
            ModelSpec::new("Claude 3 Haiku", "anthropic/claude-3-haiku")
                .with_context_window(200_000)
                .with_category(ModelCategory::Fast),
            ModelSpec::new("Claude 3 Sonnet", "anthropic/claude-3-sonnet")
                .with_context_window(200_000)
                .with_category(ModelCategory::General),
            ModelSpec::new("Llama 2 70B", "meta-llama/llama-2-70b-chat")
                .with_context_window(4_096)
                .with_category(ModelCategory::General),
            ModelSpec::new("Mistral 7B", "mistralai/mistral-7b-instruct")
                .with_context_window(32_768)
                .with_category(ModelCategory::Fast),
        ])
    }

    /// Models offered through Groq
    pub fn groq() -> Self {
        Self::new(vec![
            ModelSpec::new("Llama 3.3 70B Versatile", "llama-3.3-70b-versatile")
                .with_context_window(131_072)
                .with_category(ModelCategory::General),
            ModelSpec::new("Llama 3.1 8B Instant", "llama-3.1-8b-instant")
                .with_context_window(131_072)
                .with_category(ModelCategory::Fast),
            ModelSpec::new("Mixtral 8x7B", "mixtral-8x7b-32768")
                .with_context_window(32_768)
                .with_category(ModelCategory::General),
            ModelSpec::new("Gemma 2 9B", "gemma2-9b-it")
                .with_context_window(8_192)
                .with_category(ModelCategory::Fast),
            ModelSpec::new("DeepSeek R1 Distill Llama 70B", "deepseek-r1-distill-llama-70b")
                .with_context_window(131_072)
                .with_category(ModelCategory::Reasoning),
        ])
    }

    /// Preset catalog for `kind`
    pub fn for_provider(kind: ProviderKind) -> Self {
        match kind {
            ProviderKind::OpenRouter => Self::openrouter(),
            ProviderKind::Groq => Self::groq(),
        }
    }
}

impl ModelCatalog for StaticCatalog {
    fn list_models(&self) -> Vec<ModelSpec> {
        self.models.clone()
    }
}
