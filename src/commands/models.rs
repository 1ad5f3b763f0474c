//! Model catalog commands for chatrelay
//!
//! This module provides commands for browsing the model catalog of the
//! configured provider: listing models, showing one model's details, and
//! displaying the currently configured model.

use crate::config::Config;
use crate::error::{ChatRelayError, Result};
use crate::providers::{ModelCatalog, ModelSpec, StaticCatalog};

/// List the models offered by the configured provider
///
/// # Errors
///
/// Returns `ChatRelayError::Serialization` if JSON output fails
///
/// # Examples
///
/// ```no_run
/// use chatrelay::config::Config;
/// use chatrelay::commands::models::list_models;
///
/// # fn example() -> anyhow::Result<()> {
/// list_models(&Config::default(), false)?;
/// # Ok(())
/// # }
/// ```
pub fn list_models(config: &Config, json: bool) -> Result<()> {
    let provider = config.provider.provider_type;
    tracing::info!("Listing models for provider: {}", provider);

    let models = StaticCatalog::for_provider(provider).list_models();

    if json {
        println!("{}", serde_json::to_string_pretty(&models)?);
        return Ok(());
    }

    if models.is_empty() {
        println!("No models available from provider: {}", provider);
        return Ok(());
    }

    println!("\nAvailable models from {}:\n", provider);
    print!("{}", format_models_table(&models, Some(&config.active_model())));
    println!();
    Ok(())
}

/// Show details of one model, looked up by API id or display name
///
/// # Errors
///
/// Returns `ChatRelayError::UnknownModel` if the catalog has no such model
pub fn show_model_info(config: &Config, model_name: &str, json: bool) -> Result<()> {
    let provider = config.provider.provider_type;
    tracing::info!(
        "Getting model info for '{}' from provider: {}",
        model_name,
        provider
    );

    let model = StaticCatalog::for_provider(provider)
        .resolve(model_name)
        .ok_or_else(|| ChatRelayError::UnknownModel(model_name.to_string()))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&model)?);
    } else {
        print!("{}", format_model_details(&model));
    }
    Ok(())
}

/// Show the configured provider and model
pub fn show_current_model(config: &Config) -> Result<()> {
    let provider = config.provider.provider_type;
    let catalog = StaticCatalog::for_provider(provider);
    let model = config.active_model();
    let display = catalog
        .find(&model)
        .map(|m| m.display_name)
        .unwrap_or_else(|| "(not in catalog)".to_string());

    println!("\nCurrent Model Information\n");
    println!("Provider:       {}", provider);
    println!("Active Model:   {} [{}]", model, display);
    println!("Temperature:    {}", config.chat.temperature);
    println!("Max Tokens:     {}", config.chat.max_tokens);
    println!();
    Ok(())
}

/// Render models as an aligned text table; `current` is marked with `*`
pub fn format_models_table(models: &[ModelSpec], current: Option<&str>) -> String {
    let name_width = models
        .iter()
        .map(|m| m.display_name.len())
        .max()
        .unwrap_or(0)
        .max("Display Name".len());
    let id_width = models
        .iter()
        .map(|m| m.api_id.len())
        .max()
        .unwrap_or(0)
        .max("Model Id".len());

    let mut out = format!(
        "  {:<name_width$}  {:<id_width$}  {:>14}  Category\n",
        "Display Name", "Model Id", "Context Window"
    );
    for model in models {
        let marker = if Some(model.api_id.as_str()) == current {
            '*'
        } else {
            ' '
        };
        let context = model
            .context_window
            .map(|c| format!("{} tokens", c))
            .unwrap_or_else(|| "unknown".to_string());
        let category = model
            .category
            .map(|c| c.to_string())
            .unwrap_or_else(|| "-".to_string());
        out.push_str(&format!(
            "{} {:<name_width$}  {:<id_width$}  {:>14}  {}\n",
            marker, model.display_name, model.api_id, context, category
        ));
    }
    out
}

fn format_model_details(model: &ModelSpec) -> String {
    let mut out = format!("\nModel Information ({})\n\n", model.display_name);
    out.push_str(&format!("Model Id:        {}\n", model.api_id));
    out.push_str(&format!("Display Name:    {}\n", model.display_name));
    if let Some(context) = model.context_window {
        out.push_str(&format!("Context Window:  {} tokens\n", context));
    }
    if let Some(category) = model.category {
        out.push_str(&format!("Category:        {}\n", category));
    }
    out.push('\n');
    out
}
