//! `curdmate config`: print the effective configuration.
//!
//! Secrets never appear; only the names of the environment variables that
//! hold them, and whether they are set.

use console::style;
use serde_json::json;

use crate::state::AppState;

pub fn show_config(state: &AppState, json: bool) {
    let config = &state.config;
    let token_set = state.record_api.has_token();
    let nlp_ready = state.resolver.is_configured();

    if json {
        let value = json!({
            "data_dir": state.data_dir.display().to_string(),
            "record_api": config.record_api,
            "record_api_token_set": token_set,
            "nlp": config.nlp,
            "nlp_configured": nlp_ready,
            "server": config.server,
        });
        println!("{}", serde_json::to_string_pretty(&value).unwrap_or_default());
        return;
    }

    println!();
    println!("  {}  {}", style("Data dir:").bold(), state.data_dir.display());
    println!();
    println!("  {}", style("Record API").cyan().bold());
    println!("    {}  {}", style("URL:").bold(), config.record_api.base_url);
    println!("    {}  {}", style("Collection:").bold(), config.record_api.collection);
    println!("    {}  {}", style("Page size:").bold(), config.record_api.page_size);
    println!(
        "    {}  {} {}",
        style("Token:").bold(),
        config.record_api.token_env,
        set_marker(token_set)
    );
    println!();
    println!("  {}", style("Free-text understanding").cyan().bold());
    println!("    {}  {}", style("Provider:").bold(), config.nlp.provider_name);
    println!("    {}  {}", style("Model:").bold(), config.nlp.model);
    println!(
        "    {}  {} {}",
        style("API key:").bold(),
        config.nlp.api_key_env,
        set_marker(nlp_ready)
    );
    println!();
    println!("  {}", style("REST API").cyan().bold());
    println!(
        "    {}  {}:{}",
        style("Bind:").bold(),
        config.server.host,
        config.server.port
    );
    println!();
}

fn set_marker(set: bool) -> console::StyledObject<&'static str> {
    if set {
        style("(set)").green()
    } else {
        style("(not set)").yellow()
    }
}
