mod config;
mod limitless;
mod markdown;
mod mcp;
mod tools;

use anyhow::{Context, Result};
use config::Config;
use limitless::LimitlessClient;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging (stderr; stdout belongs to the JSON-RPC channel)
    pretty_env_logger::init();

    // Load environment variables from .env file
    dotenv::dotenv().ok();

    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.first().map(String::as_str) == Some("convert") {
        return convert_file(&args[1..]);
    }

    log::info!("Starting Limitless MCP server...");

    // Validate the credential before serving any request
    let api_key = limitless::api_key_from_env()?;

    // Load configuration
    let config = Config::from_file("config.toml")?;
    log::info!("Configuration loaded (base_url: {})", config.api.base_url);

    let client = LimitlessClient::new(config.api.base_url.clone(), api_key);

    eprintln!("Limitless MCP Server running on stdio");
    mcp::run_server(&config, client).await
}

/// Offline mode: render a captured API response from a JSON file
/// without touching the network or the API key.
///
/// `limitless-mcp convert <input.json> [output.md]`
fn convert_file(args: &[String]) -> Result<()> {
    let input = args
        .first()
        .context("Usage: limitless-mcp convert <input.json> [output.md]")?;

    let raw = std::fs::read_to_string(input)
        .with_context(|| format!("Failed to read {}", input))?;
    let response: serde_json::Value =
        serde_json::from_str(&raw).with_context(|| format!("{} is not valid JSON", input))?;

    let rendered = markdown::render_response(&response);

    match args.get(1) {
        Some(output) => {
            std::fs::write(output, &rendered)
                .with_context(|| format!("Failed to write {}", output))?;
            log::info!("Wrote {}", output);
        }
        None => println!("{}", rendered),
    }

    Ok(())
}
