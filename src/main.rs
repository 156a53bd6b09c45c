use anyhow::Result;
use clap::Parser;
use macro_pulse::{format_macro_payload_for_llm, FetchOptions, MacroEngine};
use tracing::info;

/// Macro-pulse - build one macro-trend news payload and print the
/// LLM-ready text
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// SQLite database path shared with the host application
    #[arg(long, default_value = "data/advisor.db")]
    db: String,

    /// News-search API key (owned by the caller, not the engine)
    #[arg(long, env = "NEWS_API_KEY", default_value = "")]
    api_key: String,

    /// Search query sent to the news API
    #[arg(long, default_value = "geopolitics economy markets finance")]
    query: String,

    /// Article language filter
    #[arg(long, default_value = "en")]
    language: String,

    /// Articles requested per window
    #[arg(long, default_value_t = 30)]
    page_size: u32,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_line_number(true)
        .init();

    info!("Starting macro-pulse");

    let args = Args::parse();
    if args.api_key.is_empty() {
        info!("No API key configured - running against stored articles only");
    }

    let engine = MacroEngine::new(&args.db)?;
    let opts = FetchOptions {
        query: args.query,
        language: args.language,
        page_size: args.page_size,
    };

    let payload = engine.build_macro_payload(&args.api_key, &opts)?;
    println!("{}", format_macro_payload_for_llm(&payload));
    Ok(())
}
