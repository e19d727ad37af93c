use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use codex_core::registry::config::RegistryConfig;

mod fixture;
mod logging;

#[derive(Parser, Debug)]
#[command(name = "codex_replay")]
#[command(about = "Replay Codex chain events against an in-memory registry")]
struct CodexReplayArgs {
    /// JSON fixture with tokens, metadata documents and chain events
    #[arg(short, long)]
    input: PathBuf,

    /// Additional rich-metadata provider id (repeatable)
    #[arg(long = "rich-provider")]
    rich_providers: Vec<String>,

    /// Reject events naming an unregistered provider
    #[arg(long, default_value_t = false)]
    strict_providers: bool,

    /// Maximum retries while waiting for a busy token
    #[arg(long)]
    max_retries: Option<u32>,

    /// Reject events carrying malformed addresses
    #[arg(long, default_value_t = false)]
    validate_addresses: bool,

    /// Print the report on a single line
    #[arg(long, default_value_t = false)]
    compact: bool,
}

impl CodexReplayArgs {
    fn config(&self) -> RegistryConfig {
        self.rich_providers
            .iter()
            .fold(RegistryConfig::default(), |config, id| config.with_rich_provider(id.as_str()))
            .with_strict_providers(self.strict_providers)
            .with_max_retries(self.max_retries)
            .with_address_validation(self.validate_addresses)
    }
}

#[cfg(not(tarpaulin_include))]
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init_tracing();

    let args = CodexReplayArgs::parse();
    let input = std::fs::read_to_string(&args.input)
        .with_context(|| format!("failed to read {}", args.input.display()))?;
    let fixture: fixture::Fixture = serde_json::from_str(&input)
        .with_context(|| format!("failed to parse {}", args.input.display()))?;

    let report = fixture::replay(fixture, args.config()).await?;
    tracing::info!(
        records = report.records.len(),
        failures = report.failures.len(),
        "replay finished"
    );

    let output = if args.compact {
        serde_json::to_string(&report)?
    } else {
        serde_json::to_string_pretty(&report)?
    };
    println!("{output}");

    Ok(())
}
