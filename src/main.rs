// src/main.rs

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use triage::classifier::{classify_by_keywords, ClassificationRequest, ClassifierGateway};
use triage::config::TriageConfig;
use triage::llm::AnthropicClient;

#[derive(Parser)]
#[command(name = "triage", about = "AI-backed support ticket triage engine")]
struct Cli {
    /// TOML config file overriding the built-in department table
    #[arg(long, global = true, env = "TRIAGE_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify a ticket and print the result as JSON
    Classify {
        #[arg(long)]
        title: String,
        #[arg(long)]
        description: String,
    },
    /// List configured departments in priority order
    Departments,
    /// Validate the triage configuration and exit
    CheckConfig,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    if dotenvy::dotenv().is_err() {
        info!("No .env file found, using environment variables only");
    }

    let cli = Cli::parse();
    let config = Arc::new(TriageConfig::load(cli.config.as_deref())?);

    match cli.command {
        Commands::Classify { title, description } => {
            let request = ClassificationRequest::new(title, description);
            let result = match AnthropicClient::from_config(&config.model) {
                Ok(client) => {
                    let gateway = ClassifierGateway::new(Arc::new(client), config.clone());
                    gateway.classify(&request).await
                }
                Err(e) => {
                    warn!("Model service unavailable ({e}), using keyword fallback");
                    classify_by_keywords(&request, &config)
                }
            };
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        Commands::Departments => {
            for name in config.department_names() {
                println!("{name}");
            }
        }
        Commands::CheckConfig => {
            // load() already validated; reaching this point means the
            // configuration is structurally sound.
            println!(
                "Configuration OK: {} departments, default {:?}, {} attempts",
                config.departments.len(),
                config.default_department,
                config.retry.max_attempts
            );
        }
    }

    Ok(())
}
