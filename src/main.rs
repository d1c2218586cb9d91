// Fractal History - Command-Line Entry Point

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use fractal_history::commands;
use fractal_history::models::response::CommandResponse;
use fractal_history::models::settings::{BatchPolicy, SettingsUpdate};
use fractal_history::state::AppState;
use fractal_history::storage::ConfigService;
use fractal_history_llm::ProviderType;

#[derive(Parser, Debug)]
#[command(name = "fractal-history", version, about = "Fractal History tree engine")]
struct Cli {
    /// Config file (defaults to ~/.fractal-history/config.json)
    #[arg(long, env = "FRACTAL_HISTORY_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Database file (overrides the config value)
    #[arg(long, env = "FRACTAL_HISTORY_DB", global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Load the root and first-level anchors
    Seed,
    /// Show the root node
    Root,
    /// List persisted children of a node along one breadth
    Children {
        /// Anchor id or position id of the parent
        parent: String,
        #[arg(long, default_value = "A")]
        breadth: String,
    },
    /// Show the ancestor path of a node, root first
    Path {
        /// Anchor id or position id
        anchor: String,
    },
    /// Generate children for a node along the analytical (A) or temporal (B) axis
    Generate {
        /// Anchor id or position id of the parent
        parent: String,
        #[arg(long, default_value = "A")]
        axis: String,
        /// Title override for the prompt
        #[arg(long)]
        title: Option<String>,
        /// Scope override for the prompt
        #[arg(long)]
        scope: Option<String>,
    },
    /// Report store and provider health
    Health {
        /// Also contact the provider endpoint
        #[arg(long)]
        probe: bool,
    },
    /// Show or update settings
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
    /// Print the current settings
    Show,
    /// Update one or more settings
    Set {
        #[arg(long, value_enum)]
        provider: Option<ProviderArg>,
        #[arg(long)]
        model: Option<String>,
        #[arg(long)]
        base_url: Option<String>,
        #[arg(long)]
        temperature: Option<f32>,
        #[arg(long)]
        max_tokens: Option<u32>,
        #[arg(long)]
        api_key_env: Option<String>,
        #[arg(long, value_enum)]
        batch_policy: Option<BatchPolicyArg>,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum ProviderArg {
    Openai,
    Deepseek,
}

impl From<ProviderArg> for ProviderType {
    fn from(arg: ProviderArg) -> Self {
        match arg {
            ProviderArg::Openai => ProviderType::OpenAI,
            ProviderArg::Deepseek => ProviderType::DeepSeek,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum BatchPolicyArg {
    BestEffort,
    Atomic,
}

impl From<BatchPolicyArg> for BatchPolicy {
    fn from(arg: BatchPolicyArg) -> Self {
        match arg {
            BatchPolicyArg::BestEffort => BatchPolicy::BestEffort,
            BatchPolicyArg::Atomic => BatchPolicy::Atomic,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let mut config_service = match &cli.config {
        Some(path) => ConfigService::load_or_create(path),
        None => ConfigService::new(),
    }
    .context("failed to load configuration")?;

    if let Command::Config { action } = cli.command {
        return match action {
            ConfigAction::Show => print_response(&commands::get_settings(&config_service)),
            ConfigAction::Set {
                provider,
                model,
                base_url,
                temperature,
                max_tokens,
                api_key_env,
                batch_policy,
            } => {
                let update = SettingsUpdate {
                    provider: provider.map(Into::into),
                    model,
                    base_url,
                    temperature,
                    max_tokens,
                    api_key_env,
                    batch_policy: batch_policy.map(Into::into),
                    ..Default::default()
                };
                print_response(&commands::update_settings(&mut config_service, update))
            }
        };
    }

    let state = AppState::from_config(config_service.get_config().clone(), cli.db.as_deref())
        .context("failed to initialize application state")?;

    match cli.command {
        Command::Seed => print_response(&commands::seed_tree(&state)),
        Command::Root => print_response(&commands::get_root(&state)),
        Command::Children { parent, breadth } => {
            print_response(&commands::list_children(&state, &parent, &breadth))
        }
        Command::Path { anchor } => print_response(&commands::get_ancestor_path(&state, &anchor)),
        Command::Generate {
            parent,
            axis,
            title,
            scope,
        } => print_response(&commands::generate_children(&state, &parent, &axis, title, scope).await),
        Command::Health { probe } => print_response(&commands::get_health(&state, probe).await),
        Command::Config { .. } => Ok(()),
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    // Logs go to stderr; stdout carries only the JSON response
    let fmt_layer = fmt::layer().with_target(false).with_writer(std::io::stderr);
    tracing_subscriber::registry().with(env_filter).with(fmt_layer).init();
}

fn print_response<T: Serialize>(response: &CommandResponse<T>) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(response)?);
    if response.success {
        Ok(())
    } else {
        std::process::exit(1);
    }
}
