use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "hemograma")]
#[command(about = "Manage the laboratory Observation subscription on a FHIR server")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// FHIR base URL, e.g. http://localhost:8080/fhir
    #[arg(short, long, global = true, env = "HEMOGRAMA_FHIR_URL")]
    pub server: Option<String>,

    /// Bearer token sent to the FHIR server
    #[arg(long, global = true, env = "HEMOGRAMA_FHIR_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// HTTP Basic user (ignored when --token is set)
    #[arg(long, global = true, env = "HEMOGRAMA_FHIR_USER")]
    pub user: Option<String>,

    /// HTTP Basic password
    #[arg(long, global = true, env = "HEMOGRAMA_FHIR_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Request timeout in milliseconds
    #[arg(long, global = true)]
    pub timeout_ms: Option<u64>,

    /// Output format
    #[arg(short, long, global = true)]
    pub format: Option<OutputFormat>,

    /// Log library events to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Clone, Copy, ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Json,
    Table,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Register the laboratory subscription
    Create(CreateArgs),
    /// Show the server-reported status of a subscription
    Status(IdArgs),
    /// List subscriptions on the server
    List,
    /// Switch a subscription off
    Cancel(IdArgs),
    /// Probe the server's metadata endpoint
    Ping,
    /// Decode a saved notification payload
    Decode(DecodeArgs),
}

#[derive(clap::Args)]
pub struct CreateArgs {
    /// Callback URL the server should deliver notifications to
    #[arg(long)]
    pub endpoint: String,
}

#[derive(clap::Args)]
pub struct IdArgs {
    /// Subscription id
    pub id: String,
}

#[derive(clap::Args)]
pub struct DecodeArgs {
    /// Path to the JSON payload (reads from stdin if omitted or "-")
    pub file: Option<String>,
}
