mod cli;
mod commands;
mod output;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use hemograma_subscriptions::{AuthHeader, HttpTransport, SubscriptionManager, TransportOptions};

use cli::{Cli, Commands};
use output::print_error;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        print_error(&format!("{e:#}"));
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    let format = cli.format.unwrap_or_default();

    if cli.verbose {
        let _ = tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_env_filter("debug")
            .try_init();
    }

    match &cli.command {
        Commands::Decode(args) => commands::decode::decode(args.file.as_deref(), format)?,
        Commands::Create(args) => {
            commands::subscription::create(&make_manager(&cli)?, &args.endpoint).await?
        }
        Commands::Status(args) => {
            commands::subscription::status(&make_manager(&cli)?, &args.id).await?
        }
        Commands::List => commands::subscription::list(&make_manager(&cli)?, format).await?,
        Commands::Cancel(args) => {
            commands::subscription::cancel(&make_manager(&cli)?, &args.id).await?
        }
        Commands::Ping => commands::subscription::ping(&make_manager(&cli)?).await?,
    }

    Ok(())
}

fn make_manager(cli: &Cli) -> Result<SubscriptionManager> {
    let server = cli.server.as_deref().context(
        "No FHIR server configured. Use --server or set the HEMOGRAMA_FHIR_URL env var",
    )?;
    let options = TransportOptions {
        timeout: cli.timeout_ms.map(Duration::from_millis),
        auth: auth_header(cli),
    };
    let transport = HttpTransport::new(server, options)?;
    Ok(SubscriptionManager::new(Arc::new(transport)))
}

fn auth_header(cli: &Cli) -> Option<AuthHeader> {
    match (&cli.token, &cli.user) {
        (Some(token), _) => Some(AuthHeader::Bearer {
            token: token.clone(),
        }),
        (None, Some(user)) => Some(AuthHeader::Basic {
            username: user.clone(),
            password: cli.password.clone().unwrap_or_default(),
        }),
        (None, None) => None,
    }
}
