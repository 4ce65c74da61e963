use anyhow::{Context, Result};
use colored::Colorize;
use hemograma_subscriptions::SubscriptionManager;

use crate::cli::OutputFormat;
use crate::output::{print_json, print_subscription_table, print_success, print_warning};

pub async fn create(manager: &SubscriptionManager, endpoint: &str) -> Result<()> {
    let handle = manager
        .create(endpoint)
        .await
        .context("Failed to create subscription")?;
    print_success(&format!(
        "Subscription {} created (status: {})",
        handle.id.cyan(),
        handle.status
    ));
    Ok(())
}

pub async fn status(manager: &SubscriptionManager, id: &str) -> Result<()> {
    let report = manager
        .status(id)
        .await
        .with_context(|| format!("Failed to fetch status of Subscription/{id}"))?;
    println!("{}: {}", "Subscription".cyan(), report.id);
    println!("{}: {}", "Status".cyan(), report.raw);
    Ok(())
}

pub async fn list(manager: &SubscriptionManager, format: OutputFormat) -> Result<()> {
    let body = manager.list().await.context("Failed to list subscriptions")?;
    let listing: serde_json::Value =
        serde_json::from_slice(&body).context("Server listing is not JSON")?;
    match format {
        OutputFormat::Json => print_json(&listing),
        OutputFormat::Table => print_subscription_table(&listing),
    }
    Ok(())
}

pub async fn cancel(manager: &SubscriptionManager, id: &str) -> Result<()> {
    let outcome = manager
        .cancel(id)
        .await
        .with_context(|| format!("Failed to cancel Subscription/{id}"))?;
    if !outcome.update_acknowledged {
        print_warning("Server did not acknowledge the status update");
    }
    print_success(&format!("Subscription {} cancelled", outcome.id.cyan()));
    Ok(())
}

pub async fn ping(manager: &SubscriptionManager) -> Result<()> {
    let server = manager.server_url();
    if manager.test_connectivity().await {
        println!("{} {} is {}", "✓".green(), server.cyan(), "reachable".green());
        Ok(())
    } else {
        anyhow::bail!("{server} did not answer GET /metadata with 200")
    }
}
