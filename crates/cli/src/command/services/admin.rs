use crate::command::domain::{CommandOutcome, Reporter};
use crate::command::infra::SolrClient;
use anyhow::Result;
use serde_json::json;

pub async fn info(client: &SolrClient, reporter: &mut Reporter) -> Result<CommandOutcome> {
    let ping = match client.ping().await {
        Ok(ping) => ping,
        Err(detail) => {
            return Ok(CommandOutcome::fatal(format!(
                "Cannot reach core {}: {detail}",
                client.core()
            )))
        }
    };
    let status = match client.status().await {
        Ok(status) => status,
        Err(detail) => {
            return Ok(CommandOutcome::fatal(format!(
                "Cannot read status of core {}: {detail}",
                client.core()
            )))
        }
    };

    let payload = json!({
        "core": client.core(),
        "ping": ping.get("status").cloned().unwrap_or_default(),
        "status": status,
    });
    reporter.line(&serde_json::to_string_pretty(&payload)?);
    Ok(CommandOutcome::success(format!(
        "Core {} is reachable",
        client.core()
    )))
}

pub async fn optimize(client: &SolrClient) -> CommandOutcome {
    match client.optimize().await {
        Ok(()) => CommandOutcome::success(format!("Optimized core {}", client.core())),
        Err(detail) => CommandOutcome::fatal(format!(
            "Failed to optimize core {}: {detail}",
            client.core()
        )),
    }
}
