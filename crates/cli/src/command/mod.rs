pub mod domain;
pub mod infra;
mod services;

pub use domain::{
    CommandAction, CommandOutcome, DebugPayload, DeletePayload, ExitStatus, IndexPayload,
    Reporter, SelectPayload, UsageError,
};

use crate::config::SyncConfig;
use anyhow::Result;
use services::Services;
use std::time::Instant;

pub struct CommandHandler {
    services: Services,
}

impl CommandHandler {
    pub fn new(config: SyncConfig) -> Result<Self> {
        Ok(Self {
            services: Services::new(config)?,
        })
    }

    pub async fn execute(
        &self,
        action: CommandAction,
        reporter: &mut Reporter,
    ) -> Result<CommandOutcome> {
        let name = action.name();
        let started = Instant::now();
        let outcome = self.services.route(action, reporter).await?;
        log::info!(
            "{name} finished with {:?} in {} ms",
            outcome.status,
            started.elapsed().as_millis()
        );
        Ok(outcome)
    }
}

/// Map an error that escaped a command to its exit status.
pub fn classify_error(err: &anyhow::Error) -> ExitStatus {
    if err.is::<UsageError>() {
        ExitStatus::Usage
    } else {
        ExitStatus::Fatal
    }
}
