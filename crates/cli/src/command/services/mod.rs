mod admin;
mod debug;
mod delete;
mod index;
mod select;
#[cfg(test)]
mod testing;

use crate::command::domain::{CommandAction, CommandOutcome, Reporter, UsageError};
use crate::command::infra::{CommitOnComplete, JsonlContentSource, SolrClient};
use crate::config::SyncConfig;
use anyhow::Result;
use index::IndexRun;
use solr_sync_indexer::{CompletionHook, FileCheckpointStore};

/// Wires collaborators for one invocation and routes actions to their service.
pub struct Services {
    config: SyncConfig,
    solr: SolrClient,
}

impl Services {
    pub fn new(config: SyncConfig) -> Result<Self> {
        let solr = SolrClient::new(&config)?;
        Ok(Self { config, solr })
    }

    pub async fn route(
        &self,
        action: CommandAction,
        reporter: &mut Reporter,
    ) -> Result<CommandOutcome> {
        match action {
            CommandAction::Index(payload) => {
                let path = self.config.source.as_ref().ok_or_else(|| {
                    UsageError::new("No content source configured; pass --source or set SOLR_SYNC_SOURCE")
                })?;
                let source = JsonlContentSource::new(path);
                log::info!("reading content items from {}", source.path().display());
                let checkpoint = FileCheckpointStore::new(&self.config.checkpoint_path);
                let commit = CommitOnComplete::new(&self.solr);
                index::run(
                    IndexRun {
                        source: &source,
                        writer: &self.solr,
                        hooks: vec![&commit as &dyn CompletionHook],
                        checkpoint: Some(&checkpoint),
                        batch_size: self.config.batch_size,
                    },
                    &payload,
                    reporter,
                )
                .await
            }
            CommandAction::Delete(payload) => Ok(delete::run(&self.solr, &payload, reporter).await),
            CommandAction::Select(payload) => select::run(&self.solr, &payload, reporter).await,
            CommandAction::Debug(payload) => Ok(debug::run(&self.solr, &payload, reporter).await),
            CommandAction::Info => admin::info(&self.solr, reporter).await,
            CommandAction::Optimize => Ok(admin::optimize(&self.solr).await),
        }
    }
}
