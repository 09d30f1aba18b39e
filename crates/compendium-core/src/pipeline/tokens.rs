//! Actor token defaults stage

use async_trait::async_trait;
use serde_json::json;

use crate::config::{EntityType, PackDescriptor, TokenSettings, Workspace};
use crate::document::Document;
use crate::sync::{SyncEngine, SyncOptions, SyncReport, Transform};
use crate::Result;

/// Sets the prototype token display options of every actor.
#[derive(Debug, Clone)]
pub struct TokenDefaults {
    settings: TokenSettings,
}

impl TokenDefaults {
    pub fn new(settings: TokenSettings) -> Self {
        Self { settings }
    }

    pub fn apply(&self, actor: &Document) -> Document {
        let mut actor = actor.clone();
        actor.set_path("token.displayName", self.settings.display_name);
        actor.set_path("token.displayBars", self.settings.display_bars);
        actor.set_path(
            "token.bar1",
            json!({"attribute": self.settings.bar1_attribute}),
        );
        actor.set_path("token.bar2", json!({}));
        actor
    }
}

#[async_trait]
impl Transform for TokenDefaults {
    async fn transform(
        &mut self,
        _engine: &mut SyncEngine,
        _package: &PackDescriptor,
        document: &Document,
    ) -> Result<Option<Document>> {
        Ok(Some(self.apply(document)))
    }
}

/// Apply token defaults to every Actor package and compact the ones written.
pub async fn update_tokens(workspace: &Workspace, options: SyncOptions) -> Result<SyncReport> {
    let mut engine = SyncEngine::new(workspace.root(), options);
    let mut defaults = TokenDefaults::new(workspace.settings().tokens.clone());
    let mut report = SyncReport::new(options.dry_run);

    for pack in workspace.manifest().packages(EntityType::Actor) {
        tracing::info!(package = %pack.name, "Updating actor tokens");
        let pass = engine.process_documents(pack, &mut defaults).await?;
        report.merge(pass);
    }

    report.actions.extend(engine.compact_written().await?);
    Ok(report)
}
