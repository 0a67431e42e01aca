//! Progress notifications sent back to the MCP client.

use std::sync::Arc;

use async_trait::async_trait;
use rmcp::model::{Meta, ProgressNotificationParam, ProgressToken};
use rmcp::{Peer, RoleServer};

use crate::services::progress::{noop_progress, ProgressReporter};

/// Reports progress to the client that issued the tool call.
pub struct ClientProgress {
    client: Peer<RoleServer>,
    token: ProgressToken,
}

#[async_trait]
impl ProgressReporter for ClientProgress {
    async fn report(&self, current: f64, total: f64, message: Option<String>) {
        let sent = self
            .client
            .notify_progress(ProgressNotificationParam {
                progress_token: self.token.clone(),
                progress: current,
                total: Some(total),
                message,
            })
            .await;
        if let Err(e) = sent {
            tracing::debug!("Dropping progress notification: {}", e);
        }
    }
}

/// Reporter for a tool call: client notifications when the request carries a
/// progress token, no-op otherwise.
pub fn make_mcp_progress(meta: &Meta, client: &Peer<RoleServer>) -> Arc<dyn ProgressReporter> {
    match meta.get_progress_token() {
        Some(token) => Arc::new(ClientProgress {
            client: client.clone(),
            token: token.clone(),
        }),
        None => noop_progress(),
    }
}
