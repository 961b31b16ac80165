/*!
Linear run orchestrator: authenticate, gather headers, resolve inactivity,
delete
*/

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};

use callosum_client::{
    AuthOutcome, CallosumClient, ListParams, ObjectHeader, ObjectType,
};

use crate::core::{
    config::{OnAuthFailure, PrunerConfig},
    inactivity::{InactiveUser, find_inactive_users, retain_unprotected},
};

/// Outcome of a completed run.
#[derive(Debug, Clone, Serialize)]
pub struct PruneReport {
    pub started_at: DateTime<Utc>,
    /// Header count per fetched kind, in fetch order.
    pub headers_fetched: Vec<(ObjectType, usize)>,
    pub directory_size: usize,
    pub deleted: Vec<InactiveUser>,
    pub delete_status: u16,
}

/// Drives one pruning run against the platform. The authenticated client
/// handle is created once and threaded through every call.
pub struct InactiveUserPruner {
    config: PrunerConfig,
    client: CallosumClient,
}

impl InactiveUserPruner {
    pub fn new(config: PrunerConfig) -> Result<Self, Box<dyn std::error::Error>> {
        let client = CallosumClient::new(&config.client_options())?;
        Ok(Self { config, client })
    }

    /// Run the full sequence: login, identity check, one fetch per tracked
    /// kind, inactivity resolution, deletion. Strictly linear; any
    /// transport or decoding failure ends the run.
    pub async fn run(&self) -> Result<PruneReport, Box<dyn std::error::Error>> {
        let started_at = Utc::now();
        info!(
            "🚀 Starting inactive-user pruning run against {}",
            self.config.platform.host
        );

        self.authenticate().await?;

        let mut user_headers: Vec<ObjectHeader> = Vec::new();
        let mut content_headers: Vec<ObjectHeader> = Vec::new();
        let mut headers_fetched = Vec::new();
        let params = ListParams::default();

        for &object_type in &self.config.tracking.object_types {
            let headers = self.client.list_object_headers(object_type, &params).await?;
            info!("Fetched {} {} headers", headers.len(), object_type.as_str());
            headers_fetched.push((object_type, headers.len()));

            if object_type == ObjectType::User {
                user_headers.extend(headers);
            } else {
                content_headers.extend(headers);
            }
        }

        let directory_size = user_headers.len();
        let inactive = find_inactive_users(&user_headers, &content_headers);
        info!(
            "{} of {} directory users authored no tracked content",
            inactive.len(),
            directory_size
        );

        let candidates = retain_unprotected(inactive, &self.config.tracking.protected_users);
        for user in &candidates {
            info!("Marking {} ({}) for deletion", user.name, user.id);
        }

        // The delete call goes out even when no candidate remains.
        let ids: Vec<String> = candidates.iter().map(|user| user.id.clone()).collect();
        let delete_status = self.client.delete_users(&ids).await?;
        if delete_status.is_success() {
            info!("Deleted {} users (status {})", ids.len(), delete_status);
        } else {
            warn!("Delete call returned status {}", delete_status);
        }

        Ok(PruneReport {
            started_at,
            headers_fetched,
            directory_size,
            deleted: candidates,
            delete_status: delete_status.as_u16(),
        })
    }

    /// Login and verify the session resolves to the expected administrative
    /// identity. Failures are routed through the configured policy.
    async fn authenticate(&self) -> Result<(), Box<dyn std::error::Error>> {
        let outcome = self
            .client
            .login(&self.config.platform.username, &self.config.platform.password)
            .await?;

        match outcome {
            AuthOutcome::Authenticated => {
                info!("Logged in as {}", self.config.platform.username);
            }
            AuthOutcome::Rejected { status } => {
                self.auth_failure(format!("login rejected with status {status}"))?;
            }
        }

        let session = self.client.session_info().await?;
        if session.user_name == self.config.platform.expected_identity {
            info!("Session identity verified: {}", session.user_name);
        } else {
            self.auth_failure(format!(
                "session identity is {}, expected {}",
                session.user_name, self.config.platform.expected_identity
            ))?;
        }

        Ok(())
    }

    fn auth_failure(&self, reason: String) -> Result<(), Box<dyn std::error::Error>> {
        match self.config.policy.on_auth_failure {
            OnAuthFailure::Abort => Err(format!("authentication failed: {reason}").into()),
            OnAuthFailure::Continue => {
                warn!("Authentication failed ({reason}), continuing per policy");
                Ok(())
            }
        }
    }
}
