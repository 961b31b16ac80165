/*!
Configuration management for the inactive-user pruner
*/

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use callosum_client::{ClientOptions, ObjectType};

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PrunerConfig {
    /// Connection and identity settings for the target platform
    pub platform: PlatformConfig,
    /// Which object kinds count towards authorship
    pub tracking: TrackingConfig,
    /// How strictly authentication failures are treated
    pub policy: PolicyConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PlatformConfig {
    /// Base URL of the platform
    pub host: String,
    /// Administrative account used for the run
    pub username: String,
    pub password: String,
    /// Username the session must resolve to after login
    pub expected_identity: String,
    /// Accept self-signed platform certificates. Deployments behind an
    /// untrusted certificate must opt in here.
    pub accept_invalid_certs: bool,
    /// Per-request timeout in seconds. 0 waits on the platform
    /// indefinitely, which is what the legacy tooling did.
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TrackingConfig {
    /// Object kinds fetched, in order. USER supplies the directory, every
    /// other kind contributes authors.
    pub object_types: Vec<ObjectType>,
    /// Display names that are never deletion candidates, e.g. system
    /// accounts like "tsadmin" or "Administrator".
    pub protected_users: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PolicyConfig {
    pub on_auth_failure: OnAuthFailure,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OnAuthFailure {
    /// Stop the run before touching any metadata.
    Abort,
    /// Log the failure and keep going, as the legacy tooling did.
    Continue,
}

impl Default for PrunerConfig {
    fn default() -> Self {
        Self {
            platform: PlatformConfig::default(),
            tracking: TrackingConfig::default(),
            policy: PolicyConfig::default(),
        }
    }
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            host: "https://10.85.79.254".to_string(),
            username: "tsadmin".to_string(),
            password: "admin".to_string(),
            expected_identity: "BTADMIN".to_string(),
            accept_invalid_certs: false,
            request_timeout_secs: 30,
        }
    }
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            object_types: vec![
                ObjectType::PinboardAnswerBook,
                ObjectType::QuestionAnswerBook,
                ObjectType::LogicalTable,
                ObjectType::User,
            ],
            protected_users: vec![],
        }
    }
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            on_auth_failure: OnAuthFailure::Abort,
        }
    }
}

impl PrunerConfig {
    /// Load configuration from a TOML file. Missing sections fall back to
    /// the built-in defaults.
    pub async fn load<P: AsRef<Path>>(path: P) -> Result<Self, Box<dyn std::error::Error>> {
        let content = tokio::fs::read_to_string(path).await?;
        let config = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn client_options(&self) -> ClientOptions {
        let secs = self.platform.request_timeout_secs;
        ClientOptions {
            base_url: self.platform.host.clone(),
            accept_invalid_certs: self.platform.accept_invalid_certs,
            request_timeout: (secs > 0).then(|| Duration::from_secs(secs)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_track_the_four_kinds_and_abort_on_auth_failure() {
        let config = PrunerConfig::default();
        assert_eq!(config.tracking.object_types.len(), 4);
        assert_eq!(config.tracking.object_types[3], ObjectType::User);
        assert!(config.tracking.protected_users.is_empty());
        assert_eq!(config.policy.on_auth_failure, OnAuthFailure::Abort);
        assert!(!config.platform.accept_invalid_certs);
    }

    #[test]
    fn parses_a_full_config_file() {
        let config: PrunerConfig = toml::from_str(
            r#"
            [platform]
            host = "https://analytics.internal"
            username = "opsadmin"
            password = "secret"
            expected_identity = "OPSADMIN"
            accept_invalid_certs = true
            request_timeout_secs = 0

            [tracking]
            object_types = ["LOGICAL_TABLE", "USER"]
            protected_users = ["tsadmin", "system", "su", "System", "Administrator"]

            [policy]
            on_auth_failure = "continue"
            "#,
        )
        .unwrap();

        assert_eq!(config.platform.host, "https://analytics.internal");
        assert_eq!(config.platform.expected_identity, "OPSADMIN");
        assert_eq!(
            config.tracking.object_types,
            vec![ObjectType::LogicalTable, ObjectType::User]
        );
        assert_eq!(config.tracking.protected_users.len(), 5);
        assert_eq!(config.policy.on_auth_failure, OnAuthFailure::Continue);

        let options = config.client_options();
        assert!(options.accept_invalid_certs);
        assert_eq!(options.request_timeout, None);
    }

    #[test]
    fn missing_sections_use_defaults() {
        let config: PrunerConfig = toml::from_str(
            r#"
            [platform]
            host = "https://analytics.internal"
            "#,
        )
        .unwrap();

        assert_eq!(config.platform.host, "https://analytics.internal");
        assert_eq!(config.platform.username, "tsadmin");
        assert_eq!(config.tracking.object_types.len(), 4);
        assert_eq!(config.policy.on_auth_failure, OnAuthFailure::Abort);

        let options = config.client_options();
        assert_eq!(options.request_timeout, Some(Duration::from_secs(30)));
    }
}
