/*!
Callosum REST API Client
Authenticates against a callosum-based analytics platform and exposes the
session, metadata and user-administration endpoints over a cookie-carrying
HTTP client.
*/

use std::time::Duration;

use reqwest::StatusCode;
use reqwest::header::{HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Calls without this header are rejected by the platform.
const REQUESTED_BY: (&str, &str) = ("X-Requested-By", "ThoughtSpot");

const LOGIN_PATH: &str = "/callosum/v1/tspublic/v1/session/login";
const SESSION_INFO_PATH: &str = "/callosum/v1/session/info";
const LIST_OBJECT_HEADERS_PATH: &str = "/callosum/v1/tspublic/v1/metadata/listobjectheaders";
const DELETE_USERS_PATH: &str = "/callosum/v1/session/user/deleteusers";

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("failed to decode {endpoint} response: {source}")]
    Decode {
        endpoint: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to encode request payload: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Object kinds known to the metadata listing endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ObjectType {
    PinboardAnswerBook,
    QuestionAnswerBook,
    LogicalTable,
    User,
}

impl ObjectType {
    /// Wire name used in the `type` query parameter.
    pub fn as_str(&self) -> &'static str {
        match self {
            ObjectType::PinboardAnswerBook => "PINBOARD_ANSWER_BOOK",
            ObjectType::QuestionAnswerBook => "QUESTION_ANSWER_BOOK",
            ObjectType::LogicalTable => "LOGICAL_TABLE",
            ObjectType::User => "USER",
        }
    }
}

/// Summary record returned by the listing endpoint. Content kinds carry an
/// `author`, the user kind carries `id` and `name`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObjectHeader {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub author: Option<String>,
}

/// Identity attached to the current session cookie.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionInfo {
    #[serde(rename = "userName")]
    pub user_name: String,
}

/// Result of a login attempt. A rejected login is a value, not an error;
/// the caller decides whether the run may proceed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthOutcome {
    Authenticated,
    Rejected { status: StatusCode },
}

/// Query parameters for the listing endpoint. `offset = -1` fetches the
/// complete result set in one response.
#[derive(Debug, Clone)]
pub struct ListParams {
    pub category: String,
    pub sort: String,
    pub offset: i64,
}

impl Default for ListParams {
    fn default() -> Self {
        Self {
            category: "ALL".to_string(),
            sort: "DEFAULT".to_string(),
            offset: -1,
        }
    }
}

/// Connection settings for [`CallosumClient::new`].
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// Base URL of the platform, e.g. `https://10.85.79.254`.
    pub base_url: String,
    /// Accept self-signed platform certificates. Off unless explicitly
    /// enabled in configuration.
    pub accept_invalid_certs: bool,
    /// Per-request timeout. `None` waits on the platform indefinitely.
    pub request_timeout: Option<Duration>,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            accept_invalid_certs: false,
            request_timeout: Some(Duration::from_secs(30)),
        }
    }
}

/// Authenticated handle to the platform. The session cookie issued at login
/// is held in the client's cookie store and carried on every later call.
pub struct CallosumClient {
    base_url: String,
    http: reqwest::Client,
}

impl CallosumClient {
    pub fn new(options: &ClientOptions) -> Result<Self, ClientError> {
        let mut headers = HeaderMap::new();
        headers.insert(REQUESTED_BY.0, HeaderValue::from_static(REQUESTED_BY.1));

        let mut builder = reqwest::Client::builder()
            .default_headers(headers)
            .cookie_store(true);

        if let Some(timeout) = options.request_timeout {
            builder = builder.timeout(timeout);
        }
        if options.accept_invalid_certs {
            builder = builder.danger_accept_invalid_certs(true);
        }

        Ok(Self {
            base_url: options.base_url.trim_end_matches('/').to_string(),
            http: builder.build()?,
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Send credentials as a form-encoded login request. The platform
    /// answers a successful login with HTTP 204.
    pub async fn login(&self, username: &str, password: &str) -> Result<AuthOutcome, ClientError> {
        let response = self
            .http
            .post(self.endpoint(LOGIN_PATH))
            .form(&[
                ("username", username),
                ("password", password),
                ("rememberme", "true"),
            ])
            .send()
            .await?;

        let status = response.status();
        debug!("Login returned status {}", status);

        if status == StatusCode::NO_CONTENT {
            Ok(AuthOutcome::Authenticated)
        } else {
            Ok(AuthOutcome::Rejected { status })
        }
    }

    /// Fetch the identity associated with the current session cookie.
    pub async fn session_info(&self) -> Result<SessionInfo, ClientError> {
        let body = self
            .http
            .get(self.endpoint(SESSION_INFO_PATH))
            .send()
            .await?
            .text()
            .await?;

        serde_json::from_str(&body).map_err(|source| ClientError::Decode {
            endpoint: "session/info",
            source,
        })
    }

    /// List every object header of the given kind. No pagination is
    /// performed; the platform returns the full result set for the default
    /// parameters.
    pub async fn list_object_headers(
        &self,
        object_type: ObjectType,
        params: &ListParams,
    ) -> Result<Vec<ObjectHeader>, ClientError> {
        let offset = params.offset.to_string();
        let body = self
            .http
            .get(self.endpoint(LIST_OBJECT_HEADERS_PATH))
            .query(&[
                ("type", object_type.as_str()),
                ("category", params.category.as_str()),
                ("sort", params.sort.as_str()),
                ("offset", offset.as_str()),
            ])
            .send()
            .await?
            .text()
            .await?;

        serde_json::from_str(&body).map_err(|source| ClientError::Decode {
            endpoint: "metadata/listobjectheaders",
            source,
        })
    }

    /// Delete the given users. The id list is sent JSON-encoded under a
    /// single `ids` form field, an empty list included. The platform's
    /// status is returned for reporting and never retried here.
    pub async fn delete_users(&self, user_ids: &[String]) -> Result<StatusCode, ClientError> {
        let ids = serde_json::to_string(user_ids)?;
        let response = self
            .http
            .post(self.endpoint(DELETE_USERS_PATH))
            .form(&[("ids", ids.as_str())])
            .send()
            .await?;

        Ok(response.status())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn object_type_wire_names_match_serde() {
        for object_type in [
            ObjectType::PinboardAnswerBook,
            ObjectType::QuestionAnswerBook,
            ObjectType::LogicalTable,
            ObjectType::User,
        ] {
            let encoded = serde_json::to_value(object_type).unwrap();
            assert_eq!(encoded, serde_json::Value::from(object_type.as_str()));
        }
    }

    #[test]
    fn object_type_parses_from_wire_name() {
        let parsed: ObjectType = serde_json::from_str("\"PINBOARD_ANSWER_BOOK\"").unwrap();
        assert_eq!(parsed, ObjectType::PinboardAnswerBook);
    }

    #[test]
    fn object_header_tolerates_missing_fields() {
        let header: ObjectHeader = serde_json::from_str(r#"{"id": "u1"}"#).unwrap();
        assert_eq!(header.id, "u1");
        assert_eq!(header.name, "");
        assert_eq!(header.author, None);

        let header: ObjectHeader =
            serde_json::from_str(r#"{"id": "pb1", "name": "Sales", "author": "u1"}"#).unwrap();
        assert_eq!(header.author.as_deref(), Some("u1"));
    }

    #[test]
    fn list_params_default_fetches_everything() {
        let params = ListParams::default();
        assert_eq!(params.category, "ALL");
        assert_eq!(params.sort, "DEFAULT");
        assert_eq!(params.offset, -1);
    }

    #[test]
    fn client_builds_with_insecure_certs_enabled() {
        let options = ClientOptions {
            base_url: "https://10.85.79.254/".to_string(),
            accept_invalid_certs: true,
            request_timeout: None,
        };
        let client = CallosumClient::new(&options).unwrap();
        assert_eq!(client.endpoint(LOGIN_PATH), format!("https://10.85.79.254{LOGIN_PATH}"));
    }
}
