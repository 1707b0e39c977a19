//! Verification sequence for a setup submission.
//!
//! A user is UNCONFIGURED until a submission passes the whole sequence, which
//! short-circuits on the first failure with a distinct user-facing reason:
//!
//! 1. format checks (no network call)
//! 2. identity check against the workspace API
//! 3. database metadata fetch
//! 4. schema validation
//! 5. probe page creation (write-access proof)
//! 6. upsert of the integration record, the only persistent side effect
//!
//! A VERIFIED user returns to UNCONFIGURED only via explicit disconnect.

use thiserror::Error;

use crate::db::store::{IntegrationStore, NewIntegration};
use crate::notion::{validate_database_schema, WorkspaceApi};

/// Internal integrations have no OAuth bot id; recorded as a constant marker.
pub const BOT_ID: &str = "internal_integration";

/// Notion internal integration tokens carry this prefix.
pub const SECRET_TOKEN_PREFIX: &str = "secret_";

/// Trimmed form fields from the setup page.
#[derive(Clone, Debug)]
pub struct SetupSubmission {
    pub token: String,
    pub database_id: String,
    pub user_name: Option<String>,
}

/// What the confirmation page shows after a successful verification.
#[derive(Clone, Debug)]
pub struct VerifiedSetup {
    pub user_name: String,
    pub workspace_name: String,
    pub database_title: String,
}

/// Why a submission was rejected. `Display` is the user-facing message.
#[derive(Error, Debug)]
pub enum SetupRejection {
    #[error("Please provide both integration token and database ID")]
    MissingFields,

    #[error("Integration token should start with \"{SECRET_TOKEN_PREFIX}\"")]
    BadTokenFormat,

    #[error("Invalid integration token: {0}")]
    InvalidToken(String),

    #[error("Cannot access database. Please check the database ID and ensure your integration has access to it.")]
    DatabaseInaccessible,

    #[error("{0}")]
    SchemaIssues(String),

    #[error("Cannot create pages in database. Please ensure your integration has write access.")]
    NoWriteAccess,

    #[error("Setup failed: could not save your integration. Please try again.")]
    StoreFailure,
}

/// Drive the verification sequence for one submission. Steps 1–5 are
/// read-only against local state; only the final upsert writes.
pub async fn run_verification(
    api: &dyn WorkspaceApi,
    store: &IntegrationStore,
    telegram_id: i64,
    submission: SetupSubmission,
) -> Result<VerifiedSetup, SetupRejection> {
    if submission.token.is_empty() || submission.database_id.is_empty() {
        return Err(SetupRejection::MissingFields);
    }
    if !submission.token.starts_with(SECRET_TOKEN_PREFIX) {
        return Err(SetupRejection::BadTokenFormat);
    }

    let identity = api.verify_identity().await.map_err(|e| {
        tracing::warn!(telegram_id, "Identity check failed: {}", e);
        SetupRejection::InvalidToken(e.to_string())
    })?;
    tracing::debug!(telegram_id, bot_id = %identity.id, "Token accepted by Notion");

    let database = api
        .fetch_database(&submission.database_id)
        .await
        .map_err(|e| {
            tracing::warn!(telegram_id, "Database fetch failed: {}", e);
            SetupRejection::DatabaseInaccessible
        })?;

    let report = validate_database_schema(&database);
    if !report.is_valid() {
        tracing::info!(telegram_id, "Schema validation failed: {}", report.describe());
        return Err(SetupRejection::SchemaIssues(report.describe()));
    }

    let page = api
        .create_probe_page(&submission.database_id)
        .await
        .map_err(|e| {
            tracing::warn!(telegram_id, "Probe page creation failed: {}", e);
            SetupRejection::NoWriteAccess
        })?;
    tracing::debug!(telegram_id, page_id = %page.id, "Probe page created");

    let workspace_name = identity
        .name
        .clone()
        .unwrap_or_else(|| "Personal Workspace".to_string());
    let user_name = submission
        .user_name
        .or(identity.name)
        .unwrap_or_else(|| "Unknown".to_string());

    store
        .upsert(
            telegram_id,
            NewIntegration {
                access_token: submission.token,
                workspace_id: database.id.clone(),
                workspace_name: workspace_name.clone(),
                bot_id: BOT_ID.to_string(),
                database_id: submission.database_id,
                user_name: user_name.clone(),
            },
        )
        .await
        .map_err(|e| {
            tracing::error!(telegram_id, "Failed to store integration: {}", e);
            SetupRejection::StoreFailure
        })?;

    tracing::info!(telegram_id, workspace = %workspace_name, "Setup verified and stored");

    Ok(VerifiedSetup {
        user_name,
        workspace_name,
        database_title: database.title_text(),
    })
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::db::init_database;
    use crate::notion::client::{CreatedPage, DatabaseMeta, Identity, PropertySpec, RichText};
    use crate::notion::NotionError;

    /// Scripted workspace API that records which calls were made.
    struct MockApi {
        fail_identity: bool,
        fail_database: bool,
        fail_probe: bool,
        properties: Vec<(&'static str, &'static str)>,
        calls: Mutex<Vec<&'static str>>,
    }

    impl MockApi {
        fn passing() -> Self {
            Self {
                fail_identity: false,
                fail_database: false,
                fail_probe: false,
                properties: vec![
                    ("Name", "title"),
                    ("Start at", "date"),
                    ("Finish at", "date"),
                    ("Priority", "multi_select"),
                    ("Progress", "status"),
                ],
                calls: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> Vec<&'static str> {
            self.calls.lock().unwrap().clone()
        }

        fn rejected() -> NotionError {
            NotionError::Api {
                status: reqwest::StatusCode::UNAUTHORIZED,
                body: "unauthorized".to_string(),
            }
        }
    }

    #[async_trait]
    impl WorkspaceApi for MockApi {
        async fn verify_identity(&self) -> Result<Identity, NotionError> {
            self.calls.lock().unwrap().push("identity");
            if self.fail_identity {
                return Err(Self::rejected());
            }
            Ok(Identity {
                id: "bot-1".to_string(),
                name: Some("Workspace Owner".to_string()),
            })
        }

        async fn fetch_database(&self, database_id: &str) -> Result<DatabaseMeta, NotionError> {
            self.calls.lock().unwrap().push("database");
            if self.fail_database {
                return Err(Self::rejected());
            }
            Ok(DatabaseMeta {
                id: format!("{}-normalized", database_id),
                title: vec![RichText {
                    plain_text: "Tasks".to_string(),
                }],
                properties: self
                    .properties
                    .iter()
                    .map(|(name, kind)| {
                        (
                            name.to_string(),
                            PropertySpec {
                                kind: kind.to_string(),
                            },
                        )
                    })
                    .collect::<HashMap<_, _>>(),
            })
        }

        async fn create_probe_page(&self, _database_id: &str) -> Result<CreatedPage, NotionError> {
            self.calls.lock().unwrap().push("probe");
            if self.fail_probe {
                return Err(Self::rejected());
            }
            Ok(CreatedPage {
                id: "page-1".to_string(),
            })
        }
    }

    async fn memory_store() -> IntegrationStore {
        IntegrationStore::Connected(init_database("sqlite::memory:").await.unwrap())
    }

    fn submission(token: &str) -> SetupSubmission {
        SetupSubmission {
            token: token.to_string(),
            database_id: "db-1".to_string(),
            user_name: None,
        }
    }

    #[tokio::test]
    async fn unprefixed_token_is_rejected_before_any_outbound_call() {
        let api = MockApi::passing();
        let store = memory_store().await;

        let result = run_verification(&api, &store, 7, submission("abc123")).await;

        assert!(matches!(result, Err(SetupRejection::BadTokenFormat)));
        assert!(api.calls().is_empty());
        assert_eq!(store.count().await, 0);
    }

    #[tokio::test]
    async fn blank_fields_are_rejected_before_any_outbound_call() {
        let api = MockApi::passing();
        let store = memory_store().await;

        let result = run_verification(&api, &store, 7, submission("")).await;

        assert!(matches!(result, Err(SetupRejection::MissingFields)));
        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn identity_failure_stops_before_the_database_fetch() {
        let api = MockApi {
            fail_identity: true,
            ..MockApi::passing()
        };
        let store = memory_store().await;

        let result = run_verification(&api, &store, 7, submission("secret_x")).await;

        assert!(matches!(result, Err(SetupRejection::InvalidToken(_))));
        assert_eq!(api.calls(), vec!["identity"]);
        assert_eq!(store.count().await, 0);
    }

    #[tokio::test]
    async fn database_failure_never_reaches_the_probe_and_writes_nothing() {
        let api = MockApi {
            fail_database: true,
            ..MockApi::passing()
        };
        let store = memory_store().await;

        let result = run_verification(&api, &store, 7, submission("secret_x")).await;

        assert!(matches!(result, Err(SetupRejection::DatabaseInaccessible)));
        assert_eq!(api.calls(), vec!["identity", "database"]);
        assert_eq!(store.count().await, 0);
    }

    #[tokio::test]
    async fn schema_issues_abort_before_the_probe_page() {
        let api = MockApi {
            properties: vec![
                ("Name", "title"),
                ("Start at", "date"),
                ("Finish at", "date"),
                ("Progress", "select"),
            ],
            ..MockApi::passing()
        };
        let store = memory_store().await;

        let result = run_verification(&api, &store, 7, submission("secret_x")).await;

        match result {
            Err(SetupRejection::SchemaIssues(message)) => {
                assert!(message.contains("Priority"));
                assert!(message.contains("Progress (expected: status, found: select)"));
            }
            other => panic!("expected schema rejection, got {:?}", other.map(|_| ())),
        }
        assert_eq!(api.calls(), vec!["identity", "database"]);
        assert_eq!(store.count().await, 0);
    }

    #[tokio::test]
    async fn probe_failure_writes_nothing() {
        let api = MockApi {
            fail_probe: true,
            ..MockApi::passing()
        };
        let store = memory_store().await;

        let result = run_verification(&api, &store, 7, submission("secret_x")).await;

        assert!(matches!(result, Err(SetupRejection::NoWriteAccess)));
        assert_eq!(store.count().await, 0);
    }

    #[tokio::test]
    async fn full_sequence_stores_exactly_one_retrievable_record() {
        let api = MockApi::passing();
        let store = memory_store().await;

        let setup = run_verification(&api, &store, 7, submission("secret_x"))
            .await
            .unwrap();

        assert_eq!(api.calls(), vec!["identity", "database", "probe"]);
        assert_eq!(setup.workspace_name, "Workspace Owner");
        assert_eq!(setup.database_title, "Tasks");

        assert_eq!(store.count().await, 1);
        let row = store.get(7).await.unwrap().unwrap();
        assert_eq!(row.access_token, "secret_x");
        assert_eq!(row.workspace_id, "db-1-normalized");
        assert_eq!(row.workspace_name, "Workspace Owner");
        assert_eq!(row.bot_id, BOT_ID);
        assert_eq!(row.database_id, "db-1");
        // No name was submitted, so the identity name is used.
        assert_eq!(row.user_name, "Workspace Owner");
    }

    #[tokio::test]
    async fn submitted_name_wins_over_the_identity_name() {
        let api = MockApi::passing();
        let store = memory_store().await;

        let setup = run_verification(
            &api,
            &store,
            7,
            SetupSubmission {
                token: "secret_x".to_string(),
                database_id: "db-1".to_string(),
                user_name: Some("Alice".to_string()),
            },
        )
        .await
        .unwrap();

        assert_eq!(setup.user_name, "Alice");
        assert_eq!(store.get(7).await.unwrap().unwrap().user_name, "Alice");
    }

    #[tokio::test]
    async fn disabled_store_surfaces_a_generic_store_failure() {
        let api = MockApi::passing();
        let store = IntegrationStore::Disabled;

        let result = run_verification(&api, &store, 7, submission("secret_x")).await;

        assert!(matches!(result, Err(SetupRejection::StoreFailure)));
    }
}
