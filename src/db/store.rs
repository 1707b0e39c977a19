//! Integration store: persistence operations over the `integrations` table.
//!
//! The store is a capability chosen once at startup: `Connected` wraps a live
//! SeaORM connection pool, `Disabled` is installed when the database was
//! unreachable and makes every operation degrade instead of panic. Each
//! operation checks out a pooled connection for its own scope; the upsert runs
//! inside a transaction so a conflict-resolution write commits or rolls back
//! as one unit.

use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ActiveValue::Set, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait, TransactionTrait,
};

use super::entities::integration::{self, Entity as Integration};

/// Field set for an insert-or-update; timestamps are managed by the store.
#[derive(Clone, Debug)]
pub struct NewIntegration {
    pub access_token: String,
    pub workspace_id: String,
    pub workspace_name: String,
    pub bot_id: String,
    pub database_id: String,
    pub user_name: String,
}

pub enum IntegrationStore {
    Connected(DatabaseConnection),
    Disabled,
}

impl IntegrationStore {
    /// Insert the record, or overwrite every field except `created_at` if a
    /// row for this telegram id already exists. Atomic at the database layer
    /// via ON CONFLICT, never check-then-write.
    pub async fn upsert(&self, telegram_id: i64, data: NewIntegration) -> Result<(), DbErr> {
        let db = match self {
            Self::Connected(db) => db,
            Self::Disabled => {
                return Err(DbErr::Custom("integration store is unavailable".into()))
            }
        };

        let now = chrono::Utc::now().timestamp_millis();
        let row = integration::ActiveModel {
            telegram_id: Set(telegram_id),
            access_token: Set(data.access_token),
            workspace_id: Set(data.workspace_id),
            workspace_name: Set(data.workspace_name),
            bot_id: Set(data.bot_id),
            database_id: Set(data.database_id),
            user_name: Set(data.user_name),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let txn = db.begin().await?;
        Integration::insert(row)
            .on_conflict(
                OnConflict::column(integration::Column::TelegramId)
                    .update_columns([
                        integration::Column::AccessToken,
                        integration::Column::WorkspaceId,
                        integration::Column::WorkspaceName,
                        integration::Column::BotId,
                        integration::Column::DatabaseId,
                        integration::Column::UserName,
                        integration::Column::UpdatedAt,
                    ])
                    .to_owned(),
            )
            .exec(&txn)
            .await?;
        txn.commit().await
    }

    /// Point lookup by telegram id.
    pub async fn get(&self, telegram_id: i64) -> Result<Option<integration::Model>, DbErr> {
        match self {
            Self::Connected(db) => Integration::find_by_id(telegram_id).one(db).await,
            Self::Disabled => Ok(None),
        }
    }

    /// Remove the record if present. Returns whether a row was actually
    /// removed, so callers can distinguish "already absent".
    pub async fn delete(&self, telegram_id: i64) -> Result<bool, DbErr> {
        match self {
            Self::Connected(db) => {
                let result = Integration::delete_by_id(telegram_id).exec(db).await?;
                Ok(result.rows_affected > 0)
            }
            Self::Disabled => Ok(false),
        }
    }

    /// Total row count, for display only. Degrades to 0 on any failure.
    pub async fn count(&self) -> u64 {
        match self {
            Self::Connected(db) => Integration::find().count(db).await.unwrap_or_else(|e| {
                tracing::error!("Failed to count integrations: {}", e);
                0
            }),
            Self::Disabled => 0,
        }
    }

    /// Trivial round-trip query for health reporting. Degrades to `false` on
    /// any failure.
    pub async fn liveness_probe(&self) -> bool {
        match self {
            Self::Connected(db) => db.ping().await.is_ok(),
            Self::Disabled => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_database;

    async fn memory_store() -> IntegrationStore {
        let db = init_database("sqlite::memory:").await.unwrap();
        IntegrationStore::Connected(db)
    }

    fn sample(token: &str) -> NewIntegration {
        NewIntegration {
            access_token: token.to_string(),
            workspace_id: "ws-1".to_string(),
            workspace_name: "Personal Workspace".to_string(),
            bot_id: "internal_integration".to_string(),
            database_id: "db-1".to_string(),
            user_name: "Alice".to_string(),
        }
    }

    #[tokio::test]
    async fn upsert_then_get() {
        let store = memory_store().await;
        store.upsert(42, sample("secret_a")).await.unwrap();

        let row = store.get(42).await.unwrap().unwrap();
        assert_eq!(row.telegram_id, 42);
        assert_eq!(row.access_token, "secret_a");
        assert_eq!(row.workspace_name, "Personal Workspace");
        assert_eq!(row.created_at, row.updated_at);
    }

    #[tokio::test]
    async fn get_absent_returns_none() {
        let store = memory_store().await;
        assert!(store.get(999).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn repeated_upsert_overwrites_in_place_and_keeps_created_at() {
        let store = memory_store().await;
        store.upsert(42, sample("secret_a")).await.unwrap();
        let first = store.get(42).await.unwrap().unwrap();

        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        store.upsert(42, sample("secret_b")).await.unwrap();

        assert_eq!(store.count().await, 1);
        let second = store.get(42).await.unwrap().unwrap();
        assert_eq!(second.access_token, "secret_b");
        assert_eq!(second.created_at, first.created_at);
        assert!(second.updated_at > first.updated_at);
    }

    #[tokio::test]
    async fn delete_reports_whether_a_row_was_removed() {
        let store = memory_store().await;
        store.upsert(1, sample("secret_a")).await.unwrap();
        store.upsert(2, sample("secret_b")).await.unwrap();
        assert_eq!(store.count().await, 2);

        assert!(!store.delete(3).await.unwrap());
        assert_eq!(store.count().await, 2);

        assert!(store.delete(1).await.unwrap());
        assert_eq!(store.count().await, 1);
        assert!(store.get(1).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn liveness_probe_reports_connection_state() {
        let store = memory_store().await;
        assert!(store.liveness_probe().await);
        assert!(!IntegrationStore::Disabled.liveness_probe().await);
    }

    #[tokio::test]
    async fn disabled_store_degrades_instead_of_panicking() {
        let store = IntegrationStore::Disabled;
        assert!(store.upsert(1, sample("secret_a")).await.is_err());
        assert!(store.get(1).await.unwrap().is_none());
        assert!(!store.delete(1).await.unwrap());
        assert_eq!(store.count().await, 0);
    }
}
