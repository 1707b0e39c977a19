//! Database module for SQLite persistence using SeaORM

pub mod entities;
pub mod store;

use sea_orm::{ConnectionTrait, Database, DatabaseConnection, DbErr, Statement};

/// Initialize database connection and create tables
pub async fn init_database(database_url: &str) -> Result<DatabaseConnection, DbErr> {
    tracing::info!("Connecting to database: {}", database_url);

    let db = Database::connect(database_url).await?;

    create_tables(&db).await?;

    Ok(db)
}

/// Create all tables if they don't exist
async fn create_tables(db: &DatabaseConnection) -> Result<(), DbErr> {
    // One row per Telegram user; telegram_id is the immutable key.
    db.execute(Statement::from_string(
        db.get_database_backend(),
        r#"
        CREATE TABLE IF NOT EXISTS integrations (
            telegram_id INTEGER PRIMARY KEY,
            access_token TEXT NOT NULL,
            workspace_id TEXT NOT NULL,
            workspace_name TEXT NOT NULL,
            bot_id TEXT NOT NULL,
            database_id TEXT NOT NULL,
            user_name TEXT NOT NULL,
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL
        )
        "#
        .to_string(),
    ))
    .await?;

    Ok(())
}
