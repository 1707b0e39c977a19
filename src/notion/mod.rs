//! Notion API integration: outbound client and database schema validation.

pub mod client;
pub mod schema;

pub use client::{NotionClient, NotionError, WorkspaceApi};
pub use schema::validate_database_schema;
