//! Persistence adapter for to-do records.
//!
//! Records live in a single MongoDB collection, one document per to-do:
//! `{_id, title, completed, created_at}`. The adapter owns identifier
//! generation and reports missing documents on update/delete as errors; it
//! does not enforce any business rule on the record contents.

use async_trait::async_trait;
use bson::{doc, oid::ObjectId};
use chrono::{DateTime, Utc};
use futures::TryStreamExt;
use mongodb::{Client, Collection};
use serde::{Deserialize, Serialize};

use crate::config::Config;

/// A to-do item as stored in the collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TodoRecord {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub title: String,
    pub completed: bool,
    #[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
}

impl TodoRecord {
    /// Creates a record with a freshly generated identifier, `completed` unset
    /// and `created_at` set to now.
    pub fn new(title: String) -> Self {
        Self {
            id: ObjectId::new(),
            title,
            completed: false,
            created_at: Utc::now(),
        }
    }
}

/// The mutable part of a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodoChanges {
    pub title: String,
    pub completed: bool,
}

/// Error type for repository operations.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    /// Represents a driver or server side failure.
    #[error("Database error: {0}")]
    Database(#[from] mongodb::error::Error),
    /// No document matched the identifier.
    #[error("Todo with ID {0} not found")]
    NotFound(ObjectId),
}

/// Storage operations the todo service relies on.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TodoRepository: Send + Sync {
    /// Persists a new record.
    async fn insert(&self, record: &TodoRecord) -> Result<(), RepositoryError>;

    /// Returns every stored record.
    async fn find_all(&self) -> Result<Vec<TodoRecord>, RepositoryError>;

    /// Overwrites title and completion of the record with the given ID.
    async fn update_by_id(&self, id: ObjectId, changes: TodoChanges)
    -> Result<(), RepositoryError>;

    /// Removes the record with the given ID.
    async fn delete_by_id(&self, id: ObjectId) -> Result<(), RepositoryError>;
}

pub struct MongoTodoRepository {
    collection: Collection<TodoRecord>,
}

impl MongoTodoRepository {
    pub fn new(collection: Collection<TodoRecord>) -> Self {
        Self { collection }
    }

    /// Connects to the configured database and checks it is reachable.
    ///
    /// The driver connects lazily, so a `ping` is issued up front to turn an
    /// unreachable server into a startup failure.
    #[tracing::instrument(skip(config), fields(db_name = %config.db_name, collection = %config.collection))]
    pub async fn connect(config: &Config) -> Result<Self, RepositoryError> {
        let client = Client::with_uri_str(&config.db_url).await?;
        let database = client.database(&config.db_name);
        database.run_command(doc! { "ping": 1 }).await?;
        tracing::info!("Connected to MongoDB");
        Ok(Self::new(database.collection(&config.collection)))
    }
}

#[async_trait]
impl TodoRepository for MongoTodoRepository {
    #[tracing::instrument(skip(self))]
    async fn insert(&self, record: &TodoRecord) -> Result<(), RepositoryError> {
        self.collection.insert_one(record).await?;
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn find_all(&self) -> Result<Vec<TodoRecord>, RepositoryError> {
        let cursor = self.collection.find(doc! {}).await?;
        let records: Vec<TodoRecord> = cursor.try_collect().await?;
        Ok(records)
    }

    #[tracing::instrument(skip(self))]
    async fn update_by_id(
        &self,
        id: ObjectId,
        changes: TodoChanges,
    ) -> Result<(), RepositoryError> {
        let result = self
            .collection
            .update_one(
                doc! { "_id": id },
                doc! { "$set": { "title": changes.title, "completed": changes.completed } },
            )
            .await?;
        if result.matched_count == 0 {
            return Err(RepositoryError::NotFound(id));
        }
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn delete_by_id(&self, id: ObjectId) -> Result<(), RepositoryError> {
        let result = self.collection.delete_one(doc! { "_id": id }).await?;
        if result.deleted_count == 0 {
            return Err(RepositoryError::NotFound(id));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn can_create_record_with_defaults() {
        let before = Utc::now();

        let record = TodoRecord::new("buy milk".to_string());

        assert_eq!(record.title, "buy milk");
        assert!(!record.completed);
        assert!(record.created_at >= before);
        assert_eq!(record.id.to_hex().len(), 24);
    }

    #[test]
    fn generates_distinct_ids() {
        let first = TodoRecord::new("a".to_string());
        let second = TodoRecord::new("b".to_string());

        assert_ne!(first.id, second.id);
    }

    #[test]
    fn can_serialize_record_to_document_layout() {
        let record = TodoRecord::new("walk the dog".to_string());

        let document = bson::to_document(&record).unwrap();

        assert_eq!(document.get_object_id("_id").unwrap(), record.id);
        assert_eq!(document.get_str("title").unwrap(), "walk the dog");
        assert!(!document.get_bool("completed").unwrap());
        assert!(document.get_datetime("created_at").is_ok());
        assert_eq!(document.len(), 4);
    }

    #[test]
    fn can_report_missing_record_with_its_id() {
        let id = ObjectId::parse_str("64b7f0c2a1b2c3d4e5f60718").unwrap();

        let error = RepositoryError::NotFound(id);

        assert_eq!(
            error.to_string(),
            "Todo with ID 64b7f0c2a1b2c3d4e5f60718 not found"
        );
    }
}
