use bson::oid::ObjectId;
use chrono::{DateTime, Utc};

pub mod api;
pub mod repository;

use repository::{RepositoryError, TodoChanges, TodoRecord, TodoRepository};

#[derive(Debug, PartialEq, Clone, Eq)]
pub struct Todo {
    id: ObjectId,
    title: String,
    completed: bool,
    created_at: DateTime<Utc>,
}

impl Todo {
    pub fn new(id: ObjectId, title: String, completed: bool, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            title,
            completed,
            created_at,
        }
    }

    /// Returns the ID of the todo.
    pub fn id(&self) -> ObjectId {
        self.id
    }

    /// Returns the title.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns whether the todo has been completed.
    pub fn completed(&self) -> bool {
        self.completed
    }

    /// Returns the creation time.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

impl From<TodoRecord> for Todo {
    fn from(record: TodoRecord) -> Self {
        Todo::new(record.id, record.title, record.completed, record.created_at)
    }
}

/// Error type for TodoService operations.
#[derive(Debug, thiserror::Error)]
pub enum TodoServiceError {
    /// The title was missing or blank.
    #[error("title is required")]
    TitleRequired,
    /// The identifier is not a 24 character hex string.
    #[error("id is invalid: '{0}'")]
    InvalidId(String),
    /// Represents a persistence error.
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Parses the external form of a todo identifier.
///
/// Validity is purely syntactic; whether a record with this ID exists is
/// only known once the store is asked.
pub fn parse_todo_id(raw: &str) -> Result<ObjectId, TodoServiceError> {
    let trimmed = raw.trim();
    ObjectId::parse_str(trimmed).map_err(|_| TodoServiceError::InvalidId(trimmed.to_string()))
}

pub struct TodoService<'a> {
    repository: &'a dyn TodoRepository,
}

impl TodoService<'_> {
    pub fn new(repository: &dyn TodoRepository) -> TodoService<'_> {
        TodoService { repository }
    }

    /// Creates a new todo entry.
    ///
    /// # Arguments
    ///
    /// * `title` - The title of the todo; must not be blank.
    ///
    /// # Returns
    ///
    /// A `Result` containing the created `Todo` if successful, or an error otherwise.
    #[tracing::instrument(skip(self))]
    pub async fn create_todo(&self, title: String) -> Result<Todo, TodoServiceError> {
        ensure_title(&title)?;
        let record = TodoRecord::new(title);
        self.repository.insert(&record).await?;
        Ok(Todo::from(record))
    }

    /// Overwrites the title and completion state of a todo.
    ///
    /// # Arguments
    ///
    /// * `id` - The ID of the todo to update.
    /// * `title` - The new title; must not be blank.
    /// * `completed` - The new completion state.
    #[tracing::instrument(skip(self))]
    pub async fn update_todo(
        &self,
        id: ObjectId,
        title: String,
        completed: bool,
    ) -> Result<(), TodoServiceError> {
        ensure_title(&title)?;
        self.repository
            .update_by_id(id, TodoChanges { title, completed })
            .await?;
        Ok(())
    }

    /// Retrieves all todos.
    ///
    /// # Returns
    ///
    /// A `Result` containing a vector of `Todo` if successful, or an error otherwise.
    #[tracing::instrument(skip(self))]
    pub async fn get_all_todos(&self) -> Result<Vec<Todo>, TodoServiceError> {
        let todos = self
            .repository
            .find_all()
            .await?
            .into_iter()
            .map(Todo::from)
            .collect();
        Ok(todos)
    }

    /// Deletes a todo by its ID.
    #[tracing::instrument(skip(self))]
    pub async fn delete_todo(&self, id: ObjectId) -> Result<(), TodoServiceError> {
        self.repository.delete_by_id(id).await?;
        Ok(())
    }
}

fn ensure_title(title: &str) -> Result<(), TodoServiceError> {
    if title.trim().is_empty() {
        return Err(TodoServiceError::TitleRequired);
    }
    Ok(())
}
