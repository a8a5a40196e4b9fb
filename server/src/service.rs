//! Todo use cases.
//!
//! # Responsibility
//! - Validate caller input before it reaches the repository.
//! - Turn "absent" repository results into `ServiceError::NotFound`.
//!
//! The service holds nothing but its repository, which is scoped to a single
//! request's transaction.

use tracing::debug;

use crate::db::DbError;
use crate::model::{Title, TitleError, Todo, TodoId, TodoPatch};
use crate::repo::{RepoError, TodoRepository};

pub type ServiceResult<T> = Result<T, ServiceError>;

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error(transparent)]
    Validation(#[from] TitleError),
    #[error("수정할 필드가 필요합니다.")]
    InvalidUpdate,
    #[error("TODO를 찾을 수 없습니다.")]
    NotFound(TodoId),
    #[error(transparent)]
    Repo(#[from] RepoError),
}

impl From<DbError> for ServiceError {
    fn from(value: DbError) -> Self {
        Self::Repo(RepoError::Db(value))
    }
}

pub struct TodoService<R: TodoRepository> {
    repo: R,
}

impl<R: TodoRepository> TodoService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn list_todos(&self) -> ServiceResult<Vec<Todo>> {
        Ok(self.repo.list_todos()?)
    }

    /// Trims and validates `title`, then stores a new, incomplete todo.
    pub fn create_todo(&self, title: &str) -> ServiceResult<Todo> {
        let title = Title::parse(title)?;
        let todo = self.repo.create_todo(&title)?;
        debug!(id = todo.id, "created todo");
        Ok(todo)
    }

    pub fn get_todo(&self, id: TodoId) -> ServiceResult<Todo> {
        self.repo.get_todo(id)?.ok_or(ServiceError::NotFound(id))
    }

    /// Changes the title and/or completion flag of an existing todo.
    ///
    /// At least one field must be given. A given title is validated the same
    /// way as on create.
    pub fn update_todo(
        &self,
        id: TodoId,
        title: Option<&str>,
        is_completed: Option<bool>,
    ) -> ServiceResult<Todo> {
        let patch = TodoPatch {
            title: title.map(Title::parse).transpose()?,
            is_completed,
        };
        if patch.is_empty() {
            return Err(ServiceError::InvalidUpdate);
        }

        let todo = self
            .repo
            .update_todo(id, &patch)?
            .ok_or(ServiceError::NotFound(id))?;
        debug!(id, "updated todo");
        Ok(todo)
    }

    pub fn delete_todo(&self, id: TodoId) -> ServiceResult<()> {
        if !self.repo.delete_todo(id)? {
            return Err(ServiceError::NotFound(id));
        }
        debug!(id, "deleted todo");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use chrono::Utc;

    use super::*;
    use crate::repo::RepoResult;

    /// In-memory repository so the service rules can be checked without SQLite.
    #[derive(Default)]
    struct FakeRepo {
        todos: RefCell<Vec<Todo>>,
    }

    impl TodoRepository for FakeRepo {
        fn list_todos(&self) -> RepoResult<Vec<Todo>> {
            Ok(self.todos.borrow().iter().rev().cloned().collect())
        }

        fn create_todo(&self, title: &Title) -> RepoResult<Todo> {
            let now = Utc::now();
            let mut todos = self.todos.borrow_mut();
            let todo = Todo {
                id: todos.len() as TodoId + 1,
                title: title.as_str().to_string(),
                is_completed: false,
                created_at: now,
                updated_at: now,
            };
            todos.push(todo.clone());
            Ok(todo)
        }

        fn get_todo(&self, id: TodoId) -> RepoResult<Option<Todo>> {
            Ok(self.todos.borrow().iter().find(|t| t.id == id).cloned())
        }

        fn update_todo(&self, id: TodoId, patch: &TodoPatch) -> RepoResult<Option<Todo>> {
            let mut todos = self.todos.borrow_mut();
            let Some(todo) = todos.iter_mut().find(|t| t.id == id) else {
                return Ok(None);
            };
            if let Some(title) = &patch.title {
                todo.title = title.as_str().to_string();
            }
            if let Some(done) = patch.is_completed {
                todo.is_completed = done;
            }
            todo.updated_at = Utc::now();
            Ok(Some(todo.clone()))
        }

        fn delete_todo(&self, id: TodoId) -> RepoResult<bool> {
            let mut todos = self.todos.borrow_mut();
            let before = todos.len();
            todos.retain(|t| t.id != id);
            Ok(todos.len() != before)
        }
    }

    fn service() -> TodoService<FakeRepo> {
        TodoService::new(FakeRepo::default())
    }

    #[test]
    fn create_trims_title() {
        let todo = service().create_todo("  write tests  ").unwrap();
        assert_eq!(todo.title, "write tests");
        assert!(!todo.is_completed);
    }

    #[test]
    fn create_rejects_blank_title_without_persisting() {
        let svc = service();
        let err = svc.create_todo("   ").unwrap_err();
        assert!(matches!(err, ServiceError::Validation(TitleError::Empty)));
        assert!(svc.list_todos().unwrap().is_empty());
    }

    #[test]
    fn create_rejects_overlong_title() {
        let err = service().create_todo(&"x".repeat(201)).unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Validation(TitleError::TooLong { len: 201 })
        ));
    }

    #[test]
    fn update_without_fields_is_invalid() {
        let svc = service();
        let todo = svc.create_todo("a").unwrap();
        let err = svc.update_todo(todo.id, None, None).unwrap_err();
        assert!(matches!(err, ServiceError::InvalidUpdate));
    }

    #[test]
    fn update_validates_title_before_lookup() {
        let err = service().update_todo(42, Some("  "), Some(true)).unwrap_err();
        assert!(matches!(err, ServiceError::Validation(TitleError::Empty)));
    }

    #[test]
    fn update_missing_todo_is_not_found() {
        let err = service().update_todo(999, None, Some(true)).unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(999)));
    }

    #[test]
    fn update_applies_only_given_fields() {
        let svc = service();
        let todo = svc.create_todo("original").unwrap();

        let done = svc.update_todo(todo.id, None, Some(true)).unwrap();
        assert_eq!(done.title, "original");
        assert!(done.is_completed);

        let renamed = svc.update_todo(todo.id, Some(" renamed "), None).unwrap();
        assert_eq!(renamed.title, "renamed");
        assert!(renamed.is_completed);
    }

    #[test]
    fn delete_twice_reports_not_found() {
        let svc = service();
        let todo = svc.create_todo("a").unwrap();
        svc.delete_todo(todo.id).unwrap();
        assert!(matches!(
            svc.delete_todo(todo.id).unwrap_err(),
            ServiceError::NotFound(id) if id == todo.id
        ));
        assert!(matches!(
            svc.get_todo(todo.id).unwrap_err(),
            ServiceError::NotFound(_)
        ));
    }
}
