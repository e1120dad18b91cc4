//! In-memory repository for task tracking tests.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::task::{
    domain::{
        DerivedTask, Document, DocumentId, Task, TaskId, TaskRelatedDocument, TaskType,
        TaskTypeName,
    },
    ports::{TaskRepository, TaskRepositoryError, TaskRepositoryResult},
};

/// Thread-safe in-memory task repository.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTaskRepository {
    state: Arc<RwLock<InMemoryTaskState>>,
}

#[derive(Debug, Default)]
struct InMemoryTaskState {
    tasks: HashMap<TaskId, Task>,
    task_types: HashMap<TaskTypeName, TaskType>,
    derived: Vec<DerivedTask>,
    documents: HashMap<DocumentId, Document>,
    document_links: Vec<TaskRelatedDocument>,
}

impl InMemoryTaskRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> TaskRepositoryResult<RwLockReadGuard<'_, InMemoryTaskState>> {
        self.state.read().map_err(|err| {
            TaskRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })
    }

    fn write(&self) -> TaskRepositoryResult<RwLockWriteGuard<'_, InMemoryTaskState>> {
        self.state.write().map_err(|err| {
            TaskRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })
    }
}

#[async_trait]
impl TaskRepository for InMemoryTaskRepository {
    async fn store(&self, task: &Task) -> TaskRepositoryResult<()> {
        let mut state = self.write()?;
        if state.tasks.contains_key(&task.id()) {
            return Err(TaskRepositoryError::DuplicateTask(task.id()));
        }
        state.tasks.insert(task.id(), task.clone());
        Ok(())
    }

    async fn update(&self, task: &Task) -> TaskRepositoryResult<()> {
        let mut state = self.write()?;
        let existing = state
            .tasks
            .get_mut(&task.id())
            .ok_or(TaskRepositoryError::NotFound(task.id()))?;
        *existing = task.clone();
        Ok(())
    }

    async fn find_by_id(&self, id: TaskId) -> TaskRepositoryResult<Option<Task>> {
        let state = self.read()?;
        Ok(state.tasks.get(&id).cloned())
    }

    async fn delete(&self, id: TaskId) -> TaskRepositoryResult<()> {
        let mut state = self.write()?;
        if state.tasks.remove(&id).is_none() {
            return Err(TaskRepositoryError::NotFound(id));
        }
        state
            .derived
            .retain(|edge| edge.parent() != id && edge.child() != id);
        state.document_links.retain(|link| link.task != id);
        Ok(())
    }

    async fn store_task_type(&self, task_type: &TaskType) -> TaskRepositoryResult<()> {
        let mut state = self.write()?;
        if state.task_types.contains_key(task_type.name()) {
            return Err(TaskRepositoryError::DuplicateTaskTypeName(
                task_type.name().clone(),
            ));
        }
        state
            .task_types
            .insert(task_type.name().clone(), task_type.clone());
        Ok(())
    }

    async fn find_task_type_by_name(
        &self,
        name: &TaskTypeName,
    ) -> TaskRepositoryResult<Option<TaskType>> {
        let state = self.read()?;
        Ok(state.task_types.get(name).cloned())
    }

    async fn store_derived(&self, edge: &DerivedTask) -> TaskRepositoryResult<()> {
        if edge.parent() == edge.child() {
            return Err(TaskRepositoryError::SelfReferentialDerivedTask(edge.parent()));
        }
        let mut state = self.write()?;
        for endpoint in [edge.parent(), edge.child()] {
            if !state.tasks.contains_key(&endpoint) {
                return Err(TaskRepositoryError::NotFound(endpoint));
            }
        }
        let duplicate = state
            .derived
            .iter()
            .any(|existing| existing.parent() == edge.parent() && existing.child() == edge.child());
        if duplicate {
            return Err(TaskRepositoryError::DuplicateDerivedTask {
                parent: edge.parent(),
                child: edge.child(),
            });
        }
        state.derived.push(edge.clone());
        Ok(())
    }

    async fn derived_tasks(&self, parent: TaskId) -> TaskRepositoryResult<Vec<Task>> {
        let state = self.read()?;
        Ok(state
            .derived
            .iter()
            .filter(|edge| edge.parent() == parent)
            .filter_map(|edge| state.tasks.get(&edge.child()).cloned())
            .collect())
    }

    async fn parent_task(&self, child: TaskId) -> TaskRepositoryResult<Option<Task>> {
        let state = self.read()?;
        Ok(state
            .derived
            .iter()
            .find(|edge| edge.child() == child)
            .and_then(|edge| state.tasks.get(&edge.parent()).cloned()))
    }

    async fn store_document(&self, document: &Document) -> TaskRepositoryResult<()> {
        let mut state = self.write()?;
        state.documents.insert(document.id(), document.clone());
        Ok(())
    }

    async fn link_document(&self, link: TaskRelatedDocument) -> TaskRepositoryResult<()> {
        let mut state = self.write()?;
        if !state.tasks.contains_key(&link.task) {
            return Err(TaskRepositoryError::NotFound(link.task));
        }
        if state.document_links.contains(&link) {
            return Err(TaskRepositoryError::DuplicateDocumentLink {
                task: link.task,
                document: link.document,
            });
        }
        state.document_links.push(link);
        Ok(())
    }

    async fn documents_for_task(&self, task: TaskId) -> TaskRepositoryResult<Vec<Document>> {
        let state = self.read()?;
        let mut seen = HashSet::new();
        Ok(state
            .document_links
            .iter()
            .filter(|link| link.task == task && seen.insert(link.document))
            .filter_map(|link| state.documents.get(&link.document).cloned())
            .collect())
    }
}
