//! Storage collaborator interfaces.
//!
//! Persistence lives outside this crate; the orchestrator and the
//! maintenance sweeps speak only to these traits. An absent entity is
//! `Ok(None)` on the lookup -- [`StoreError`] is reserved for backend
//! failures. [`MemoryStore`] is the reference implementation used by the
//! test suites.

use std::collections::BTreeMap;

use crate::error::StoreError;
use crate::progression::User;
use crate::space::Space;
use crate::task::Task;

/// Task persistence.
pub trait TaskStore {
    fn task(&self, id: &str) -> Result<Option<Task>, StoreError>;
    fn tasks_by_owner(&self, user_id: &str) -> Result<Vec<Task>, StoreError>;
    fn tasks_by_space(&self, space_id: &str) -> Result<Vec<Task>, StoreError>;
    fn tasks_by_ids(&self, ids: &[String]) -> Result<Vec<Task>, StoreError>;
    fn save_task(&mut self, task: &Task) -> Result<(), StoreError>;
    fn delete_task(&mut self, id: &str) -> Result<(), StoreError>;
    fn delete_tasks(&mut self, ids: &[String]) -> Result<(), StoreError>;
    /// Number of tasks owned by `user_id`, for the creation limit.
    fn task_count_for(&self, user_id: &str) -> Result<usize, StoreError>;
}

/// User persistence.
pub trait UserStore {
    fn user(&self, id: &str) -> Result<Option<User>, StoreError>;
    fn users_by_ids(&self, ids: &[String]) -> Result<Vec<User>, StoreError>;
    /// The full user set, iterated by the maintenance sweeps.
    fn users(&self) -> Result<Vec<User>, StoreError>;
    fn save_user(&mut self, user: &User) -> Result<(), StoreError>;
    fn save_users(&mut self, users: &[User]) -> Result<(), StoreError>;
}

/// Space persistence.
pub trait SpaceStore {
    fn space(&self, id: &str) -> Result<Option<Space>, StoreError>;
    fn spaces_by_ids(&self, ids: &[String]) -> Result<Vec<Space>, StoreError>;
    fn save_space(&mut self, space: &Space) -> Result<(), StoreError>;
}

/// In-memory store backed by ordered maps, so iteration order (and with it
/// sweep behavior in tests) is deterministic.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tasks: BTreeMap<String, Task>,
    users: BTreeMap<String, User>,
    spaces: BTreeMap<String, Space>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    // Seeding helpers for tests and fixtures.

    pub fn insert_task(&mut self, task: Task) {
        self.tasks.insert(task.id.clone(), task);
    }

    pub fn insert_user(&mut self, user: User) {
        self.users.insert(user.id.clone(), user);
    }

    pub fn insert_space(&mut self, space: Space) {
        self.spaces.insert(space.id.clone(), space);
    }
}

impl TaskStore for MemoryStore {
    fn task(&self, id: &str) -> Result<Option<Task>, StoreError> {
        Ok(self.tasks.get(id).cloned())
    }

    fn tasks_by_owner(&self, user_id: &str) -> Result<Vec<Task>, StoreError> {
        Ok(self
            .tasks
            .values()
            .filter(|t| t.user_id == user_id)
            .cloned()
            .collect())
    }

    fn tasks_by_space(&self, space_id: &str) -> Result<Vec<Task>, StoreError> {
        Ok(self
            .tasks
            .values()
            .filter(|t| t.space_id == space_id)
            .cloned()
            .collect())
    }

    fn tasks_by_ids(&self, ids: &[String]) -> Result<Vec<Task>, StoreError> {
        Ok(ids.iter().filter_map(|id| self.tasks.get(id).cloned()).collect())
    }

    fn save_task(&mut self, task: &Task) -> Result<(), StoreError> {
        self.tasks.insert(task.id.clone(), task.clone());
        Ok(())
    }

    fn delete_task(&mut self, id: &str) -> Result<(), StoreError> {
        self.tasks.remove(id);
        Ok(())
    }

    fn delete_tasks(&mut self, ids: &[String]) -> Result<(), StoreError> {
        for id in ids {
            self.tasks.remove(id);
        }
        Ok(())
    }

    fn task_count_for(&self, user_id: &str) -> Result<usize, StoreError> {
        Ok(self.tasks.values().filter(|t| t.user_id == user_id).count())
    }
}

impl UserStore for MemoryStore {
    fn user(&self, id: &str) -> Result<Option<User>, StoreError> {
        Ok(self.users.get(id).cloned())
    }

    fn users_by_ids(&self, ids: &[String]) -> Result<Vec<User>, StoreError> {
        Ok(ids.iter().filter_map(|id| self.users.get(id).cloned()).collect())
    }

    fn users(&self) -> Result<Vec<User>, StoreError> {
        Ok(self.users.values().cloned().collect())
    }

    fn save_user(&mut self, user: &User) -> Result<(), StoreError> {
        self.users.insert(user.id.clone(), user.clone());
        Ok(())
    }

    fn save_users(&mut self, users: &[User]) -> Result<(), StoreError> {
        for user in users {
            self.users.insert(user.id.clone(), user.clone());
        }
        Ok(())
    }
}

impl SpaceStore for MemoryStore {
    fn space(&self, id: &str) -> Result<Option<Space>, StoreError> {
        Ok(self.spaces.get(id).cloned())
    }

    fn spaces_by_ids(&self, ids: &[String]) -> Result<Vec<Space>, StoreError> {
        Ok(ids.iter().filter_map(|id| self.spaces.get(id).cloned()).collect())
    }

    fn save_space(&mut self, space: &Space) -> Result<(), StoreError> {
        self.spaces.insert(space.id.clone(), space.clone());
        Ok(())
    }
}
