//! Spaces group a user's tasks by life area ("Health", "Work", ...).
//!
//! The core only touches membership: maintenance detaches deleted task ids,
//! task creation attaches new ones.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Space {
    pub id: String,
    pub user_id: String,
    pub name: String,
    #[serde(default)]
    pub task_ids: Vec<String>,
}

impl Space {
    pub fn new(user_id: impl Into<String>, name: impl Into<String>) -> Self {
        Space {
            id: format!("space-{}", Uuid::new_v4()),
            user_id: user_id.into(),
            name: name.into(),
            task_ids: Vec::new(),
        }
    }

    pub fn attach_task(&mut self, task_id: impl Into<String>) {
        let task_id = task_id.into();
        if !self.task_ids.contains(&task_id) {
            self.task_ids.push(task_id);
        }
    }

    /// Remove a task id from this space. Returns whether it was present.
    pub fn detach_task(&mut self, task_id: &str) -> bool {
        let before = self.task_ids.len();
        self.task_ids.retain(|id| id != task_id);
        self.task_ids.len() != before
    }
}
