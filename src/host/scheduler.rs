//! Task Scheduling Seam
//!
//! Bookkeeping for the recurring tasks a plugin asks the host to run.
//! The library records and clears schedules; executing them when due is the
//! host's job.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::plugin::error::PluginResult;

/// Recurrence intervals the host understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskInterval {
    Hourly,
    TwiceDaily,
    Daily,
}

impl TaskInterval {
    pub fn as_secs(&self) -> u64 {
        match self {
            TaskInterval::Hourly => 3_600,
            TaskInterval::TwiceDaily => 43_200,
            TaskInterval::Daily => 86_400,
        }
    }
}

/// A recurring task owned by one plugin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduledTask {
    /// Hook name the host fires when the task is due
    pub hook: String,

    /// Recurrence interval
    pub interval: TaskInterval,

    /// Next due time
    pub next_run: DateTime<Utc>,
}

impl ScheduledTask {
    /// A task first due one interval from now.
    pub fn recurring<S: Into<String>>(hook: S, interval: TaskInterval) -> Self {
        Self {
            hook: hook.into(),
            interval,
            next_run: Utc::now() + Duration::seconds(interval.as_secs() as i64),
        }
    }
}

/// Host seam for recurring task bookkeeping.
pub trait TaskScheduler: Send + Sync {
    /// Record a task for an owner. Rescheduling a hook the owner already
    /// has replaces the existing entry.
    fn schedule(&self, owner: &str, task: ScheduledTask) -> PluginResult<()>;

    /// Drop every task owned by `owner`, returning how many were cleared.
    fn clear_owner(&self, owner: &str) -> usize;

    /// Tasks currently recorded for an owner.
    fn tasks_for(&self, owner: &str) -> Vec<ScheduledTask>;
}

/// In-memory reference scheduler.
#[derive(Debug, Default)]
pub struct MemoryScheduler {
    tasks: Mutex<HashMap<String, Vec<ScheduledTask>>>,
}

impl MemoryScheduler {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TaskScheduler for MemoryScheduler {
    fn schedule(&self, owner: &str, task: ScheduledTask) -> PluginResult<()> {
        let mut tasks = self.tasks.lock();
        let owned = tasks.entry(owner.to_string()).or_default();
        owned.retain(|existing| existing.hook != task.hook);
        owned.push(task);
        Ok(())
    }

    fn clear_owner(&self, owner: &str) -> usize {
        self.tasks
            .lock()
            .remove(owner)
            .map(|owned| owned.len())
            .unwrap_or(0)
    }

    fn tasks_for(&self, owner: &str) -> Vec<ScheduledTask> {
        self.tasks
            .lock()
            .get(owner)
            .cloned()
            .unwrap_or_default()
    }
}
