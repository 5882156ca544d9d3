//! Bounded fork/join fan-out for storage-unit tasks.
//!
//! The manager's `initialize`, `load_sv`, and `store_sv` each produce a list
//! of independent unit-sized tasks. In parallel mode those are spread over
//! the rayon worker pool (sized to the CPU count, never more workers than
//! tasks); the call joins before returning and every task runs exactly once.
//! Task errors do not abort siblings: they are collected and surfaced as a
//! single aggregated [`QocError::TaskFailure`].

use rayon::prelude::*;

use crate::error::{QocError, Result};

/// Applies a fallible function to every element of a task list.
#[derive(Debug, Clone, Copy, Default)]
pub struct ParallelExecutor;

impl ParallelExecutor {
    pub fn new() -> Self {
        Self
    }

    /// Runs `f` once per task on the worker pool and joins.
    ///
    /// # Arguments
    ///
    /// * `tasks` - Argument values, one per task
    /// * `f` - Task body; failures are collected, not short-circuited
    ///
    /// # Returns
    ///
    /// Ok(()) when every task succeeded, otherwise a single `TaskFailure`
    /// aggregating every task error message.
    pub fn execute<T, F>(&self, tasks: Vec<T>, f: F) -> Result<()>
    where
        T: Send,
        F: Fn(T) -> Result<()> + Sync,
    {
        let total = tasks.len();
        let messages: Vec<String> = tasks
            .into_par_iter()
            .filter_map(|task| f(task).err().map(|e| e.to_string()))
            .collect();

        if messages.is_empty() {
            Ok(())
        } else {
            Err(QocError::TaskFailure { total, messages })
        }
    }
}
