use crate::engines::scheduling::{Run, RunStatus};
use crate::error::{NetControlError, Result};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Closure applied to the stored copy of a run by [`RunStore::update_run`]
pub type RunUpdate<'a> = &'a mut dyn FnMut(&mut Run) -> Result<()>;

/// Durable record store the scheduler reads runs from and checkpoints to
pub trait RunStore: Send + Sync {
    /// Runs in the given status, oldest first
    fn list_runs_by_status(&self, status: RunStatus) -> Result<Vec<Run>>;

    /// Insert or replace a run
    fn save_run(&self, run: &Run) -> Result<()>;

    /// Latest persisted state of a run, `None` if it was deleted
    fn reload_run(&self, id: &str) -> Result<Option<Run>>;

    /// Read-modify-write of one run. `update` sees the latest stored state;
    /// if it fails nothing is written. Returns the saved run, `None` if the
    /// run does not exist.
    ///
    /// The default is a plain reload followed by a save. Stores shared with
    /// other writers must override it so no write lands in between.
    fn update_run(&self, id: &str, update: RunUpdate<'_>) -> Result<Option<Run>> {
        let Some(mut run) = self.reload_run(id)? else {
            return Ok(None);
        };
        update(&mut run)?;
        self.save_run(&run)?;
        Ok(Some(run))
    }

    /// Stop request from outside the scheduler. Returns whether the status
    /// changed.
    fn request_stop(&self, id: &str) -> Result<bool> {
        let mut changed = false;
        self.update_run(id, &mut |run| {
            changed = run.request_stop()?;
            Ok(())
        })?
        .ok_or_else(|| NetControlError::RunNotFound(id.to_string()))?;
        Ok(changed)
    }
}

impl<T: RunStore + ?Sized> RunStore for Arc<T> {
    fn list_runs_by_status(&self, status: RunStatus) -> Result<Vec<Run>> {
        (**self).list_runs_by_status(status)
    }

    fn save_run(&self, run: &Run) -> Result<()> {
        (**self).save_run(run)
    }

    fn reload_run(&self, id: &str) -> Result<Option<Run>> {
        (**self).reload_run(id)
    }

    fn update_run(&self, id: &str, update: RunUpdate<'_>) -> Result<Option<Run>> {
        (**self).update_run(id, update)
    }

    fn request_stop(&self, id: &str) -> Result<bool> {
        (**self).request_stop(id)
    }
}

/// Order runs the way they are claimed: creation time, then id
pub fn sort_by_submission(runs: &mut [Run]) {
    runs.sort_by(|a, b| {
        a.date_time_created
            .cmp(&b.date_time_created)
            .then_with(|| a.id.cmp(&b.id))
    });
}

/// Volatile store for embedding and tests
#[derive(Default)]
pub struct InMemoryRunStore {
    data: Mutex<HashMap<String, Run>>,
}

impl InMemoryRunStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.data.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn remove(&self, id: &str) -> Option<Run> {
        self.data
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(id)
    }
}

impl RunStore for InMemoryRunStore {
    fn list_runs_by_status(&self, status: RunStatus) -> Result<Vec<Run>> {
        let data = self.data.lock().unwrap_or_else(|e| e.into_inner());
        let mut runs: Vec<Run> = data
            .values()
            .filter(|run| run.status() == status)
            .cloned()
            .collect();
        sort_by_submission(&mut runs);
        Ok(runs)
    }

    fn save_run(&self, run: &Run) -> Result<()> {
        let mut data = self.data.lock().unwrap_or_else(|e| e.into_inner());
        data.insert(run.id.clone(), run.clone());
        Ok(())
    }

    fn reload_run(&self, id: &str) -> Result<Option<Run>> {
        let data = self.data.lock().unwrap_or_else(|e| e.into_inner());
        Ok(data.get(id).cloned())
    }

    fn update_run(&self, id: &str, update: RunUpdate<'_>) -> Result<Option<Run>> {
        let mut data = self.data.lock().unwrap_or_else(|e| e.into_inner());
        let Some(stored) = data.get(id) else {
            return Ok(None);
        };
        let mut run = stored.clone();
        update(&mut run)?;
        data.insert(id.to_string(), run.clone());
        Ok(Some(run))
    }
}
