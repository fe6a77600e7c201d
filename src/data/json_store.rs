use super::store::{sort_by_submission, RunStore, RunUpdate};
use crate::engines::scheduling::{Run, RunStatus};
use crate::error::{NetControlError, Result};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// One pretty-printed JSON document per run, named `<id>.json`.
///
/// Saves write a temporary file, flush it to disk and rename it over the
/// previous document, so a crash or power loss leaves either the old or the
/// new checkpoint, never a truncated one. Writers in this process are
/// serialized, which makes [`RunStore::update_run`] atomic for every handle
/// sharing the store.
pub struct JsonFileRunStore {
    dir: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonFileRunStore {
    pub fn open<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        Ok(Self {
            dir,
            write_lock: Mutex::new(()),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, id: &str) -> Result<PathBuf> {
        if id.is_empty() || id.contains(['/', '\\']) || id.starts_with('.') {
            return Err(NetControlError::Storage(format!("Invalid run id: {:?}", id)));
        }
        Ok(self.dir.join(format!("{}.json", id)))
    }

    fn read_run(path: &Path) -> Result<Run> {
        let contents = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }

    fn read_existing(&self, id: &str) -> Result<Option<Run>> {
        let path = self.path_for(id)?;
        if !path.exists() {
            return Ok(None);
        }
        Self::read_run(&path).map(Some)
    }

    /// Callers hold `write_lock`
    fn write_run(&self, run: &Run) -> Result<()> {
        let path = self.path_for(&run.id)?;
        let tmp = path.with_extension("json.tmp");
        let json = serde_json::to_string_pretty(run)?;

        let mut file = File::create(&tmp)?;
        file.write_all(json.as_bytes())?;
        file.sync_all()?;
        drop(file);

        fs::rename(&tmp, &path)?;
        self.sync_dir()
    }

    // The rename is only durable once the directory entry is
    #[cfg(unix)]
    fn sync_dir(&self) -> Result<()> {
        File::open(&self.dir)?.sync_all()?;
        Ok(())
    }

    #[cfg(not(unix))]
    fn sync_dir(&self) -> Result<()> {
        Ok(())
    }
}

impl RunStore for JsonFileRunStore {
    fn list_runs_by_status(&self, status: RunStatus) -> Result<Vec<Run>> {
        let mut runs = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            match Self::read_run(&path) {
                Ok(run) if run.status() == status => runs.push(run),
                Ok(_) => {}
                Err(e) => log::error!("Skipping unreadable run file {}: {}", path.display(), e),
            }
        }
        sort_by_submission(&mut runs);
        Ok(runs)
    }

    fn save_run(&self, run: &Run) -> Result<()> {
        let _guard = self.write_lock.lock().unwrap_or_else(|e| e.into_inner());
        self.write_run(run)
    }

    fn reload_run(&self, id: &str) -> Result<Option<Run>> {
        self.read_existing(id)
    }

    fn update_run(&self, id: &str, update: RunUpdate<'_>) -> Result<Option<Run>> {
        let _guard = self.write_lock.lock().unwrap_or_else(|e| e.into_inner());
        let Some(mut run) = self.read_existing(id)? else {
            return Ok(None);
        };
        update(&mut run)?;
        if run.id != id {
            return Err(NetControlError::Storage(format!(
                "Update of run {} changed its id to {}",
                id, run.id
            )));
        }
        self.write_run(&run)?;
        Ok(Some(run))
    }
}
