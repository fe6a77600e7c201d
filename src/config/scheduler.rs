use super::traits::ConfigSection;
use crate::engines::network::ReachabilityMethod;
use crate::error::NetControlError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Wait between polls when no run is queued
    pub idle_delay_secs: u64,
    /// Wait before re-submitting a checkpoint that failed to save
    pub save_retry_delay_secs: u64,
    /// Directory of the JSON run store used by the host binary
    pub store_dir: PathBuf,
    pub reachability_method: ReachabilityMethod,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            idle_delay_secs: 30,
            save_retry_delay_secs: 5,
            store_dir: PathBuf::from("runs"),
            reachability_method: ReachabilityMethod::Frontier,
        }
    }
}

impl SchedulerConfig {
    pub fn idle_delay(&self) -> Duration {
        Duration::from_secs(self.idle_delay_secs)
    }

    pub fn save_retry_delay(&self) -> Duration {
        Duration::from_secs(self.save_retry_delay_secs)
    }
}

impl ConfigSection for SchedulerConfig {
    fn section_name() -> &'static str {
        "scheduler"
    }

    fn validate(&self) -> Result<(), NetControlError> {
        if self.idle_delay_secs == 0 {
            return Err(NetControlError::Configuration(
                "Idle delay must be at least one second".to_string(),
            ));
        }
        if self.store_dir.as_os_str().is_empty() {
            return Err(NetControlError::Configuration(
                "Store directory must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}
