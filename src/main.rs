use anyhow::Context;
use netcontrol::config::ConfigManager;
use netcontrol::data::JsonFileRunStore;
use netcontrol::engines::scheduling::Scheduler;
use std::path::PathBuf;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let config_path = std::env::args_os().nth(1).map(PathBuf::from);
    let manager = ConfigManager::new();
    manager
        .load(config_path.as_deref())
        .context("Failed to load configuration")?;
    let config = manager.get();

    let store = JsonFileRunStore::open(&config.scheduler.store_dir).with_context(|| {
        format!(
            "Failed to open run store at {}",
            config.scheduler.store_dir.display()
        )
    })?;
    log::info!("Run store: {}", store.dir().display());

    let mut scheduler = Scheduler::new(store, config.scheduler);
    scheduler.run().context("Scheduler failed")?;
    Ok(())
}
