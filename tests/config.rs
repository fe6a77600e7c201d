use netcontrol::config::{AppConfig, ConfigManager, ConfigSection, Parameters, SchedulerConfig};
use netcontrol::engines::network::ReachabilityMethod;
use std::path::PathBuf;

fn temp_file(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("netcontrol-{}-{}", std::process::id(), name))
}

#[test]
fn test_defaults_are_valid() {
    let config = AppConfig::default();
    assert!(config.validate().is_ok());

    let parameters = Parameters::default();
    assert_eq!(parameters.population_size, 80);
    assert_eq!(parameters.maximum_path_length, 5);
    assert_eq!(parameters.elite_count(), 20);
    assert_eq!(parameters.random_count(), 20);
    assert_eq!(parameters.crossover_count(), 40);

    assert_eq!(Parameters::section_name(), "parameters");
    assert_eq!(SchedulerConfig::section_name(), "scheduler");
}

fn assert_rejected(change: impl FnOnce(&mut Parameters)) {
    let mut parameters = Parameters::default();
    change(&mut parameters);
    let err = parameters.validate().unwrap_err();
    assert!(err.is_configuration(), "unexpected error {}", err);
}

#[test]
fn test_invalid_parameters_are_rejected() {
    assert_rejected(|p| p.population_size = 0);
    assert_rejected(|p| p.maximum_iterations = 0);
    assert_rejected(|p| p.maximum_iterations_without_improvement = 0);
    assert_rejected(|p| p.maximum_path_length = 0);
    assert_rejected(|p| p.percentage_elite = 1.5);
    assert_rejected(|p| p.percentage_random = -0.1);
    assert_rejected(|p| p.probability_mutation = 2.0);
    assert_rejected(|p| {
        p.percentage_elite = 0.6;
        p.percentage_random = 0.6;
    });
}

#[test]
fn test_scheduler_config_needs_idle_delay() {
    let config = SchedulerConfig {
        idle_delay_secs: 0,
        ..SchedulerConfig::default()
    };
    assert!(config.validate().is_err());
}

#[test]
fn test_load_from_toml_file() {
    let path = temp_file("load.toml");
    std::fs::write(
        &path,
        r#"
[scheduler]
idle_delay_secs = 2
store_dir = "/var/lib/netcontrol"
reachability_method = "matrix_powers"

[parameters]
population_size = 40
random_seed = 9
"#,
    )
    .unwrap();

    let manager = ConfigManager::new();
    manager.load_from_file(&path).unwrap();
    let _ = std::fs::remove_file(&path);

    let config = manager.get();
    assert_eq!(config.scheduler.idle_delay_secs, 2);
    assert_eq!(config.scheduler.save_retry_delay_secs, 5);
    assert_eq!(config.scheduler.store_dir, PathBuf::from("/var/lib/netcontrol"));
    assert_eq!(config.scheduler.reachability_method, ReachabilityMethod::MatrixPowers);
    assert_eq!(config.parameters.population_size, 40);
    assert_eq!(config.parameters.random_seed, 9);
    assert_eq!(config.parameters.maximum_iterations, 10000);
}

#[test]
fn test_invalid_file_is_rejected() {
    let path = temp_file("invalid.toml");
    std::fs::write(&path, "[parameters]\npercentage_elite = 3.0\n").unwrap();

    let manager = ConfigManager::new();
    assert!(manager.load_from_file(&path).is_err());
    let _ = std::fs::remove_file(&path);

    // The previous configuration is kept
    assert_eq!(manager.get(), AppConfig::default());
}

#[test]
fn test_save_and_reload() {
    let path = temp_file("saved.toml");
    let manager = ConfigManager::new();
    manager
        .update(|config| config.parameters.maximum_path_length = 3)
        .unwrap();
    manager.save_to_file(&path).unwrap();

    let reloaded = ConfigManager::new();
    reloaded.load_from_file(&path).unwrap();
    let _ = std::fs::remove_file(&path);
    assert_eq!(reloaded.get(), manager.get());
}

#[test]
fn test_update_rejects_invalid_values() {
    let manager = ConfigManager::new();
    let result = manager.update(|config| config.parameters.population_size = 0);
    assert!(result.is_err());
    assert_eq!(manager.get().parameters.population_size, 80);

    manager
        .update(|config| config.scheduler.idle_delay_secs = 5)
        .unwrap();
    assert_eq!(manager.get().scheduler.idle_delay_secs, 5);
}
