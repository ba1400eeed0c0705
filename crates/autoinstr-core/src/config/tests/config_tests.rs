#![cfg(test)]

use crate::config::{AutoInstrumentConfig, BootstrapConfig, ConfigError, ConfigFormat};
use crate::plugin_system::exclusion::ExclusionSet;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::tempdir;

#[test]
fn test_format_from_path() {
    assert_eq!(ConfigFormat::from_path(Path::new("a.json")), Some(ConfigFormat::Json));
    assert_eq!(ConfigFormat::from_path(Path::new("a.JSON")), Some(ConfigFormat::Json));
    assert_eq!(ConfigFormat::from_path(Path::new("a.txt")), None);
    assert_eq!(ConfigFormat::from_path(Path::new("noext")), None);
    #[cfg(feature = "yaml-config")]
    assert_eq!(ConfigFormat::from_path(Path::new("a.yml")), Some(ConfigFormat::Yaml));
    #[cfg(feature = "toml-config")]
    assert_eq!(ConfigFormat::from_path(Path::new("a.toml")), Some(ConfigFormat::Toml));
}

#[test]
fn test_defaults() {
    let config = AutoInstrumentConfig::default();
    assert_eq!(config.exclusions(), ExclusionSet::none());
    assert_eq!(config.bootstrap.registry, None);
    assert_eq!(config.bootstrap.check_command, vec!["python3", "-m", "pip", "check"]);
    assert!(config.bootstrap.install_command.iter().any(|p| p == "{package}"));
}

#[test]
fn test_load_json_with_partial_fields() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("autoinstr.json");
    fs::write(
        &path,
        r#"{"disabled_instrumentations": "flask, requests", "bootstrap": {"registry": "libs.toml"}}"#,
    )
    .unwrap();

    let config = AutoInstrumentConfig::load(&path).unwrap();

    assert_eq!(config.exclusions(), ExclusionSet::from_names(["flask", "requests"]));
    assert_eq!(config.bootstrap.registry, Some(PathBuf::from("libs.toml")));
    // Unset keys keep their defaults
    assert_eq!(config.bootstrap.list_command, BootstrapConfig::default().list_command);
}

#[cfg(feature = "toml-config")]
#[test]
fn test_load_toml() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("autoinstr.toml");
    fs::write(
        &path,
        "distro = \"vendor\"\n\n[bootstrap]\ncheck_command = [\"true\"]\n",
    )
    .unwrap();

    let config = AutoInstrumentConfig::load(&path).unwrap();
    assert_eq!(config.distro.as_deref(), Some("vendor"));
    assert_eq!(config.bootstrap.check_command, vec!["true"]);
}

#[cfg(feature = "yaml-config")]
#[test]
fn test_load_yaml() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("autoinstr.yaml");
    fs::write(&path, "disabled_instrumentations: '*'\nconfigurator: custom\n").unwrap();

    let config = AutoInstrumentConfig::load(&path).unwrap();
    assert!(config.exclusions().is_all());
    assert_eq!(config.activation_settings().configurator.as_deref(), Some("custom"));
}

#[test]
fn test_load_errors() {
    let dir = tempdir().unwrap();

    let unknown = dir.path().join("autoinstr.ini");
    fs::write(&unknown, "x=1").unwrap();
    assert!(matches!(
        AutoInstrumentConfig::load(&unknown),
        Err(ConfigError::UnsupportedConfigFormat(_))
    ));

    let missing = dir.path().join("missing.json");
    assert!(matches!(AutoInstrumentConfig::load(&missing), Err(ConfigError::Io { .. })));

    let broken = dir.path().join("broken.json");
    fs::write(&broken, "{not json").unwrap();
    assert!(matches!(
        AutoInstrumentConfig::load(&broken),
        Err(ConfigError::DeserializationError { .. })
    ));
}

#[test]
fn test_overrides_replace_file_values() {
    let mut config = AutoInstrumentConfig {
        disabled_instrumentations: "flask".to_string(),
        distro: Some("file-distro".to_string()),
        configurator: Some("file-configurator".to_string()),
        ..Default::default()
    };
    let env: HashMap<&str, &str> = HashMap::from([
        ("AUTOINSTR_DISABLED_INSTRUMENTATIONS", "requests"),
        ("AUTOINSTR_DISTRO", "env-distro"),
        ("AUTOINSTR_CONFIGURATOR", ""),
    ]);

    config.apply_overrides(|key| env.get(key).map(|v| v.to_string()));

    let settings = config.activation_settings();
    assert_eq!(settings.excluded, ExclusionSet::from_names(["requests"]));
    assert_eq!(settings.distro.as_deref(), Some("env-distro"));
    assert_eq!(settings.configurator, None);
}

#[test]
fn test_overrides_absent_keep_file_values() {
    let mut config = AutoInstrumentConfig {
        distro: Some("file-distro".to_string()),
        ..Default::default()
    };
    config.apply_overrides(|_| None);
    assert_eq!(config.distro.as_deref(), Some("file-distro"));
}

#[test]
fn test_json_serialization_keeps_values() {
    let config = AutoInstrumentConfig {
        disabled_instrumentations: "*".to_string(),
        ..Default::default()
    };
    let text = ConfigFormat::Json.serialize(&config).unwrap();
    let back: AutoInstrumentConfig = ConfigFormat::Json.deserialize(&text).unwrap();
    assert_eq!(back, config);
}
