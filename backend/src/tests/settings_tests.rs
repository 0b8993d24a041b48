use std::collections::HashMap;
use std::fs;

use crate::cfg;
use crate::loader;

#[test]
fn test_default_settings_serve_where_the_loader_reads() {
    let settings = cfg::AppSettings::default();

    assert_eq!(settings.get_server_address(), "127.0.0.1:8000");
    assert_eq!(settings.loader.source_url, loader::DEFAULT_SOURCE_URL);
    assert_eq!(settings.database.url, "sqlite:students.sqlite");
}

#[test]
fn test_settings_defaults_survive_toml_round_trip() {
    let text = toml::to_string(&cfg::AppSettings::default()).unwrap();
    let parsed: cfg::AppSettings = toml::from_str(&text).unwrap();

    assert_eq!(parsed.server.port, 8000);
    assert_eq!(parsed.loader.source_url, loader::DEFAULT_SOURCE_URL);
}

#[test]
fn test_loader_section_defaults_when_missing() {
    let parsed: cfg::AppSettings = toml::from_str("[server]\nhost = \"0.0.0.0\"\nport = 9000\n").unwrap();

    assert_eq!(parsed.get_server_address(), "0.0.0.0:9000");
    assert_eq!(parsed.loader.source_url, loader::DEFAULT_SOURCE_URL);
}

fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let vars: HashMap<String, String> = pairs.iter().map(|(k, v)| ((*k).to_string(), (*v).to_string())).collect();
    move |name| vars.get(name).cloned()
}

#[test]
fn test_load_layers_files_then_environment() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("configs.default.toml"),
        "[server]\nhost = \"0.0.0.0\"\nport = 7000\n\n[database]\nmax_connections = 2\n",
    )
    .unwrap();
    fs::write(dir.path().join("configs.test.toml"), "[server]\nport = 7100\n\n[loader]\nsource_url = \"http://roster.test/\"\n").unwrap();
    fs::write(dir.path().join("configs.local.toml"), "[database]\nurl = \"sqlite:local.sqlite\"\n").unwrap();

    let settings = cfg::AppSettings::load(dir.path(), "test", env_from(&[])).unwrap();

    assert_eq!(settings.get_server_address(), "0.0.0.0:7100");
    assert_eq!(settings.database.max_connections, 2);
    assert_eq!(settings.database.url, "sqlite:local.sqlite");
    assert_eq!(settings.loader.source_url, "http://roster.test/");
}

#[test]
fn test_load_environment_overrides_keys_with_underscores() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("configs.test.toml"), "[loader]\nsource_url = \"http://roster.test/\"\n").unwrap();
    let env = env_from(&[
        ("APP_SERVER_PORT", "9001"),
        ("APP_LOADER_SOURCE_URL", "http://10.0.0.1:9/"),
        ("APP_DATABASE_MAX_CONNECTIONS", "9"),
        ("APP_SERVER_LOG_DIRECTIVES", "debug"),
    ]);

    let settings = cfg::AppSettings::load(dir.path(), "test", env).unwrap();

    assert_eq!(settings.server.port, 9001);
    assert_eq!(settings.loader.source_url, "http://10.0.0.1:9/");
    assert_eq!(settings.database.max_connections, 9);
    assert_eq!(settings.server.log_directives, "debug");
    assert_eq!(settings.server.host, "127.0.0.1");
}

#[test]
fn test_load_without_files_uses_defaults_and_writes_nothing_outside_production() {
    let dir = tempfile::tempdir().unwrap();

    let settings = cfg::AppSettings::load(dir.path(), "development", env_from(&[])).unwrap();

    assert_eq!(settings.get_server_address(), "127.0.0.1:8000");
    assert_eq!(settings.loader.source_url, loader::DEFAULT_SOURCE_URL);
    assert!(!dir.path().join("configs.development.toml").exists());
}

#[test]
fn test_load_in_production_writes_effective_settings_once() {
    let dir = tempfile::tempdir().unwrap();
    let written = dir.path().join("configs.production.toml");

    let settings =
        cfg::AppSettings::load(dir.path(), "production", env_from(&[("APP_SERVER_PORT", "8080")])).unwrap();
    assert_eq!(settings.server.port, 8080);
    assert!(written.exists());

    let reparsed: cfg::AppSettings = toml::from_str(&fs::read_to_string(&written).unwrap()).unwrap();
    assert_eq!(reparsed.server.port, 8080);

    fs::write(&written, "[server]\nport = 8200\n").unwrap();
    let reloaded = cfg::AppSettings::load(dir.path(), "production", env_from(&[])).unwrap();
    assert_eq!(reloaded.server.port, 8200);
    assert_eq!(fs::read_to_string(&written).unwrap(), "[server]\nport = 8200\n");
}

#[test]
fn test_load_rejects_invalid_override() {
    let dir = tempfile::tempdir().unwrap();

    let result = cfg::AppSettings::load(dir.path(), "test", env_from(&[("APP_SERVER_PORT", "not-a-port")]));

    assert!(result.is_err());
}
