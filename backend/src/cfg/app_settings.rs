use std::{env, fs, path::Path};

use config::{ConfigError, File, FileFormat};
use serde::{Deserialize, Serialize};

use crate::cfg;

/// Environment variables and the settings keys they override.
///
/// Keys are listed explicitly because several of them contain underscores,
/// which a separator-based mapping would split into nested tables.
pub const ENV_OVERRIDES: [(&str, &str); 6] = [
    ("APP_SERVER_HOST", "server.host"),
    ("APP_SERVER_PORT", "server.port"),
    ("APP_SERVER_LOG_DIRECTIVES", "server.log_directives"),
    ("APP_DATABASE_URL", "database.url"),
    ("APP_DATABASE_MAX_CONNECTIONS", "database.max_connections"),
    ("APP_LOADER_SOURCE_URL", "loader.source_url"),
];

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct AppSettings {
    #[serde(default)]
    pub server: cfg::ServerSettings,

    #[serde(default)]
    pub database: cfg::DatabaseSettings,

    #[serde(default)]
    pub loader: cfg::LoaderSettings,
}

impl AppSettings {
    /// Settings for the running process: `.env`, the config files in the
    /// working directory and the `APP_*` environment.
    pub fn new() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::load(Self::get_config_path(), &Self::get_app_run_env(), |name| env::var(name).ok())
    }

    /// Builds the settings from, lowest priority first: compiled defaults,
    /// `configs.default.toml`, `configs.{app_run_env}.toml`,
    /// `configs.local.toml`, then the variables in [`ENV_OVERRIDES`] as
    /// resolved by `lookup_env`.
    ///
    /// In `production` a missing `configs.production.toml` is written out
    /// with the effective settings so it can be edited in place.
    pub fn load<F>(config_path: &Path, app_run_env: &str, lookup_env: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let default_toml = toml::to_string(&Self::default())
            .map_err(|e| ConfigError::Message(format!("Failed to serialize defaults: {e}")))?;
        let mut builder = config::Config::builder().add_source(File::from_str(&default_toml, FileFormat::Toml));

        let env_config_path = config_path.join(format!("configs.{app_run_env}.toml"));
        let env_config_exists = env_config_path.exists();
        for path in [
            config_path.join("configs.default.toml"),
            env_config_path.clone(),
            config_path.join("configs.local.toml"),
        ] {
            builder = builder.add_source(File::from(path).required(false));
        }

        for (name, key) in ENV_OVERRIDES {
            builder = builder.set_override_option(key, lookup_env(name))?;
        }

        let settings = builder.build()?.try_deserialize::<Self>()?;

        if app_run_env == "production" && !env_config_exists {
            let settings_str = toml::to_string(&settings)
                .map_err(|e| ConfigError::Message(format!("Failed to serialize config: {e}")))?;
            fs::write(&env_config_path, settings_str)
                .map_err(|e| ConfigError::Message(format!("Failed to write config file: {e}")))?;
            eprintln!("Created default config file at {}", env_config_path.to_string_lossy());
        }

        Ok(settings)
    }

    #[must_use]
    pub fn get_server_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    #[must_use]
    pub fn get_app_run_env() -> String {
        env::var("APP_RUN_ENV").unwrap_or_else(|_| "production".to_string())
    }

    #[must_use]
    pub fn get_config_path() -> &'static Path {
        Path::new(".")
    }

    #[must_use]
    pub fn get_config_full_path() -> String {
        let config_path = Self::get_config_path();
        config_path
            .canonicalize()
            .ok()
            .unwrap_or_else(|| config_path.to_path_buf())
            .to_string_lossy()
            .to_string()
    }
}
