use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct ServerSettings {
    #[serde(default)]
    pub host: String,

    #[serde(default)]
    pub port: u16,

    #[serde(default)]
    pub log_directives: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        // 8000 is where the page data loader looks for the roster
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
            log_directives: "info,tower_http=info,axum=info,sqlx=warn".to_string(),
        }
    }
}
