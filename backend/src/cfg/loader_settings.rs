use serde::{Deserialize, Serialize};

use crate::loader;

/// Where the `load` command reads page data from.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct LoaderSettings {
    #[serde(default = "default_source_url")]
    pub source_url: String,
}

fn default_source_url() -> String {
    loader::DEFAULT_SOURCE_URL.to_string()
}

impl Default for LoaderSettings {
    fn default() -> Self {
        Self {
            source_url: default_source_url(),
        }
    }
}
