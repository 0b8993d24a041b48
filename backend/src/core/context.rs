use crate::cfg;
use crate::core;

pub type ArcContext = std::sync::Arc<Context>;

#[derive(Clone)]
pub struct Context {
    pub db: core::DbContext,
    pub settings: cfg::AppSettings,
}

impl Context {
    #[must_use]
    pub fn new(db: core::DbContext, settings: cfg::AppSettings) -> ArcContext {
        Self { db, settings }.into()
    }
}
