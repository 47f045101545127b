use std::sync::Arc;

use crate::services::{FileCacheService, ForgeService};

/// Platform key the file cache indexes forge branches under.
pub const DEFAULT_PLATFORM: &str = "gitee";

#[derive(Clone)]
pub struct AppContext {
    pub platform: String,
    pub forge: Arc<dyn ForgeService>,
    pub file_cache: Arc<dyn FileCacheService>,
}

impl AppContext {
    pub fn new(forge: Arc<dyn ForgeService>, file_cache: Arc<dyn FileCacheService>) -> Self {
        Self {
            platform: DEFAULT_PLATFORM.to_string(),
            forge,
            file_cache,
        }
    }
}
