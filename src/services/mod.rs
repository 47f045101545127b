pub mod file_cache;
pub mod forge;

pub use file_cache::{CacheBranch, CachedFile, FileCacheService};
pub use forge::{ForgeService, RepoContent, RepoLabel};
