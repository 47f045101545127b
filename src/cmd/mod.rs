pub mod config;
pub mod handle;
