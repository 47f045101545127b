pub mod file_cache;
pub mod gitee;

#[cfg(test)]
pub mod fakes;
