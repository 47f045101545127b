pub mod obs_meta;
pub mod ownership;
pub mod welcome;
