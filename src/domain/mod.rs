pub mod change;
pub mod intercept;
pub mod item;
pub mod notification;
pub mod ownership;
pub mod tree;
