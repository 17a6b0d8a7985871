pub mod cli;
pub mod controller;
pub mod error;
pub mod render;
pub mod sort;
pub mod store;
pub mod types;
pub mod utils;
