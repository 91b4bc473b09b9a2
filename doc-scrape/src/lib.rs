pub mod backends;
pub mod cli;
pub mod hash_table;
pub mod load_config;
pub mod upload;

pub use cli::{run, Cli, Commands};
