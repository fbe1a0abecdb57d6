pub mod config;
pub mod instrument;
