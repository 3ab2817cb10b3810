pub mod config;
pub mod engine;
pub mod error;
pub mod loader;
pub mod normalize;
pub mod output;
pub mod presentation;
