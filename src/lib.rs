pub mod app;
pub mod cards;
pub mod cli;
pub mod config;
pub mod display;
pub mod drill;
pub mod error;
pub mod export;
pub mod presets;
pub mod ranges;
pub mod recall;
pub mod saved;
pub mod session;
pub mod storage;
