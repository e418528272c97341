//! Listen reconciliation library - shared modules for the CLI.

pub mod catalog;
pub mod confirm;
pub mod engine;
pub mod feed;
pub mod fuzzy;
pub mod models;
pub mod normalize;
pub mod progress;
pub mod report;
pub mod safety;
pub mod stats;
pub mod store;
pub mod window;
