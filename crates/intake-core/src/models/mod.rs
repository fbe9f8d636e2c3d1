//! Data models shared by the library and the CLI.

pub mod config;
pub mod fields;

pub use config::IntakeConfig;
pub use fields::{ExtractedFields, RequiredField};
