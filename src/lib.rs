pub mod analysis;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod generator;
pub mod github;
pub mod retry;


// Re-export commonly used types
pub use analysis::{FileRecord, ProjectAnalyzer, ProjectData};
pub use config::Config;
pub use error::{AnalyzerError, GenerationError};
pub use generator::{GeneratedReadme, ReadmeGenerator};
pub use github::{GithubClient, Repository};
