pub mod app;
pub mod config;
pub mod display;
pub mod drafts;
pub mod github;
pub mod types;

pub use app::{App, IssueSync, RepoFailure};
pub use github::{GhClient, PersonalAccessToken};
