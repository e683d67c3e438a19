pub mod auth;
pub mod client;
pub mod error;
mod graphql;
pub mod requests;
pub mod responses;

pub use auth::PersonalAccessToken;
pub use client::GhClient;
pub use error::Error;
