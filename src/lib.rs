//! # linear-release
//!
//! Release glue that labels Linear issues with the version that shipped them.
//!
//! ## Features
//!
//! - Issue identifier extraction from branch names and commit messages
//! - Source branch resolution through GitHub pull requests or local git
//! - Version labels, optional release comments and dry runs
//!
//! ## Quick Start
//!
//! ```rust
//! use linear_release::issues::IssueMatcher;
//!
//! let ids = IssueMatcher::any_team().extract("feature/ENG-123-login");
//! assert!(ids.contains("ENG-123"));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod branches;
pub mod cli;
pub mod config;
pub mod error;
pub mod git;
pub mod github;
pub mod graphql;
pub mod issues;
pub mod linear;
pub mod release;
pub mod utils;

#[cfg(test)]
pub(crate) mod test_utils;

pub use crate::cli::Cli;
pub use crate::error::PluginError;

/// The current version of linear-release.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
