//! Local git repository access.

pub mod branches;
pub mod remote;

pub use branches::GitBranchSource;
pub use remote::GitHubRepo;

/// Number of hex characters to show in abbreviated commit hashes.
pub const SHORT_HASH_LEN: usize = 8;
