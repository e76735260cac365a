//! Centralized error handling for m3u-curator
//!
//! # Error Categories
//!
//! - **Configuration Errors**: missing or malformed settings, raised before
//!   any network or file activity
//! - **Source Errors**: upstream playlist could not be fetched or decoded
//! - **Write Errors**: the curated playlist could not be stored
//!
//! # Usage
//!
//! ```rust
//! use m3u_curator::errors::{AppError, AppResult};
//!
//! fn example_function() -> AppResult<String> {
//!     Err(AppError::configuration("SOURCE_URL is not set"))
//! }
//! ```

pub mod types;

pub use types::*;

/// Convenience type alias for Results using AppError
pub type AppResult<T> = Result<T, AppError>;

/// Convenience type alias for Source Results
pub type SourceResult<T> = Result<T, SourceError>;
