//! # Error Types
//!
//! This module defines the error type shared by the search engine and its
//! collaborators. Soft terminations of the search (time limit reached, known
//! optimum hit) are not errors; only configuration problems, broken tours and
//! failures of collaborators such as the tour writer end up here.
//!
//! ## Examples
//!
//! Using the `Result` type:
//!
//! ```rust
//! use lkrun::error::{SearchError, Result};
//!
//! fn some_function() -> Result<()> {
//!     Ok(())
//! }
//!
//! fn caller() {
//!     match some_function() {
//!         Ok(_) => println!("Success!"),
//!         Err(e) => println!("Error: {}", e),
//!     }
//! }
//! ```
//!
//! Using the `ResultExt` trait to add context to errors:
//!
//! ```rust
//! use lkrun::error::{Result, ResultExt};
//! use std::fs::File;
//!
//! fn open_tour_file(path: &str) -> Result<()> {
//!     File::open(path).context("Failed to open tour file")?;
//!     Ok(())
//! }
//! ```
//!
//! Using the `OptionExt` trait to convert `Option` to `Result`:
//!
//! ```rust
//! use lkrun::error::{SearchError, OptionExt};
//!
//! fn best_fitness(fitness: &[i64]) -> lkrun::error::Result<i64> {
//!     fitness.first().copied().ok_or_else_search(|| SearchError::EmptyArchive)
//! }
//! ```

use std::error::Error as StdError;
use std::fmt;
use thiserror::Error;

/// Represents errors that can occur while setting up or running a search.
#[derive(Error, Debug)]
pub enum SearchError {
    /// Error that occurs when an invalid configuration is provided.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Error that occurs when the successor chain is not a single Hamiltonian cycle.
    #[error("Invalid tour: {0}")]
    InvalidTour(String),

    /// Error that occurs when an operation needs at least one archived tour.
    #[error("Empty archive error: Cannot operate on an empty tour archive")]
    EmptyArchive,

    /// Error that occurs when an I/O operation fails.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A generic error with a custom message.
    #[error("{0}")]
    Other(String),
}

/// A specialized Result type for search operations.
pub type Result<T> = std::result::Result<T, SearchError>;

/// Extension trait for Result to add context to errors.
///
/// ## Examples
///
/// ```rust
/// use lkrun::error::ResultExt;
/// use std::fs::File;
///
/// fn read_file(path: &str) -> lkrun::error::Result<()> {
///     File::open(path).context("Failed to open file")?;
///     Ok(())
/// }
/// ```
pub trait ResultExt<T, E> {
    /// Converts the error to a `SearchError::Other` prefixed with `context`.
    fn context<C>(self, context: C) -> Result<T>
    where
        C: fmt::Display + Send + Sync + 'static;
}

impl<T, E> ResultExt<T, E> for std::result::Result<T, E>
where
    E: StdError + Send + Sync + 'static,
{
    fn context<C>(self, context: C) -> Result<T>
    where
        C: fmt::Display + Send + Sync + 'static,
    {
        self.map_err(|e| SearchError::Other(format!("{}: {}", context, e)))
    }
}

/// Extension trait for Option to convert to Result with a custom error.
pub trait OptionExt<T> {
    /// Converts an `Option<T>` to a `Result<T>` using a closure to build the error.
    fn ok_or_else_search<F>(self, err_fn: F) -> Result<T>
    where
        F: FnOnce() -> SearchError;
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_else_search<F>(self, err_fn: F) -> Result<T>
    where
        F: FnOnce() -> SearchError,
    {
        self.ok_or_else(err_fn)
    }
}
