//! mdump-rc - Annotation result orchestration client
//!
//! Tracks an asynchronous backend annotation job from submission to
//! completion, fans out dependent queries once the job finishes, assembles
//! a consistent per-segment view of derived metadata and drives a selective
//! export. See the service modules for the individual components; the
//! [`services::ResultsOrchestrator`] ties them together the way the results
//! page uses them.

pub mod error;
pub mod models;
pub mod services;

pub use crate::error::{FetchError, FetchResult, PageError};
