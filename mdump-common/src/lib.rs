//! # MetaDump Common Library
//!
//! Shared code for the MetaDump annotation client:
//! - Event types (AnnotateEvent enum) and EventBus
//! - Configuration resolution
//! - Common error types

pub mod config;
pub mod error;
pub mod events;

pub use error::{Error, Result};
