//! topic2csv common types and errors.
//!
//! This crate provides foundational pieces shared across t2c-core modules:
//! - Unified error type with stable diagnostic codes
//! - Topic type name normalization (`pkg/Type` -> `pkg/msg/Type`)

pub mod error;
pub mod topic_type;

pub use error::{Error, Result};
pub use topic_type::normalize_topic_type;
