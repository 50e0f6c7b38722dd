//! # Record Store
//!
//! The persisted side of the annotation system: records and the repository
//! that holds them. This crate is the single source of truth for record
//! content and does not contain any annotation policy.
//!
//! ## Core Components
//!
//! - **record**: The `Record` unit with its two text buffers
//! - **store**: The `RecordStore` repository trait and an in-memory implementation

pub mod error;
pub mod record;
pub mod store;

pub use error::*;
pub use record::*;
pub use store::*;
