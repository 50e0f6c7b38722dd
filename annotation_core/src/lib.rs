//! # Annotation Core
//!
//! Files `#-- ... --#` annotations from narrative text into capacity-managed
//! roster records, and keeps one profile record per named person. Works
//! against any `record_store::RecordStore`.
//!
//! ## Core Components
//!
//! - **markers**: Span scanning, new-annotation extraction, stripping
//! - **classify**: Keyword-based category classification
//! - **roster**: Slot parsing, record location/allocation, capacity-checked writing
//! - **dedupe**: Duplicate line removal across roster records
//! - **profile**: Name extraction and profile records
//! - **sheet**: One-time roster and profile initialization from a sheet record
//! - **session**: Host hooks, persisted state, the session log
//!
//! ## Pipeline
//!
//! output text → markers → classify → locate → write → (profile) → dedupe → stripped text

pub mod classify;
pub mod commands;
pub mod config;
pub mod dedupe;
pub mod error;
pub mod markers;
pub mod profile;
pub mod roster;
pub mod session;
pub mod settings;
pub mod sheet;

pub use classify::*;
pub use config::*;
pub use dedupe::*;
pub use error::*;
pub use profile::*;
pub use roster::*;
pub use session::*;
pub use sheet::*;
