//! Task normalization and timeline layout for AI task allocation documents.
//!
//! Raw documents come from the persistence layer with loosely-typed scalars.
//! The engine flattens them into canonical [`types::Task`] records, derives
//! statistics, and lays tasks out on a navigable 14-day timeline.

pub mod config;
pub mod engine;
pub mod error;
pub mod normalize;
pub mod raw;
pub mod tasks;
pub mod timeline;
pub mod types;
pub mod util;

pub use engine::TaskEngine;
pub use error::EngineError;
