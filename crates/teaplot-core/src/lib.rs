//! teaplot Core
//!
//! Shared plumbing for the teaplot crates: logging, profiling, collection
//! aliases, window geometry and the viewer configuration file.

pub mod alloc;
pub mod config;
pub mod geometry;
pub mod logging;
pub mod profiling;
