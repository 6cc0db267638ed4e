// This module re-exports important pieces for convenience,
// so we can "use crate::config::*" easily.
pub mod logging;
pub mod namenode;
pub mod types;
pub mod web;

pub use logging::*;
pub use namenode::*;
pub use types::*;
pub use web::*;
