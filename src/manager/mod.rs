//! Per-view representation managers.

pub mod representation_manager;
pub mod status;

pub use representation_manager::{RepresentationManager, ViewId};
pub use status::{ManagerFlags, ManagerStatus};
