//! Value types shared across the representation cache: timestamps, frames,
//! representable items and opaque actor bundles.

pub mod actors;
pub mod frame;
pub mod item;
pub mod time;

pub use actors::{ActorHandle, ActorSet, Actors};
pub use frame::{Frame, FrameClock, FrameRef, ViewState};
pub use item::{ItemId, ItemKind, ViewItem, ViewItemRef};
pub use time::{TimeRange, TimeStamp};
