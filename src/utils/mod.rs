//! Utility helpers: generational allocator, concurrent collection, logging.

pub mod allocator;
pub mod collector;
pub mod logging;

pub use allocator::{Arena, EntityId, GenerationalId};
pub use collector::ShardedCollector;
