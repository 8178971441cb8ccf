pub mod backend_adapter;
pub mod engine;
pub mod entry;

pub use backend_adapter::BackendSelectorQuery;
pub use engine::ResolutionEngine;
pub use entry::{discovery_entry, target_entry};
