pub mod engine;

pub use engine::{Registry, SharedRegistry, lock};
