//! The `session` module drives telemetry generation.
//!
//! A generator loop ticks on a fixed interval and hands each reading to the
//! registry for fan-out. Depending on `StreamMode` there is either one loop
//! per connection, owned by that connection, or a single shared loop for the
//! whole process.

pub mod stream;

pub use stream::{run_generator_loop, spawn_shared_stream};
