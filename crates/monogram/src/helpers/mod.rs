//! Application-level helpers built on the core layer

pub mod counter;
pub mod lifecycle;

pub use counter::Counter;
pub use lifecycle::Timestamps;
