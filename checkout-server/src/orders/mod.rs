//! Order lifecycle: the status machine, the return sub-machine, and the
//! controller that drives both.

mod lifecycle;
pub mod transitions;

pub use lifecycle::OrderLifecycle;
