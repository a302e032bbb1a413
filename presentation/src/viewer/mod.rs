//! Live conversation display.

mod live;

pub use live::{LiveView, LiveViewer};
