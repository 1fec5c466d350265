pub mod binding;
pub mod bridge;
pub mod cli;
pub mod coordinator;
pub mod entity;
pub mod error;
pub mod event;
pub mod logging;
pub mod storage;
pub mod vault;
pub mod watch;
pub mod widget;

pub use coordinator::Coordinator;
pub use error::{Result, StickyError};
