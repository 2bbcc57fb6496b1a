//! Sink implementations
//!
//! Contains ChannelSink, CallbackSink, and LogSink.

mod callback;
mod channel;
mod log;

pub use self::callback::CallbackSink;
pub use self::channel::{ChannelSink, EventStream};
pub use self::log::LogSink;
