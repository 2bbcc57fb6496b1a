//! # Command Dispatcher
//!
//! The command surface of the bridge.
//!
//! Maps a command name plus a JSON argument map onto a `SessionController`
//! operation and produces exactly one reply or error:
//! - Unknown names reply `NotImplemented`
//! - Each handler validates its own arguments before touching the session
//! - Platform-specific commands reply "not supported" on the other platform

pub mod arguments;
pub mod dispatcher;
pub mod keys;
pub mod method;
pub mod permission;
pub mod reply;

pub use arguments::Arguments;
pub use contracts::Platform;
pub use dispatcher::{CommandDispatcher, MethodCall};
pub use method::MethodName;
pub use permission::{AlwaysGranted, PermissionFlag, PermissionGate};
pub use reply::{CommandError, CommandReply};
