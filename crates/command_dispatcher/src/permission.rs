//! Camera permission check consulted before lifecycle commands

use std::sync::atomic::{AtomicBool, Ordering};

/// Host-provided permission check
pub trait PermissionGate: Send + Sync {
    fn camera_permission_granted(&self) -> bool;
}

/// Gate for hosts without a permission model
#[derive(Debug, Default, Clone, Copy)]
pub struct AlwaysGranted;

impl PermissionGate for AlwaysGranted {
    fn camera_permission_granted(&self) -> bool {
        true
    }
}

/// Gate backed by a flag the host flips when the user answers
#[derive(Debug)]
pub struct PermissionFlag(AtomicBool);

impl PermissionFlag {
    pub fn new(granted: bool) -> Self {
        Self(AtomicBool::new(granted))
    }

    pub fn set(&self, granted: bool) {
        self.0.store(granted, Ordering::SeqCst);
    }
}

impl PermissionGate for PermissionFlag {
    fn camera_permission_granted(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}
