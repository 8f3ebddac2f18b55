//! Connectivity status collaborator.

use std::sync::atomic::{AtomicBool, Ordering};

/// Answers whether the remote store is worth contacting right now.
pub trait Connectivity: Send + Sync {
    fn is_online(&self) -> bool;
}

/// Host-driven connectivity flag.
#[derive(Debug)]
pub struct StaticConnectivity {
    online: AtomicBool,
}

impl StaticConnectivity {
    pub fn new(online: bool) -> Self {
        Self {
            online: AtomicBool::new(online),
        }
    }

    pub fn set_online(&self, online: bool) {
        self.online.store(online, Ordering::Relaxed);
    }
}

impl Connectivity for StaticConnectivity {
    fn is_online(&self) -> bool {
        self.online.load(Ordering::Relaxed)
    }
}
