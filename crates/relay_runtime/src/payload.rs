//! Load-time script payload
//!
//! Attaches a pipeline stage to every resource the host creates. The stage
//! appends the configured code to the first script loaded and then stays
//! inert.

use crate::host::ResourceManager;
use relay_core::Subscription;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Code appended by the payload stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Payload {
    pub code: String,
}

impl Default for Payload {
    fn default() -> Self {
        Self {
            code: "\nprint('hello world')".to_string(),
        }
    }
}

/// Connect the payload to `manager`. Returns the init subscription.
pub fn install(manager: &ResourceManager, payload: Arc<Payload>) -> Subscription {
    let executed = Arc::new(AtomicBool::new(false));
    manager.on_init_instance().connect(move |resource| {
        let payload = Arc::clone(&payload);
        let executed = Arc::clone(&executed);
        tracing::debug!(resource = resource.name(), "attaching payload stage");
        resource
            .on_before_load_script()
            .add_stage("payload", move |script: &mut Vec<u8>| {
                if executed.swap(true, Ordering::SeqCst) {
                    return;
                }
                script.extend_from_slice(payload.code.as_bytes());
            });
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_appends_once() {
        let manager = ResourceManager::new();
        install(&manager, Arc::new(Payload::default()));

        let first = manager.create_resource("a");
        let second = manager.create_resource("b");

        assert_eq!(
            manager.load_script(&first, "x = 1"),
            "x = 1\nprint('hello world')"
        );
        assert_eq!(manager.load_script(&first, "x = 1"), "x = 1");
        assert_eq!(manager.load_script(&second, "y = 2"), "y = 2");
    }

    #[test]
    fn test_uninstalled_payload_leaves_scripts_alone() {
        let manager = ResourceManager::new();
        let subscription = install(
            &manager,
            Arc::new(Payload {
                code: "-- extra".to_string(),
            }),
        );
        assert!(manager.on_init_instance().disconnect(subscription));

        let resource = manager.create_resource("a");
        assert_eq!(manager.load_script(&resource, "body"), "body");
    }
}
