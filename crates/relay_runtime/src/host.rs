//! Simulated resource host
//!
//! Stands in for the process that owns resources: it announces every new
//! resource through `on_init_instance` and runs each resource's load-time
//! pipeline over the script text before handing it on.

use relay_core::{declare_instance, Event, Pipeline, Subscriber};
use std::sync::{Arc, Mutex, PoisonError};

/// A loadable unit of script.
pub struct Resource {
    name: String,
    on_before_load_script: Pipeline<Vec<u8>>,
}

impl Resource {
    fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            on_before_load_script: Pipeline::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Stages that may rewrite the script bytes before they are loaded.
    pub fn on_before_load_script(&self) -> &Pipeline<Vec<u8>> {
        &self.on_before_load_script
    }
}

/// Owner of all resources in the host.
pub struct ResourceManager {
    on_init_instance: Event<Arc<Resource>>,
    resources: Mutex<Vec<Arc<Resource>>>,
}

declare_instance!(ResourceManager);

impl ResourceManager {
    pub fn new() -> Self {
        Self {
            on_init_instance: Event::new(),
            resources: Mutex::new(Vec::new()),
        }
    }

    /// Fired once per resource, right after it is created.
    pub fn on_init_instance(&self) -> Subscriber<'_, Arc<Resource>> {
        self.on_init_instance.subscriber()
    }

    pub fn create_resource(&self, name: &str) -> Arc<Resource> {
        let mut resource = Arc::new(Resource::new(name));
        let notified = self.on_init_instance.invoke(&mut resource);
        tracing::debug!(resource = name, notified, "resource initialized");

        self.resources
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Arc::clone(&resource));
        resource
    }

    /// Run the resource's load pipeline over `source` and return the final text.
    ///
    /// Invalid UTF-8 left behind by a stage is replaced with U+FFFD and
    /// reported as a warning.
    pub fn load_script(&self, resource: &Resource, source: &str) -> String {
        let mut buffer = source.as_bytes().to_vec();
        let stages = resource.on_before_load_script.run(&mut buffer);
        tracing::debug!(resource = resource.name(), stages, bytes = buffer.len(), "script loaded");
        match String::from_utf8(buffer) {
            Ok(script) => script,
            Err(err) => {
                tracing::warn!(
                    resource = resource.name(),
                    valid_up_to = err.utf8_error().valid_up_to(),
                    "load stages produced invalid UTF-8; replacing invalid bytes"
                );
                String::from_utf8_lossy(err.as_bytes()).into_owned()
            }
        }
    }

    pub fn resource_count(&self) -> usize {
        self.resources
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

impl Default for ResourceManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_subscribers_see_each_resource() {
        let manager = ResourceManager::new();
        let names = Arc::new(Mutex::new(Vec::new()));
        let seen = Arc::clone(&names);
        manager.on_init_instance().connect(move |resource| {
            seen.lock().unwrap().push(resource.name().to_string());
        });

        manager.create_resource("chat");
        manager.create_resource("spawnmanager");

        assert_eq!(*names.lock().unwrap(), vec!["chat", "spawnmanager"]);
        assert_eq!(manager.resource_count(), 2);
    }

    #[test]
    fn test_invalid_utf8_from_stage_is_replaced() {
        let manager = ResourceManager::new();
        let resource = manager.create_resource("broken");
        resource
            .on_before_load_script()
            .add_stage("garble", |script: &mut Vec<u8>| script.push(0xFF));

        assert_eq!(manager.load_script(&resource, "ok"), "ok\u{FFFD}");
    }

    #[test]
    fn test_load_without_stages_is_identity() {
        let manager = ResourceManager::new();
        let resource = manager.create_resource("plain");
        assert_eq!(manager.load_script(&resource, "print(1)"), "print(1)");
    }
}
