//! Relay Runtime
//!
//! Boots logging and the global registry, then drives a simulated resource
//! host through the locator and event substrate.

mod host;
mod payload;

use anyhow::{Context as _, Result};
use host::ResourceManager;
use payload::Payload;
use relay_core::{Context, Instance, RegistryConfig};
use std::path::PathBuf;
use std::sync::Arc;

const SCRIPTS: &[(&str, &str)] = &[
    ("mapmanager", "print('mapmanager starting')"),
    ("spawnmanager", "print('spawnmanager starting')"),
    ("chat", "print('chat starting')"),
];

fn config_path() -> Option<PathBuf> {
    std::env::args_os()
        .nth(1)
        .or_else(|| std::env::var_os("RELAY_CONFIG"))
        .map(PathBuf::from)
}

fn load_config() -> Result<RegistryConfig> {
    match config_path() {
        Some(path) => RegistryConfig::load(&path)
            .with_context(|| format!("loading config from {}", path.display())),
        None => Ok(RegistryConfig::default()),
    }
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    tracing::info!("Relay v{}", relay_core::VERSION);
    let config = load_config()?;
    tracing::info!(registry = %config.name, capacity = config.capacity, "Configuring registry...");
    relay_core::init_global(config.clone())?;

    // Host side: publish the resource manager process-wide.
    ResourceManager::set(Box::leak(Box::new(ResourceManager::new())));

    // Consumer side: find the manager through the locator, not by reference.
    let mut services = Context::new(&config)?;
    services.provide(Arc::new(Payload::default()))?;
    payload::install(ResourceManager::get(), services.get::<Payload>());

    let manager = ResourceManager::get();
    for (name, source) in SCRIPTS {
        let resource = manager.create_resource(name);
        let script = manager.load_script(&resource, source);
        tracing::info!(resource = resource.name(), script = %script, "Loaded script");
    }

    let registry = relay_core::global_registry();
    for (id, name) in registry.entries() {
        let lookups = relay_core::read_instances().lookups(id);
        tracing::info!(%id, component = %name, lookups, "Registered component");
    }
    tracing::info!(
        resources = manager.resource_count(),
        components = registry.size(),
        "Runtime finished successfully"
    );

    Ok(())
}
