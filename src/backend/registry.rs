// Copyright 2026 Wallcheb Contributors
// SPDX-License-Identifier: Apache-2.0

//! Backend registry for managing execution backends.
//!
//! The registry provides discovery, registration, and lookup of backends.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, info, warn};

use super::r#trait::{BackendType, QuantumBackend};
use crate::config::ResourceLimits;
use crate::error::{BackendError, Error, Result};

/// Thread-safe backend registry.
pub struct BackendRegistry {
    backends: RwLock<HashMap<String, Arc<dyn QuantumBackend>>>,
    default_backend: RwLock<Option<String>>,
    limits: ResourceLimits,
}

impl BackendRegistry {
    /// Create a registry with specific resource limits.
    pub fn with_limits(limits: ResourceLimits) -> Self {
        Self {
            backends: RwLock::new(HashMap::new()),
            default_backend: RwLock::new(None),
            limits,
        }
    }

    /// Register a backend.
    ///
    /// A backend with the same name is replaced; the first registration
    /// becomes the default.
    pub fn register(&self, backend: Arc<dyn QuantumBackend>) {
        let name = backend.name().to_string();
        info!(backend = %name, "Registering backend");

        let mut backends = self.backends.write();
        backends.insert(name.clone(), backend);

        let mut default = self.default_backend.write();
        if default.is_none() {
            debug!(backend = %name, "Setting as default backend");
            *default = Some(name);
        }
    }

    /// Set the default backend.
    pub fn set_default(&self, name: &str) -> Result<()> {
        let backends = self.backends.read();
        if !backends.contains_key(name) {
            return Err(Error::Backend(BackendError::NotFound(name.to_string())));
        }

        let mut default = self.default_backend.write();
        *default = Some(name.to_string());
        info!(backend = %name, "Set as default backend");
        Ok(())
    }

    /// Get a backend by name.
    pub fn get(&self, name: &str) -> Result<Arc<dyn QuantumBackend>> {
        let backends = self.backends.read();
        backends
            .get(name)
            .cloned()
            .ok_or_else(|| Error::Backend(BackendError::NotFound(name.to_string())))
    }

    /// Get the default backend.
    pub fn get_default(&self) -> Result<Arc<dyn QuantumBackend>> {
        let default = self.default_backend.read();
        match default.as_ref() {
            Some(name) => self.get(name),
            None => Err(Error::Backend(BackendError::NotFound(
                "No default backend configured".to_string(),
            ))),
        }
    }

    /// List all registered backend names.
    pub fn list(&self) -> Vec<String> {
        let backends = self.backends.read();
        backends.keys().cloned().collect()
    }

    /// List all backends with their types.
    pub fn list_with_types(&self) -> Vec<(String, BackendType)> {
        let backends = self.backends.read();
        backends
            .iter()
            .map(|(name, backend)| (name.clone(), backend.backend_type()))
            .collect()
    }

    /// Check if a backend is registered.
    pub fn contains(&self, name: &str) -> bool {
        let backends = self.backends.read();
        backends.contains_key(name)
    }

    /// Number of registered backends.
    pub fn len(&self) -> usize {
        let backends = self.backends.read();
        backends.len()
    }

    /// Check if the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Unregister a backend.
    pub fn unregister(&self, name: &str) -> Option<Arc<dyn QuantumBackend>> {
        let mut backends = self.backends.write();
        let removed = backends.remove(name);

        if removed.is_some() {
            info!(backend = %name, "Unregistered backend");

            let mut default = self.default_backend.write();
            if default.as_deref() == Some(name) {
                warn!(backend = %name, "Unregistered default backend");
                *default = None;
            }
        }

        removed
    }

    /// Global resource limits.
    pub fn limits(&self) -> &ResourceLimits {
        &self.limits
    }

    /// Default backend name.
    pub fn default_backend_name(&self) -> Option<String> {
        self.default_backend.read().clone()
    }
}

impl Default for BackendRegistry {
    fn default() -> Self {
        Self::with_limits(ResourceLimits::default())
    }
}
