//! Registry backed by a fixed name -> base URL table.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;

use super::{RegistryError, RegistryResult, ServiceRegistry};

/// In-process registry. Registrations made at runtime are kept in memory.
#[derive(Debug, Default)]
pub struct StaticRegistry {
    services: RwLock<HashMap<String, String>>,
    // service id -> service name
    registrations: RwLock<HashMap<String, String>>,
}

impl StaticRegistry {
    pub fn new(services: HashMap<String, String>) -> Self {
        Self {
            services: RwLock::new(services),
            registrations: RwLock::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl ServiceRegistry for StaticRegistry {
    async fn register(
        &self,
        name: &str,
        address: &str,
        port: u16,
        _health_check_path: &str,
    ) -> RegistryResult<String> {
        let id = format!("{name}-{address}");
        let url = format!("http://{address}:{port}");

        self.services
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(name.to_string(), url);
        self.registrations
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id.clone(), name.to_string());

        Ok(id)
    }

    async fn deregister(&self, service_id: &str) -> RegistryResult<()> {
        let name = self
            .registrations
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(service_id);

        if let Some(name) = name {
            self.services
                .write()
                .unwrap_or_else(PoisonError::into_inner)
                .remove(&name);
        }
        Ok(())
    }

    async fn resolve(&self, name: &str) -> RegistryResult<String> {
        self.services
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
            .ok_or_else(|| RegistryError::NoHealthyInstance(name.to_string()))
    }
}
