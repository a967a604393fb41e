use std::sync::Arc;

use crate::auth::{AuthError, IdentityProvider};
use crate::config::AppConfig;
use crate::database::Datastore;
use crate::services::TenantResolver;

/// Shared handles cloned into every request
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub datastore: Arc<dyn Datastore>,
    pub identity: Arc<IdentityProvider>,
}

impl AppState {
    pub fn new(config: AppConfig, datastore: Arc<dyn Datastore>) -> Result<Self, AuthError> {
        let identity = IdentityProvider::from_config(&config.security)?;
        Ok(Self {
            config: Arc::new(config),
            datastore,
            identity: Arc::new(identity),
        })
    }

    pub fn tenants(&self) -> TenantResolver<'_> {
        TenantResolver::new(self.datastore.as_ref())
    }
}
