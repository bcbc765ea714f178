//! Backend lookup capabilities used by the slash commands.
//!
//! Gateways are opaque to the router: they take the user's free text and hand
//! back a JSON value. Handles are built per request and never cached.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::config::CommandEnv;
use crate::errors::{Backend, CommandError, GatewayError};

/// Storefront platforms the CRM can filter customers by.
pub const PLATFORMS: &[&str] = &["Shopify", "BigCommerce", "Magento", "Miva", "Custom"];

#[async_trait]
pub trait CrmGateway: Send + Sync {
    /// Customers whose name contains the text.
    async fn query(&self, text: &str) -> Result<Value, GatewayError>;

    /// Customers whose identifier starts with the text.
    async fn query_by_id(&self, text: &str) -> Result<Value, GatewayError>;
}

#[async_trait]
pub trait SearchGateway: Send + Sync {
    async fn query(&self, text: &str) -> Result<Value, GatewayError>;
}

/// A request-scoped gateway, or the marker that its credentials were blank.
pub enum GatewayHandle<T: ?Sized> {
    Configured(Box<T>),
    NotConfigured,
}

impl<T: ?Sized> GatewayHandle<T> {
    /// Builds the gateway only when every credential is non-blank.
    pub fn from_credentials<F>(credentials: &[&str], build: F) -> Self
    where
        F: FnOnce() -> Box<T>,
    {
        if credentials.iter().any(|value| value.trim().is_empty()) {
            return Self::NotConfigured;
        }
        Self::Configured(build())
    }

    pub fn is_configured(&self) -> bool {
        matches!(self, Self::Configured(_))
    }

    pub fn require(&self, backend: Backend) -> Result<&T, CommandError> {
        match self {
            Self::Configured(gateway) => Ok(gateway.as_ref()),
            Self::NotConfigured => Err(CommandError::BackendUnavailable(backend)),
        }
    }
}

/// Constructs fresh gateway handles from the current request's configuration.
pub trait GatewayFactory: Send + Sync {
    fn crm(&self, env: &CommandEnv) -> GatewayHandle<dyn CrmGateway>;
    fn search(&self, env: &CommandEnv) -> GatewayHandle<dyn SearchGateway>;
}

impl<T> GatewayFactory for Arc<T>
where
    T: GatewayFactory + ?Sized,
{
    fn crm(&self, env: &CommandEnv) -> GatewayHandle<dyn CrmGateway> {
        (**self).crm(env)
    }

    fn search(&self, env: &CommandEnv) -> GatewayHandle<dyn SearchGateway> {
        (**self).search(env)
    }
}
