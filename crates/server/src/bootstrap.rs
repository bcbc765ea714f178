use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use nebo_core::config::{AppConfig, CommandEnv, ConfigError, EnvSource, LoadOptions, ProcessEnv};
use nebo_core::gateway::{CrmGateway, GatewayFactory, GatewayHandle, SearchGateway};
use nebo_slack::commands::{CommandRouter, RouterSettings};
use nebo_slack::notify::{Notifier, SlackNotifier};
use reqwest::Client;
use thiserror::Error;
use tracing::info;

use crate::crm::SalesforceGateway;
use crate::health;
use crate::search::NextopiaGateway;
use crate::slash::{self, SlashState};

pub struct Application {
    pub config: AppConfig,
    pub router: Router,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("http client construction failed: {0}")]
    HttpClient(#[source] reqwest::Error),
}

/// Builds real backend gateways from whatever credentials the current request
/// sees. Nothing is cached between requests apart from the shared HTTP client.
#[derive(Clone)]
pub struct BackendGateways {
    client: Client,
    nextopia_base_url: String,
    salesforce_api_version: String,
}

impl BackendGateways {
    pub fn new(client: Client, config: &AppConfig) -> Self {
        Self {
            client,
            nextopia_base_url: config.backends.nextopia_base_url.clone(),
            salesforce_api_version: config.backends.salesforce_api_version.clone(),
        }
    }
}

impl GatewayFactory for BackendGateways {
    fn crm(&self, env: &CommandEnv) -> GatewayHandle<dyn CrmGateway> {
        use secrecy::ExposeSecret;

        GatewayHandle::from_credentials(
            &[
                env.sf_url.as_str(),
                env.sf_user.as_str(),
                env.sf_password.expose_secret(),
                env.sf_token.expose_secret(),
            ],
            || {
                Box::new(SalesforceGateway::new(
                    self.client.clone(),
                    env.sf_url.trim(),
                    env.sf_user.trim(),
                    env.sf_password.clone(),
                    env.sf_token.clone(),
                    self.salesforce_api_version.clone(),
                )) as Box<dyn CrmGateway>
            },
        )
    }

    fn search(&self, env: &CommandEnv) -> GatewayHandle<dyn SearchGateway> {
        use secrecy::ExposeSecret;

        GatewayHandle::from_credentials(
            &[env.nx_user.as_str(), env.nx_password.expose_secret()],
            || {
                Box::new(NextopiaGateway::new(
                    self.client.clone(),
                    self.nextopia_base_url.clone(),
                    env.nx_user.trim(),
                    env.nx_password.clone(),
                )) as Box<dyn SearchGateway>
            },
        )
    }
}

pub fn bootstrap(options: LoadOptions) -> Result<Application, BootstrapError> {
    let config = AppConfig::load(options)?;
    bootstrap_with_config(config)
}

pub fn bootstrap_with_config(config: AppConfig) -> Result<Application, BootstrapError> {
    bootstrap_with_env(config, Arc::new(ProcessEnv))
}

pub fn bootstrap_with_env(
    config: AppConfig,
    env_source: Arc<dyn EnvSource>,
) -> Result<Application, BootstrapError> {
    info!(
        event_name = "system.bootstrap.start",
        correlation_id = "bootstrap",
        "starting application bootstrap"
    );

    let client = Client::builder()
        .timeout(Duration::from_secs(config.server.request_timeout_secs))
        .build()
        .map_err(BootstrapError::HttpClient)?;

    let gateways: Arc<dyn GatewayFactory> = Arc::new(BackendGateways::new(client.clone(), &config));
    let notifier: Arc<dyn Notifier> =
        Arc::new(SlackNotifier::new(client, config.slack.api_base_url.clone()));
    let command_router = CommandRouter::new(
        gateways,
        notifier,
        RouterSettings { feature_channel: config.slack.feature_channel.clone() },
    );

    let router = slash::router(SlashState::new(command_router, env_source)).merge(health::router());

    info!(
        event_name = "system.bootstrap.ready",
        correlation_id = "bootstrap",
        feature_channel = %config.slack.feature_channel,
        "slash command routes assembled"
    );

    Ok(Application { config, router })
}
