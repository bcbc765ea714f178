pub mod config;
pub mod errors;
pub mod gateway;

pub use config::{AppConfig, CommandEnv, EnvSource, ProcessEnv};
pub use errors::{Backend, CommandError, GatewayError};
pub use gateway::{CrmGateway, GatewayFactory, GatewayHandle, SearchGateway};
