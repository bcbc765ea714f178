use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{rejection::FormRejection, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Form, Router,
};
use nebo_core::config::{CommandEnv, EnvSource};
use nebo_core::errors::CommandError;
use nebo_core::gateway::GatewayFactory;
use nebo_slack::commands::{CommandRouter, InboundRequest};
use nebo_slack::notify::Notifier;
use tracing::{error, info, warn};
use uuid::Uuid;

pub type SharedCommandRouter = CommandRouter<Arc<dyn GatewayFactory>, Arc<dyn Notifier>>;

#[derive(Clone)]
pub struct SlashState {
    router: Arc<SharedCommandRouter>,
    env_source: Arc<dyn EnvSource>,
}

impl SlashState {
    pub fn new(router: SharedCommandRouter, env_source: Arc<dyn EnvSource>) -> Self {
        Self { router: Arc::new(router), env_source }
    }
}

pub fn router(state: SlashState) -> Router {
    Router::new()
        .route("/", post(slash_command))
        .route("/api", post(slash_command))
        .with_state(state)
}

pub async fn slash_command(
    State(state): State<SlashState>,
    form: Result<Form<HashMap<String, String>>, FormRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4().to_string();
    let env = CommandEnv::load(state.env_source.as_ref());

    let request = match form {
        Ok(Form(fields)) => InboundRequest::Form(fields),
        Err(rejection) => InboundRequest::Unreadable(rejection.body_text()),
    };

    match state.router.handle(&env, request, &correlation_id).await {
        Ok(reply) => {
            info!(
                event_name = "nebo.command.replied",
                correlation_id = %correlation_id,
                response_type = reply.response_type.as_str(),
                "slash command answered"
            );
            ([(header::CONTENT_TYPE, "application/json")], reply.render()).into_response()
        }
        Err(command_error) => error_response(&command_error, &correlation_id),
    }
}

fn error_response(command_error: &CommandError, correlation_id: &str) -> Response {
    let status = StatusCode::from_u16(command_error.http_status())
        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    if status == StatusCode::UNAUTHORIZED {
        warn!(
            event_name = "nebo.command.rejected",
            correlation_id,
            error_kind = command_error.kind(),
            error = %command_error,
            "slash command failed verification"
        );
    } else {
        error!(
            event_name = "nebo.command.failed",
            correlation_id,
            error_kind = command_error.kind(),
            error = %command_error,
            "slash command failed"
        );
    }

    (status, [(header::CONTENT_TYPE, "text/plain; charset=utf-8")], format!("{command_error}\n"))
        .into_response()
}
