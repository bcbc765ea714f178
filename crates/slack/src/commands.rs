use std::collections::HashMap;

use chrono::Utc;
use nebo_core::config::CommandEnv;
use nebo_core::errors::{Backend, CommandError};
use nebo_core::gateway::GatewayFactory;
use secrecy::ExposeSecret;
use tracing::{debug, warn};

use crate::blocks::{self, Reply, FIRE_ACK};
use crate::fire::{fire_checklist, fire_down_text};
use crate::meet::meet_link;
use crate::notify::{feature_request_text, notify_logged, Notification, Notifier, NotifyTarget};
use crate::verify::verify_token;

/// The fields of a Slack slash-command POST this service relies on.
///
/// Missing fields read as empty strings so that the token check always runs
/// before anything else about the request is judged.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SlashCommandPayload {
    pub command: String,
    pub text: String,
    pub token: String,
    pub user_id: String,
    pub response_url: String,
}

impl SlashCommandPayload {
    pub fn from_form(form: &HashMap<String, String>) -> Self {
        let field = |name: &str| form.get(name).cloned().unwrap_or_default();

        Self {
            command: field("command").trim().to_owned(),
            text: field("text"),
            token: field("token"),
            user_id: field("user_id"),
            response_url: field("response_url"),
        }
    }
}

/// Inbound request body as handed over by the transport.
#[derive(Clone, Debug)]
pub enum InboundRequest {
    Form(HashMap<String, String>),
    Unreadable(String),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CommandKind {
    NameLookup,
    FireChecklist,
    FireDown,
    SearchIdLookup,
    CrmIdLookup,
    FeatureRequest,
    MeetLink,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HelpTrigger {
    BlankOrHelp,
    HelpOnly,
    Never,
}

impl HelpTrigger {
    pub fn matches(self, text: &str) -> bool {
        let text = text.trim();
        match self {
            Self::BlankOrHelp => text.is_empty() || text == "help",
            Self::HelpOnly => text == "help",
            Self::Never => false,
        }
    }
}

pub struct CommandSpec {
    pub kind: CommandKind,
    pub aliases: &'static [&'static str],
    pub backend: Option<Backend>,
    pub help_trigger: HelpTrigger,
    pub usage: Option<fn() -> Reply>,
}

impl CommandSpec {
    pub fn help_for(&self, text: &str) -> Option<Reply> {
        if !self.help_trigger.matches(text) {
            return None;
        }
        self.usage.map(|usage| usage())
    }
}

pub static COMMANDS: &[CommandSpec] = &[
    CommandSpec {
        kind: CommandKind::NameLookup,
        aliases: &["/rep", "/alpha-nebo", "/nebo"],
        backend: Some(Backend::Salesforce),
        help_trigger: HelpTrigger::BlankOrHelp,
        usage: Some(blocks::nebo_help),
    },
    CommandSpec {
        kind: CommandKind::FireChecklist,
        aliases: &["/fire", "/firetest"],
        backend: None,
        help_trigger: HelpTrigger::HelpOnly,
        usage: Some(blocks::fire_help),
    },
    CommandSpec {
        kind: CommandKind::FireDown,
        aliases: &["/firedown"],
        backend: None,
        help_trigger: HelpTrigger::Never,
        usage: None,
    },
    CommandSpec {
        kind: CommandKind::SearchIdLookup,
        aliases: &["/neboidnx", "/neboid"],
        backend: Some(Backend::Nextopia),
        help_trigger: HelpTrigger::BlankOrHelp,
        usage: Some(blocks::neboid_help),
    },
    CommandSpec {
        kind: CommandKind::CrmIdLookup,
        aliases: &["/neboidss"],
        backend: Some(Backend::Salesforce),
        help_trigger: HelpTrigger::BlankOrHelp,
        usage: Some(blocks::neboid_help),
    },
    CommandSpec {
        kind: CommandKind::FeatureRequest,
        aliases: &["/feature"],
        backend: None,
        help_trigger: HelpTrigger::BlankOrHelp,
        usage: Some(blocks::feature_help),
    },
    CommandSpec {
        kind: CommandKind::MeetLink,
        aliases: &["/meet", "/meettest"],
        backend: None,
        help_trigger: HelpTrigger::HelpOnly,
        usage: Some(blocks::meet_help),
    },
];

pub fn resolve_command(command: &str) -> Option<&'static CommandSpec> {
    COMMANDS.iter().find(|spec| spec.aliases.contains(&command))
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RequestStage {
    Received,
    ConfigChecked,
    Authenticated,
    BackendsBound,
    Dispatched,
    Replied,
}

impl RequestStage {
    fn as_str(&self) -> &'static str {
        match self {
            Self::Received => "received",
            Self::ConfigChecked => "config_checked",
            Self::Authenticated => "authenticated",
            Self::BackendsBound => "backends_bound",
            Self::Dispatched => "dispatched",
            Self::Replied => "replied",
        }
    }
}

#[derive(Clone, Debug)]
pub struct RouterSettings {
    pub feature_channel: String,
}

/// Validates a slash command and dispatches it to exactly one handler.
pub struct CommandRouter<G, N> {
    gateways: G,
    notifier: N,
    settings: RouterSettings,
}

impl<G, N> CommandRouter<G, N>
where
    G: GatewayFactory,
    N: Notifier,
{
    pub fn new(gateways: G, notifier: N, settings: RouterSettings) -> Self {
        Self { gateways, notifier, settings }
    }

    pub async fn handle(
        &self,
        env: &CommandEnv,
        request: InboundRequest,
        correlation_id: &str,
    ) -> Result<Reply, CommandError> {
        trace_stage(RequestStage::Received, correlation_id);

        let blanks = env.check()?;
        if !blanks.is_empty() {
            warn!(
                event_name = "nebo.config.blank_fields",
                correlation_id,
                blank_fields = %blanks.join(", "),
                "blank configuration tolerated in development mode"
            );
        }
        trace_stage(RequestStage::ConfigChecked, correlation_id);

        let payload = match request {
            InboundRequest::Form(form) => SlashCommandPayload::from_form(&form),
            InboundRequest::Unreadable(reason) => {
                return Err(CommandError::MalformedRequest(reason));
            }
        };

        if !verify_token(&payload.token, env.slack_verification_token.expose_secret()) {
            return Err(CommandError::Authentication);
        }
        trace_stage(RequestStage::Authenticated, correlation_id);

        if payload.command.is_empty() {
            return Err(CommandError::MalformedRequest("missing `command` field".to_owned()));
        }

        let spec = resolve_command(&payload.command)
            .ok_or_else(|| CommandError::UnknownCommand(payload.command.clone()))?;

        let reply = self.dispatch(spec, env, &payload, correlation_id).await?;
        trace_stage(RequestStage::Replied, correlation_id);
        Ok(reply)
    }

    async fn dispatch(
        &self,
        spec: &CommandSpec,
        env: &CommandEnv,
        payload: &SlashCommandPayload,
        correlation_id: &str,
    ) -> Result<Reply, CommandError> {
        if let Some(help) = spec.help_for(&payload.text) {
            return Ok(help);
        }

        if let Some(backend) = spec.backend {
            debug!(
                event_name = "nebo.command.backend_required",
                correlation_id,
                backend = backend.as_str(),
                "binding request-scoped gateway"
            );
        }

        let reply = match spec.kind {
            CommandKind::NameLookup => {
                let crm = self.gateways.crm(env);
                let gateway = crm.require(Backend::Salesforce)?;
                trace_stage(RequestStage::BackendsBound, correlation_id);
                Reply::from_lookup(gateway.query(&payload.text).await?)
            }
            CommandKind::CrmIdLookup => {
                let crm = self.gateways.crm(env);
                let gateway = crm.require(Backend::Salesforce)?;
                trace_stage(RequestStage::BackendsBound, correlation_id);
                Reply::from_lookup(gateway.query_by_id(&payload.text).await?)
            }
            CommandKind::SearchIdLookup => {
                let search = self.gateways.search(env);
                let gateway = search.require(Backend::Nextopia)?;
                trace_stage(RequestStage::BackendsBound, correlation_id);
                Reply::from_lookup(gateway.query(&payload.text).await?)
            }
            CommandKind::FireChecklist => {
                let checklist = fire_checklist(&env.gdrive_fire_doc_folder_id, Utc::now());
                let notification = Notification {
                    target: NotifyTarget::Callback { url: payload.response_url.clone() },
                    reply: Reply::in_channel(checklist),
                };
                notify_logged(&self.notifier, &notification, correlation_id).await;
                Reply::ephemeral(FIRE_ACK)
            }
            CommandKind::FireDown => Reply::in_channel(fire_down_text()),
            CommandKind::FeatureRequest => {
                let notification = Notification {
                    target: NotifyTarget::Channel {
                        channel_id: self.settings.feature_channel.clone(),
                        bot_token: env.slack_oauth_token.clone(),
                    },
                    reply: Reply::in_channel(feature_request_text(
                        &payload.user_id,
                        &payload.text,
                    )),
                };
                notify_logged(&self.notifier, &notification, correlation_id).await;
                blocks::feature_ack()
            }
            CommandKind::MeetLink => Reply::in_channel(meet_link(&payload.text)),
        };

        trace_stage(RequestStage::Dispatched, correlation_id);
        Ok(reply)
    }
}

fn trace_stage(stage: RequestStage, correlation_id: &str) {
    debug!(
        event_name = "nebo.command.stage",
        correlation_id,
        stage = stage.as_str(),
        "slash command advanced"
    );
}
