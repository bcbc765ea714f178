use nebo_core::gateway::PLATFORMS;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

pub const FEATURE_ACK: &str = "feature request submitted, we'll be in touch!";
pub const FIRE_ACK: &str = "fire checklist posted to the channel";
pub const NO_RESULTS: &str = "no results";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseType {
    Ephemeral,
    InChannel,
}

impl ResponseType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ephemeral => "ephemeral",
            Self::InChannel => "in_channel",
        }
    }
}

/// The message returned to Slack for a slash command.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reply {
    pub response_type: ResponseType,
    pub text: String,
}

impl Reply {
    pub fn ephemeral(text: impl Into<String>) -> Self {
        Self { response_type: ResponseType::Ephemeral, text: text.into() }
    }

    pub fn in_channel(text: impl Into<String>) -> Self {
        Self { response_type: ResponseType::InChannel, text: text.into() }
    }

    /// Wraps an opaque backend result. Values already shaped like a reply are
    /// passed through; anything else is posted in-channel as JSON.
    pub fn from_lookup(value: Value) -> Self {
        if let Ok(reply) = serde_json::from_value::<Reply>(value.clone()) {
            if reply.text.trim().is_empty() {
                return Self { text: NO_RESULTS.to_owned(), ..reply };
            }
            return reply;
        }

        match value {
            Value::Null => Self::in_channel(NO_RESULTS),
            Value::Array(ref items) if items.is_empty() => Self::in_channel(NO_RESULTS),
            Value::String(text) if text.trim().is_empty() => Self::in_channel(NO_RESULTS),
            Value::String(text) => Self::in_channel(text),
            other => Self::in_channel(
                serde_json::to_string_pretty(&other).unwrap_or_else(|_| other.to_string()),
            ),
        }
    }

    /// Wire payload: `{"response_type": ..., "text": ...}`.
    pub fn render(&self) -> Vec<u8> {
        json!({ "response_type": self.response_type.as_str(), "text": self.text })
            .to_string()
            .into_bytes()
    }
}

pub fn nebo_help() -> Reply {
    let platforms = PLATFORMS.join(", ").to_lowercase();
    Reply::ephemeral(format!(
        "Nebo usage:\n`/nebo shoes` - find all customers with shoe in the name\n`/nebo shopify` - show {{{platforms}}} clients sorted by MRR\n`/nebo help` - this message"
    ))
}

pub fn neboid_help() -> Reply {
    Reply::ephemeral(
        "Neboid usage:\n`/neboid <id prefix>` - find all customers with an id that starts with this prefix\n`/neboid help` - this message",
    )
}

pub fn fire_help() -> Reply {
    Reply::ephemeral("Fire usage:\n`/fire` - generate a fire checklist to handle the fire")
}

pub fn meet_help() -> Reply {
    Reply::ephemeral(
        "Meet usage:\n`/meet` - generate a random meet\n`/meet name` - generate a meet with a name\n`/meet help` - this message",
    )
}

pub fn feature_help() -> Reply {
    Reply::ephemeral(
        "Feature usage:\n`/feature description of feature required` - submits a feature to the product team\n`/feature help` - this message",
    )
}

pub fn feature_ack() -> Reply {
    Reply::ephemeral(FEATURE_ACK)
}

#[cfg(test)]
mod tests {
    use serde_json::{json, Value};

    use super::{nebo_help, Reply, ResponseType, NO_RESULTS};

    #[test]
    fn render_uses_slack_field_names() {
        let rendered = Reply::in_channel("g.co/meet/standup").render();
        let payload: Value = serde_json::from_slice(&rendered).expect("valid json");

        assert_eq!(payload, json!({ "response_type": "in_channel", "text": "g.co/meet/standup" }));
    }

    #[test]
    fn render_escapes_text() {
        let rendered = Reply::ephemeral("quote \" and\nnewline").render();
        let reply: Reply = serde_json::from_slice(&rendered).expect("round trip");

        assert_eq!(reply.response_type, ResponseType::Ephemeral);
        assert_eq!(reply.text, "quote \" and\nnewline");
    }

    #[test]
    fn reply_shaped_lookup_results_pass_through() {
        let reply = Reply::from_lookup(json!({
            "response_type": "ephemeral",
            "text": "*Acme Shoes* (Shopify) MRR 1200",
        }));

        assert_eq!(reply, Reply::ephemeral("*Acme Shoes* (Shopify) MRR 1200"));
    }

    #[test]
    fn empty_lookup_results_still_produce_text() {
        assert_eq!(Reply::from_lookup(Value::Null).text, NO_RESULTS);
        assert_eq!(Reply::from_lookup(json!([])).text, NO_RESULTS);
        assert_eq!(
            Reply::from_lookup(json!({ "response_type": "in_channel", "text": "" })).text,
            NO_RESULTS
        );
    }

    #[test]
    fn other_lookup_results_render_as_json() {
        let reply = Reply::from_lookup(json!([{ "id": "ab12", "name": "Acme" }]));

        assert_eq!(reply.response_type, ResponseType::InChannel);
        assert!(reply.text.contains("\"id\": \"ab12\""));
    }

    #[test]
    fn nebo_help_lists_platforms_in_lowercase() {
        let help = nebo_help();

        assert_eq!(help.response_type, ResponseType::Ephemeral);
        assert!(help.text.contains("show {shopify, bigcommerce, magento, miva, custom} clients"));
    }
}
