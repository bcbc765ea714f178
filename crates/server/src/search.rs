//! Nextopia client lookups by id prefix.

use nebo_core::errors::{Backend, GatewayError};
use nebo_core::gateway::SearchGateway;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::{json, Value};

pub struct NextopiaGateway {
    client: Client,
    base_url: String,
    user: String,
    password: SecretString,
}

#[derive(Debug, Deserialize)]
struct ClientRecord {
    id: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    status: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ClientListing {
    Wrapped { clients: Vec<ClientRecord> },
    Bare(Vec<ClientRecord>),
}

impl ClientListing {
    fn into_records(self) -> Vec<ClientRecord> {
        match self {
            Self::Wrapped { clients } => clients,
            Self::Bare(clients) => clients,
        }
    }
}

impl NextopiaGateway {
    pub fn new(
        client: Client,
        base_url: impl Into<String>,
        user: impl Into<String>,
        password: SecretString,
    ) -> Self {
        Self { client, base_url: base_url.into(), user: user.into(), password }
    }
}

#[async_trait::async_trait]
impl SearchGateway for NextopiaGateway {
    async fn query(&self, text: &str) -> Result<Value, GatewayError> {
        let url = format!("{}/clients", self.base_url.trim_end_matches('/'));
        let response = self
            .client
            .get(&url)
            .basic_auth(&self.user, Some(self.password.expose_secret()))
            .query(&[("id_prefix", text.trim())])
            .send()
            .await
            .map_err(|error| GatewayError::Transport {
                backend: Backend::Nextopia,
                message: error.to_string(),
            })?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(GatewayError::Authentication {
                backend: Backend::Nextopia,
                message: status.to_string(),
            });
        }
        if !status.is_success() {
            return Err(GatewayError::Query {
                backend: Backend::Nextopia,
                message: status.to_string(),
            });
        }

        let listing: ClientListing = response.json().await.map_err(|error| GatewayError::Query {
            backend: Backend::Nextopia,
            message: format!("unreadable client listing: {error}"),
        })?;

        Ok(render_clients(text.trim(), listing.into_records()))
    }
}

fn render_clients(prefix: &str, records: Vec<ClientRecord>) -> Value {
    let matching: Vec<String> = records
        .into_iter()
        .filter(|record| record.id.starts_with(prefix))
        .map(|record| {
            let name = record.name.unwrap_or_else(|| "unnamed client".to_owned());
            match record.status {
                Some(status) if !status.is_empty() => format!("`{}` {name} ({status})", record.id),
                _ => format!("`{}` {name}", record.id),
            }
        })
        .collect();

    if matching.is_empty() {
        return json!({
            "response_type": "in_channel",
            "text": format!("no Nextopia clients with an id starting `{prefix}`"),
        });
    }

    json!({ "response_type": "in_channel", "text": matching.join("\n") })
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{render_clients, ClientListing};

    #[test]
    fn listing_accepts_wrapped_and_bare_arrays() {
        let wrapped: ClientListing =
            serde_json::from_value(json!({ "clients": [{ "id": "ab12" }] })).expect("wrapped");
        let bare: ClientListing =
            serde_json::from_value(json!([{ "id": "ab12", "name": "Acme" }])).expect("bare");

        assert_eq!(wrapped.into_records().len(), 1);
        assert_eq!(bare.into_records()[0].name.as_deref(), Some("Acme"));
    }

    #[test]
    fn only_prefix_matches_are_listed() {
        let listing: ClientListing = serde_json::from_value(json!([
            { "id": "ab12", "name": "Acme", "status": "live" },
            { "id": "zz99", "name": "Other" },
            { "id": "ab13" },
        ]))
        .expect("listing");

        let rendered = render_clients("ab", listing.into_records());

        assert_eq!(rendered["response_type"], "in_channel");
        assert_eq!(rendered["text"], "`ab12` Acme (live)\n`ab13` unnamed client");
    }

    #[test]
    fn no_matches_still_reply_with_text() {
        let rendered = render_clients("qq", Vec::new());
        assert_eq!(rendered["text"], "no Nextopia clients with an id starting `qq`");
    }
}
