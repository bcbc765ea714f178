//! Salesforce-backed customer lookups.
//!
//! Each gateway logs in once through the SOAP partner endpoint (username plus
//! password and security token), then runs SOQL through the REST query API.

use nebo_core::errors::{Backend, GatewayError};
use nebo_core::gateway::{CrmGateway, PLATFORMS};
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::sync::OnceCell;
use tracing::debug;

const RESULT_LIMIT: usize = 50;
const ACCOUNT_FIELDS: &str = "Id, Name, Customer_Id__c, Platform__c, MRR__c";

#[derive(Debug, Clone)]
struct Session {
    session_id: String,
    instance_url: String,
}

pub struct SalesforceGateway {
    client: Client,
    login_url: String,
    user: String,
    password: SecretString,
    security_token: SecretString,
    api_version: String,
    session: OnceCell<Session>,
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    records: Vec<AccountRecord>,
}

#[derive(Debug, Deserialize)]
struct AccountRecord {
    #[serde(rename = "Id")]
    id: String,
    #[serde(rename = "Name")]
    name: String,
    #[serde(rename = "Customer_Id__c", default)]
    customer_id: Option<String>,
    #[serde(rename = "Platform__c", default)]
    platform: Option<String>,
    #[serde(rename = "MRR__c", default)]
    mrr: Option<f64>,
}

impl SalesforceGateway {
    pub fn new(
        client: Client,
        login_url: impl Into<String>,
        user: impl Into<String>,
        password: SecretString,
        security_token: SecretString,
        api_version: impl Into<String>,
    ) -> Self {
        Self {
            client,
            login_url: login_url.into(),
            user: user.into(),
            password,
            security_token,
            api_version: api_version.into(),
            session: OnceCell::new(),
        }
    }

    async fn session(&self) -> Result<&Session, GatewayError> {
        self.session.get_or_try_init(|| self.login()).await
    }

    async fn login(&self) -> Result<Session, GatewayError> {
        let version = self.api_version.trim_start_matches('v');
        let url = format!("{}/services/Soap/u/{version}", self.login_url.trim_end_matches('/'));
        let password =
            format!("{}{}", self.password.expose_secret(), self.security_token.expose_secret());
        let envelope = login_envelope(&self.user, &password);

        let response = self
            .client
            .post(&url)
            .header("Content-Type", "text/xml; charset=UTF-8")
            .header("SOAPAction", "login")
            .body(envelope)
            .send()
            .await
            .map_err(transport)?;
        let status = response.status();
        let body = response.text().await.map_err(transport)?;

        if !status.is_success() {
            let message = xml_element(&body, "faultstring").unwrap_or_else(|| status.to_string());
            return Err(GatewayError::Authentication { backend: Backend::Salesforce, message });
        }

        let (session_id, server_url) = parse_login_response(&body).map_err(|message| {
            GatewayError::Authentication { backend: Backend::Salesforce, message }
        })?;
        let server_url = server_url.unwrap_or_else(|| self.login_url.clone());

        debug!(event_name = "crm.salesforce.login", "salesforce session established");
        Ok(Session { session_id, instance_url: instance_root(&server_url) })
    }

    async fn run_query(&self, soql: &str) -> Result<Vec<AccountRecord>, GatewayError> {
        let session = self.session().await?;
        let url = format!("{}/services/data/{}/query", session.instance_url, self.api_version);

        let response = self
            .client
            .get(&url)
            .bearer_auth(&session.session_id)
            .query(&[("q", soql)])
            .send()
            .await
            .map_err(transport)?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(GatewayError::Query {
                backend: Backend::Salesforce,
                message: format!("{status}: {body}"),
            });
        }

        let payload: QueryResponse = response.json().await.map_err(|error| GatewayError::Query {
            backend: Backend::Salesforce,
            message: format!("unreadable query response: {error}"),
        })?;
        Ok(payload.records)
    }
}

#[async_trait::async_trait]
impl CrmGateway for SalesforceGateway {
    async fn query(&self, text: &str) -> Result<Value, GatewayError> {
        let records = self.run_query(&name_query(text)).await?;
        Ok(render_accounts(&records))
    }

    async fn query_by_id(&self, text: &str) -> Result<Value, GatewayError> {
        let records = self.run_query(&id_query(text)).await?;
        Ok(render_accounts(&records))
    }
}

/// Platform names select every customer on that platform by MRR; anything
/// else is a substring match on the account name.
pub fn name_query(text: &str) -> String {
    let needle = text.trim();
    if let Some(platform) = PLATFORMS.iter().find(|platform| platform.eq_ignore_ascii_case(needle))
    {
        return format!(
            "SELECT {ACCOUNT_FIELDS} FROM Account WHERE Platform__c = '{}' ORDER BY MRR__c DESC NULLS LAST LIMIT {RESULT_LIMIT}",
            escape_soql(platform)
        );
    }

    format!(
        "SELECT {ACCOUNT_FIELDS} FROM Account WHERE Name LIKE '%{}%' ORDER BY Name LIMIT {RESULT_LIMIT}",
        escape_soql_like(needle)
    )
}

pub fn id_query(text: &str) -> String {
    format!(
        "SELECT {ACCOUNT_FIELDS} FROM Account WHERE Customer_Id__c LIKE '{}%' ORDER BY Customer_Id__c LIMIT {RESULT_LIMIT}",
        escape_soql_like(text.trim())
    )
}

fn escape_soql(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '\\' => escaped.push_str("\\\\"),
            '\'' => escaped.push_str("\\'"),
            '"' => escaped.push_str("\\\""),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            '\t' => escaped.push_str("\\t"),
            other => escaped.push(other),
        }
    }
    escaped
}

fn escape_soql_like(value: &str) -> String {
    escape_soql(value).replace('%', "\\%").replace('_', "\\_")
}

fn render_accounts(records: &[AccountRecord]) -> Value {
    if records.is_empty() {
        return json!({ "response_type": "in_channel", "text": "no matching customers" });
    }

    let lines: Vec<String> = records
        .iter()
        .map(|record| {
            let mut line = format!("*{}*", record.name);
            if let Some(platform) = record.platform.as_deref().filter(|value| !value.is_empty()) {
                line.push_str(&format!(" ({platform})"));
            }
            let id = record.customer_id.as_deref().unwrap_or(record.id.as_str());
            line.push_str(&format!(" id `{id}`"));
            if let Some(mrr) = record.mrr {
                line.push_str(&format!(" MRR ${mrr:.2}"));
            }
            line
        })
        .collect();

    json!({ "response_type": "in_channel", "text": lines.join("\n") })
}

fn login_envelope(user: &str, password: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="utf-8"?>
<env:Envelope xmlns:xsd="http://www.w3.org/2001/XMLSchema" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance" xmlns:env="http://schemas.xmlsoap.org/soap/envelope/">
  <env:Body>
    <n1:login xmlns:n1="urn:partner.soap.sforce.com">
      <n1:username>{}</n1:username>
      <n1:password>{}</n1:password>
    </n1:login>
  </env:Body>
</env:Envelope>"#,
        escape_xml(user),
        escape_xml(password)
    )
}

/// Session id and server url, read only from inside `<loginResponse>` so a
/// fault detail can never be mistaken for a session.
fn parse_login_response(body: &str) -> Result<(String, Option<String>), String> {
    let Some(login) = xml_element(body, "loginResponse") else {
        return Err(xml_element(body, "faultstring")
            .unwrap_or_else(|| "login response was not a loginResponse".to_owned()));
    };
    let session_id = xml_element(&login, "sessionId")
        .filter(|value| !value.is_empty())
        .ok_or_else(|| "login response did not include a session id".to_owned())?;
    Ok((session_id, xml_element(&login, "serverUrl")))
}

fn escape_xml(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

fn xml_element(body: &str, name: &str) -> Option<String> {
    let open = format!("<{name}>");
    let close = format!("</{name}>");
    let start = body.find(&open)? + open.len();
    let end = body[start..].find(&close)? + start;
    Some(body[start..end].to_owned())
}

/// `https://na1.salesforce.com/services/Soap/u/52.0/00D...` → `https://na1.salesforce.com`
fn instance_root(server_url: &str) -> String {
    match server_url.find("/services/") {
        Some(index) => server_url[..index].to_owned(),
        None => server_url.trim_end_matches('/').to_owned(),
    }
}

fn transport(error: reqwest::Error) -> GatewayError {
    GatewayError::Transport { backend: Backend::Salesforce, message: error.to_string() }
}
