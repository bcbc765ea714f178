use nebo_core::config::{blank_fields_message, AppConfig, CommandEnv, EnvSource, LoadOptions};
use secrecy::ExposeSecret;
use serde::Serialize;

use super::CommandResult;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum CheckStatus {
    Pass,
    Fail,
    Skipped,
}

#[derive(Debug, Serialize)]
struct DoctorCheck {
    name: &'static str,
    status: CheckStatus,
    details: String,
}

#[derive(Debug, Serialize)]
struct DoctorReport {
    overall_status: CheckStatus,
    summary: String,
    development_mode: bool,
    checks: Vec<DoctorCheck>,
}

pub fn run(json_output: bool, env: &dyn EnvSource) -> CommandResult {
    let report = build_report(env);
    let exit_code = if report.overall_status == CheckStatus::Pass { 0 } else { 1 };

    let output = if json_output {
        serde_json::to_string_pretty(&report).unwrap_or_else(|error| {
            format!(
                "{{\"overall_status\":\"fail\",\"summary\":\"doctor serialization failed\",\"error\":\"{}\"}}",
                escape_json(&error.to_string())
            )
        })
    } else {
        render_human(&report)
    };

    CommandResult { exit_code, output }
}

fn build_report(env: &dyn EnvSource) -> DoctorReport {
    let mut checks = Vec::new();

    match AppConfig::load(LoadOptions::default()) {
        Ok(config) => checks.push(DoctorCheck {
            name: "config_validation",
            status: CheckStatus::Pass,
            details: format!(
                "configuration loaded; listening on {}:{}",
                config.server.bind_address, config.server.port
            ),
        }),
        Err(error) => checks.push(DoctorCheck {
            name: "config_validation",
            status: CheckStatus::Fail,
            details: error.to_string(),
        }),
    }

    let command_env = CommandEnv::load(env);
    let development_mode = command_env.is_development();
    checks.push(check_command_env(&command_env));
    checks.push(check_credentials(
        "salesforce_credentials",
        &[
            command_env.sf_url.as_str(),
            command_env.sf_user.as_str(),
            command_env.sf_password.expose_secret(),
            command_env.sf_token.expose_secret(),
        ],
        development_mode,
    ));
    checks.push(check_credentials(
        "nextopia_credentials",
        &[command_env.nx_user.as_str(), command_env.nx_password.expose_secret()],
        development_mode,
    ));

    let all_pass = checks.iter().all(|check| check.status != CheckStatus::Fail);
    let overall_status = if all_pass { CheckStatus::Pass } else { CheckStatus::Fail };
    let summary = if all_pass {
        "doctor: all readiness checks passed".to_string()
    } else {
        "doctor: one or more readiness checks failed".to_string()
    };

    DoctorReport { overall_status, summary, development_mode, checks }
}

fn check_command_env(env: &CommandEnv) -> DoctorCheck {
    let blanks = env.blank_fields();
    if blanks.is_empty() {
        return DoctorCheck {
            name: "command_env",
            status: CheckStatus::Pass,
            details: "all slash-command settings are present".to_string(),
        };
    }

    if env.is_development() {
        return DoctorCheck {
            name: "command_env",
            status: CheckStatus::Pass,
            details: format!("development mode tolerates blanks: {}", blanks.join(", ")),
        };
    }

    DoctorCheck { name: "command_env", status: CheckStatus::Fail, details: blank_fields_message(&blanks) }
}

fn check_credentials(
    name: &'static str,
    credentials: &[&str],
    development_mode: bool,
) -> DoctorCheck {
    if credentials.iter().all(|value| !value.trim().is_empty()) {
        return DoctorCheck { name, status: CheckStatus::Pass, details: "credentials present".to_string() };
    }

    if development_mode {
        return DoctorCheck {
            name,
            status: CheckStatus::Skipped,
            details: "incomplete credentials; lookups against this backend will fail".to_string(),
        };
    }

    DoctorCheck { name, status: CheckStatus::Fail, details: "incomplete credentials".to_string() }
}

fn render_human(report: &DoctorReport) -> String {
    let mut lines = Vec::new();
    lines.push(report.summary.clone());

    for check in &report.checks {
        let marker = match check.status {
            CheckStatus::Pass => "ok",
            CheckStatus::Fail => "fail",
            CheckStatus::Skipped => "skip",
        };
        lines.push(format!("- [{marker}] {}: {}", check.name, check.details));
    }

    lines.join("\n")
}

fn escape_json(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}
