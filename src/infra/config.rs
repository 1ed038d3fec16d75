use std::path::PathBuf;

use env_helpers::{get_env, get_env_default};
use secrecy::SecretString;
use url::Url;

use crate::{
    adapters::{action_network::ACTION_NETWORK_API_BASE, slack::SLACK_APP_ORIGIN},
    app_error::{AppError, AppResult},
    infra::scheduler::WeeklySchedule,
    use_cases::roster::DEFAULT_ROSTER_SUBJECT,
};

pub struct AppConfig {
    pub google_client_id: String,
    pub google_client_secret: SecretString,
    pub google_refresh_token: SecretString,
    /// Used until the first refresh. Leave unset to refresh on the first call.
    pub google_access_token: Option<SecretString>,
    /// Subject line of the weekly roster export email.
    pub roster_subject: String,
    pub action_network_api_token: SecretString,
    pub action_network_api_base: String,
    /// Built from `SLACK_WORKSPACE`, e.g. `team.slack.com` becomes `https://team.slack.com/`.
    pub slack_workspace_origin: Url,
    pub slack_username: String,
    pub slack_password: SecretString,
    pub slack_app_origin: Url,
    pub schedule: WeeklySchedule,
    /// Optional file for the JSON log layer.
    pub log_file: Option<PathBuf>,
}

impl AppConfig {
    pub fn from_env() -> AppResult<Self> {
        let google_client_id: String = get_env("GOOGLE_CLIENT_ID");
        let google_client_secret = SecretString::new(get_env::<String>("GOOGLE_CLIENT_SECRET").into());
        let google_refresh_token = SecretString::new(get_env::<String>("GOOGLE_REFRESH_TOKEN").into());
        let google_access_token =
            optional_env("GOOGLE_ACCESS_TOKEN").map(|token| SecretString::new(token.into()));
        let roster_subject: String =
            get_env_default("ROSTER_SUBJECT", DEFAULT_ROSTER_SUBJECT.to_string());

        let action_network_api_token =
            SecretString::new(get_env::<String>("ACTION_NETWORK_API_TOKEN").into());
        let action_network_api_base: String =
            get_env_default("ACTION_NETWORK_API_BASE", ACTION_NETWORK_API_BASE.to_string());

        let slack_workspace_origin = workspace_origin(&get_env::<String>("SLACK_WORKSPACE"))?;
        let slack_username: String = get_env("SLACK_USERNAME");
        let slack_password = SecretString::new(get_env::<String>("SLACK_PASSWORD").into());
        let slack_app_origin = parse_url(
            "SLACK_APP_ORIGIN",
            &get_env_default("SLACK_APP_ORIGIN", SLACK_APP_ORIGIN.to_string()),
        )?;

        let schedule = WeeklySchedule::parse(
            &get_env_default("SYNC_WEEKDAY", "Tue".to_string()),
            &get_env_default("SYNC_TIME", "09:00".to_string()),
        )?;
        let log_file = optional_env("LOG_FILE").map(PathBuf::from);

        Ok(Self {
            google_client_id,
            google_client_secret,
            google_refresh_token,
            google_access_token,
            roster_subject,
            action_network_api_token,
            action_network_api_base,
            slack_workspace_origin,
            slack_username,
            slack_password,
            slack_app_origin,
            schedule,
            log_file,
        })
    }
}

fn optional_env(key: &'static str) -> Option<String> {
    Some(get_env_default(key, String::new())).filter(|value| !value.trim().is_empty())
}

fn parse_url(key: &str, value: &str) -> AppResult<Url> {
    Url::parse(value).map_err(|e| AppError::Config(format!("{key} is not a valid URL: {e}")))
}

/// Accepts a bare host (`team.slack.com`) or a full origin.
fn workspace_origin(workspace: &str) -> AppResult<Url> {
    let workspace = workspace.trim().trim_end_matches('/');
    if workspace.contains("://") {
        parse_url("SLACK_WORKSPACE", workspace)
    } else {
        parse_url("SLACK_WORKSPACE", &format!("https://{workspace}"))
    }
}
