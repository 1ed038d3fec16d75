use crate::{
    adapters::{
        action_network::ActionNetworkClient,
        gmail::{GmailCredentials, GmailMailbox},
        slack::SlackWebClient,
    },
    infra::{
        config::AppConfig,
        http_client::{try_build_client, try_build_no_redirect_client},
    },
    use_cases::{
        contact_upload::{ContactApi, ContactUploader},
        invite::{InviteClient, WorkspaceCredentials, WorkspaceWeb},
        member_sync::MemberSync,
        roster::{Mailbox, RosterFetcher},
    },
};
use std::fs::File;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

pub fn init_member_sync(config: &AppConfig) -> anyhow::Result<MemberSync> {
    let client = try_build_client()?;

    let mailbox = Arc::new(GmailMailbox::new(
        client.clone(),
        GmailCredentials {
            client_id: config.google_client_id.clone(),
            client_secret: config.google_client_secret.clone(),
            refresh_token: config.google_refresh_token.clone(),
            access_token: config.google_access_token.clone(),
        },
    ));

    let contacts = Arc::new(ActionNetworkClient::new(
        client,
        &config.action_network_api_base,
        config.action_network_api_token.clone(),
    ));

    let workspace = Arc::new(SlackWebClient::new(
        try_build_no_redirect_client()?,
        config.slack_workspace_origin.clone(),
        config.slack_app_origin.clone(),
    ));

    let roster = RosterFetcher::new(
        mailbox as Arc<dyn Mailbox>,
        config.roster_subject.clone(),
    );
    let uploader = ContactUploader::new(contacts as Arc<dyn ContactApi>);
    let invites = InviteClient::new(
        workspace as Arc<dyn WorkspaceWeb>,
        WorkspaceCredentials {
            username: config.slack_username.clone(),
            password: config.slack_password.clone(),
        },
    );

    Ok(MemberSync::new(roster, uploader, invites))
}

pub fn init_tracing(log_file: Option<&Path>) -> anyhow::Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| "roster_sync=info".into());

    // Console (pretty logs)
    let console_layer = fmt::layer().with_target(false).with_level(true).pretty();

    // File (structured JSON logs), only when a path is configured
    let json_layer = match log_file {
        Some(path) => Some(
            fmt::layer()
                .json()
                .with_writer(Mutex::new(File::create(path)?))
                .with_current_span(true)
                .with_span_list(true),
        ),
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .with(json_layer)
        .try_init()
        .ok();

    Ok(())
}
