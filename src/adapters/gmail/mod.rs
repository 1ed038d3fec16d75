use async_trait::async_trait;
use base64::{
    Engine,
    alphabet,
    engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig},
};
use reqwest::{Client, Response, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, de::DeserializeOwned};
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::{
    adapters::{http_error, upstream_status},
    app_error::{AppError, AppResult},
    domain::entities::message::MessagePart,
    use_cases::roster::Mailbox,
};

pub const GMAIL_API_BASE: &str = "https://gmail.googleapis.com/gmail/v1/users/me";
pub const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";

/// Gmail sends attachment bodies as base64url, sometimes unpadded.
const GMAIL_BASE64: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

#[derive(Clone)]
pub struct GmailCredentials {
    pub client_id: String,
    pub client_secret: SecretString,
    pub refresh_token: SecretString,
    /// Token to use until the first refresh, if one is already known.
    pub access_token: Option<SecretString>,
}

/// [`Mailbox`] over the Gmail REST API, authenticated with an offline
/// OAuth refresh token.
pub struct GmailMailbox {
    client: Client,
    api_base: String,
    token_url: String,
    client_id: String,
    client_secret: SecretString,
    refresh_token: SecretString,
    access_token: RwLock<Option<SecretString>>,
}

impl GmailMailbox {
    pub fn new(client: Client, credentials: GmailCredentials) -> Self {
        Self::with_endpoints(client, credentials, GMAIL_API_BASE, GOOGLE_TOKEN_URL)
    }

    pub fn with_endpoints(
        client: Client,
        credentials: GmailCredentials,
        api_base: impl Into<String>,
        token_url: impl Into<String>,
    ) -> Self {
        Self {
            client,
            api_base: api_base.into().trim_end_matches('/').to_string(),
            token_url: token_url.into(),
            client_id: credentials.client_id,
            client_secret: credentials.client_secret,
            refresh_token: credentials.refresh_token,
            access_token: RwLock::new(credentials.access_token),
        }
    }

    async fn refresh_access_token(&self) -> AppResult<SecretString> {
        let response = self
            .client
            .post(&self.token_url)
            .form(&[
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.expose_secret()),
                ("refresh_token", self.refresh_token.expose_secret()),
                ("grant_type", "refresh_token"),
            ])
            .send()
            .await
            .map_err(http_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Authentication(format!(
                "Google token refresh failed with {status}: {body}"
            )));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| AppError::Http(format!("Failed to parse token response: {e}")))?;
        let token = SecretString::new(token.access_token.into());

        *self.access_token.write().await = Some(token.clone());
        debug!("Refreshed Gmail access token");

        Ok(token)
    }

    async fn current_token(&self) -> AppResult<SecretString> {
        if let Some(token) = self.access_token.read().await.clone() {
            return Ok(token);
        }
        self.refresh_access_token().await
    }

    async fn send_get(
        &self,
        path: &str,
        query: &[(&str, &str)],
        token: &SecretString,
    ) -> AppResult<Response> {
        self.client
            .get(format!("{}{}", self.api_base, path))
            .bearer_auth(token.expose_secret())
            .query(query)
            .send()
            .await
            .map_err(http_error)
    }

    /// GET with one token refresh if the cached access token was rejected.
    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> AppResult<T> {
        let token = self.current_token().await?;
        let mut response = self.send_get(path, query, &token).await?;

        if response.status() == StatusCode::UNAUTHORIZED {
            warn!("Gmail rejected access token, refreshing");
            let token = self.refresh_access_token().await?;
            response = self.send_get(path, query, &token).await?;
        }

        if !response.status().is_success() {
            return Err(upstream_status(response.status()));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| AppError::Http(format!("Failed to parse Gmail response: {e}")))
    }
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Deserialize)]
struct ListResponse {
    #[serde(default)]
    messages: Vec<MessageRef>,
}

#[derive(Deserialize)]
struct MessageRef {
    id: String,
}

#[derive(Deserialize)]
struct MessageResponse {
    payload: PartResponse,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PartResponse {
    #[serde(default)]
    mime_type: String,
    body: Option<PartBody>,
    #[serde(default)]
    parts: Vec<PartResponse>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PartBody {
    attachment_id: Option<String>,
}

#[derive(Deserialize)]
struct AttachmentResponse {
    data: String,
}

impl From<PartResponse> for MessagePart {
    fn from(part: PartResponse) -> Self {
        MessagePart {
            mime_type: part.mime_type,
            attachment_id: part.body.and_then(|b| b.attachment_id),
            parts: part.parts.into_iter().map(MessagePart::from).collect(),
        }
    }
}

#[async_trait]
impl Mailbox for GmailMailbox {
    async fn search(&self, query: &str) -> AppResult<Vec<String>> {
        let list: ListResponse = self.get_json("/messages", &[("q", query)]).await?;
        Ok(list.messages.into_iter().map(|m| m.id).collect())
    }

    async fn message(&self, message_id: &str) -> AppResult<MessagePart> {
        let message: MessageResponse = self
            .get_json(&format!("/messages/{message_id}"), &[])
            .await?;
        Ok(message.payload.into())
    }

    async fn attachment(&self, message_id: &str, attachment_id: &str) -> AppResult<Vec<u8>> {
        let attachment: AttachmentResponse = self
            .get_json(
                &format!("/messages/{message_id}/attachments/{attachment_id}"),
                &[],
            )
            .await?;

        GMAIL_BASE64
            .decode(attachment.data.as_bytes())
            .map_err(|e| AppError::Archive(format!("Attachment is not valid base64: {e}")))
    }
}
