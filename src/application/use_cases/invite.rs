//! Invites new members to the chat workspace by replaying its browser sign-in.
//!
//! The workspace has no public invite API, so the flow scrapes its web UI:
//!
//! 1. [`EntryPoint`] loads the sign-in page for cookies and the form crumb.
//! 2. [`SignIn`] posts the credentials and keeps only the cookies it gets back.
//! 3. [`TokenFetch`] loads the client bootstrap page for the API token.
//! 4. [`Invite`] posts the bulk-invite form.
//!
//! Each state is consumed by its transition, so a stage can only run once and
//! only in order. Every step depends on the literal markup of pages that carry
//! no compatibility promise.

use std::sync::Arc;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, info, instrument};

use crate::{
    app_error::{AppError, AppResult},
    domain::entities::invite::{Invitation, Session},
};

/// Name of the cookie that carries the signed-in session.
pub const SESSION_COOKIE: &str = "d";

pub const SIGN_IN_REDIRECT: &str = "/ssb/redirect?entry_point=workspace_signin";

const CRUMB_START: &str = "crumbValue&quot;:&quot;";
const CRUMB_END: &str = "&";
const TOKEN_START: &str = "\"token\":\"";
const TOKEN_END: &str = "\"";

/// The parts of a scraped response the flow looks at.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WebPage {
    /// Raw `Set-Cookie` header values, in response order.
    pub set_cookies: Vec<String>,
    pub body: String,
}

#[derive(Debug, Clone)]
pub struct WorkspaceCredentials {
    pub username: String,
    pub password: SecretString,
}

#[derive(Debug)]
pub struct SignInForm {
    pub crumb: String,
    pub email: String,
    pub password: SecretString,
}

impl SignInForm {
    /// URL-encoded body fields, in the order the browser sends them.
    pub fn fields(&self) -> [(&str, &str); 7] {
        [
            ("signin", "1"),
            ("redir", SIGN_IN_REDIRECT),
            ("has_remember", "true"),
            ("crumb", &self.crumb),
            ("email", &self.email),
            ("password", self.password.expose_secret()),
            ("remember", "remember"),
        ]
    }
}

#[derive(Debug)]
pub struct InviteBulkForm {
    pub invites: Vec<Invitation>,
    pub token: SecretString,
}

impl InviteBulkForm {
    /// Multipart fields, in the order the invite modal sends them.
    pub fn fields(&self) -> AppResult<Vec<(&'static str, String)>> {
        let invites = serde_json::to_string(&self.invites)
            .map_err(|e| AppError::Internal(format!("Failed to encode invites: {e}")))?;

        let fixed = [
            ("source", "invite-modal"),
            ("campaign", "team-menu"),
            ("mode", "manual"),
            ("restricted", "false"),
            ("ultra_restricted", "false"),
            ("email_password_policy_enabled", "false"),
            ("_x_reason", "invite_bulk"),
            ("_x_mode", "online"),
            ("_x_sonic", "true"),
        ];

        let mut fields = vec![
            ("invites", invites),
            ("token", self.token.expose_secret().to_string()),
        ];
        fields.extend(fixed.map(|(name, value)| (name, value.to_string())));
        Ok(fields)
    }
}

/// The workspace's web surface, one method per scraped exchange.
#[async_trait]
pub trait WorkspaceWeb: Send + Sync {
    /// Unauthenticated GET of the workspace root.
    async fn entry_page(&self) -> AppResult<WebPage>;
    /// Credential POST. Must not follow redirects.
    async fn sign_in(&self, cookie: &str, form: &SignInForm) -> AppResult<WebPage>;
    /// Authenticated GET of the client bootstrap page.
    async fn client_page(&self, cookie: &str) -> AppResult<WebPage>;
    /// Bulk-invite POST. Only transport failures are errors.
    async fn invite_bulk(&self, cookie: &str, form: &InviteBulkForm) -> AppResult<()>;
}

#[derive(Debug, Default)]
pub struct EntryPoint;

#[derive(Debug)]
pub struct SignIn {
    cookies: String,
    crumb: String,
}

#[derive(Debug)]
pub struct TokenFetch {
    cookies: SecretString,
}

#[derive(Debug)]
pub struct Invite {
    session: Session,
}

impl EntryPoint {
    pub async fn advance(self, web: &dyn WorkspaceWeb) -> AppResult<SignIn> {
        let page = web.entry_page().await?;

        let crumb = extract_between(&page.body, CRUMB_START, CRUMB_END).ok_or_else(|| {
            AppError::Scrape("sign-in crumb not found on workspace entry page".into())
        })?;

        Ok(SignIn {
            cookies: cookie_header(&page.set_cookies),
            crumb: crumb.to_string(),
        })
    }
}

impl SignIn {
    pub fn cookies(&self) -> &str {
        &self.cookies
    }

    pub fn crumb(&self) -> &str {
        &self.crumb
    }

    /// Signs in and replaces the entry cookies with the ones the sign-in
    /// response sets.
    pub async fn advance(
        self,
        web: &dyn WorkspaceWeb,
        credentials: &WorkspaceCredentials,
    ) -> AppResult<TokenFetch> {
        let form = SignInForm {
            crumb: self.crumb,
            email: credentials.username.clone(),
            password: credentials.password.clone(),
        };

        let page = web.sign_in(&self.cookies, &form).await?;

        if page.set_cookies.is_empty() {
            return Err(AppError::Authentication(
                "sign-in response set no cookies".into(),
            ));
        }
        if !has_cookie(&page.set_cookies, SESSION_COOKIE) {
            return Err(AppError::Authentication(format!(
                "sign-in response is missing the `{SESSION_COOKIE}` session cookie"
            )));
        }

        Ok(TokenFetch {
            cookies: SecretString::new(cookie_header(&page.set_cookies).into()),
        })
    }
}

impl TokenFetch {
    pub async fn advance(self, web: &dyn WorkspaceWeb) -> AppResult<Invite> {
        let page = web.client_page(self.cookies.expose_secret()).await?;

        let token = extract_between(&page.body, TOKEN_START, TOKEN_END).ok_or_else(|| {
            AppError::Scrape("client token not found on bootstrap page".into())
        })?;

        Ok(Invite {
            session: Session {
                cookie_header: self.cookies,
                client_token: SecretString::new(token.into()),
            },
        })
    }
}

impl Invite {
    /// Terminal transition; the session is dropped once the form is sent.
    pub async fn submit(self, web: &dyn WorkspaceWeb, emails: &[String]) -> AppResult<()> {
        let form = InviteBulkForm {
            invites: emails.iter().map(Invitation::manual).collect(),
            token: self.session.client_token,
        };

        web.invite_bulk(self.session.cookie_header.expose_secret(), &form)
            .await
    }
}

#[derive(Clone)]
pub struct InviteClient {
    web: Arc<dyn WorkspaceWeb>,
    credentials: WorkspaceCredentials,
}

impl InviteClient {
    pub fn new(web: Arc<dyn WorkspaceWeb>, credentials: WorkspaceCredentials) -> Self {
        Self { web, credentials }
    }

    #[instrument(skip(self, emails), fields(count = emails.len()))]
    pub async fn invite(&self, emails: &[String]) -> AppResult<()> {
        let web = self.web.as_ref();

        let sign_in = EntryPoint.advance(web).await?;
        debug!("Scraped workspace entry page");

        let token_fetch = sign_in.advance(web, &self.credentials).await?;
        debug!("Signed in to workspace");

        let invite = token_fetch.advance(web).await?;
        debug!("Fetched workspace client token");

        invite.submit(web, emails).await?;
        info!("Submitted bulk invite");

        Ok(())
    }
}

/// Joins the `name=value` part of each `Set-Cookie` into one `Cookie` header.
pub fn cookie_header(set_cookies: &[String]) -> String {
    set_cookies
        .iter()
        .map(|cookie| cookie.split_once(';').map_or(cookie.as_str(), |(pair, _)| pair))
        .map(str::trim)
        .collect::<Vec<_>>()
        .join(";")
}

fn has_cookie(set_cookies: &[String], name: &str) -> bool {
    set_cookies.iter().any(|cookie| {
        cookie
            .split_once('=')
            .is_some_and(|(cookie_name, _)| cookie_name.trim() == name)
    })
}

/// Text between the first `start` marker and the next `end` after it.
pub fn extract_between<'a>(body: &'a str, start: &str, end: &str) -> Option<&'a str> {
    let from = body.find(start)? + start.len();
    let rest = &body[from..];
    let len = rest.find(end)?;
    Some(&rest[..len])
}
