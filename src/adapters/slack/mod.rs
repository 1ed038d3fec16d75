use async_trait::async_trait;
use reqwest::{
    Client, RequestBuilder, Response,
    header::{ACCEPT, ACCEPT_LANGUAGE, CACHE_CONTROL, COOKIE, ORIGIN, PRAGMA, SET_COOKIE, USER_AGENT},
    multipart::Form,
};
use tracing::debug;
use url::Url;

use crate::{
    adapters::http_error,
    app_error::{AppError, AppResult},
    use_cases::invite::{InviteBulkForm, SIGN_IN_REDIRECT, SignInForm, WebPage, WorkspaceWeb},
};

pub const SLACK_APP_ORIGIN: &str = "https://app.slack.com";

const BROWSER_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; rv:78.0) Gecko/20100101 Firefox/78.0";
const HTML_ACCEPT: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8";
const ACCEPT_LANGUAGE_VALUE: &str = "en-US,en;q=0.5";

const CLIENT_BOOT_PATH: &str = "/auth?app=client&teams=&iframe=1";
const INVITE_BULK_PATH: &str = "/api/users.admin.inviteBulk";

/// [`WorkspaceWeb`] that talks to the real workspace pages.
///
/// `client` must be built without redirect following, otherwise the sign-in
/// `Set-Cookie` headers are lost to the redirect target.
#[derive(Clone)]
pub struct SlackWebClient {
    client: Client,
    workspace_origin: Url,
    app_origin: Url,
}

impl SlackWebClient {
    pub fn new(client: Client, workspace_origin: Url, app_origin: Url) -> Self {
        Self {
            client,
            workspace_origin,
            app_origin,
        }
    }

    fn sign_in_url(&self) -> Url {
        let mut url = self.workspace_origin.clone();
        url.set_path("/");
        url.set_query(Some(&format!("redir={SIGN_IN_REDIRECT}")));
        url
    }

    fn html_request(&self, builder: RequestBuilder) -> RequestBuilder {
        builder
            .header(USER_AGENT, BROWSER_USER_AGENT)
            .header(ACCEPT, HTML_ACCEPT)
            .header(ACCEPT_LANGUAGE, ACCEPT_LANGUAGE_VALUE)
            .header("Upgrade-Insecure-Requests", "1")
    }
}

fn join(origin: &Url, path: &str) -> AppResult<Url> {
    origin
        .join(path)
        .map_err(|e| AppError::Internal(format!("Invalid workspace URL {origin}{path}: {e}")))
}

async fn read_page(response: Response) -> AppResult<WebPage> {
    let status = response.status();
    let set_cookies = response
        .headers()
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .map(str::to_string)
        .collect();
    let body = response.text().await.map_err(http_error)?;

    debug!(status = status.as_u16(), "Fetched workspace page");

    Ok(WebPage { set_cookies, body })
}

#[async_trait]
impl WorkspaceWeb for SlackWebClient {
    async fn entry_page(&self) -> AppResult<WebPage> {
        let response = self
            .html_request(self.client.get(self.workspace_origin.clone()))
            .header(CACHE_CONTROL, "max-age=0")
            .send()
            .await
            .map_err(http_error)?;

        read_page(response).await
    }

    async fn sign_in(&self, cookie: &str, form: &SignInForm) -> AppResult<WebPage> {
        let response = self
            .html_request(self.client.post(self.sign_in_url()))
            .header(ORIGIN, "null")
            .header(COOKIE, cookie)
            .form(&form.fields()[..])
            .send()
            .await
            .map_err(http_error)?;

        read_page(response).await
    }

    async fn client_page(&self, cookie: &str) -> AppResult<WebPage> {
        let response = self
            .html_request(self.client.get(join(&self.app_origin, CLIENT_BOOT_PATH)?))
            .header(CACHE_CONTROL, "max-age=0")
            .header(COOKIE, cookie)
            .send()
            .await
            .map_err(http_error)?;

        read_page(response).await
    }

    async fn invite_bulk(&self, cookie: &str, form: &InviteBulkForm) -> AppResult<()> {
        let multipart = form
            .fields()?
            .into_iter()
            .fold(Form::new(), |multipart, (name, value)| multipart.text(name, value));

        let origin = self.app_origin.origin().ascii_serialization();
        let response = self
            .client
            .post(join(&self.workspace_origin, INVITE_BULK_PATH)?)
            .header(USER_AGENT, BROWSER_USER_AGENT)
            .header(ACCEPT, "*/*")
            .header(ACCEPT_LANGUAGE, ACCEPT_LANGUAGE_VALUE)
            .header(PRAGMA, "no-cache")
            .header(CACHE_CONTROL, "no-cache")
            .header(ORIGIN, origin)
            .header(COOKIE, cookie)
            .multipart(multipart)
            .send()
            .await
            .map_err(http_error)?;

        let status = response.status();
        match response.text().await {
            Ok(body) => debug!(status = status.as_u16(), body = %body, "Bulk invite response"),
            Err(e) => debug!(
                status = status.as_u16(),
                error = %e,
                "Bulk invite response body unreadable"
            ),
        }

        Ok(())
    }
}
