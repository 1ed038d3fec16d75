use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use tracing::debug;

use crate::{
    adapters::{http_error, upstream_status},
    app_error::AppResult,
    domain::entities::contact::ContactRecord,
    use_cases::contact_upload::ContactApi,
};

pub const ACTION_NETWORK_API_BASE: &str = "https://actionnetwork.org/api/v2";

const API_TOKEN_HEADER: &str = "OSDI-API-Token";

#[derive(Serialize)]
struct PersonSignupHelper<'a> {
    person: &'a ContactRecord,
}

/// [`ContactApi`] backed by the Action Network person signup helper.
#[derive(Clone)]
pub struct ActionNetworkClient {
    client: Client,
    people_url: String,
    api_token: SecretString,
}

impl ActionNetworkClient {
    pub fn new(client: Client, api_base: &str, api_token: SecretString) -> Self {
        Self {
            client,
            people_url: format!("{}/people/", api_base.trim_end_matches('/')),
            api_token,
        }
    }
}

#[async_trait]
impl ContactApi for ActionNetworkClient {
    async fn create_person(&self, person: &ContactRecord) -> AppResult<()> {
        let response = self
            .client
            .post(&self.people_url)
            .header(API_TOKEN_HEADER, self.api_token.expose_secret())
            .json(&PersonSignupHelper { person })
            .send()
            .await
            .map_err(http_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(upstream_status(status));
        }

        debug!(ak_id = person.ak_id().unwrap_or("<missing>"), "Person upserted");
        Ok(())
    }
}
