use secrecy::SecretString;
use serde::Serialize;

/// One entry of the workspace's bulk-invite payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Invitation {
    pub email: String,
    pub mode: &'static str,
    #[serde(rename = "type")]
    pub kind: &'static str,
}

impl Invitation {
    pub fn manual(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            mode: "manual",
            kind: "regular",
        }
    }
}

/// Credentials scraped from a signed-in browser session.
///
/// Lives only as long as one invite operation; there is no logout.
#[derive(Debug)]
pub struct Session {
    pub cookie_header: SecretString,
    pub client_token: SecretString,
}
