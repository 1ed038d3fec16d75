use std::{
    collections::HashSet,
    sync::{
        Mutex,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;
use secrecy::ExposeSecret;

use crate::{
    app_error::{AppError, AppResult},
    domain::entities::{contact::ContactRecord, message::MessagePart},
    use_cases::{
        contact_upload::ContactApi,
        invite::{InviteBulkForm, SignInForm, WebPage, WorkspaceWeb},
        roster::Mailbox,
    },
};

// ============================================================================
// Mailbox
// ============================================================================

/// Mailbox that answers every search with a fixed id list and serves one
/// message and one attachment for them.
pub struct InMemoryMailbox {
    message_ids: Vec<String>,
    payload: MessagePart,
    attachment: Vec<u8>,
    queries: Mutex<Vec<String>>,
    attachment_requests: Mutex<Vec<(String, String)>>,
}

impl InMemoryMailbox {
    pub fn single(message_id: &str, payload: MessagePart, attachment: Vec<u8>) -> Self {
        Self {
            message_ids: vec![message_id.to_string()],
            payload,
            attachment,
            queries: Mutex::new(Vec::new()),
            attachment_requests: Mutex::new(Vec::new()),
        }
    }

    pub fn with_message_ids(message_ids: Vec<String>) -> Self {
        Self {
            message_ids,
            payload: MessagePart::default(),
            attachment: Vec::new(),
            queries: Mutex::new(Vec::new()),
            attachment_requests: Mutex::new(Vec::new()),
        }
    }

    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }

    pub fn attachment_requests(&self) -> Vec<(String, String)> {
        self.attachment_requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Mailbox for InMemoryMailbox {
    async fn search(&self, query: &str) -> AppResult<Vec<String>> {
        self.queries.lock().unwrap().push(query.to_string());
        Ok(self.message_ids.clone())
    }

    async fn message(&self, message_id: &str) -> AppResult<MessagePart> {
        if self.message_ids.iter().any(|id| id == message_id) {
            Ok(self.payload.clone())
        } else {
            Err(AppError::UpstreamStatus {
                status: 404,
                reason: "Not Found".into(),
            })
        }
    }

    async fn attachment(&self, message_id: &str, attachment_id: &str) -> AppResult<Vec<u8>> {
        self.attachment_requests
            .lock()
            .unwrap()
            .push((message_id.to_string(), attachment_id.to_string()));
        Ok(self.attachment.clone())
    }
}

// ============================================================================
// Contact platform
// ============================================================================

/// Contact API that records every submission and can be told to reject some.
#[derive(Default)]
pub struct RecordingContactApi {
    fail_all: bool,
    failing_ak_ids: HashSet<String>,
    delay: Option<Duration>,
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    people: Mutex<Vec<ContactRecord>>,
}

impl RecordingContactApi {
    pub fn failing_for(ak_ids: &[&str]) -> Self {
        Self {
            failing_ak_ids: ak_ids.iter().map(|id| id.to_string()).collect(),
            ..Default::default()
        }
    }

    pub fn failing_all() -> Self {
        Self {
            fail_all: true,
            ..Default::default()
        }
    }

    /// Holds each submission open briefly so overlapping calls can be observed.
    pub fn slow() -> Self {
        Self {
            delay: Some(Duration::from_millis(10)),
            ..Default::default()
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    pub fn people(&self) -> Vec<ContactRecord> {
        self.people.lock().unwrap().clone()
    }
}

#[async_trait]
impl ContactApi for RecordingContactApi {
    async fn create_person(&self, person: &ContactRecord) -> AppResult<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let in_flight = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(in_flight, Ordering::SeqCst);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        self.people.lock().unwrap().push(person.clone());

        let rejected = self.fail_all
            || person
                .ak_id()
                .is_some_and(|id| self.failing_ak_ids.contains(id));
        if rejected {
            return Err(AppError::UpstreamStatus {
                status: 400,
                reason: "Bad Request".into(),
            });
        }
        Ok(())
    }
}

// ============================================================================
// Chat workspace
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebCall {
    EntryPage,
    SignIn {
        cookie: String,
        crumb: String,
        email: String,
    },
    ClientPage {
        cookie: String,
    },
    InviteBulk {
        cookie: String,
        fields: Vec<(&'static str, String)>,
    },
}

/// Workspace web surface that replays canned pages and records each call.
pub struct ScriptedWorkspaceWeb {
    pub entry: WebPage,
    pub sign_in: WebPage,
    pub client: WebPage,
    calls: Mutex<Vec<WebCall>>,
}

impl ScriptedWorkspaceWeb {
    pub fn new(entry: WebPage, sign_in: WebPage, client: WebPage) -> Self {
        Self {
            entry,
            sign_in,
            client,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Pages for a sign-in that succeeds end to end.
    pub fn signed_in() -> Self {
        Self::new(
            WebPage {
                set_cookies: vec!["b=anon; Path=/".into()],
                body: "crumbValue&quot;:&quot;crumb-1&quot;".into(),
            },
            WebPage {
                set_cookies: vec!["d=session; Path=/; HttpOnly".into()],
                body: String::new(),
            },
            WebPage {
                set_cookies: vec![],
                body: r#"{"token":"xoxc-1"}"#.into(),
            },
        )
    }

    pub fn calls(&self) -> Vec<WebCall> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: WebCall) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl WorkspaceWeb for ScriptedWorkspaceWeb {
    async fn entry_page(&self) -> AppResult<WebPage> {
        self.record(WebCall::EntryPage);
        Ok(self.entry.clone())
    }

    async fn sign_in(&self, cookie: &str, form: &SignInForm) -> AppResult<WebPage> {
        // Credentials must reach the port intact even though they are secret.
        assert!(!form.password.expose_secret().is_empty());
        self.record(WebCall::SignIn {
            cookie: cookie.to_string(),
            crumb: form.crumb.clone(),
            email: form.email.clone(),
        });
        Ok(self.sign_in.clone())
    }

    async fn client_page(&self, cookie: &str) -> AppResult<WebPage> {
        self.record(WebCall::ClientPage {
            cookie: cookie.to_string(),
        });
        Ok(self.client.clone())
    }

    async fn invite_bulk(&self, cookie: &str, form: &InviteBulkForm) -> AppResult<()> {
        self.record(WebCall::InviteBulk {
            cookie: cookie.to_string(),
            fields: form.fields()?,
        });
        Ok(())
    }
}
