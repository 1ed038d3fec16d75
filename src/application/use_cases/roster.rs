use std::{
    collections::BTreeMap,
    io::{Cursor, Read},
    sync::Arc,
};

use async_trait::async_trait;
use chrono::{Duration, Local, NaiveDateTime};
use tracing::{info, instrument};

use crate::{
    app_error::{AppError, AppResult},
    domain::entities::{message::MessagePart, roster_record::RosterRecord},
};

/// Only messages received since the start of this many days ago are considered.
pub const LOOKBACK_DAYS: i64 = 1;

pub const DEFAULT_ROSTER_SUBJECT: &str = "Atlanta Membership List";

const ZIP_MIME_TYPES: [&str; 2] = ["application/x-zip-compressed", "application/zip"];

/// Read-only view of the inbox the roster is mailed to.
#[async_trait]
pub trait Mailbox: Send + Sync {
    /// Ids of the messages matching a search query.
    async fn search(&self, query: &str) -> AppResult<Vec<String>>;
    /// Root of the message's MIME tree.
    async fn message(&self, message_id: &str) -> AppResult<MessagePart>;
    /// Decoded bytes of one attachment.
    async fn attachment(&self, message_id: &str, attachment_id: &str) -> AppResult<Vec<u8>>;
}

#[derive(Clone)]
pub struct RosterFetcher {
    mailbox: Arc<dyn Mailbox>,
    subject: String,
}

impl RosterFetcher {
    pub fn new(mailbox: Arc<dyn Mailbox>, subject: String) -> Self {
        Self { mailbox, subject }
    }

    pub async fn fetch(&self) -> AppResult<Vec<RosterRecord>> {
        self.fetch_at(Local::now().naive_local()).await
    }

    #[instrument(skip(self))]
    pub async fn fetch_at(&self, now: NaiveDateTime) -> AppResult<Vec<RosterRecord>> {
        let query = search_query(&self.subject, now);
        let message_ids = self.mailbox.search(&query).await?;

        let [message_id] = message_ids.as_slice() else {
            return Err(AppError::Lookup {
                found: message_ids.len(),
            });
        };

        let payload = self.mailbox.message(message_id).await?;
        let attachment_id =
            find_zip_attachment_id(&payload).ok_or(AppError::AttachmentNotFound)?;

        let archive = self.mailbox.attachment(message_id, attachment_id).await?;
        let csv = unzip_first_entry(&archive)?;
        let records = parse_roster_csv(&csv)?;

        info!(
            message_id = %message_id,
            count = records.len(),
            "Fetched member roster"
        );

        Ok(records)
    }
}

pub fn search_query(subject: &str, now: NaiveDateTime) -> String {
    let after = (now.date() - Duration::days(LOOKBACK_DAYS)).format("%m/%d/%Y");
    format!("subject:\"{subject}\" AND has:attachment AND after:{after}")
}

/// Depth-first search for the zip attachment: direct children first, then
/// each nested multipart container in order.
pub fn find_zip_attachment_id(part: &MessagePart) -> Option<&str> {
    part.parts
        .iter()
        .filter(|child| ZIP_MIME_TYPES.contains(&child.mime_type.as_str()))
        .find_map(|child| child.attachment_id.as_deref())
        .or_else(|| {
            part.parts
                .iter()
                .filter(|child| child.is_container())
                .find_map(find_zip_attachment_id)
        })
}

fn unzip_first_entry(bytes: &[u8]) -> AppResult<String> {
    let mut archive =
        zip::ZipArchive::new(Cursor::new(bytes)).map_err(|e| AppError::Archive(e.to_string()))?;

    if archive.len() == 0 {
        return Err(AppError::Archive("archive has no entries".into()));
    }

    let mut entry = archive
        .by_index(0)
        .map_err(|e| AppError::Archive(e.to_string()))?;
    let mut contents = Vec::new();
    entry
        .read_to_end(&mut contents)
        .map_err(|e| AppError::Archive(e.to_string()))?;

    // Legacy exports are not always UTF-8; bad bytes become U+FFFD.
    Ok(String::from_utf8_lossy(&contents).into_owned())
}

pub fn parse_roster_csv(text: &str) -> AppResult<Vec<RosterRecord>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(text.as_bytes());

    reader
        .deserialize::<BTreeMap<String, String>>()
        .map(|row| {
            row.map(RosterRecord::new)
                .map_err(|e| AppError::Csv(e.to_string()))
        })
        .collect()
}
