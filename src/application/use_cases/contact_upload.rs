use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Local, NaiveDate, NaiveDateTime, NaiveTime};
use tokio::sync::Semaphore;
use tracing::{error, info, instrument, warn};

use crate::{
    app_error::{AppError, AppResult},
    domain::entities::contact::ContactRecord,
};

pub const MAX_CONCURRENT_UPLOADS: usize = 10;

/// Members who joined on or after the start of this many days ago count as new.
pub const NEW_MEMBER_WINDOW_DAYS: i64 = 8;

const JOIN_DATE_TIME_FORMATS: [&str; 6] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];
const JOIN_DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%m/%d/%Y"];

#[async_trait]
pub trait ContactApi: Send + Sync {
    /// Upserts one person. Any non-2xx answer is an error.
    async fn create_person(&self, person: &ContactRecord) -> AppResult<()>;
}

#[derive(Clone)]
pub struct ContactUploader {
    api: Arc<dyn ContactApi>,
    max_concurrent: usize,
}

impl ContactUploader {
    pub fn new(api: Arc<dyn ContactApi>) -> Self {
        Self {
            api,
            max_concurrent: MAX_CONCURRENT_UPLOADS,
        }
    }

    /// Uploads every record and returns the emails of the new members.
    pub async fn upload(&self, records: &[ContactRecord]) -> AppResult<Vec<String>> {
        self.upload_at(records, Local::now().naive_local()).await
    }

    #[instrument(skip(self, records), fields(count = records.len()))]
    pub async fn upload_at(
        &self,
        records: &[ContactRecord],
        now: NaiveDateTime,
    ) -> AppResult<Vec<String>> {
        let failures = self.submit_all(records).await;
        if !failures.is_empty() {
            warn!(failed = failures.len(), "Contact upload finished with failures");
            return Err(AppError::AggregateUpload(failures));
        }

        let threshold = new_member_threshold(now);
        let new_members: Vec<String> = records
            .iter()
            .filter(|record| is_new_member(record, threshold))
            .filter_map(|record| record.primary_email().map(str::to_string))
            .collect();

        info!(new_members = new_members.len(), "Contacts uploaded");

        Ok(new_members)
    }

    /// Submits every record, at most `max_concurrent` at a time, and returns
    /// one message per failed submission.
    async fn submit_all(&self, records: &[ContactRecord]) -> Vec<String> {
        let semaphore = Arc::new(Semaphore::new(self.max_concurrent));
        let mut handles = Vec::with_capacity(records.len());

        for record in records {
            let api = Arc::clone(&self.api);
            let sem = Arc::clone(&semaphore);
            let record = record.clone();

            handles.push(tokio::spawn(async move {
                let ak_id = record.ak_id().unwrap_or("<missing>").to_string();
                let result = match sem.acquire().await {
                    Ok(_permit) => api.create_person(&record).await,
                    Err(e) => Err(AppError::Internal(e.to_string())),
                };
                result.map_err(|e| format!("Error creating person with AK_ID={ak_id} - {e}"))
            }));
        }

        let mut failures = Vec::new();
        for handle in handles {
            match handle.await {
                Ok(Ok(())) => {}
                Ok(Err(message)) => {
                    warn!(error = %message, "Contact upload failed");
                    failures.push(message);
                }
                Err(e) => {
                    error!(error = %e, "Contact upload task panicked");
                    failures.push(format!("Contact upload task failed: {e}"));
                }
            }
        }

        failures
    }
}

pub fn new_member_threshold(now: NaiveDateTime) -> NaiveDateTime {
    (now.date() - Duration::days(NEW_MEMBER_WINDOW_DAYS)).and_time(NaiveTime::MIN)
}

fn is_new_member(record: &ContactRecord, threshold: NaiveDateTime) -> bool {
    let Some(raw) = record.join_date() else {
        return false;
    };

    match parse_join_date(raw) {
        Some(joined) => joined >= threshold,
        None => {
            warn!(
                ak_id = record.ak_id().unwrap_or("<missing>"),
                join_date = raw,
                "Unparseable join date, not treating member as new"
            );
            false
        }
    }
}

pub fn parse_join_date(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();

    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Local).naive_local());
    }

    JOIN_DATE_TIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .or_else(|| {
            JOIN_DATE_FORMATS
                .iter()
                .find_map(|format| NaiveDate::parse_from_str(raw, format).ok())
                .map(|date| date.and_time(NaiveTime::MIN))
        })
}
