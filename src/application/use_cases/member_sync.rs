use tracing::{info, instrument};
use uuid::Uuid;

use crate::{
    app_error::AppResult,
    domain::entities::contact::ContactRecord,
    field_mapper::map_roster_record,
    use_cases::{contact_upload::ContactUploader, invite::InviteClient, roster::RosterFetcher},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncReport {
    pub fetched: usize,
    pub uploaded: usize,
    pub invited: usize,
}

/// One end-to-end pass: mailbox roster, contact platform, workspace invites.
#[derive(Clone)]
pub struct MemberSync {
    roster: RosterFetcher,
    uploader: ContactUploader,
    invites: InviteClient,
}

impl MemberSync {
    pub fn new(roster: RosterFetcher, uploader: ContactUploader, invites: InviteClient) -> Self {
        Self {
            roster,
            uploader,
            invites,
        }
    }

    #[instrument(skip(self), fields(run_id = %Uuid::new_v4()))]
    pub async fn run(&self) -> AppResult<SyncReport> {
        let roster = self.roster.fetch().await?;
        let contacts: Vec<ContactRecord> = roster.iter().map(map_roster_record).collect();

        let new_members = self.uploader.upload(&contacts).await?;

        if new_members.is_empty() {
            info!("No new members to invite");
        } else {
            self.invites.invite(&new_members).await?;
        }

        Ok(SyncReport {
            fetched: roster.len(),
            uploaded: contacts.len(),
            invited: new_members.len(),
        })
    }
}
