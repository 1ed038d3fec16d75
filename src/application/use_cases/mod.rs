pub mod contact_upload;
pub mod invite;
pub mod member_sync;
pub mod roster;
