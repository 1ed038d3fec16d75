pub mod contact;
pub mod invite;
pub mod message;
pub mod roster_record;
