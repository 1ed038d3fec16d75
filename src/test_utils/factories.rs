//! Test data factories.
//!
//! Each factory creates a complete, valid object with sensible defaults.
//! Use the closure parameter (where present) to override specific fields.

use std::{collections::BTreeMap, io::Write};

use chrono::{NaiveDate, NaiveDateTime};

use crate::domain::entities::{
    contact::{ContactRecord, EmailAddress},
    roster_record::{RosterRecord, columns},
};

/// Create a roster row with every mapped column filled in.
pub fn create_test_roster_record(
    overrides: impl FnOnce(&mut BTreeMap<String, String>),
) -> RosterRecord {
    let mut fields: BTreeMap<String, String> = [
        (columns::AK_ID, "1234"),
        (columns::JOIN_DATE, "2024-05-10"),
        (columns::LAST_NAME, "debs"),
        (columns::FIRST_NAME, "eugene"),
        (columns::EMAIL, "eugene.v.debs@iww.org"),
        (columns::MAILING_ADDRESS_1, "123 Broad St."),
        (columns::MAILING_ADDRESS_2, "Woodstock Jail cell block A"),
        (columns::MAILING_CITY, "Woodstock"),
        (columns::MAILING_STATE, "IL"),
        (columns::MAILING_ZIP, "60098"),
        (columns::BILLING_ADDRESS_1, "4321 Main St."),
        (columns::BILLING_ADDRESS_2, "apt B"),
        (columns::BILLING_CITY, "Terre Haute"),
        (columns::BILLING_STATE, "IN"),
        (columns::BILLING_ZIP, "47801"),
        (columns::MOBILE_PHONE, "8121231234"),
        (columns::HOME_PHONE, "8123214321"),
        (columns::WORK_PHONE, "8121111111"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect();
    overrides(&mut fields);
    RosterRecord::new(fields)
}

/// Create a minimal contact carrying only what the uploader looks at.
pub fn create_test_contact(
    ak_id: &str,
    email: Option<&str>,
    join_date: Option<&str>,
) -> ContactRecord {
    let mut custom_fields = BTreeMap::from([(columns::AK_ID.to_string(), ak_id.to_string())]);
    if let Some(join_date) = join_date {
        custom_fields.insert(columns::JOIN_DATE.to_string(), join_date.to_string());
    }

    ContactRecord {
        email_addresses: vec![EmailAddress {
            address: email.map(str::to_string),
        }],
        custom_fields,
        ..Default::default()
    }
}

/// Fixed "now" used by clock-dependent tests: Tuesday 2024-05-14 10:00.
pub fn test_datetime() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 5, 14)
        .unwrap()
        .and_hms_opt(10, 0, 0)
        .unwrap()
}

/// Zip a CSV document the way the roster export ships it: one entry.
pub fn zip_csv(csv: &str) -> Vec<u8> {
    zip_bytes(csv.as_bytes())
}

/// Like [`zip_csv`], for entry contents that are not valid UTF-8.
pub fn zip_bytes(contents: &[u8]) -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(std::io::Cursor::new(Vec::new()));
    writer
        .start_file("members.csv", zip::write::SimpleFileOptions::default())
        .unwrap();
    writer.write_all(contents).unwrap();
    writer.finish().unwrap().into_inner()
}
