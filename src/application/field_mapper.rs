use std::collections::HashSet;

use crate::domain::entities::{
    contact::{ContactRecord, EmailAddress, PhoneNumber, PostalAddress},
    roster_record::{RosterRecord, columns},
};

struct AddressColumns {
    line_1: &'static str,
    line_2: &'static str,
    city: &'static str,
    state: &'static str,
    zip: &'static str,
}

const MAILING: AddressColumns = AddressColumns {
    line_1: columns::MAILING_ADDRESS_1,
    line_2: columns::MAILING_ADDRESS_2,
    city: columns::MAILING_CITY,
    state: columns::MAILING_STATE,
    zip: columns::MAILING_ZIP,
};

const BILLING: AddressColumns = AddressColumns {
    line_1: columns::BILLING_ADDRESS_1,
    line_2: columns::BILLING_ADDRESS_2,
    city: columns::BILLING_CITY,
    state: columns::BILLING_STATE,
    zip: columns::BILLING_ZIP,
};

/// Consolidation order of the phone columns.
const PHONE_COLUMNS: [&str; 3] = [
    columns::MOBILE_PHONE,
    columns::HOME_PHONE,
    columns::WORK_PHONE,
];

/// Columns consumed by structured fields. Phone columns are also kept
/// verbatim as custom fields, so they are not listed.
const STRUCTURED_COLUMNS: [&str; 13] = [
    columns::LAST_NAME,
    columns::FIRST_NAME,
    columns::EMAIL,
    columns::MAILING_ADDRESS_1,
    columns::MAILING_ADDRESS_2,
    columns::MAILING_CITY,
    columns::MAILING_STATE,
    columns::MAILING_ZIP,
    columns::BILLING_ADDRESS_1,
    columns::BILLING_ADDRESS_2,
    columns::BILLING_CITY,
    columns::BILLING_STATE,
    columns::BILLING_ZIP,
];

/// Maps one roster row onto an OSDI person. Never fails; missing columns
/// just leave the matching structure empty.
pub fn map_roster_record(record: &RosterRecord) -> ContactRecord {
    let owned = |column: &str| record.get(column).map(str::to_string);

    ContactRecord {
        family_name: owned(columns::LAST_NAME),
        given_name: owned(columns::FIRST_NAME),
        postal_addresses: [&MAILING, &BILLING]
            .into_iter()
            .filter_map(|address| postal_address(record, address))
            .collect(),
        phone_numbers: consolidate_phone_numbers(record),
        email_addresses: vec![EmailAddress {
            address: owned(columns::EMAIL),
        }],
        custom_fields: record
            .iter()
            .filter(|(column, _)| !STRUCTURED_COLUMNS.contains(column))
            .map(|(column, value)| (column.to_string(), value.to_string()))
            .collect(),
    }
}

fn postal_address(record: &RosterRecord, address: &AddressColumns) -> Option<PostalAddress> {
    let line_1 = record.non_empty(address.line_1)?;

    let mut address_lines = vec![line_1.to_string()];
    if let Some(line_2) = record.non_empty(address.line_2) {
        address_lines.push(line_2.to_string());
    }

    Some(PostalAddress {
        address_lines,
        locality: record.get(address.city).map(str::to_string),
        region: record.get(address.state).map(str::to_string),
        postal_code: record.get(address.zip).map(str::to_string),
    })
}

fn consolidate_phone_numbers(record: &RosterRecord) -> Vec<PhoneNumber> {
    let mut seen = HashSet::new();

    PHONE_COLUMNS
        .iter()
        .filter_map(|column| record.non_empty(column))
        .flat_map(|value| value.split(','))
        .map(str::trim)
        .filter(|number| !number.is_empty() && seen.insert(*number))
        .map(|number| PhoneNumber {
            number: number.to_string(),
        })
        .collect()
}
