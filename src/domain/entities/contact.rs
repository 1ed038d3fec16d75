use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::roster_record::columns;

/// An OSDI person as accepted by the contact platform's `people` endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub family_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub given_name: Option<String>,
    pub postal_addresses: Vec<PostalAddress>,
    pub phone_numbers: Vec<PhoneNumber>,
    pub email_addresses: Vec<EmailAddress>,
    pub custom_fields: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostalAddress {
    pub address_lines: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub locality: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhoneNumber {
    pub number: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailAddress {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

impl ContactRecord {
    pub fn primary_email(&self) -> Option<&str> {
        self.email_addresses
            .iter()
            .find_map(|e| e.address.as_deref())
            .filter(|address| !address.is_empty())
    }

    pub fn custom_field(&self, name: &str) -> Option<&str> {
        self.custom_fields.get(name).map(String::as_str)
    }

    /// Source-system member id, used to tag upload failures.
    pub fn ak_id(&self) -> Option<&str> {
        self.custom_field(columns::AK_ID)
    }

    pub fn join_date(&self) -> Option<&str> {
        self.custom_field(columns::JOIN_DATE)
    }
}
