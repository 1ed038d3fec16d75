use std::collections::BTreeMap;

/// Column names of the weekly roster export that get special treatment.
pub mod columns {
    pub const AK_ID: &str = "AK_ID";
    pub const JOIN_DATE: &str = "Join_Date";

    pub const LAST_NAME: &str = "last_name";
    pub const FIRST_NAME: &str = "first_name";
    pub const EMAIL: &str = "Email";

    pub const MOBILE_PHONE: &str = "Mobile_Phone";
    pub const HOME_PHONE: &str = "Home_Phone";
    pub const WORK_PHONE: &str = "Work_Phone";

    pub const MAILING_ADDRESS_1: &str = "Mailing_Address1";
    pub const MAILING_ADDRESS_2: &str = "Mailing_Address2";
    pub const MAILING_CITY: &str = "Mailing_City";
    pub const MAILING_STATE: &str = "Mailing_State";
    pub const MAILING_ZIP: &str = "Mailing_Zip";

    pub const BILLING_ADDRESS_1: &str = "Billing_Address_Line_1";
    pub const BILLING_ADDRESS_2: &str = "Billing_Address_Line_2";
    pub const BILLING_CITY: &str = "Billing_City";
    pub const BILLING_STATE: &str = "Billing_State";
    pub const BILLING_ZIP: &str = "Billing_Zip";
}

/// One CSV row of the roster, keyed by header name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RosterRecord {
    fields: BTreeMap<String, String>,
}

impl RosterRecord {
    pub fn new(fields: BTreeMap<String, String>) -> Self {
        Self { fields }
    }

    pub fn get(&self, column: &str) -> Option<&str> {
        self.fields.get(column).map(String::as_str)
    }

    /// Like [`get`](Self::get), but treats an empty cell as absent.
    pub fn non_empty(&self, column: &str) -> Option<&str> {
        self.get(column).filter(|value| !value.is_empty())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K, V> FromIterator<(K, V)> for RosterRecord
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}
