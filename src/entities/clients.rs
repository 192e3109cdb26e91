// 🐾 Client Entities - Clients and their pets' vaccine records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{nested_records, LABEL_KEY};
use crate::identity;
use crate::resolve;
use crate::value::RawRecord;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Client {
    pub id: String,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub pet_name: Option<String>,
    pub pet_breed: Option<String>,
    pub tags: Vec<String>,
    pub vaccine_records: Vec<VaccineRecord>,

    /// Free-text status, defaults to "active"
    pub status: String,

    pub created_at: Option<DateTime<Utc>>,
    pub last_visit_at: Option<DateTime<Utc>>,

    /// Total spend to date, `None` when the store does not track it
    pub lifetime_value: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VaccineRecord {
    pub name: String,
    pub administered_at: Option<DateTime<Utc>>,
    pub expires_at: Option<DateTime<Utc>>,
    pub verified: Option<bool>,
}

pub fn map_client(record: &RawRecord) -> Client {
    let name = resolve::string(
        record,
        &["name", "full_name", "client_name", "customer_name", "display_name", "owner_name"],
    )
    .unwrap_or_else(|| "Unknown".to_string());

    Client {
        id: identity::entity_id(record, &["client_id", "customer_id"], "cli", &name),
        email: resolve::string(record, &["email", "email_address", "contact_email"]),
        phone: resolve::string(record, &["phone", "phone_number", "mobile", "contact_phone"]),
        pet_name: resolve::string(record, &["pet_name", "pet", "animal_name", "dog_name"]),
        pet_breed: resolve::string(record, &["pet_breed", "breed"]),
        tags: resolve::string_list(record, &["tags", "labels", "segments"]),
        vaccine_records: nested_records(record, &["vaccine_records", "vaccinations", "vaccines"])
            .iter()
            .map(map_vaccine_record)
            .collect(),
        status: resolve::string(record, &["status", "client_status", "state"])
            .unwrap_or_else(|| "active".to_string()),
        created_at: resolve::date(record, &["created_at", "createdAt", "joined_at", "signup_date"]),
        last_visit_at: resolve::date(
            record,
            &["last_visit_at", "last_visit", "last_appointment", "lastVisit"],
        ),
        lifetime_value: resolve::number(
            record,
            &["lifetime_value", "total_spent", "lifetime_spend", "ltv"],
        ),
        name,
    }
}

/// Accepts full objects, bare vaccine names, or `{"Rabies": "2026-01-01"}`
pub fn map_vaccine_record(record: &RawRecord) -> VaccineRecord {
    VaccineRecord {
        name: resolve::string(record, &[LABEL_KEY, "name", "vaccine", "type"])
            .unwrap_or_else(|| "Unknown".to_string()),
        administered_at: resolve::date(
            record,
            &["administered_at", "administered", "given_at", "date"],
        ),
        expires_at: resolve::date(
            record,
            &["expires_at", "expires", "expiration", "expiry", "due", "value"],
        ),
        verified: resolve::boolean(record, &["verified", "is_verified"]),
    }
}

// ============================================================================
// TESTS
// ============================================================================
