// 📅 Scheduling Entities - Appointments and the waitlist

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::identity;
use crate::resolve;
use crate::value::RawRecord;

// ============================================================================
// APPOINTMENT
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Appointment {
    pub id: String,

    /// Client display name ("Walk-in" when the row has none)
    pub client_name: String,
    pub client_id: Option<String>,
    pub pet_name: Option<String>,
    pub staff_name: Option<String>,
    pub services: Vec<String>,

    /// Free-text status, defaults to "scheduled"
    pub status: String,

    pub start_at: Option<DateTime<Utc>>,
    pub end_at: Option<DateTime<Utc>>,

    /// Explicit duration, or end - start when both are known
    pub duration_minutes: Option<f64>,

    pub price: Option<f64>,
    pub location: Option<String>,
    pub notes: Option<String>,
}

pub fn map_appointment(record: &RawRecord) -> Appointment {
    let client_name = resolve::string(
        record,
        &["client_name", "client", "customer_name", "customer", "owner_name", "name"],
    )
    .unwrap_or_else(|| "Walk-in".to_string());

    let start_at = resolve::date(
        record,
        &["start_at", "start_time", "starts_at", "startTime", "start", "scheduled_at", "appointment_time", "date"],
    );
    let end_at = resolve::date(record, &["end_at", "end_time", "ends_at", "endTime", "end"]);

    let duration_minutes = resolve::number(record, &["duration_minutes", "duration", "length_minutes"])
        .or_else(|| match (start_at, end_at) {
            (Some(start), Some(end)) if end >= start => {
                Some((end - start).num_minutes() as f64)
            }
            _ => None,
        });

    Appointment {
        id: identity::entity_id(record, &["appointment_id", "booking_id"], "apt", &client_name),
        client_id: resolve::string(record, &["client_id", "customer_id"]),
        pet_name: resolve::string(record, &["pet_name", "pet", "animal_name", "dog_name"]),
        staff_name: resolve::string(
            record,
            &["staff_name", "staff", "groomer", "stylist", "employee_name", "assigned_to", "provider"],
        ),
        services: resolve::string_list(
            record,
            &["services", "service_names", "service", "treatments"],
        ),
        status: resolve::string(record, &["status", "appointment_status", "state"])
            .unwrap_or_else(|| "scheduled".to_string()),
        start_at,
        end_at,
        duration_minutes,
        price: resolve::number(record, &["price", "total", "amount", "cost", "quoted_price"]),
        location: resolve::string(record, &["location", "room", "station"]),
        notes: resolve::string(record, &["notes", "note", "comments"]),
        client_name,
    }
}

// ============================================================================
// WAITLIST ENTRY
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaitlistEntry {
    pub id: String,
    pub client_name: String,

    /// Phone or email, whichever the row carries
    pub contact: Option<String>,
    pub pet_name: Option<String>,
    pub services: Vec<String>,
    pub preferred_staff: Option<String>,

    /// When the client would like to be seen
    pub preferred_start: Option<DateTime<Utc>>,

    /// When the client joined the waitlist
    pub created_at: Option<DateTime<Utc>>,

    /// Free-text status, defaults to "waiting"
    pub status: String,
    pub priority: Option<String>,
    pub notes: Option<String>,
}

pub fn map_waitlist_entry(record: &RawRecord) -> WaitlistEntry {
    let client_name = resolve::string(
        record,
        &["client_name", "client", "customer_name", "customer", "name"],
    )
    .unwrap_or_else(|| "Walk-in".to_string());

    WaitlistEntry {
        id: identity::entity_id(record, &["waitlist_id", "entry_id"], "wait", &client_name),
        contact: resolve::string(
            record,
            &["contact", "phone", "client_phone", "email", "client_email"],
        ),
        pet_name: resolve::string(record, &["pet_name", "pet", "animal_name"]),
        services: resolve::string_list(
            record,
            &["services", "requested_services", "service", "service_names"],
        ),
        preferred_staff: resolve::string(
            record,
            &["preferred_staff", "staff_name", "staff", "groomer", "stylist"],
        ),
        preferred_start: resolve::date(
            record,
            &["preferred_start", "preferredStart", "preferred_time", "preferred_date", "requested_start", "desired_start"],
        ),
        created_at: resolve::date(
            record,
            &["created_at", "createdAt", "inserted_at", "added_at", "requested_at", "date_added"],
        ),
        status: resolve::string(record, &["status", "state"])
            .unwrap_or_else(|| "waiting".to_string()),
        priority: resolve::string(record, &["priority", "urgency"]),
        notes: resolve::string(record, &["notes", "note", "comments"]),
        client_name,
    }
}

// ============================================================================
// TESTS
// ============================================================================
