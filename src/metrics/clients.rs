// 🐾 Client Metrics - Roster health, vaccine alerts, top spenders

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::common::{start_of_day, sum_known};
use crate::entities::Client;
use crate::timeline::month_key;
use crate::tone::{classify, StatusDomain, Tone, ToneCounts};

/// Vaccines expiring inside this many days are flagged
pub const VACCINE_WARNING_DAYS: i64 = 30;

/// Clients listed under `top_clients`
pub const TOP_CLIENT_LIMIT: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VaccineAlert {
    pub client_id: String,
    pub client_name: String,
    pub pet_name: Option<String>,
    pub vaccine: String,
    pub expires_at: DateTime<Utc>,
    pub expired: bool,
}

/// Expired vaccines and those expiring within the warning window, soonest first
pub fn vaccine_alerts(clients: &[Client], now: DateTime<Utc>) -> Vec<VaccineAlert> {
    let today = start_of_day(now);
    let horizon = today + Duration::days(VACCINE_WARNING_DAYS);

    let mut alerts: Vec<VaccineAlert> = clients
        .iter()
        .flat_map(|client| {
            client.vaccine_records.iter().filter_map(move |vaccine| {
                let expires_at = vaccine.expires_at.filter(|e| *e < horizon)?;
                Some(VaccineAlert {
                    client_id: client.id.clone(),
                    client_name: client.name.clone(),
                    pet_name: client.pet_name.clone(),
                    vaccine: vaccine.name.clone(),
                    expires_at,
                    expired: expires_at < today,
                })
            })
        })
        .collect();

    alerts.sort_by(|a, b| {
        a.expires_at
            .cmp(&b.expires_at)
            .then_with(|| a.client_id.cmp(&b.client_id))
    });
    alerts
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientValue {
    pub id: String,
    pub name: String,
    pub lifetime_value: f64,
}

/// Clients with a known lifetime value, highest first
pub fn top_clients(clients: &[Client], limit: usize) -> Vec<ClientValue> {
    let mut ranked: Vec<ClientValue> = clients
        .iter()
        .filter_map(|c| {
            c.lifetime_value.map(|value| ClientValue {
                id: c.id.clone(),
                name: c.name.clone(),
                lifetime_value: value,
            })
        })
        .collect();

    ranked.sort_by(|a, b| {
        b.lifetime_value
            .total_cmp(&a.lifetime_value)
            .then_with(|| a.name.cmp(&b.name))
    });
    ranked.truncate(limit);
    ranked
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagCount {
    pub tag: String,
    pub count: usize,
}

/// Case-insensitive tag counts; the first spelling seen is kept
pub fn tag_counts(clients: &[Client]) -> Vec<TagCount> {
    let mut counts: HashMap<String, TagCount> = HashMap::new();
    for tag in clients.iter().flat_map(|c| c.tags.iter()) {
        counts
            .entry(tag.to_lowercase())
            .or_insert_with(|| TagCount {
                tag: tag.clone(),
                count: 0,
            })
            .count += 1;
    }

    let mut tags: Vec<TagCount> = counts.into_values().collect();
    tags.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.tag.cmp(&b.tag)));
    tags
}

// ============================================================================
// CLIENT REPORT
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientReport {
    pub generated_at: DateTime<Utc>,
    pub total: usize,
    pub active: usize,
    /// Created in the current UTC calendar month
    pub new_this_month: usize,
    pub vaccines_expired: usize,
    pub vaccines_expiring: usize,
    pub vaccine_alerts: Vec<VaccineAlert>,
    pub lifetime_value_total: f64,
    pub top_clients: Vec<ClientValue>,
    pub tags: Vec<TagCount>,
    pub tones: ToneCounts,
}

pub fn client_report(clients: &[Client], now: DateTime<Utc>) -> ClientReport {
    let this_month = month_key(now);
    let alerts = vaccine_alerts(clients, now);
    let expired = alerts.iter().filter(|a| a.expired).count();

    ClientReport {
        generated_at: now,
        total: clients.len(),
        active: clients
            .iter()
            .filter(|c| classify(StatusDomain::Client, &c.status) == Tone::Positive)
            .count(),
        new_this_month: clients
            .iter()
            .filter(|c| c.created_at.map_or(false, |d| month_key(d) == this_month))
            .count(),
        vaccines_expired: expired,
        vaccines_expiring: alerts.len() - expired,
        vaccine_alerts: alerts,
        lifetime_value_total: sum_known(clients.iter().map(|c| c.lifetime_value)),
        top_clients: top_clients(clients, TOP_CLIENT_LIMIT),
        tags: tag_counts(clients),
        tones: ToneCounts::tally(StatusDomain::Client, clients.iter().map(|c| c.status.as_str())),
    }
}

// ============================================================================
// TESTS
// ============================================================================
