// 📅 Scheduling Metrics - Appointment load and waitlist lead time

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::common::{start_of_day, sum_known};
use crate::entities::{Appointment, WaitlistEntry};
use crate::timeline::{self, SeriesPoint};
use crate::tone::{classify, StatusDomain, Tone, ToneCounts};

const UNASSIGNED_STAFF: &str = "Unassigned";

fn is_cancelled(appointment: &Appointment) -> bool {
    classify(StatusDomain::Appointment, &appointment.status) == Tone::Negative
}

fn is_completed(appointment: &Appointment) -> bool {
    let status = appointment.status.to_lowercase();
    status.contains("complete") && !status.contains("incomplete")
}

// ============================================================================
// APPOINTMENTS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppointmentSummary {
    pub total: usize,
    /// Starting within the current UTC day
    pub today: usize,
    /// Starting from now on and not cancelled
    pub upcoming: usize,
    pub completed: usize,
    /// Cancelled, no-show, missed or declined
    pub cancelled: usize,
    /// Σ price over appointments that were not cancelled
    pub booked_revenue: f64,
    pub tones: ToneCounts,
}

pub fn summarize_appointments(appointments: &[Appointment], now: DateTime<Utc>) -> AppointmentSummary {
    let day_start = start_of_day(now);
    let day_end = day_start + Duration::days(1);

    AppointmentSummary {
        total: appointments.len(),
        today: appointments
            .iter()
            .filter(|a| a.start_at.map_or(false, |s| s >= day_start && s < day_end))
            .count(),
        upcoming: appointments
            .iter()
            .filter(|a| !is_cancelled(a) && a.start_at.map_or(false, |s| s >= now))
            .count(),
        completed: appointments.iter().filter(|a| is_completed(a)).count(),
        cancelled: appointments.iter().filter(|a| is_cancelled(a)).count(),
        booked_revenue: sum_known(appointments.iter().filter(|a| !is_cancelled(a)).map(|a| a.price)),
        tones: ToneCounts::tally(
            StatusDomain::Appointment,
            appointments.iter().map(|a| a.status.as_str()),
        ),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaffLoad {
    pub staff_name: String,
    pub appointments: usize,
    pub revenue: f64,
}

/// Non-cancelled appointments per staff member, busiest first
pub fn staff_load(appointments: &[Appointment]) -> Vec<StaffLoad> {
    let mut loads: HashMap<String, StaffLoad> = HashMap::new();

    for appointment in appointments.iter().filter(|a| !is_cancelled(a)) {
        let name = appointment
            .staff_name
            .clone()
            .unwrap_or_else(|| UNASSIGNED_STAFF.to_string());
        let load = loads.entry(name.clone()).or_insert_with(|| StaffLoad {
            staff_name: name,
            appointments: 0,
            revenue: 0.0,
        });
        load.appointments += 1;
        load.revenue += appointment.price.unwrap_or(0.0);
    }

    let mut loads: Vec<StaffLoad> = loads.into_values().collect();
    loads.sort_by(|a, b| {
        b.appointments
            .cmp(&a.appointments)
            .then_with(|| a.staff_name.cmp(&b.staff_name))
    });
    loads
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceCount {
    pub service: String,
    pub count: usize,
}

/// How often each service is booked, most popular first
pub fn service_popularity(appointments: &[Appointment]) -> Vec<ServiceCount> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for service in appointments
        .iter()
        .filter(|a| !is_cancelled(a))
        .flat_map(|a| a.services.iter())
    {
        *counts.entry(service.as_str()).or_insert(0) += 1;
    }

    let mut services: Vec<ServiceCount> = counts
        .into_iter()
        .map(|(service, count)| ServiceCount {
            service: service.to_string(),
            count,
        })
        .collect();
    services.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.service.cmp(&b.service)));
    services
}

/// Appointment count and booked revenue per start month.
/// `values[0]` is the count, `values[1]` the revenue.
pub fn monthly_appointments(appointments: &[Appointment], months: usize) -> Vec<SeriesPoint> {
    let booked: Vec<&Appointment> = appointments.iter().filter(|a| !is_cancelled(a)).collect();
    let counts = timeline::monthly_totals(booked.iter().copied(), |a| a.start_at, |_| Some(1.0));
    let revenue = timeline::monthly_totals(booked.iter().copied(), |a| a.start_at, |a| a.price);

    timeline::merge_series(&[&counts, &revenue], months)
}

// ============================================================================
// WAITLIST
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaitlistSummary {
    pub total: usize,
    /// Entries still waiting on a slot
    pub active: usize,
    /// Rounded mean of (preferred start - joined), each floored at 0
    pub average_lead_minutes: Option<i64>,
    /// Entries that carried both timestamps
    pub with_lead_time: usize,
    pub tones: ToneCounts,
}

/// Whole minutes between joining and the preferred start, floored at 0
pub fn lead_minutes(entry: &WaitlistEntry) -> Option<i64> {
    match (entry.created_at, entry.preferred_start) {
        (Some(created), Some(preferred)) => Some((preferred - created).num_minutes().max(0)),
        _ => None,
    }
}

pub fn summarize_waitlist(entries: &[WaitlistEntry]) -> WaitlistSummary {
    let leads: Vec<i64> = entries.iter().filter_map(lead_minutes).collect();
    let average_lead_minutes = if leads.is_empty() {
        None
    } else {
        let mean = leads.iter().sum::<i64>() as f64 / leads.len() as f64;
        Some(mean.round() as i64)
    };
    let tones = ToneCounts::tally(StatusDomain::Waitlist, entries.iter().map(|e| e.status.as_str()));

    WaitlistSummary {
        total: entries.len(),
        active: tones.pending,
        average_lead_minutes,
        with_lead_time: leads.len(),
        tones,
    }
}

// ============================================================================
// SCHEDULING REPORT
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SchedulingSnapshot {
    pub appointments: Vec<Appointment>,
    pub waitlist: Vec<WaitlistEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchedulingReport {
    pub generated_at: DateTime<Utc>,
    pub appointments: AppointmentSummary,
    pub staff_load: Vec<StaffLoad>,
    pub services: Vec<ServiceCount>,
    pub monthly: Vec<SeriesPoint>,
    pub waitlist: WaitlistSummary,
}

pub fn scheduling_report(snapshot: &SchedulingSnapshot, now: DateTime<Utc>, months: usize) -> SchedulingReport {
    SchedulingReport {
        generated_at: now,
        appointments: summarize_appointments(&snapshot.appointments, now),
        staff_load: staff_load(&snapshot.appointments),
        services: service_popularity(&snapshot.appointments),
        monthly: monthly_appointments(&snapshot.appointments, months),
        waitlist: summarize_waitlist(&snapshot.waitlist),
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{map_appointment, map_waitlist_entry};
    use crate::value::RawRecord;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 15, 12, 0, 0).unwrap()
    }

    fn appointment(staff: &str, start: &str, status: &str, price: f64, services: &str) -> Appointment {
        map_appointment(
            &RawRecord::new()
                .with("staff_name", staff)
                .with("start_time", start)
                .with("status", status)
                .with("price", price)
                .with("services", services)
                .with("duration", 60.0),
        )
    }

    fn sample() -> Vec<Appointment> {
        vec![
            appointment("Ana", "2025-03-15T09:00:00Z", "completed", 80.0, "Bath, Nails"),
            appointment("Ana", "2025-03-15T15:00:00Z", "confirmed", 120.0, "Full groom"),
            appointment("Ben", "2025-03-20T10:00:00Z", "scheduled", 60.0, "Bath"),
            appointment("Ben", "2025-03-10T10:00:00Z", "cancelled", 90.0, "Full groom"),
            appointment("Ana", "2025-02-03T10:00:00Z", "no-show", 45.0, "Nails"),
        ]
    }

    #[test]
    fn test_summarize_appointments() {
        let summary = summarize_appointments(&sample(), now());

        assert_eq!(summary.total, 5);
        assert_eq!(summary.today, 2);
        assert_eq!(summary.upcoming, 2);
        assert_eq!(summary.completed, 1);
        assert_eq!(summary.cancelled, 2);
        assert_eq!(summary.booked_revenue, 260.0);
    }

    #[test]
    fn test_staff_load_and_services() {
        let mut appointments = sample();
        appointments.push(map_appointment(&RawRecord::new().with("services", "Bath")));

        let load = staff_load(&appointments);
        assert_eq!(load[0].staff_name, "Ana");
        assert_eq!(load[0].appointments, 2);
        assert_eq!(load[0].revenue, 200.0);
        assert_eq!(load[1].staff_name, "Ben");
        assert_eq!(load[2].staff_name, UNASSIGNED_STAFF);

        let services = service_popularity(&appointments);
        assert_eq!(services[0], ServiceCount { service: "Bath".into(), count: 3 });
        assert_eq!(services[1].service, "Full groom");
        assert_eq!(services[2].service, "Nails");
    }

    #[test]
    fn test_monthly_appointments_skip_cancelled() {
        let monthly = monthly_appointments(&sample(), 6);

        assert_eq!(monthly.len(), 1);
        assert_eq!(monthly[0].month, "2025-03");
        assert_eq!(monthly[0].values, vec![3.0, 260.0]);
    }

    #[test]
    fn test_waitlist_lead_time_thirty_minutes() {
        let entries = vec![
            map_waitlist_entry(
                &RawRecord::new()
                    .with("createdAt", "2025-03-01T10:00:00Z")
                    .with("preferredStart", "2025-03-01T10:30:00Z"),
            ),
            map_waitlist_entry(&RawRecord::new().with("createdAt", "2025-03-01T11:00:00Z")),
        ];

        let summary = summarize_waitlist(&entries);

        assert_eq!(summary.total, 2);
        assert_eq!(summary.with_lead_time, 1);
        assert_eq!(summary.average_lead_minutes, Some(30));
        assert_eq!(summary.active, 2);
    }

    #[test]
    fn test_waitlist_lead_time_floors_and_rounds() {
        let entries = vec![
            // preferred before joining counts as 0
            map_waitlist_entry(
                &RawRecord::new()
                    .with("created_at", "2025-03-01T10:00:00Z")
                    .with("preferred_start", "2025-03-01T09:00:00Z"),
            ),
            map_waitlist_entry(
                &RawRecord::new()
                    .with("created_at", "2025-03-01T10:00:00Z")
                    .with("preferred_start", "2025-03-01T10:45:00Z"),
            ),
        ];

        // (0 + 45) / 2 = 22.5 -> 23
        assert_eq!(summarize_waitlist(&entries).average_lead_minutes, Some(23));
        assert_eq!(summarize_waitlist(&[]).average_lead_minutes, None);
    }
}
