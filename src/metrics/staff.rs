// 👥 Staff Metrics - Headcount, shift hours, reviews, onboarding

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::common::{is_before_today, normalize_category};
use crate::entities::{OnboardingChecklist, PerformanceReview, Shift, StaffMember};
use crate::tone::{classify, StatusDomain, Tone, ToneCounts};

// ============================================================================
// HEADCOUNT
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleCount {
    pub role: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Headcount {
    pub total: usize,
    /// Members whose status is not negative (terminated, inactive, ...)
    pub current: usize,
    pub by_role: Vec<RoleCount>,
    pub tones: ToneCounts,
}

pub fn headcount(members: &[StaffMember]) -> Headcount {
    let current: Vec<&StaffMember> = members
        .iter()
        .filter(|m| classify(StatusDomain::Staff, &m.status) != Tone::Negative)
        .collect();

    let mut roles: HashMap<String, usize> = HashMap::new();
    for member in &current {
        *roles.entry(normalize_category(member.role.as_deref())).or_insert(0) += 1;
    }
    let mut by_role: Vec<RoleCount> = roles
        .into_iter()
        .map(|(role, count)| RoleCount { role, count })
        .collect();
    by_role.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.role.cmp(&b.role)));

    Headcount {
        total: members.len(),
        current: current.len(),
        by_role,
        tones: ToneCounts::tally(StatusDomain::Staff, members.iter().map(|m| m.status.as_str())),
    }
}

// ============================================================================
// SHIFTS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaffHours {
    pub staff_name: String,
    pub shifts: usize,
    pub hours: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShiftSummary {
    pub count: usize,
    /// Σ paid hours over shifts that were not cancelled
    pub scheduled_hours: f64,
    /// Assigned staff only, most hours first
    pub hours_by_staff: Vec<StaffHours>,
    /// Unassigned shifts that still need cover
    pub open_shifts: usize,
    pub upcoming: usize,
    pub tones: ToneCounts,
}

pub fn summarize_shifts(shifts: &[Shift], now: DateTime<Utc>) -> ShiftSummary {
    let active: Vec<&Shift> = shifts
        .iter()
        .filter(|s| classify(StatusDomain::Shift, &s.status) != Tone::Negative)
        .collect();

    let mut per_staff: HashMap<&str, StaffHours> = HashMap::new();
    for shift in active.iter().filter(|s| !s.is_unassigned()) {
        let entry = per_staff
            .entry(shift.staff_name.as_str())
            .or_insert_with(|| StaffHours {
                staff_name: shift.staff_name.clone(),
                shifts: 0,
                hours: 0.0,
            });
        entry.shifts += 1;
        entry.hours += shift.hours().unwrap_or(0.0);
    }
    let mut hours_by_staff: Vec<StaffHours> = per_staff.into_values().collect();
    hours_by_staff.sort_by(|a, b| {
        b.hours
            .total_cmp(&a.hours)
            .then_with(|| a.staff_name.cmp(&b.staff_name))
    });

    ShiftSummary {
        count: shifts.len(),
        scheduled_hours: active.iter().filter_map(|s| s.hours()).sum(),
        hours_by_staff,
        open_shifts: active.iter().filter(|s| s.is_unassigned()).count(),
        upcoming: active
            .iter()
            .filter(|s| s.start_at.map_or(false, |start| start >= now))
            .count(),
        tones: ToneCounts::tally(StatusDomain::Shift, shifts.iter().map(|s| s.status.as_str())),
    }
}

// ============================================================================
// REVIEWS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewSummary {
    pub count: usize,
    pub completed: usize,
    pub pending: usize,
    /// Not completed and due before today
    pub overdue: usize,
    /// Mean over reviews that carry a rating
    pub average_rating: Option<f64>,
    pub tones: ToneCounts,
}

fn review_completed(review: &PerformanceReview) -> bool {
    review.completed_at.is_some() || classify(StatusDomain::Review, &review.status) == Tone::Positive
}

pub fn summarize_reviews(reviews: &[PerformanceReview], now: DateTime<Utc>) -> ReviewSummary {
    let ratings: Vec<f64> = reviews.iter().filter_map(|r| r.rating).collect();
    let open: Vec<&PerformanceReview> = reviews
        .iter()
        .filter(|r| !review_completed(r) && !r.status.to_lowercase().contains("cancel"))
        .collect();

    ReviewSummary {
        count: reviews.len(),
        completed: reviews.iter().filter(|r| review_completed(r)).count(),
        pending: open.iter().filter(|r| !is_before_today(r.due_at, now)).count(),
        overdue: open.iter().filter(|r| is_before_today(r.due_at, now)).count(),
        average_rating: if ratings.is_empty() {
            None
        } else {
            Some(ratings.iter().sum::<f64>() / ratings.len() as f64)
        },
        tones: ToneCounts::tally(StatusDomain::Review, reviews.iter().map(|r| r.status.as_str())),
    }
}

// ============================================================================
// ONBOARDING
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OnboardingProgress {
    pub checklist_id: String,
    pub staff_name: String,
    pub role: Option<String>,
    pub completed_items: usize,
    pub total_items: usize,
    /// Rounded percent of items done; `None` for an empty checklist
    pub percent_complete: Option<f64>,
    /// Due before today with items still open
    pub overdue: bool,
}

pub fn onboarding_progress(checklists: &[OnboardingChecklist], now: DateTime<Utc>) -> Vec<OnboardingProgress> {
    checklists
        .iter()
        .map(|checklist| {
            let total_items = checklist.items.len();
            let completed_items = checklist.items.iter().filter(|i| i.completed).count();
            let percent_complete = (total_items > 0)
                .then(|| (completed_items as f64 / total_items as f64 * 100.0).round());

            OnboardingProgress {
                checklist_id: checklist.id.clone(),
                staff_name: checklist.staff_name.clone(),
                role: checklist.role.clone(),
                completed_items,
                total_items,
                percent_complete,
                overdue: completed_items < total_items && is_before_today(checklist.due_at, now),
            }
        })
        .collect()
}

// ============================================================================
// STAFF REPORT
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StaffSnapshot {
    pub members: Vec<StaffMember>,
    pub shifts: Vec<Shift>,
    pub reviews: Vec<PerformanceReview>,
    pub onboarding: Vec<OnboardingChecklist>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaffReport {
    pub generated_at: DateTime<Utc>,
    pub headcount: Headcount,
    pub shifts: ShiftSummary,
    pub reviews: ReviewSummary,
    pub onboarding: Vec<OnboardingProgress>,
}

pub fn staff_report(snapshot: &StaffSnapshot, now: DateTime<Utc>) -> StaffReport {
    StaffReport {
        generated_at: now,
        headcount: headcount(&snapshot.members),
        shifts: summarize_shifts(&snapshot.shifts, now),
        reviews: summarize_reviews(&snapshot.reviews, now),
        onboarding: onboarding_progress(&snapshot.onboarding, now),
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{map_onboarding_checklist, map_performance_review, map_shift, map_staff_member};
    use crate::metrics::common::UNCATEGORIZED;
    use crate::value::{RawRecord, RawValue};
    use chrono::TimeZone;
    use serde_json::json;

    fn record(value: serde_json::Value) -> RawRecord {
        match RawValue::from(value) {
            RawValue::Map(m) => m,
            _ => panic!("test record must be an object"),
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 15, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_headcount() {
        let members: Vec<StaffMember> = [
            json!({"name": "Ana", "role": "Groomer"}),
            json!({"name": "Ben", "role": "Groomer", "status": "onboarding"}),
            json!({"name": "Cy", "role": "Bather", "status": "terminated"}),
            json!({"name": "Di"}),
        ]
        .into_iter()
        .map(|r| map_staff_member(&record(r)))
        .collect();

        let count = headcount(&members);

        assert_eq!(count.total, 4);
        assert_eq!(count.current, 3);
        assert_eq!(count.by_role[0], RoleCount { role: "Groomer".into(), count: 2 });
        assert_eq!(count.by_role[1].role, UNCATEGORIZED);
        assert_eq!(count.tones.negative, 1);
        assert_eq!(count.tones.pending, 1);
    }

    #[test]
    fn test_summarize_shifts() {
        let shifts: Vec<Shift> = [
            json!({"staff_name": "Ana", "start": "2025-03-15T09:00:00Z", "end": "2025-03-15T17:00:00Z", "break_minutes": 30}),
            json!({"staff_name": "Ana", "start": "2025-03-16T09:00:00Z", "end": "2025-03-16T13:00:00Z"}),
            json!({"staff_name": "Ben", "start": "2025-03-16T09:00:00Z", "end": "2025-03-16T15:00:00Z", "status": "cancelled"}),
            json!({"start": "2025-03-17T09:00:00Z", "end": "2025-03-17T12:00:00Z", "status": "open"}),
        ]
        .into_iter()
        .map(|r| map_shift(&record(r)))
        .collect();

        let summary = summarize_shifts(&shifts, now());

        assert_eq!(summary.count, 4);
        assert_eq!(summary.scheduled_hours, 14.5);
        assert_eq!(summary.hours_by_staff.len(), 1);
        assert_eq!(summary.hours_by_staff[0].hours, 11.5);
        assert_eq!(summary.hours_by_staff[0].shifts, 2);
        assert_eq!(summary.open_shifts, 1);
        assert_eq!(summary.upcoming, 2);
    }

    #[test]
    fn test_summarize_reviews() {
        let reviews: Vec<PerformanceReview> = [
            json!({"employee": "Ana", "rating": 4.5, "status": "completed"}),
            json!({"employee": "Ben", "rating": 3.5, "completed_at": "2025-02-01"}),
            json!({"employee": "Cy", "due_date": "2025-03-01"}),
            json!({"employee": "Di", "due_date": "2025-04-01", "status": "draft"}),
        ]
        .into_iter()
        .map(|r| map_performance_review(&record(r)))
        .collect();

        let summary = summarize_reviews(&reviews, now());

        assert_eq!(summary.completed, 2);
        assert_eq!(summary.pending, 1);
        assert_eq!(summary.overdue, 1);
        assert_eq!(summary.average_rating, Some(4.0));
    }

    #[test]
    fn test_onboarding_progress() {
        let checklists: Vec<OnboardingChecklist> = [
            json!({
                "new_hire": "Eve",
                "due_date": "2025-03-01",
                "tasks": [
                    {"task": "Paperwork", "done": true},
                    {"task": "Tour", "status": "Done"},
                    {"task": "Shadow shift"}
                ]
            }),
            json!({"new_hire": "Fay"}),
        ]
        .into_iter()
        .map(|r| map_onboarding_checklist(&record(r)))
        .collect();

        let progress = onboarding_progress(&checklists, now());

        assert_eq!(progress[0].completed_items, 2);
        assert_eq!(progress[0].total_items, 3);
        assert_eq!(progress[0].percent_complete, Some(67.0));
        assert!(progress[0].overdue);
        assert_eq!(progress[1].percent_complete, None);
        assert!(!progress[1].overdue);
    }
}
