// 🧑‍🤝‍🧑 Staff Entities - Team members, shifts, reviews, onboarding

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{nested_records, LABEL_KEY};
use crate::identity;
use crate::resolve;
use crate::value::RawRecord;

// ============================================================================
// STAFF MEMBER
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaffMember {
    pub id: String,
    pub name: String,
    pub role: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub specialties: Vec<String>,

    /// Free-text status, defaults to "active"
    pub status: String,
    pub hired_at: Option<DateTime<Utc>>,
    pub hourly_rate: Option<f64>,
}

pub fn map_staff_member(record: &RawRecord) -> StaffMember {
    let name = resolve::string(
        record,
        &["name", "full_name", "staff_name", "display_name", "employee_name"],
    )
    .unwrap_or_else(|| "Unnamed".to_string());

    StaffMember {
        id: identity::entity_id(record, &["staff_id", "employee_id", "user_id"], "stf", &name),
        role: resolve::string(record, &["role", "title", "position", "job_title"]),
        email: resolve::string(record, &["email", "work_email", "email_address"]),
        phone: resolve::string(record, &["phone", "mobile", "phone_number"]),
        specialties: resolve::string_list(
            record,
            &["specialties", "skills", "services", "certifications"],
        ),
        status: resolve::string(record, &["status", "employment_status", "state"])
            .unwrap_or_else(|| "active".to_string()),
        hired_at: resolve::date(record, &["hired_at", "hire_date", "start_date", "created_at"]),
        hourly_rate: resolve::number(record, &["hourly_rate", "rate", "pay_rate", "wage"]),
        name,
    }
}

// ============================================================================
// SHIFT
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shift {
    pub id: String,

    /// Assigned staff member ("Unassigned" for open shifts)
    pub staff_name: String,
    pub role: Option<String>,
    pub start_at: Option<DateTime<Utc>>,
    pub end_at: Option<DateTime<Utc>>,
    pub break_minutes: Option<f64>,

    /// Free-text status, defaults to "scheduled"
    pub status: String,
    pub location: Option<String>,
    pub notes: Option<String>,
}

impl Shift {
    /// Paid hours: (end - start) minus break, never negative
    pub fn hours(&self) -> Option<f64> {
        let (start, end) = (self.start_at?, self.end_at?);
        let minutes = (end - start).num_minutes() as f64 - self.break_minutes.unwrap_or(0.0);
        Some((minutes / 60.0).max(0.0))
    }

    pub fn is_unassigned(&self) -> bool {
        self.staff_name == UNASSIGNED
    }
}

const UNASSIGNED: &str = "Unassigned";

pub fn map_shift(record: &RawRecord) -> Shift {
    let staff_name = resolve::string(
        record,
        &["staff_name", "staff", "employee_name", "employee", "assigned_to", "name"],
    )
    .unwrap_or_else(|| UNASSIGNED.to_string());

    Shift {
        id: identity::entity_id(record, &["shift_id"], "sft", &staff_name),
        role: resolve::string(record, &["role", "position", "station"]),
        start_at: resolve::date(
            record,
            &["start_at", "start_time", "starts_at", "shift_start", "start"],
        ),
        end_at: resolve::date(record, &["end_at", "end_time", "ends_at", "shift_end", "end"]),
        break_minutes: resolve::number(
            record,
            &["break_minutes", "unpaid_break_minutes", "break"],
        ),
        status: resolve::string(record, &["status", "shift_status", "state"])
            .unwrap_or_else(|| "scheduled".to_string()),
        location: resolve::string(record, &["location", "site", "room"]),
        notes: resolve::string(record, &["notes", "note", "comments"]),
        staff_name,
    }
}

// ============================================================================
// PERFORMANCE REVIEW
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceReview {
    pub id: String,
    pub staff_name: String,
    pub reviewer: Option<String>,
    pub period: Option<String>,
    pub rating: Option<f64>,

    /// Free-text status, defaults to "scheduled"
    pub status: String,
    pub due_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub goals: Vec<ReviewGoal>,
    pub summary: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewGoal {
    pub label: String,
    pub status: Option<String>,

    /// Percent complete, 0-100
    pub progress: Option<f64>,
    pub due_at: Option<DateTime<Utc>>,
}

pub fn map_performance_review(record: &RawRecord) -> PerformanceReview {
    let staff_name = resolve::string(
        record,
        &["staff_name", "employee_name", "employee", "staff", "reviewee", "name"],
    )
    .unwrap_or_else(|| "Unknown".to_string());

    PerformanceReview {
        id: identity::entity_id(record, &["review_id"], "rev", &staff_name),
        reviewer: resolve::string(record, &["reviewer", "reviewer_name", "manager"]),
        period: resolve::string(record, &["period", "review_period", "cycle"]),
        rating: resolve::number(record, &["rating", "overall_rating", "score"]),
        status: resolve::string(record, &["status", "review_status", "state"])
            .unwrap_or_else(|| "scheduled".to_string()),
        due_at: resolve::date(record, &["due_at", "due_date", "review_date", "scheduled_for"]),
        completed_at: resolve::date(record, &["completed_at", "submitted_at", "signed_at"]),
        goals: nested_records(record, &["goals", "objectives", "targets"])
            .iter()
            .map(map_review_goal)
            .collect(),
        summary: resolve::string(record, &["summary", "notes", "comments"]),
        staff_name,
    }
}

/// Keyed form `{"Upsell add-ons": "met"}` puts text values in `status` and
/// numeric values in `progress`.
pub fn map_review_goal(record: &RawRecord) -> ReviewGoal {
    let keyed_text = record
        .get("value")
        .and_then(|v| v.as_text())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string);

    ReviewGoal {
        label: resolve::string(record, &[LABEL_KEY, "name", "title", "goal", "description"])
            .unwrap_or_else(|| "Unnamed".to_string()),
        status: resolve::string(record, &["status", "state", "result"]).or(keyed_text),
        progress: resolve::number(record, &["progress", "percent_complete", "completion", "value"])
            .map(|p| p.clamp(0.0, 100.0)),
        due_at: resolve::date(record, &["due_at", "due_date", "target_date"]),
    }
}

// ============================================================================
// ONBOARDING CHECKLIST
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OnboardingChecklist {
    pub id: String,
    pub staff_name: String,
    pub role: Option<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub due_at: Option<DateTime<Utc>>,

    /// Free-text status, defaults to "in progress"
    pub status: String,
    pub items: Vec<ChecklistItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChecklistItem {
    pub label: String,
    pub completed: bool,
    pub due_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
}

pub fn map_onboarding_checklist(record: &RawRecord) -> OnboardingChecklist {
    let staff_name = resolve::string(
        record,
        &["staff_name", "employee_name", "new_hire", "employee", "name"],
    )
    .unwrap_or_else(|| "New hire".to_string());

    OnboardingChecklist {
        id: identity::entity_id(record, &["checklist_id", "onboarding_id"], "onb", &staff_name),
        role: resolve::string(record, &["role", "position", "title"]),
        start_date: resolve::date(record, &["start_date", "starts_on", "hire_date"]),
        due_at: resolve::date(record, &["due_at", "due_date", "complete_by"]),
        status: resolve::string(record, &["status", "state"])
            .unwrap_or_else(|| "in progress".to_string()),
        items: nested_records(record, &["items", "checklist", "tasks", "steps"])
            .iter()
            .map(map_checklist_item)
            .collect(),
        staff_name,
    }
}

/// Completion comes from an explicit flag, a "done"-like status, or a
/// completion timestamp, in that order. Label-only items are open.
pub fn map_checklist_item(record: &RawRecord) -> ChecklistItem {
    let completed_at = resolve::date(record, &["completed_at", "done_at", "checked_at"]);
    let from_status = resolve::string(record, &["status", "state"]).map(|s| {
        matches!(s.to_lowercase().as_str(), "done" | "complete" | "completed")
    });

    ChecklistItem {
        label: resolve::string(record, &[LABEL_KEY, "name", "title", "task", "description"])
            .unwrap_or_else(|| "Unnamed".to_string()),
        completed: resolve::boolean(
            record,
            &["completed", "done", "complete", "is_complete", "checked", "value"],
        )
        .or(from_status)
        .unwrap_or(completed_at.is_some()),
        due_at: resolve::date(record, &["due_at", "due_date"]),
        completed_at,
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::RawValue;
    use serde_json::json;

    fn record(value: serde_json::Value) -> RawRecord {
        match RawValue::from(value) {
            RawValue::Map(m) => m,
            _ => panic!("test record must be an object"),
        }
    }

    #[test]
    fn test_map_staff_member() {
        let s = map_staff_member(&record(json!({
            "employee_id": 3,
            "full_name": "Ana Ruiz",
            "title": "Senior Groomer",
            "skills": "Hand scissoring\nCats",
            "pay_rate": "$24.50"
        })));

        assert_eq!(s.id, "3");
        assert_eq!(s.name, "Ana Ruiz");
        assert_eq!(s.role.as_deref(), Some("Senior Groomer"));
        assert_eq!(s.specialties, vec!["Hand scissoring", "Cats"]);
        assert_eq!(s.hourly_rate, Some(24.5));
        assert_eq!(s.status, "active");
    }

    #[test]
    fn test_shift_hours() {
        let shift = map_shift(&record(json!({
            "employee": "Ana",
            "start_time": "2025-01-06T09:00:00Z",
            "end_time": "2025-01-06T17:30:00Z",
            "break_minutes": 30
        })));

        assert_eq!(shift.hours(), Some(8.0));
        assert!(!shift.is_unassigned());
    }

    #[test]
    fn test_open_shift() {
        let shift = map_shift(&record(json!({"start": "2025-01-06T09:00:00Z"})));

        assert!(shift.is_unassigned());
        assert!(shift.hours().is_none());
    }

    #[test]
    fn test_map_performance_review_goals() {
        let review = map_performance_review(&record(json!({
            "employee_name": "Ana",
            "score": "4.5",
            "goals": {"Upsell add-ons": "met", "Certification": 60}
        })));

        assert_eq!(review.rating, Some(4.5));
        assert_eq!(review.goals.len(), 2);
        assert_eq!(review.goals[0].label, "Certification");
        assert_eq!(review.goals[0].progress, Some(60.0));
        assert!(review.goals[0].status.is_none());
        assert_eq!(review.goals[1].status.as_deref(), Some("met"));
        assert!(review.goals[1].progress.is_none());
    }

    #[test]
    fn test_map_onboarding_items() {
        let checklist = map_onboarding_checklist(&record(json!({
            "new_hire": "Sam",
            "tasks": [
                {"task": "W-4", "done": true},
                {"title": "Safety training", "status": "Complete"},
                {"name": "Shadow shift", "completed_at": "2025-01-10"},
                "Uniform"
            ]
        })));

        assert_eq!(checklist.staff_name, "Sam");
        assert_eq!(checklist.status, "in progress");
        let done: Vec<bool> = checklist.items.iter().map(|i| i.completed).collect();
        assert_eq!(done, vec![true, true, true, false]);
        assert_eq!(checklist.items[3].label, "Uniform");
    }

    #[test]
    fn test_map_onboarding_keyed_items() {
        let checklist = map_onboarding_checklist(&record(json!({
            "checklist": {"Paperwork": true, "Tour": false}
        })));

        assert_eq!(checklist.items.len(), 2);
        assert_eq!(checklist.items[0].label, "Paperwork");
        assert!(checklist.items[0].completed);
        assert!(!checklist.items[1].completed);
    }
}
