// 🎨 Status Tones - One keyword table for every status string
//
// Every surface that shows a status chip asks this module for its tone.
// A status is lower-cased and matched by substring against the domain's
// keyword sets in a fixed order:
//
//   negative  ->  pending  ->  positive  ->  neutral
//
// Order resolves substring overlaps: "unpaid" is listed as pending and is
// seen before "paid"; "inactive" is negative and is seen before "active".
//
// A positive keyword only counts when it is not directly negated
// ("unavailable", "not received", "uncounted", "disapproved"). A status whose
// only positive hits are negated is pending.

use serde::{Deserialize, Serialize};

// ============================================================================
// TONE
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    /// Active, done, healthy
    Positive,
    /// Needs attention or is waiting on something
    Pending,
    /// Blocked, failed, cancelled
    Negative,
    /// Unknown or empty status
    Neutral,
}

impl Tone {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tone::Positive => "positive",
            Tone::Pending => "pending",
            Tone::Negative => "negative",
            Tone::Neutral => "neutral",
        }
    }
}

// ============================================================================
// DOMAINS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusDomain {
    Appointment,
    Waitlist,
    Client,
    Invoice,
    Expense,
    Payout,
    Payment,
    Payroll,
    TaxFiling,
    Vendor,
    PurchaseOrder,
    Inventory,
    CycleCount,
    Staff,
    Shift,
    Review,
    Onboarding,
}

/// Keyword sets for one domain
#[derive(Debug)]
pub struct ToneKeywords {
    pub positive: &'static [&'static str],
    pub pending: &'static [&'static str],
    pub negative: &'static [&'static str],
}

impl StatusDomain {
    pub const ALL: [StatusDomain; 17] = [
        StatusDomain::Appointment,
        StatusDomain::Waitlist,
        StatusDomain::Client,
        StatusDomain::Invoice,
        StatusDomain::Expense,
        StatusDomain::Payout,
        StatusDomain::Payment,
        StatusDomain::Payroll,
        StatusDomain::TaxFiling,
        StatusDomain::Vendor,
        StatusDomain::PurchaseOrder,
        StatusDomain::Inventory,
        StatusDomain::CycleCount,
        StatusDomain::Staff,
        StatusDomain::Shift,
        StatusDomain::Review,
        StatusDomain::Onboarding,
    ];

    /// The keyword table
    pub fn keywords(&self) -> &'static ToneKeywords {
        match self {
            StatusDomain::Appointment => &ToneKeywords {
                positive: &["confirmed", "completed", "complete", "checked in", "checked-in", "arrived", "in progress"],
                pending: &["scheduled", "pending", "booked", "requested", "tentative", "waiting", "rescheduled"],
                negative: &["cancel", "no-show", "no show", "noshow", "missed", "declined"],
            },
            StatusDomain::Waitlist => &ToneKeywords {
                positive: &["booked", "scheduled", "converted", "confirmed"],
                pending: &["waiting", "pending", "contacted", "new", "open", "offered"],
                negative: &["cancel", "expired", "removed", "declined", "closed"],
            },
            StatusDomain::Client => &ToneKeywords {
                positive: &["active", "vip", "member"],
                pending: &["new", "lead", "prospect", "pending", "trial"],
                negative: &["inactive", "banned", "blocked", "archived", "lapsed", "churned"],
            },
            StatusDomain::Invoice => &ToneKeywords {
                positive: &["paid", "settled", "complete"],
                pending: &["unpaid", "incomplete", "partial", "open", "sent", "pending", "due"],
                negative: &["overdue", "past due", "void", "failed", "uncollectible", "refunded", "written off"],
            },
            StatusDomain::Expense => &ToneKeywords {
                positive: &["paid", "approved", "reimbursed", "reconciled", "cleared"],
                pending: &["unpaid", "pending", "submitted", "review", "awaiting"],
                negative: &["rejected", "declined", "disputed", "flagged", "void"],
            },
            StatusDomain::Payout => &ToneKeywords {
                positive: &["paid", "completed", "complete", "deposited", "sent", "settled"],
                pending: &["pending", "scheduled", "processing", "in transit", "in_transit", "queued"],
                negative: &["failed", "cancel", "returned", "reversed"],
            },
            StatusDomain::Payment => &ToneKeywords {
                positive: &["succeeded", "success", "paid", "captured", "completed", "settled"],
                pending: &["pending", "processing", "authorized", "requires"],
                negative: &["failed", "declined", "refunded", "disputed", "chargeback", "void", "cancel"],
            },
            StatusDomain::Payroll => &ToneKeywords {
                positive: &["paid", "processed", "completed", "complete", "approved"],
                pending: &["draft", "pending", "scheduled", "processing", "review"],
                negative: &["failed", "cancel", "rejected", "error"],
            },
            StatusDomain::TaxFiling => &ToneKeywords {
                positive: &["filed", "paid", "accepted", "complete"],
                pending: &["unfiled", "not filed", "upcoming", "pending", "due", "draft", "prepared", "in progress"],
                negative: &["overdue", "past due", "late", "rejected", "penalty"],
            },
            StatusDomain::Vendor => &ToneKeywords {
                positive: &["active", "preferred", "approved"],
                pending: &["pending", "onboarding", "review", "trial"],
                negative: &["inactive", "suspended", "blocked", "terminated", "archived"],
            },
            StatusDomain::PurchaseOrder => &ToneKeywords {
                positive: &["received", "complete", "closed", "fulfilled", "delivered"],
                pending: &["partial", "draft", "submitted", "ordered", "pending", "sent", "approved", "in transit", "backordered"],
                negative: &["cancel", "rejected", "void", "lost", "damaged"],
            },
            StatusDomain::Inventory => &ToneKeywords {
                positive: &["in stock", "healthy", "available", "active"],
                pending: &["low", "reorder", "on order", "backorder"],
                negative: &["out of stock", "discontinued", "expired", "recalled", "damaged"],
            },
            StatusDomain::CycleCount => &ToneKeywords {
                positive: &["complete", "reconciled", "approved", "verified", "counted"],
                pending: &["scheduled", "pending", "in progress", "review", "open"],
                negative: &["discrepancy", "variance", "failed", "cancel", "missed"],
            },
            StatusDomain::Staff => &ToneKeywords {
                positive: &["active", "employed", "working", "available"],
                pending: &["onboarding", "pending", "invited", "probation", "training", "leave"],
                negative: &["inactive", "terminated", "suspended", "resigned", "archived"],
            },
            StatusDomain::Shift => &ToneKeywords {
                positive: &["confirmed", "completed", "complete", "published", "clocked in", "worked"],
                pending: &["scheduled", "open", "pending", "draft", "unassigned", "requested", "swap"],
                negative: &["cancel", "no-show", "no show", "missed", "declined", "absent"],
            },
            StatusDomain::Review => &ToneKeywords {
                positive: &["completed", "complete", "submitted", "signed", "acknowledged", "finalized"],
                pending: &["incomplete", "not started", "scheduled", "pending", "draft", "in progress", "due"],
                negative: &["overdue", "past due", "missed", "cancel", "escalated"],
            },
            StatusDomain::Onboarding => &ToneKeywords {
                positive: &["complete", "done", "finished", "active"],
                pending: &["incomplete", "in progress", "pending", "started", "invited"],
                negative: &["blocked", "stalled", "cancel", "overdue", "failed"],
            },
        }
    }
}

// ============================================================================
// CLASSIFICATION
// ============================================================================

/// Text that flips the keyword right after it
const NEGATIONS: &[&str] = &["un", "in", "non", "non-", "mis", "dis", "not ", "not-", "not yet ", "never "];

/// Some occurrence of `word` in `status` is not preceded by a negation
fn affirmed(status: &str, word: &str) -> bool {
    status.match_indices(word).any(|(at, _)| {
        let before = &status[..at];
        !NEGATIONS.iter().any(|n| before.ends_with(n))
    })
}

/// Classify a free-text status for a domain
pub fn classify(domain: StatusDomain, status: &str) -> Tone {
    let status = status.trim().to_lowercase();
    if status.is_empty() {
        return Tone::Neutral;
    }

    let table = domain.keywords();
    let hit = |words: &[&str]| words.iter().any(|w| status.contains(*w));

    if hit(table.negative) {
        Tone::Negative
    } else if hit(table.pending) {
        Tone::Pending
    } else if table.positive.iter().any(|w| affirmed(&status, w)) {
        Tone::Positive
    } else if hit(table.positive) {
        Tone::Pending
    } else {
        Tone::Neutral
    }
}

/// Count of statuses per tone
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToneCounts {
    pub positive: usize,
    pub pending: usize,
    pub negative: usize,
    pub neutral: usize,
}

impl ToneCounts {
    pub fn tally<'a>(domain: StatusDomain, statuses: impl IntoIterator<Item = &'a str>) -> Self {
        let mut counts = ToneCounts::default();
        for status in statuses {
            counts.add(classify(domain, status));
        }
        counts
    }

    pub fn add(&mut self, tone: Tone) {
        match tone {
            Tone::Positive => self.positive += 1,
            Tone::Pending => self.pending += 1,
            Tone::Negative => self.negative += 1,
            Tone::Neutral => self.neutral += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.positive + self.pending + self.negative + self.neutral
    }
}

// ============================================================================
// TESTS
// ============================================================================
