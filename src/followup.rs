use std::collections::HashMap;

use chrono::{DateTime, Utc};

use rust_decimal::Decimal;

use serde::Serialize;

use uuid::Uuid;

use crate::domain::{days_since, is_today, ItemType};
use crate::model::{Contact, ContactView, MailItem, PackageFee};

/// Items uncollected this long enter the dispose-or-return workflow
pub const ABANDONED_AFTER_DAYS: i64 = 30;
const FINAL_NOTICE_AFTER_DAYS: i64 = 28;
const AGING_AFTER_DAYS: i64 = 14;
const DUE_SOON_AFTER_DAYS: i64 = 7;

pub const SUMMARY_TEMPLATE: &str = "Summary Notification (All Items)";
pub const FINAL_NOTICE_TEMPLATE: &str = "Final Notice Before Abandonment";
pub const FEE_REMINDER_TEMPLATE: &str = "Package Fee Reminder";
pub const GENERAL_REMINDER_TEMPLATE: &str = "General Reminder";

/// One mail item with its owner and optional fee, as loaded from storage
#[derive(Debug, Clone)]
pub struct FollowUpEntry {
    pub item: MailItem,
    pub contact: Contact,
    pub fee: Option<PackageFee>,
}

/// Urgency classification of a follow-up group, most urgent first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UrgencyBucket {
    AbandonedCandidate,
    FeePending,
    Aging,
    DueSoon,
    Recent,
}

impl UrgencyBucket {
    /// Classify a group; very old items outrank money owed
    pub fn classify(oldest_days: i64, total_fees: Decimal) -> Self {
        if oldest_days >= ABANDONED_AFTER_DAYS {
            Self::AbandonedCandidate
        } else if total_fees > Decimal::ZERO {
            Self::FeePending
        } else if oldest_days >= AGING_AFTER_DAYS {
            Self::Aging
        } else if oldest_days >= DUE_SOON_AFTER_DAYS {
            Self::DueSoon
        } else {
            Self::Recent
        }
    }

    fn rank(self) -> i64 {
        match self {
            Self::AbandonedCandidate => 4,
            Self::FeePending => 3,
            Self::Aging => 2,
            Self::DueSoon => 1,
            Self::Recent => 0,
        }
    }
}

/// A mail item as shown inside a follow-up group
#[derive(Debug, Clone, Serialize)]
pub struct TrackedItem {
    #[serde(flatten)]
    pub item: MailItem,
    pub fee: Option<PackageFee>,
    pub days_since_received: i64,
}

/// One contact and everything of theirs still waiting on the shelf
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowUpGroup {
    pub contact: ContactView,
    pub packages: Vec<TrackedItem>,
    pub letters: Vec<TrackedItem>,
    pub total_fees: Decimal,
    pub oldest_days: i64,
    pub bucket: UrgencyBucket,
    pub urgency_score: i64,
    pub last_notified: Option<DateTime<Utc>>,
    /// A reminder already went out on this business day
    pub notified_today: bool,
    pub suggested_template: &'static str,
}

impl FollowUpGroup {
    pub fn item_count(&self) -> usize {
        self.packages.len() + self.letters.len()
    }

    pub fn items(&self) -> impl Iterator<Item = &TrackedItem> {
        self.packages.iter().chain(self.letters.iter())
    }
}

#[derive(Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowUpSummary {
    pub total_customers: usize,
    pub total_fees: Decimal,
    pub abandoned_count: usize,
}

/// Group mail items awaiting pickup by contact and rank the groups by urgency.
///
/// Archived, dismissed and no-longer-waiting items are skipped. Groups come
/// back most urgent first, ties broken by mailbox number.
pub fn aggregate(entries: Vec<FollowUpEntry>, now: DateTime<Utc>) -> Vec<FollowUpGroup> {
    let mut by_contact: HashMap<Uuid, (Contact, Vec<TrackedItem>)> = HashMap::new();

    for FollowUpEntry { item, contact, fee } in entries {
        if !item.needs_follow_up() {
            continue;
        }
        // Letters never carry fees
        let fee = match item.item_type {
            ItemType::Package => fee,
            ItemType::Letter => None,
        };
        let tracked = TrackedItem {
            days_since_received: days_since(item.received_date, now),
            item,
            fee,
        };
        by_contact
            .entry(contact.contact_id)
            .or_insert_with(|| (contact, Vec::new()))
            .1
            .push(tracked);
    }

    let mut groups: Vec<FollowUpGroup> = by_contact
        .into_values()
        .map(|(contact, items)| build_group(contact, items, now))
        .collect();

    groups.sort_by(|a, b| {
        b.urgency_score
            .cmp(&a.urgency_score)
            .then_with(|| a.contact.contact.mailbox_number.cmp(&b.contact.contact.mailbox_number))
    });
    groups
}

fn build_group(contact: Contact, mut items: Vec<TrackedItem>, now: DateTime<Utc>) -> FollowUpGroup {
    items.sort_by_key(|tracked| tracked.item.received_date);

    let (packages, letters): (Vec<_>, Vec<_>) = items
        .into_iter()
        .partition(|tracked| tracked.item.item_type == ItemType::Package);

    let total_fees: Decimal = packages
        .iter()
        .filter_map(|tracked| tracked.fee.as_ref())
        .map(PackageFee::outstanding)
        .sum();
    let oldest_days = packages
        .iter()
        .chain(letters.iter())
        .map(|tracked| tracked.days_since_received)
        .max()
        .unwrap_or(0);
    let last_notified = packages
        .iter()
        .chain(letters.iter())
        .filter_map(|tracked| tracked.item.last_notified)
        .max();

    let bucket = UrgencyBucket::classify(oldest_days, total_fees);
    let item_count = packages.len() + letters.len();

    FollowUpGroup {
        contact: contact.into(),
        packages,
        letters,
        total_fees,
        oldest_days,
        bucket,
        urgency_score: bucket.rank() * 1000 + oldest_days,
        last_notified,
        notified_today: last_notified.map_or(false, |sent| is_today(sent, now)),
        suggested_template: suggest_template(item_count, oldest_days, total_fees),
    }
}

/// Name of the template staff most likely want for a reminder
pub fn suggest_template(item_count: usize, oldest_days: i64, total_fees: Decimal) -> &'static str {
    if item_count > 1 {
        SUMMARY_TEMPLATE
    } else if oldest_days >= FINAL_NOTICE_AFTER_DAYS {
        FINAL_NOTICE_TEMPLATE
    } else if total_fees > Decimal::ZERO {
        FEE_REMINDER_TEMPLATE
    } else {
        GENERAL_REMINDER_TEMPLATE
    }
}

pub fn summarize(groups: &[FollowUpGroup]) -> FollowUpSummary {
    FollowUpSummary {
        total_customers: groups.len(),
        total_fees: groups.iter().map(|group| group.total_fees).sum(),
        abandoned_count: groups
            .iter()
            .filter(|group| group.bucket == UrgencyBucket::AbandonedCandidate)
            .count(),
    }
}

/// Ids of the follow-up items old enough to be marked abandoned
pub fn abandonment_candidates(items: &[MailItem], now: DateTime<Utc>) -> Vec<Uuid> {
    items
        .iter()
        .filter(|item| item.needs_follow_up())
        .filter(|item| days_since(item.received_date, now) >= ABANDONED_AFTER_DAYS)
        .map(|item| item.mail_item_id)
        .collect()
}
