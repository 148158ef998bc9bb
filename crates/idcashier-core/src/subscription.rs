//! Subscription status and period arithmetic.
//!
//! Dates are calendar dates and the end date is inclusive: a subscription
//! ending today is still active.

use chrono::{Months, NaiveDate};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::types::Subscription;

/// True while `end_date >= today`.
pub fn is_subscription_active(end_date: NaiveDate, today: NaiveDate) -> bool {
    end_date >= today
}

/// Subscription state as shown on the subscription page.
///
/// `None` covers both "no row" and "lookup failed". Neither blocks the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[serde(tag = "status", rename_all = "camelCase")]
#[ts(export)]
pub enum SubscriptionStatus {
    Active {
        #[ts(as = "String")]
        start: NaiveDate,
        #[ts(as = "String")]
        end: NaiveDate,
    },
    Expired {
        #[ts(as = "String")]
        start: NaiveDate,
        #[ts(as = "String")]
        end: NaiveDate,
    },
    #[default]
    None,
}

impl SubscriptionStatus {
    pub fn from_subscription(subscription: Option<&Subscription>, today: NaiveDate) -> Self {
        match subscription {
            None => SubscriptionStatus::None,
            Some(sub) if is_subscription_active(sub.end_date, today) => SubscriptionStatus::Active {
                start: sub.start_date,
                end: sub.end_date,
            },
            Some(sub) => SubscriptionStatus::Expired {
                start: sub.start_date,
                end: sub.end_date,
            },
        }
    }

    /// Only an expired subscription denies access.
    pub fn grants_access(&self) -> bool {
        !matches!(self, SubscriptionStatus::Expired { .. })
    }

    pub fn end_date(&self) -> Option<NaiveDate> {
        match self {
            SubscriptionStatus::Active { end, .. } | SubscriptionStatus::Expired { end, .. } => Some(*end),
            SubscriptionStatus::None => None,
        }
    }

    /// Days left including today, zero once expired.
    pub fn days_remaining(&self, today: NaiveDate) -> i64 {
        match self {
            SubscriptionStatus::Active { end, .. } => (*end - today).num_days() + 1,
            _ => 0,
        }
    }
}

/// A `{start_date, end_date}` pair sent to the subscription function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SubscriptionPeriod {
    #[ts(as = "String")]
    pub start_date: NaiveDate,
    #[ts(as = "String")]
    pub end_date: NaiveDate,
}

/// Adds calendar months, clamping to the last day of the target month.
///
/// ## Example
/// ```rust
/// use chrono::NaiveDate;
/// use idcashier_core::subscription::add_months;
///
/// let jan31 = NaiveDate::from_ymd_opt(2024, 1, 31).unwrap();
/// assert_eq!(add_months(jan31, 1), NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
/// ```
pub fn add_months(date: NaiveDate, months: u32) -> NaiveDate {
    date.checked_add_months(Months::new(months)).unwrap_or(NaiveDate::MAX)
}

/// Computes the period produced by buying `months` more months.
///
/// An active subscription is extended from its current end; otherwise the
/// new period starts at `start`.
pub fn calculate_subscription_period(
    start: NaiveDate,
    current_end: Option<NaiveDate>,
    months: u32,
    today: NaiveDate,
) -> SubscriptionPeriod {
    let from = match current_end {
        Some(end) if is_subscription_active(end, today) => end,
        _ => start,
    };

    SubscriptionPeriod {
        start_date: from,
        end_date: add_months(from, months),
    }
}
