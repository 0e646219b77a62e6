//! Event types for ABM admin notifications
//!
//! Every state change made through the admin console produces one event.
//! The console logs it and prints `message()` as a notice line.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::availability::SelectionMode;
use crate::pricing::PricingRule;
use crate::time;

/// ABM admin event types
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum AdminEvent {
    /// Selected dates committed to the blocked set
    DatesBlocked {
        artist_id: Uuid,
        dates: Vec<NaiveDate>,
        timestamp: DateTime<Utc>,
    },

    /// Commit attempted but every selected date was already blocked
    NoChanges {
        artist_id: Uuid,
        timestamp: DateTime<Utc>,
    },

    /// One date unblocked
    DateUnblocked {
        artist_id: Uuid,
        date: NaiveDate,
        timestamp: DateTime<Utc>,
    },

    /// All blocked dates removed
    BlockedDatesCleared {
        artist_id: Uuid,
        count: usize,
        timestamp: DateTime<Utc>,
    },

    /// Calendar picker switched between single and range mode
    SelectionModeChanged {
        artist_id: Uuid,
        mode: SelectionMode,
        timestamp: DateTime<Utc>,
    },

    /// Pricing override added or overwritten
    PricingRuleAdded {
        artist_id: Uuid,
        rule: PricingRule,
        replaced: Option<Decimal>,
        timestamp: DateTime<Utc>,
    },

    /// Pricing override removed
    PricingRuleRemoved {
        artist_id: Uuid,
        rule: String,
        price: Decimal,
        timestamp: DateTime<Utc>,
    },

    /// Fallback price changed
    DefaultPriceChanged {
        artist_id: Uuid,
        price: Decimal,
        timestamp: DateTime<Utc>,
    },
}

impl AdminEvent {
    pub fn dates_blocked(artist_id: Uuid, dates: Vec<NaiveDate>) -> Self {
        AdminEvent::DatesBlocked {
            artist_id,
            dates,
            timestamp: time::now(),
        }
    }

    pub fn no_changes(artist_id: Uuid) -> Self {
        AdminEvent::NoChanges {
            artist_id,
            timestamp: time::now(),
        }
    }

    pub fn date_unblocked(artist_id: Uuid, date: NaiveDate) -> Self {
        AdminEvent::DateUnblocked {
            artist_id,
            date,
            timestamp: time::now(),
        }
    }

    pub fn blocked_dates_cleared(artist_id: Uuid, count: usize) -> Self {
        AdminEvent::BlockedDatesCleared {
            artist_id,
            count,
            timestamp: time::now(),
        }
    }

    pub fn selection_mode_changed(artist_id: Uuid, mode: SelectionMode) -> Self {
        AdminEvent::SelectionModeChanged {
            artist_id,
            mode,
            timestamp: time::now(),
        }
    }

    pub fn pricing_rule_added(
        artist_id: Uuid,
        rule: PricingRule,
        replaced: Option<Decimal>,
    ) -> Self {
        AdminEvent::PricingRuleAdded {
            artist_id,
            rule,
            replaced,
            timestamp: time::now(),
        }
    }

    pub fn pricing_rule_removed(artist_id: Uuid, rule: String, price: Decimal) -> Self {
        AdminEvent::PricingRuleRemoved {
            artist_id,
            rule,
            price,
            timestamp: time::now(),
        }
    }

    pub fn default_price_changed(artist_id: Uuid, price: Decimal) -> Self {
        AdminEvent::DefaultPriceChanged {
            artist_id,
            price,
            timestamp: time::now(),
        }
    }

    /// Artist the event belongs to
    pub fn artist_id(&self) -> Uuid {
        match self {
            AdminEvent::DatesBlocked { artist_id, .. }
            | AdminEvent::NoChanges { artist_id, .. }
            | AdminEvent::DateUnblocked { artist_id, .. }
            | AdminEvent::BlockedDatesCleared { artist_id, .. }
            | AdminEvent::SelectionModeChanged { artist_id, .. }
            | AdminEvent::PricingRuleAdded { artist_id, .. }
            | AdminEvent::PricingRuleRemoved { artist_id, .. }
            | AdminEvent::DefaultPriceChanged { artist_id, .. } => *artist_id,
        }
    }

    /// Event type name as serialized in the `type` tag
    pub fn event_type(&self) -> &'static str {
        match self {
            AdminEvent::DatesBlocked { .. } => "DatesBlocked",
            AdminEvent::NoChanges { .. } => "NoChanges",
            AdminEvent::DateUnblocked { .. } => "DateUnblocked",
            AdminEvent::BlockedDatesCleared { .. } => "BlockedDatesCleared",
            AdminEvent::SelectionModeChanged { .. } => "SelectionModeChanged",
            AdminEvent::PricingRuleAdded { .. } => "PricingRuleAdded",
            AdminEvent::PricingRuleRemoved { .. } => "PricingRuleRemoved",
            AdminEvent::DefaultPriceChanged { .. } => "DefaultPriceChanged",
        }
    }

    /// One-line notice for the operator
    pub fn message(&self) -> String {
        match self {
            AdminEvent::DatesBlocked { dates, .. } => match dates.len() {
                1 => format!("Blocked {}", dates[0]),
                n => format!("Blocked {} dates", n),
            },
            AdminEvent::NoChanges { .. } => {
                "No changes: selected dates are already blocked".to_string()
            }
            AdminEvent::DateUnblocked { date, .. } => format!("Unblocked {}", date),
            AdminEvent::BlockedDatesCleared { count, .. } => {
                format!("Cleared {} blocked date(s)", count)
            }
            AdminEvent::SelectionModeChanged { mode, .. } => {
                format!("Selection mode: {}", mode)
            }
            AdminEvent::PricingRuleAdded { rule, replaced, .. } => match replaced {
                Some(old) => format!("Updated {} (was {})", rule, old),
                None => format!("Added {}", rule),
            },
            AdminEvent::PricingRuleRemoved { rule, price, .. } => {
                format!("Removed {} ({})", rule, price)
            }
            AdminEvent::DefaultPriceChanged { price, .. } => {
                format!("Default price set to {}", price)
            }
        }
    }
}
