//! Event type and country catalogs
//!
//! Maps the ids used as pricing keys to display labels. Pricing itself does
//! not consult the catalog; unknown ids still resolve (to the default price).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::pricing::{CountryCode, EventTypeId};

/// Known event types and countries with their labels
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Catalog {
    #[serde(default)]
    pub event_types: BTreeMap<EventTypeId, String>,
    #[serde(default)]
    pub countries: BTreeMap<CountryCode, String>,
}

impl Catalog {
    /// Event types and Gulf markets used by the mock data
    pub fn builtin() -> Self {
        let event_types = [
            ("wedding", "Wedding"),
            ("corporate", "Corporate Event"),
            ("festival", "Festival"),
            ("private", "Private Party"),
            ("concert", "Concert"),
        ];
        let countries = [
            ("ae", "United Arab Emirates"),
            ("sa", "Saudi Arabia"),
            ("qa", "Qatar"),
            ("kw", "Kuwait"),
            ("bh", "Bahrain"),
            ("om", "Oman"),
        ];

        Self {
            event_types: event_types
                .iter()
                .map(|(id, label)| (EventTypeId::new(*id), label.to_string()))
                .collect(),
            countries: countries
                .iter()
                .map(|(code, label)| (CountryCode::new(*code), label.to_string()))
                .collect(),
        }
    }

    pub fn has_event_type(&self, id: &str) -> bool {
        self.event_types.contains_key(id)
    }

    pub fn has_country(&self, code: &str) -> bool {
        self.countries.contains_key(code)
    }

    /// Label for an event type, or the id itself when unknown
    pub fn event_type_label<'a>(&'a self, id: &'a str) -> &'a str {
        self.event_types.get(id).map(String::as_str).unwrap_or(id)
    }

    /// Label for a country, or the code itself when unknown
    pub fn country_label<'a>(&'a self, code: &'a str) -> &'a str {
        self.countries.get(code).map(String::as_str).unwrap_or(code)
    }

    /// Add entries from `other`, keeping existing labels on conflict
    pub fn merge(&mut self, other: Catalog) {
        for (id, label) in other.event_types {
            self.event_types.entry(id).or_insert(label);
        }
        for (code, label) in other.countries {
            self.countries.entry(code).or_insert(label);
        }
    }
}
