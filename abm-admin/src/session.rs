//! In-memory admin session
//!
//! Holds every artist loaded from the seed, each with its own pricing matrix
//! and availability calendar. The artist-management commands and the booking
//! page quote read and write the same calendar. Nothing is persisted.

use abm_common::availability::{
    AvailabilityCalendar, BlockOutcome, SelectOutcome, SelectionSnapshot,
};
use abm_common::catalog::Catalog;
use abm_common::events::AdminEvent;
use abm_common::pricing::{PriceTier, PricingMatrix, ResolvedPrice, RuleDraft, RuleKey};
use abm_common::seed::SeedData;
use abm_common::{Error, Result};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

/// One artist's editable state
#[derive(Debug, Clone)]
pub struct Artist {
    pub id: Uuid,
    pub name: String,
    pub genre: Option<String>,
    pub pricing: PricingMatrix,
    pub calendar: AvailabilityCalendar,
}

/// Booking page answer for one date
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    pub artist: String,
    pub event_type: String,
    pub country: String,
    pub date: NaiveDate,
    pub price: Decimal,
    pub tier: PriceTier,
    pub available: bool,
}

/// Export document for one artist
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ArtistExport<'a> {
    id: Uuid,
    name: &'a str,
    pricing: &'a PricingMatrix,
    blocked_dates: Vec<NaiveDate>,
    selection: SelectionSnapshot,
}

/// All artists plus the currently active one
pub struct Session {
    catalog: Catalog,
    artists: Vec<Artist>,
    active: usize,
    history: Vec<AdminEvent>,
}

impl Session {
    /// Build a session from seed data
    ///
    /// Artists without an id get a fresh UUID. Seed catalog entries are
    /// merged over the builtin catalog.
    pub fn from_seed(seed: SeedData) -> Result<Self> {
        seed.validate()?;

        let mut catalog = Catalog::builtin();
        catalog.merge(seed.catalog);

        let artists: Vec<Artist> = seed
            .artists
            .into_iter()
            .map(|a| Artist {
                id: a.id.unwrap_or_else(Uuid::new_v4),
                name: a.name,
                genre: a.genre,
                pricing: a.pricing,
                calendar: AvailabilityCalendar::new(a.blocked),
            })
            .collect();

        info!("Session started with {} artist(s)", artists.len());

        Ok(Self {
            catalog,
            artists,
            active: 0,
            history: Vec::new(),
        })
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn artists(&self) -> &[Artist] {
        &self.artists
    }

    pub fn active(&self) -> &Artist {
        &self.artists[self.active]
    }

    fn active_mut(&mut self) -> &mut Artist {
        &mut self.artists[self.active]
    }

    pub fn active_index(&self) -> usize {
        self.active
    }

    /// Events emitted so far, oldest first
    pub fn history(&self) -> &[AdminEvent] {
        &self.history
    }

    fn record(&mut self, event: AdminEvent) -> AdminEvent {
        info!(
            event_type = event.event_type(),
            artist_id = %event.artist_id(),
            "{}",
            event.message()
        );
        self.history.push(event.clone());
        event
    }

    /// Switch the active artist
    ///
    /// Accepts a 1-based list index, a UUID prefix, or a case-insensitive
    /// name. Ambiguous prefixes are rejected.
    pub fn use_artist(&mut self, selector: &str) -> Result<&Artist> {
        let selector = selector.trim();

        let index = if let Ok(n) = selector.parse::<usize>() {
            (1..=self.artists.len())
                .contains(&n)
                .then(|| n - 1)
                .ok_or_else(|| Error::NotFound(format!("No artist #{}", n)))?
        } else if let Some(i) = self
            .artists
            .iter()
            .position(|a| a.name.eq_ignore_ascii_case(selector))
        {
            i
        } else {
            let prefix = selector.to_lowercase();
            let matches: Vec<usize> = self
                .artists
                .iter()
                .enumerate()
                .filter(|(_, a)| a.id.to_string().starts_with(&prefix))
                .map(|(i, _)| i)
                .collect();
            match matches.as_slice() {
                [i] => *i,
                [] => return Err(Error::NotFound(format!("No artist matches '{}'", selector))),
                _ => {
                    return Err(Error::InvalidInput(format!(
                        "'{}' matches {} artists",
                        selector,
                        matches.len()
                    )))
                }
            }
        };

        self.active = index;
        let artist = &self.artists[index];
        info!("Active artist: {} ({})", artist.name, artist.id);
        Ok(artist)
    }

    /// Effective price for the active artist
    pub fn price(&self, event_type: &str, country: &str) -> ResolvedPrice {
        self.active().pricing.resolve(event_type, country)
    }

    /// Validate and apply a pricing rule to the active artist
    pub fn add_rule(&mut self, draft: &RuleDraft) -> Result<AdminEvent> {
        let rule = draft.validate()?;

        if let Some(event_type) = draft.event_type.as_deref().map(str::trim) {
            if !self.catalog.has_event_type(event_type) {
                warn!("Event type '{}' is not in the catalog", event_type);
            }
        }
        if let Some(country) = draft.country.as_deref().map(str::trim) {
            if !self.catalog.has_country(country) {
                warn!("Country '{}' is not in the catalog", country);
            }
        }

        let artist = self.active_mut();
        let replaced = artist.pricing.add_rule(rule.clone());
        let id = artist.id;
        Ok(self.record(AdminEvent::pricing_rule_added(id, rule, replaced)))
    }

    /// Remove a pricing rule from the active artist; None if it did not exist
    pub fn remove_rule(&mut self, key: &RuleKey) -> Option<AdminEvent> {
        let artist = self.active_mut();
        let price = artist.pricing.remove_rule(key)?;
        let id = artist.id;
        Some(self.record(AdminEvent::pricing_rule_removed(id, key.to_string(), price)))
    }

    /// Replace the default price; must be greater than zero
    pub fn set_default_price(&mut self, price: Decimal) -> Result<AdminEvent> {
        if price <= Decimal::ZERO {
            return Err(Error::InvalidInput(format!(
                "Price must be greater than zero (got {})",
                price
            )));
        }
        let artist = self.active_mut();
        artist.pricing.set_default(price);
        let id = artist.id;
        Ok(self.record(AdminEvent::default_price_changed(id, price)))
    }

    /// Set range mode on/off, or toggle it when `enabled` is None
    pub fn set_range_mode(&mut self, enabled: Option<bool>) -> AdminEvent {
        let artist = self.active_mut();
        let mode = match enabled {
            Some(on) => {
                artist.calendar.set_range_mode(on);
                artist.calendar.selection().mode()
            }
            None => artist.calendar.toggle_range_mode(),
        };
        let id = artist.id;
        self.record(AdminEvent::selection_mode_changed(id, mode))
    }

    pub fn select(&mut self, date: NaiveDate) -> SelectOutcome {
        self.active_mut().calendar.select(date)
    }

    /// Drop the pending selection without blocking anything
    pub fn cancel_selection(&mut self) {
        self.active_mut().calendar.clear_selection();
    }

    /// Commit the active artist's selection
    pub fn block(&mut self) -> AdminEvent {
        let artist = self.active_mut();
        let outcome = artist.calendar.block_dates();
        let id = artist.id;
        let event = match outcome {
            BlockOutcome::Blocked { dates } => AdminEvent::dates_blocked(id, dates),
            BlockOutcome::NoChanges => AdminEvent::no_changes(id),
        };
        self.record(event)
    }

    /// Unblock a date; None if it was not blocked
    pub fn unblock(&mut self, date: NaiveDate) -> Option<AdminEvent> {
        let artist = self.active_mut();
        if !artist.calendar.remove_blocked_date(date) {
            return None;
        }
        let id = artist.id;
        Some(self.record(AdminEvent::date_unblocked(id, date)))
    }

    pub fn clear_blocked(&mut self) -> AdminEvent {
        let artist = self.active_mut();
        let count = artist.calendar.clear_all_blocked_dates();
        let id = artist.id;
        self.record(AdminEvent::blocked_dates_cleared(id, count))
    }

    /// Booking page view of the active artist
    pub fn quote(&self, event_type: &str, country: &str, date: NaiveDate) -> Quote {
        let artist = self.active();
        let resolved = artist.pricing.resolve(event_type, country);
        Quote {
            artist: artist.name.clone(),
            event_type: self.catalog.event_type_label(event_type).to_string(),
            country: self.catalog.country_label(country).to_string(),
            date,
            price: resolved.price,
            tier: resolved.tier,
            available: artist.calendar.is_available(&date),
        }
    }

    /// Active artist's pricing, blocked dates and selection as pretty JSON
    pub fn export_json(&self) -> Result<String> {
        let artist = self.active();
        let export = ArtistExport {
            id: artist.id,
            name: &artist.name,
            pricing: &artist.pricing,
            blocked_dates: artist.calendar.blocked().iter().copied().collect(),
            selection: artist.calendar.selection().snapshot(),
        };
        Ok(serde_json::to_string_pretty(&export)?)
    }
}
