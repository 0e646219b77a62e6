//! Artist pricing matrix
//!
//! An artist quotes one price per booking. The price is picked from a
//! four-tier override hierarchy, first match wins:
//!
//! 1. Specific combination (`specific[event_type][country]`)
//! 2. Event type (`event_types[event_type]`)
//! 3. Country (`countries[country]`)
//! 4. Default
//!
//! Tiers never combine. The matrix stores whatever it is given; price and
//! key validation belongs to the caller (see [`RuleDraft`]).

use std::borrow::Borrow;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use tracing::debug;

use crate::{Error, Result};

/// Event type identifier (e.g. `wedding`, `corporate`)
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventTypeId(String);

impl EventTypeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for EventTypeId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for EventTypeId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl fmt::Display for EventTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Country identifier (lowercase ISO code in the seed data, e.g. `ae`)
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CountryCode(String);

impl CountryCode {
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for CountryCode {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for CountryCode {
    fn from(code: &str) -> Self {
        Self::new(code)
    }
}

impl fmt::Display for CountryCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Tier of the hierarchy that produced a price
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PriceTier {
    Specific,
    EventType,
    Country,
    Default,
}

impl PriceTier {
    /// Human-readable name for console output
    pub fn display_name(&self) -> &'static str {
        match self {
            PriceTier::Specific => "specific combination",
            PriceTier::EventType => "event type override",
            PriceTier::Country => "country override",
            PriceTier::Default => "default price",
        }
    }
}

impl fmt::Display for PriceTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Price together with the tier it came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ResolvedPrice {
    pub price: Decimal,
    pub tier: PriceTier,
}

/// Override kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RuleKind {
    EventType,
    Country,
    Specific,
}

impl RuleKind {
    pub fn all_variants() -> &'static [RuleKind] {
        &[RuleKind::EventType, RuleKind::Country, RuleKind::Specific]
    }
}

impl FromStr for RuleKind {
    type Err = Error;

    /// Accepts `event-type`, `event_type`, `eventtype`, `country`, `specific`
    /// (case insensitive)
    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "event-type" | "event_type" | "eventtype" => Ok(RuleKind::EventType),
            "country" => Ok(RuleKind::Country),
            "specific" => Ok(RuleKind::Specific),
            other => {
                let expected: Vec<String> =
                    RuleKind::all_variants().iter().map(|k| k.to_string()).collect();
                Err(Error::InvalidInput(format!(
                    "Unknown rule kind '{}' (expected one of: {})",
                    other,
                    expected.join(", ")
                )))
            }
        }
    }
}

impl fmt::Display for RuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RuleKind::EventType => "event-type",
            RuleKind::Country => "country",
            RuleKind::Specific => "specific",
        };
        f.write_str(name)
    }
}

/// A single price override
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum PricingRule {
    #[serde(rename_all = "camelCase")]
    EventType { event_type: EventTypeId, price: Decimal },
    Country { country: CountryCode, price: Decimal },
    #[serde(rename_all = "camelCase")]
    Specific {
        event_type: EventTypeId,
        country: CountryCode,
        price: Decimal,
    },
}

impl PricingRule {
    pub fn kind(&self) -> RuleKind {
        match self {
            PricingRule::EventType { .. } => RuleKind::EventType,
            PricingRule::Country { .. } => RuleKind::Country,
            PricingRule::Specific { .. } => RuleKind::Specific,
        }
    }

    pub fn price(&self) -> Decimal {
        match self {
            PricingRule::EventType { price, .. }
            | PricingRule::Country { price, .. }
            | PricingRule::Specific { price, .. } => *price,
        }
    }

    /// Key addressing this rule for removal
    pub fn key(&self) -> RuleKey {
        match self {
            PricingRule::EventType { event_type, .. } => RuleKey::EventType(event_type.clone()),
            PricingRule::Country { country, .. } => RuleKey::Country(country.clone()),
            PricingRule::Specific {
                event_type,
                country,
                ..
            } => RuleKey::Specific(event_type.clone(), country.clone()),
        }
    }
}

impl fmt::Display for PricingRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} = {}", self.key(), self.price())
    }
}

/// Address of an override in the matrix
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleKey {
    EventType(EventTypeId),
    Country(CountryCode),
    Specific(EventTypeId, CountryCode),
}

impl fmt::Display for RuleKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleKey::EventType(event_type) => write!(f, "event-type {}", event_type),
            RuleKey::Country(country) => write!(f, "country {}", country),
            RuleKey::Specific(event_type, country) => {
                write!(f, "specific {} × {}", event_type, country)
            }
        }
    }
}

/// Unvalidated rule as entered by an operator
///
/// Mirrors the pricing form: the kind decides which keys are required.
#[derive(Debug, Clone, Default)]
pub struct RuleDraft {
    pub kind: Option<RuleKind>,
    pub event_type: Option<String>,
    pub country: Option<String>,
    pub price: Option<Decimal>,
}

impl RuleDraft {
    /// Check the draft and turn it into a rule
    ///
    /// Rejects a missing kind, a price that is missing or not strictly
    /// positive, and blank keys required by the kind. Keys are trimmed.
    pub fn validate(&self) -> Result<PricingRule> {
        let kind = self
            .kind
            .ok_or_else(|| Error::InvalidInput("Rule kind is required".to_string()))?;

        let price = match self.price {
            Some(price) if price > Decimal::ZERO => price,
            Some(price) => {
                return Err(Error::InvalidInput(format!(
                    "Price must be greater than zero (got {})",
                    price
                )))
            }
            None => return Err(Error::InvalidInput("Price is required".to_string())),
        };

        let rule = match kind {
            RuleKind::EventType => PricingRule::EventType {
                event_type: EventTypeId::new(required_key(&self.event_type, "event type")?),
                price,
            },
            RuleKind::Country => PricingRule::Country {
                country: CountryCode::new(required_key(&self.country, "country")?),
                price,
            },
            RuleKind::Specific => PricingRule::Specific {
                event_type: EventTypeId::new(required_key(&self.event_type, "event type")?),
                country: CountryCode::new(required_key(&self.country, "country")?),
                price,
            },
        };

        Ok(rule)
    }
}

fn required_key(value: &Option<String>, name: &str) -> Result<String> {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v.to_string()),
        _ => Err(Error::InvalidInput(format!("A {} is required for this rule", name))),
    }
}

/// Per-artist price overrides with a guaranteed default
///
/// Serialized shape (JSON/TOML):
/// `{ default, eventTypes: {et: p}, countries: {c: p}, specific: {et: {c: p}} }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingMatrix {
    default: Decimal,
    #[serde(default)]
    event_types: BTreeMap<EventTypeId, Decimal>,
    #[serde(default)]
    countries: BTreeMap<CountryCode, Decimal>,
    #[serde(default, deserialize_with = "deserialize_specific")]
    specific: BTreeMap<EventTypeId, BTreeMap<CountryCode, Decimal>>,
}

/// Drops empty inner maps so a loaded matrix never carries an event type
/// with no countries under `specific`.
fn deserialize_specific<'de, D>(
    deserializer: D,
) -> std::result::Result<BTreeMap<EventTypeId, BTreeMap<CountryCode, Decimal>>, D::Error>
where
    D: Deserializer<'de>,
{
    let mut specific =
        BTreeMap::<EventTypeId, BTreeMap<CountryCode, Decimal>>::deserialize(deserializer)?;
    specific.retain(|_, countries| !countries.is_empty());
    Ok(specific)
}

impl PricingMatrix {
    /// Matrix with only a default price
    pub fn new(default: Decimal) -> Self {
        Self {
            default,
            event_types: BTreeMap::new(),
            countries: BTreeMap::new(),
            specific: BTreeMap::new(),
        }
    }

    pub fn default_price(&self) -> Decimal {
        self.default
    }

    pub fn set_default(&mut self, price: Decimal) {
        debug!(old = %self.default, new = %price, "Default price changed");
        self.default = price;
    }

    pub fn event_types(&self) -> &BTreeMap<EventTypeId, Decimal> {
        &self.event_types
    }

    pub fn countries(&self) -> &BTreeMap<CountryCode, Decimal> {
        &self.countries
    }

    pub fn specific(&self) -> &BTreeMap<EventTypeId, BTreeMap<CountryCode, Decimal>> {
        &self.specific
    }

    /// Effective price for an event type in a country
    ///
    /// Total: unknown keys fall through to the default.
    pub fn effective_price(&self, event_type: &str, country: &str) -> Decimal {
        self.resolve(event_type, country).price
    }

    /// Effective price and the tier that produced it
    pub fn resolve(&self, event_type: &str, country: &str) -> ResolvedPrice {
        if let Some(price) = self
            .specific
            .get(event_type)
            .and_then(|countries| countries.get(country))
        {
            return ResolvedPrice {
                price: *price,
                tier: PriceTier::Specific,
            };
        }

        if let Some(price) = self.event_types.get(event_type) {
            return ResolvedPrice {
                price: *price,
                tier: PriceTier::EventType,
            };
        }

        if let Some(price) = self.countries.get(country) {
            return ResolvedPrice {
                price: *price,
                tier: PriceTier::Country,
            };
        }

        ResolvedPrice {
            price: self.default,
            tier: PriceTier::Default,
        }
    }

    /// Insert or overwrite an override, returning the price it replaced
    pub fn add_rule(&mut self, rule: PricingRule) -> Option<Decimal> {
        debug!(rule = %rule, "Adding pricing rule");
        match rule {
            PricingRule::EventType { event_type, price } => {
                self.event_types.insert(event_type, price)
            }
            PricingRule::Country { country, price } => self.countries.insert(country, price),
            PricingRule::Specific {
                event_type,
                country,
                price,
            } => self.specific.entry(event_type).or_default().insert(country, price),
        }
    }

    /// Delete an override, returning the removed price
    ///
    /// Removing the last country of a specific event type also removes the
    /// event type entry. Missing rules are a no-op.
    pub fn remove_rule(&mut self, key: &RuleKey) -> Option<Decimal> {
        debug!(rule = %key, "Removing pricing rule");
        match key {
            RuleKey::EventType(event_type) => self.event_types.remove(event_type),
            RuleKey::Country(country) => self.countries.remove(country),
            RuleKey::Specific(event_type, country) => {
                let countries = self.specific.get_mut(event_type)?;
                let removed = countries.remove(country);
                if countries.is_empty() {
                    self.specific.remove(event_type);
                }
                removed
            }
        }
    }

    /// Every override, event types first, then countries, then combinations
    pub fn rules(&self) -> Vec<PricingRule> {
        let event_types = self.event_types.iter().map(|(event_type, price)| PricingRule::EventType {
            event_type: event_type.clone(),
            price: *price,
        });
        let countries = self.countries.iter().map(|(country, price)| PricingRule::Country {
            country: country.clone(),
            price: *price,
        });
        let specific = self.specific.iter().flat_map(|(event_type, countries)| {
            countries.iter().map(move |(country, price)| PricingRule::Specific {
                event_type: event_type.clone(),
                country: country.clone(),
                price: *price,
            })
        });

        event_types.chain(countries).chain(specific).collect()
    }

    /// Number of overrides (default excluded)
    pub fn rule_count(&self) -> usize {
        self.event_types.len()
            + self.countries.len()
            + self.specific.values().map(BTreeMap::len).sum::<usize>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn price(value: i64) -> Decimal {
        Decimal::from(value)
    }

    fn event_type(id: &str, value: i64) -> PricingRule {
        PricingRule::EventType {
            event_type: id.into(),
            price: price(value),
        }
    }

    fn country(code: &str, value: i64) -> PricingRule {
        PricingRule::Country {
            country: code.into(),
            price: price(value),
        }
    }

    fn specific(id: &str, code: &str, value: i64) -> PricingRule {
        PricingRule::Specific {
            event_type: id.into(),
            country: code.into(),
            price: price(value),
        }
    }

    #[test]
    fn test_specific_beats_every_other_tier() {
        let mut matrix = PricingMatrix::new(price(500));
        matrix.add_rule(specific("wedding", "ae", 2000));
        matrix.add_rule(event_type("wedding", 1500));
        matrix.add_rule(country("ae", 1200));

        let resolved = matrix.resolve("wedding", "ae");
        assert_eq!(resolved.price, price(2000));
        assert_eq!(resolved.tier, PriceTier::Specific);
    }

    #[test]
    fn test_fallback_chain() {
        let mut matrix = PricingMatrix::new(price(300));
        matrix.add_rule(event_type("corporate", 800));
        matrix.add_rule(country("sa", 600));

        assert_eq!(matrix.effective_price("corporate", "sa"), price(800));
        assert_eq!(matrix.effective_price("festival", "sa"), price(600));
        assert_eq!(matrix.effective_price("festival", "qa"), price(300));

        assert_eq!(matrix.resolve("corporate", "qa").tier, PriceTier::EventType);
        assert_eq!(matrix.resolve("festival", "sa").tier, PriceTier::Country);
        assert_eq!(matrix.resolve("festival", "qa").tier, PriceTier::Default);
    }

    #[test]
    fn test_specific_only_applies_to_exact_pair() {
        let mut matrix = PricingMatrix::new(price(300));
        matrix.add_rule(specific("wedding", "ae", 2000));

        assert_eq!(matrix.effective_price("wedding", "sa"), price(300));
        assert_eq!(matrix.effective_price("private", "ae"), price(300));
    }

    #[test]
    fn test_unknown_keys_resolve_to_default() {
        let matrix = PricingMatrix::new(price(450));
        for (et, c) in [("", ""), ("wedding", "ae"), ("???", "zz"), ("Wedding", "AE")] {
            assert_eq!(matrix.effective_price(et, c), price(450));
        }
    }

    #[test]
    fn test_add_rule_overwrites_and_returns_previous() {
        let mut matrix = PricingMatrix::new(price(100));
        assert_eq!(matrix.add_rule(event_type("wedding", 1500)), None);
        assert_eq!(matrix.add_rule(event_type("wedding", 1700)), Some(price(1500)));
        assert_eq!(matrix.effective_price("wedding", "ae"), price(1700));

        assert_eq!(matrix.add_rule(specific("wedding", "ae", 2000)), None);
        assert_eq!(matrix.add_rule(specific("wedding", "ae", 2100)), Some(price(2000)));
        assert_eq!(matrix.effective_price("wedding", "ae"), price(2100));
    }

    #[test]
    fn test_removing_last_specific_country_removes_event_type() {
        let mut matrix = PricingMatrix::new(price(500));
        matrix.add_rule(specific("wedding", "ae", 2000));

        let removed = matrix.remove_rule(&RuleKey::Specific("wedding".into(), "ae".into()));
        assert_eq!(removed, Some(price(2000)));
        assert!(!matrix.specific().contains_key("wedding"));
        assert!(matrix.specific().is_empty());
    }

    #[test]
    fn test_removing_one_of_several_specific_countries_keeps_event_type() {
        let mut matrix = PricingMatrix::new(price(500));
        matrix.add_rule(specific("wedding", "ae", 2000));
        matrix.add_rule(specific("wedding", "sa", 1800));

        matrix.remove_rule(&RuleKey::Specific("wedding".into(), "ae".into()));
        let countries = matrix.specific().get("wedding").unwrap();
        assert_eq!(countries.len(), 1);
        assert_eq!(countries.get("sa"), Some(&price(1800)));
    }

    #[test]
    fn test_remove_missing_rule_is_noop() {
        let mut matrix = PricingMatrix::new(price(500));
        matrix.add_rule(event_type("wedding", 1500));
        let before = matrix.clone();

        assert_eq!(matrix.remove_rule(&RuleKey::Country("ae".into())), None);
        assert_eq!(matrix.remove_rule(&RuleKey::EventType("festival".into())), None);
        assert_eq!(
            matrix.remove_rule(&RuleKey::Specific("wedding".into(), "ae".into())),
            None
        );
        assert_eq!(matrix, before);
    }

    #[test]
    fn test_overrides_are_independent() {
        let mut matrix = PricingMatrix::new(price(500));
        matrix.add_rule(event_type("wedding", 1500));
        matrix.add_rule(country("wedding", 999));
        matrix.remove_rule(&RuleKey::EventType("wedding".into()));

        // Same string used as a country key is untouched
        assert_eq!(matrix.countries().get("wedding"), Some(&price(999)));
    }

    #[test]
    fn test_rules_listing_order_and_count() {
        let mut matrix = PricingMatrix::new(price(500));
        matrix.add_rule(specific("wedding", "sa", 1800));
        matrix.add_rule(country("ae", 1200));
        matrix.add_rule(specific("wedding", "ae", 2000));
        matrix.add_rule(event_type("corporate", 800));

        let rules = matrix.rules();
        assert_eq!(matrix.rule_count(), 4);
        assert_eq!(
            rules,
            vec![
                event_type("corporate", 800),
                country("ae", 1200),
                specific("wedding", "ae", 2000),
                specific("wedding", "sa", 1800),
            ]
        );
    }

    #[test]
    fn test_rule_key_round_trip_through_remove() {
        let mut matrix = PricingMatrix::new(price(500));
        for rule in [event_type("wedding", 1), country("ae", 2), specific("private", "kw", 3)] {
            matrix.add_rule(rule.clone());
            assert_eq!(matrix.remove_rule(&rule.key()), Some(rule.price()));
        }
        assert_eq!(matrix.rule_count(), 0);
    }

    #[test]
    fn test_draft_validation_accepts_complete_rules() {
        let draft = RuleDraft {
            kind: Some(RuleKind::Specific),
            event_type: Some(" wedding ".to_string()),
            country: Some("ae".to_string()),
            price: Some(price(2000)),
        };
        assert_eq!(draft.validate().unwrap(), specific("wedding", "ae", 2000));

        // Country is ignored for an event type rule
        let draft = RuleDraft {
            kind: Some(RuleKind::EventType),
            event_type: Some("corporate".to_string()),
            country: None,
            price: Some(price(800)),
        };
        assert_eq!(draft.validate().unwrap(), event_type("corporate", 800));
    }

    #[test]
    fn test_draft_validation_rejects_bad_price() {
        for bad in [None, Some(Decimal::ZERO), Some(price(-5))] {
            let draft = RuleDraft {
                kind: Some(RuleKind::Country),
                country: Some("ae".to_string()),
                price: bad,
                ..Default::default()
            };
            assert!(matches!(draft.validate(), Err(Error::InvalidInput(_))));
        }
    }

    #[test]
    fn test_draft_validation_rejects_missing_keys() {
        let missing_country = RuleDraft {
            kind: Some(RuleKind::Specific),
            event_type: Some("wedding".to_string()),
            country: Some("   ".to_string()),
            price: Some(price(100)),
        };
        assert!(missing_country.validate().is_err());

        let missing_event_type = RuleDraft {
            kind: Some(RuleKind::EventType),
            price: Some(price(100)),
            ..Default::default()
        };
        assert!(missing_event_type.validate().is_err());

        let missing_kind = RuleDraft {
            country: Some("ae".to_string()),
            price: Some(price(100)),
            ..Default::default()
        };
        assert!(missing_kind.validate().is_err());
    }

    #[test]
    fn test_rule_kind_parse() {
        assert_eq!("event-type".parse::<RuleKind>().unwrap(), RuleKind::EventType);
        assert_eq!("EVENT_TYPE".parse::<RuleKind>().unwrap(), RuleKind::EventType);
        assert_eq!("Country".parse::<RuleKind>().unwrap(), RuleKind::Country);
        assert_eq!("specific".parse::<RuleKind>().unwrap(), RuleKind::Specific);
        assert!("combo".parse::<RuleKind>().is_err());

        for kind in RuleKind::all_variants() {
            assert_eq!(kind.to_string().parse::<RuleKind>().unwrap(), *kind);
        }
    }

    #[test]
    fn test_json_shape() {
        let mut matrix = PricingMatrix::new(price(500));
        matrix.add_rule(event_type("wedding", 1500));
        matrix.add_rule(country("ae", 1200));
        matrix.add_rule(specific("wedding", "ae", 2000));

        let json = serde_json::to_value(&matrix).unwrap();
        assert_eq!(json["default"].as_f64(), Some(500.0));
        assert_eq!(json["eventTypes"]["wedding"].as_f64(), Some(1500.0));
        assert_eq!(json["countries"]["ae"].as_f64(), Some(1200.0));
        assert_eq!(json["specific"]["wedding"]["ae"].as_f64(), Some(2000.0));
    }

    #[test]
    fn test_deserialize_drops_empty_specific_entries() {
        let json = r#"{
            "default": 300,
            "specific": { "wedding": {}, "corporate": { "sa": 900 } }
        }"#;
        let matrix: PricingMatrix = serde_json::from_str(json).unwrap();

        assert!(!matrix.specific().contains_key("wedding"));
        assert_eq!(matrix.effective_price("corporate", "sa"), price(900));
        assert!(matrix.event_types().is_empty());
        assert!(matrix.countries().is_empty());
    }

    #[test]
    fn test_deserialize_requires_default() {
        let json = r#"{ "eventTypes": { "wedding": 1500 } }"#;
        assert!(serde_json::from_str::<PricingMatrix>(json).is_err());
    }
}
