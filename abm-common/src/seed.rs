//! Seed (mock) data
//!
//! The back office runs on in-memory data only. A session starts from a seed:
//! either a TOML file or the compiled-in set below. Nothing is written back.
//!
//! ```toml
//! [[artists]]
//! name = "Layla Haddad"
//! blocked = ["2024-03-15"]
//!
//! [artists.pricing]
//! default = 500
//! eventTypes = { wedding = 1500 }
//! countries = { ae = 1200 }
//! specific = { wedding = { ae = 2000 } }
//! ```

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::availability::BlockedDateSet;
use crate::catalog::Catalog;
use crate::pricing::{PricingMatrix, PricingRule};
use crate::{Error, Result};

/// Complete seed document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeedData {
    /// Extra catalog entries, merged over the builtin catalog
    #[serde(default)]
    pub catalog: Catalog,

    #[serde(default)]
    pub artists: Vec<ArtistSeed>,
}

/// One artist's starting state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtistSeed {
    /// Generated when omitted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,

    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub genre: Option<String>,

    pub pricing: PricingMatrix,

    #[serde(default)]
    pub blocked: BlockedDateSet,
}

impl SeedData {
    /// Read and validate a TOML seed file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let seed = Self::from_toml_str(&content)?;
        debug!(artists = seed.artists.len(), "Loaded seed from {}", path.display());
        Ok(seed)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let seed: SeedData = toml::from_str(content)?;
        seed.validate()?;
        Ok(seed)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize seed: {}", e)))
    }

    /// At least one artist, non-blank names, unique explicit ids,
    /// every price greater than zero
    pub fn validate(&self) -> Result<()> {
        if self.artists.is_empty() {
            return Err(Error::Config("Seed contains no artists".to_string()));
        }

        let mut ids = HashSet::new();
        for artist in &self.artists {
            if artist.name.trim().is_empty() {
                return Err(Error::Config("Artist name must not be empty".to_string()));
            }
            if let Some(id) = artist.id {
                if !ids.insert(id) {
                    return Err(Error::Config(format!("Duplicate artist id {}", id)));
                }
            }
            let pricing = &artist.pricing;
            if pricing.default_price() <= Decimal::ZERO
                || pricing.rules().iter().any(|rule| rule.price() <= Decimal::ZERO)
            {
                return Err(Error::Config(format!(
                    "Prices must be greater than zero in pricing of '{}'",
                    artist.name
                )));
            }
        }

        Ok(())
    }

    /// Mock artists used when no seed file is configured
    pub fn builtin() -> Self {
        let mut layla = PricingMatrix::new(Decimal::from(500));
        for rule in [
            event_type_rule("wedding", 1500),
            event_type_rule("corporate", 800),
            country_rule("ae", 1200),
            country_rule("sa", 600),
            specific_rule("wedding", "ae", 2000),
            specific_rule("wedding", "sa", 1800),
        ] {
            layla.add_rule(rule);
        }

        let mut karim = PricingMatrix::new(Decimal::from(300));
        for rule in [
            event_type_rule("festival", 900),
            country_rule("qa", 450),
            specific_rule("private", "kw", 700),
        ] {
            karim.add_rule(rule);
        }

        let noor = PricingMatrix::new(Decimal::from(1000));

        Self {
            catalog: Catalog::default(),
            artists: vec![
                ArtistSeed {
                    id: Some(Uuid::from_u128(0x6c61_796c_6100_4000_8000_0000_0000_0001)),
                    name: "Layla Haddad".to_string(),
                    genre: Some("Vocalist".to_string()),
                    pricing: layla,
                    blocked: BlockedDateSet::from_dates([
                        ymd(2024, 3, 15),
                        ymd(2024, 3, 16),
                        ymd(2024, 4, 1),
                    ]),
                },
                ArtistSeed {
                    id: Some(Uuid::from_u128(0x6b61_7269_6d00_4000_8000_0000_0000_0002)),
                    name: "DJ Karim".to_string(),
                    genre: Some("DJ".to_string()),
                    pricing: karim,
                    blocked: BlockedDateSet::from_dates([ymd(2024, 3, 22)]),
                },
                ArtistSeed {
                    id: Some(Uuid::from_u128(0x6e6f_6f72_0000_4000_8000_0000_0000_0003)),
                    name: "Noor Oud Ensemble".to_string(),
                    genre: Some("Traditional".to_string()),
                    pricing: noor,
                    blocked: BlockedDateSet::new(),
                },
            ],
        }
    }
}

fn ymd(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or_default()
}

fn event_type_rule(id: &str, price: i64) -> PricingRule {
    PricingRule::EventType {
        event_type: id.into(),
        price: Decimal::from(price),
    }
}

fn country_rule(code: &str, price: i64) -> PricingRule {
    PricingRule::Country {
        country: code.into(),
        price: Decimal::from(price),
    }
}

fn specific_rule(id: &str, code: &str, price: i64) -> PricingRule {
    PricingRule::Specific {
        event_type: id.into(),
        country: code.into(),
        price: Decimal::from(price),
    }
}
