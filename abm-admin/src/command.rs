//! Console command grammar
//!
//! One command per line, whitespace separated. Blank lines and lines starting
//! with `#` are ignored. Parsing is done by clap so that every command gets
//! usage text and typed arguments for free.

use abm_common::pricing::{RuleDraft, RuleKey, RuleKind};
use abm_common::time;
use abm_common::{Error, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use rust_decimal::Decimal;

/// Wrapper so clap can parse a single console line
#[derive(Parser, Debug)]
#[command(
    name = "abm",
    no_binary_name = true,
    disable_help_subcommand = true,
    disable_version_flag = true
)]
struct Line {
    #[command(subcommand)]
    command: Command,
}

/// Console commands
#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// List artists
    Artists,

    /// List known event types and countries
    Catalog,

    /// Switch the active artist (list index, id prefix or name)
    Use {
        #[arg(required = true, num_args = 1..)]
        artist: Vec<String>,
    },

    /// Effective price for an event type in a country
    Price { event_type: String, country: String },

    /// List pricing overrides of the active artist
    Rules,

    /// Add or remove pricing overrides
    Rule {
        #[command(subcommand)]
        action: RuleAction,
    },

    /// Set the default (fallback) price
    #[command(name = "default")]
    SetDefault {
        #[arg(allow_negative_numbers = true)]
        price: Decimal,
    },

    /// Range selection mode: on, off, or toggle when omitted
    Range { state: Option<Switch> },

    /// Pick a date (YYYY-MM-DD or "today")
    Select {
        #[arg(value_parser = parse_day)]
        date: NaiveDate,
    },

    /// Show the pending selection
    Selection,

    /// Discard the pending selection
    Cancel,

    /// Block the selected dates
    Block,

    /// Unblock one date
    Unblock {
        #[arg(value_parser = parse_day)]
        date: NaiveDate,
    },

    /// Unblock every date of the active artist
    ClearBlocked,

    /// List blocked dates grouped by month
    Blocked,

    /// Booking page view: price and availability for a date
    Quote {
        event_type: String,
        country: String,
        #[arg(value_parser = parse_day)]
        date: NaiveDate,
    },

    /// Print the active artist's pricing and availability as JSON
    Export,

    /// Show available commands
    Help,

    /// Leave the console
    #[command(alias = "exit")]
    Quit,
}

/// On/off argument for `range`
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Switch {
    On,
    Off,
}

/// `rule` subcommands
#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum RuleAction {
    /// Add or overwrite an override
    Add {
        #[command(subcommand)]
        rule: NewRule,
    },
    /// Remove an override
    Remove {
        #[command(subcommand)]
        rule: RuleTarget,
    },
}

/// Override to add
#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum NewRule {
    EventType {
        event_type: String,
        #[arg(allow_negative_numbers = true)]
        price: Decimal,
    },
    Country {
        country: String,
        #[arg(allow_negative_numbers = true)]
        price: Decimal,
    },
    Specific {
        event_type: String,
        country: String,
        #[arg(allow_negative_numbers = true)]
        price: Decimal,
    },
}

impl NewRule {
    /// Unvalidated form data; see [`RuleDraft::validate`]
    pub fn to_draft(&self) -> RuleDraft {
        match self {
            NewRule::EventType { event_type, price } => RuleDraft {
                kind: Some(RuleKind::EventType),
                event_type: Some(event_type.clone()),
                country: None,
                price: Some(*price),
            },
            NewRule::Country { country, price } => RuleDraft {
                kind: Some(RuleKind::Country),
                event_type: None,
                country: Some(country.clone()),
                price: Some(*price),
            },
            NewRule::Specific {
                event_type,
                country,
                price,
            } => RuleDraft {
                kind: Some(RuleKind::Specific),
                event_type: Some(event_type.clone()),
                country: Some(country.clone()),
                price: Some(*price),
            },
        }
    }
}

/// Override to remove
#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum RuleTarget {
    EventType { event_type: String },
    Country { country: String },
    Specific { event_type: String, country: String },
}

impl RuleTarget {
    pub fn to_key(&self) -> RuleKey {
        match self {
            RuleTarget::EventType { event_type } => RuleKey::EventType(event_type.as_str().into()),
            RuleTarget::Country { country } => RuleKey::Country(country.as_str().into()),
            RuleTarget::Specific {
                event_type,
                country,
            } => RuleKey::Specific(event_type.as_str().into(), country.as_str().into()),
        }
    }
}

fn parse_day(s: &str) -> std::result::Result<NaiveDate, String> {
    if s.eq_ignore_ascii_case("today") {
        return Ok(time::today());
    }
    time::parse_date(s).map_err(|e| e.to_string())
}

/// Parse one console line
///
/// Returns `Ok(None)` for blank lines and comments.
pub fn parse_line(line: &str) -> Result<Option<Command>> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }

    let parsed = Line::try_parse_from(line.split_whitespace())
        .map_err(|e| Error::InvalidInput(e.to_string().trim_end().to_string()))?;
    Ok(Some(parsed.command))
}

/// Usage text for the `help` command
pub fn help_text() -> String {
    use clap::CommandFactory;
    Line::command().render_long_help().to_string()
}
