//! Line-oriented admin console
//!
//! Reads commands from any `BufRead` (stdin or a script file), applies them
//! to the [`Session`] and writes results to any `Write`. Command errors are
//! reported and the console keeps going; only I/O errors end the run.

use std::io::{BufRead, Write};

use abm_common::availability::{SelectOutcome, MAX_RANGE_DAYS};
use abm_common::config::ConsoleConfig;
use abm_common::events::AdminEvent;
use abm_common::Result;
use tracing::debug;

use crate::command::{help_text, parse_line, Command, RuleAction, Switch};
use crate::session::Session;

/// Whether the loop should keep reading
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub struct Console<R, W> {
    session: Session,
    config: ConsoleConfig,
    input: R,
    output: W,
    interactive: bool,
}

impl<R: BufRead, W: Write> Console<R, W> {
    /// `interactive` controls whether a prompt is printed before each line
    pub fn new(
        session: Session,
        config: ConsoleConfig,
        input: R,
        output: W,
        interactive: bool,
    ) -> Self {
        Self {
            session,
            config,
            input,
            output,
            interactive,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Consume the console, returning the session and the output sink
    pub fn into_parts(self) -> (Session, W) {
        (self.session, self.output)
    }

    /// Run until `quit` or end of input
    pub fn run(&mut self) -> Result<()> {
        let mut line = String::new();
        loop {
            if self.interactive {
                write!(self.output, "{}", self.config.prompt)?;
                self.output.flush()?;
            }

            line.clear();
            if self.input.read_line(&mut line)? == 0 {
                break;
            }

            if self.config.echo_commands && !line.trim().is_empty() {
                writeln!(self.output, "{}{}", self.config.prompt, line.trim())?;
            }

            if self.execute_line(&line)? == Flow::Quit {
                break;
            }
        }
        debug!("Console finished, {} event(s) this session", self.session.history().len());
        Ok(())
    }

    /// Parse and execute one line; parse errors are printed, not returned
    pub fn execute_line(&mut self, line: &str) -> Result<Flow> {
        match parse_line(line) {
            Ok(Some(command)) => self.execute(command),
            Ok(None) => Ok(Flow::Continue),
            Err(e) => {
                writeln!(self.output, "error: {}", e)?;
                Ok(Flow::Continue)
            }
        }
    }

    /// Execute one command against the session
    pub fn execute(&mut self, command: Command) -> Result<Flow> {
        debug!(?command, "Executing");
        match command {
            Command::Artists => self.print_artists()?,
            Command::Catalog => self.print_catalog()?,
            Command::Use { artist } => match self.session.use_artist(&artist.join(" ")) {
                Ok(a) => {
                    let line = format!("Active artist: {} ({})", a.name, a.id);
                    writeln!(self.output, "{}", line)?;
                }
                Err(e) => writeln!(self.output, "error: {}", e)?,
            },
            Command::Price {
                event_type,
                country,
            } => {
                let resolved = self.session.price(&event_type, &country);
                writeln!(
                    self.output,
                    "{} / {}: {} ({})",
                    event_type, country, resolved.price, resolved.tier
                )?;
            }
            Command::Rules => self.print_rules()?,
            Command::Rule { action } => match action {
                RuleAction::Add { rule } => match self.session.add_rule(&rule.to_draft()) {
                    Ok(event) => self.notice(&event)?,
                    Err(e) => writeln!(self.output, "error: {}", e)?,
                },
                RuleAction::Remove { rule } => {
                    let key = rule.to_key();
                    match self.session.remove_rule(&key) {
                        Some(event) => self.notice(&event)?,
                        None => writeln!(self.output, "No rule for {}", key)?,
                    }
                }
            },
            Command::SetDefault { price } => match self.session.set_default_price(price) {
                Ok(event) => self.notice(&event)?,
                Err(e) => writeln!(self.output, "error: {}", e)?,
            },
            Command::Range { state } => {
                let enabled = state.map(|s| s == Switch::On);
                let event = self.session.set_range_mode(enabled);
                self.notice(&event)?;
            }
            Command::Select { date } => {
                let outcome = self.session.select(date);
                let text = match outcome {
                    SelectOutcome::Selected => format!("Selected {}", date),
                    SelectOutcome::Deselected => format!("Deselected {}", date),
                    SelectOutcome::RangeStarted => {
                        format!("Range start {}, pick the end date", date)
                    }
                    SelectOutcome::RangeCompleted { days } => {
                        format!("Range selected: {} day(s)", days)
                    }
                    SelectOutcome::RangeTooLong { days } => format!(
                        "error: range of {} days exceeds the {}-day limit; pick a closer end date",
                        days, MAX_RANGE_DAYS
                    ),
                    SelectOutcome::Disabled => {
                        format!("{} is blocked; unblock it first", date)
                    }
                };
                writeln!(self.output, "{}", text)?;
            }
            Command::Selection => self.print_selection()?,
            Command::Cancel => {
                self.session.cancel_selection();
                writeln!(self.output, "Selection cleared")?;
            }
            Command::Block => {
                let event = self.session.block();
                self.notice(&event)?;
            }
            Command::Unblock { date } => match self.session.unblock(date) {
                Some(event) => self.notice(&event)?,
                None => writeln!(self.output, "{} is not blocked", date)?,
            },
            Command::ClearBlocked => {
                let event = self.session.clear_blocked();
                self.notice(&event)?;
            }
            Command::Blocked => self.print_blocked()?,
            Command::Quote {
                event_type,
                country,
                date,
            } => {
                let quote = self.session.quote(&event_type, &country, date);
                let availability = if quote.available {
                    "available"
                } else {
                    "unavailable"
                };
                writeln!(
                    self.output,
                    "{} for {} in {} on {}: {} ({}), {}",
                    quote.artist,
                    quote.event_type,
                    quote.country,
                    quote.date,
                    quote.price,
                    quote.tier,
                    availability
                )?;
            }
            Command::Export => {
                let json = self.session.export_json()?;
                writeln!(self.output, "{}", json)?;
            }
            Command::Help => writeln!(self.output, "{}", help_text())?,
            Command::Quit => return Ok(Flow::Quit),
        }
        Ok(Flow::Continue)
    }

    fn notice(&mut self, event: &AdminEvent) -> Result<()> {
        writeln!(self.output, "* {}", event.message())?;
        Ok(())
    }

    fn print_artists(&mut self) -> Result<()> {
        let active = self.session.active_index();
        for (i, artist) in self.session.artists().iter().enumerate() {
            let marker = if i == active { '*' } else { ' ' };
            let genre = artist.genre.as_deref().unwrap_or("-");
            writeln!(
                self.output,
                "{} {}. {} [{}] {} ({} blocked)",
                marker,
                i + 1,
                artist.name,
                genre,
                artist.id,
                artist.calendar.blocked().len()
            )?;
        }
        Ok(())
    }

    fn print_catalog(&mut self) -> Result<()> {
        let catalog = self.session.catalog();
        writeln!(self.output, "Event types:")?;
        for (id, label) in &catalog.event_types {
            writeln!(self.output, "  {:<12} {}", id.as_str(), label)?;
        }
        writeln!(self.output, "Countries:")?;
        for (code, label) in &catalog.countries {
            writeln!(self.output, "  {:<12} {}", code.as_str(), label)?;
        }
        Ok(())
    }

    fn print_rules(&mut self) -> Result<()> {
        let artist = self.session.active();
        writeln!(self.output, "Pricing for {}", artist.name)?;
        writeln!(self.output, "  default = {}", artist.pricing.default_price())?;
        let rules = artist.pricing.rules();
        if rules.is_empty() {
            writeln!(self.output, "  (no overrides)")?;
        }
        for rule in rules {
            writeln!(self.output, "  {}", rule)?;
        }
        Ok(())
    }

    fn print_selection(&mut self) -> Result<()> {
        let selection = self.session.active().calendar.selection();
        let dates: Vec<String> = selection
            .selected_dates()
            .iter()
            .map(|d| d.to_string())
            .collect();
        let mut line = format!("Mode: {}", selection.mode());
        if let Some(start) = selection.range_start() {
            line.push_str(&format!(", awaiting end (start {})", start));
        }
        writeln!(self.output, "{}", line)?;
        if dates.is_empty() {
            writeln!(self.output, "Nothing selected")?;
        } else {
            writeln!(self.output, "Selected: {}", dates.join(", "))?;
        }
        Ok(())
    }

    fn print_blocked(&mut self) -> Result<()> {
        let groups = self.session.active().calendar.blocked().group_by_month();
        if groups.is_empty() {
            writeln!(self.output, "No blocked dates")?;
        }
        for group in groups {
            let days: Vec<String> = group
                .dates
                .iter()
                .map(|d| d.format("%d").to_string())
                .collect();
            writeln!(self.output, "{}: {}", group.label(), days.join(", "))?;
        }
        Ok(())
    }
}
