//! Integration tests for the admin console
//!
//! Tests the implementation of:
//! - Console command loop over a script (stdin stand-in)
//! - Range selection, blocking and the booking page quote sharing one calendar
//! - Pricing rule edits through console commands
//!
//! Builtin artists: Layla Haddad is active first and has 2024-03-15,
//! 2024-03-16 and 2024-04-01 blocked.

use std::io::Cursor;

use abm_admin::console::{Console, Flow};
use abm_admin::session::Session;
use abm_common::config::ConsoleConfig;
use abm_common::events::AdminEvent;
use abm_common::seed::SeedData;
use chrono::NaiveDate;
use rust_decimal::Decimal;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Run a script against the builtin artists, returning the session and output
fn run_script(script: &str) -> (Session, String) {
    run_with_config(script, ConsoleConfig::default())
}

fn run_with_config(script: &str, config: ConsoleConfig) -> (Session, String) {
    let session = Session::from_seed(SeedData::builtin()).unwrap();
    let input = Cursor::new(script.to_string());
    let mut console = Console::new(session, config, input, Vec::new(), false);
    console.run().unwrap();
    let (session, output) = console.into_parts();
    (session, String::from_utf8(output).unwrap())
}

#[test]
fn test_reversed_range_blocks_every_day_between() {
    let (session, output) = run_script(
        "range on\n\
         select 2024-05-12\n\
         select 2024-05-10\n\
         block\n",
    );

    assert!(output.contains("Range start 2024-05-12"));
    assert!(output.contains("Range selected: 3 day(s)"));
    assert!(output.contains("* Blocked 3 dates"));

    let calendar = &session.active().calendar;
    for day in 10..=12 {
        assert!(calendar.blocked().contains(&date(2024, 5, day)));
    }
    assert!(calendar.selection().selected_dates().is_empty());
    // Range mode survives a commit
    assert!(calendar.selection().is_range_mode());
}

#[test]
fn test_block_with_nothing_selected_reports_no_changes() {
    let (session, output) = run_script("block\n");
    assert!(output.contains("* No changes"));
    assert_eq!(session.active().calendar.blocked().len(), 3);
    assert!(matches!(session.history(), [AdminEvent::NoChanges { .. }]));
}

#[test]
fn test_range_over_blocked_days_only_adds_fresh_ones() {
    let (session, output) = run_script(
        "range on\n\
         select 2024-03-14\n\
         select 2024-03-17\n\
         block\n",
    );
    // 14 and 17 are new, 15 and 16 were already blocked
    assert!(output.contains("Range selected: 4 day(s)"));
    assert!(output.contains("* Blocked 2 dates"));
    assert_eq!(session.active().calendar.blocked().len(), 5);
}

#[test]
fn test_selecting_blocked_date_is_refused() {
    let (session, output) = run_script("select 2024-03-15\nselection\n");
    assert!(output.contains("2024-03-15 is blocked"));
    assert!(output.contains("Nothing selected"));
    assert!(session.active().calendar.selection().selected_dates().is_empty());
}

#[test]
fn test_single_mode_toggles_selection() {
    let (session, output) = run_script(
        "select 2024-06-01\n\
         select 2024-06-02\n\
         select 2024-06-01\n\
         selection\n",
    );
    assert!(output.contains("Selected 2024-06-01"));
    assert!(output.contains("Deselected 2024-06-01"));
    assert!(output.contains("Mode: single"));
    assert!(output.contains("Selected: 2024-06-02"));
    assert_eq!(
        session.active().calendar.selection().selected_dates(),
        &[date(2024, 6, 2)]
    );
}

#[test]
fn test_switching_mode_discards_pending_range() {
    let (session, output) = run_script(
        "range on\n\
         select 2024-07-01\n\
         selection\n\
         range\n\
         selection\n",
    );
    assert!(output.contains("awaiting end (start 2024-07-01)"));
    assert!(output.contains("* Selection mode: single"));
    let selection = session.active().calendar.selection();
    assert!(!selection.is_range_mode());
    assert!(selection.selected_dates().is_empty());
}

#[test]
fn test_quote_reflects_blocked_dates() {
    let (_, output) = run_script(
        "quote wedding ae 2024-03-15\n\
         quote wedding ae 2024-03-17\n\
         unblock 2024-03-15\n\
         quote wedding ae 2024-03-15\n",
    );
    let lines: Vec<&str> = output.lines().collect();
    assert_eq!(
        lines[0],
        "Layla Haddad for Wedding in United Arab Emirates on 2024-03-15: \
         2000 (specific combination), unavailable"
    );
    assert!(lines[1].ends_with(", available"));
    assert_eq!(lines[2], "* Unblocked 2024-03-15");
    assert!(lines[3].ends_with(", available"));
}

#[test]
fn test_price_resolution_tiers() {
    let (_, output) = run_script(
        "price wedding ae\n\
         price wedding qa\n\
         price festival ae\n\
         price festival qa\n",
    );
    let lines: Vec<&str> = output.lines().collect();
    assert_eq!(lines[0], "wedding / ae: 2000 (specific combination)");
    assert_eq!(lines[1], "wedding / qa: 1500 (event type override)");
    assert_eq!(lines[2], "festival / ae: 1200 (country override)");
    assert_eq!(lines[3], "festival / qa: 500 (default price)");
}

#[test]
fn test_rule_add_and_remove() {
    let (session, output) = run_script(
        "use 3\n\
         rule add country ae 1400\n\
         rule add country ae 1450\n\
         rule add specific wedding qa 2200\n\
         rule remove specific wedding qa\n\
         rule remove specific wedding qa\n",
    );
    assert!(output.contains("Active artist: Noor Oud Ensemble"));
    assert!(output.contains("* Added country ae = 1400"));
    assert!(output.contains("* Updated country ae = 1450 (was 1400)"));
    assert!(output.contains("No rule for specific wedding × qa"));

    let pricing = &session.active().pricing;
    assert_eq!(pricing.effective_price("wedding", "ae"), Decimal::from(1450));
    assert!(pricing.specific().is_empty());
}

#[test]
fn test_invalid_commands_leave_state_untouched() {
    let (session, output) = run_script(
        "rule add country ae -5\n\
         rule add country ae 0\n\
         default 0\n\
         select 2024-02-30\n\
         dance\n",
    );
    assert_eq!(output.lines().filter(|l| l.starts_with("error: ")).count(), 5);
    assert!(session.history().is_empty());
    assert_eq!(session.active().pricing.default_price(), Decimal::from(500));
}

#[test]
fn test_quit_stops_processing() {
    let (session, output) = run_script(
        "default 650\n\
         quit\n\
         default 700\n",
    );
    assert!(output.contains("* Default price set to 650"));
    assert!(!output.contains("700"));
    assert_eq!(session.active().pricing.default_price(), Decimal::from(650));
}

#[test]
fn test_execute_line_flow() {
    let session = Session::from_seed(SeedData::builtin()).unwrap();
    let input = Cursor::new(String::new());
    let mut console = Console::new(session, ConsoleConfig::default(), input, Vec::new(), false);
    assert_eq!(console.execute_line("# comment").unwrap(), Flow::Continue);
    assert_eq!(console.execute_line("artists").unwrap(), Flow::Continue);
    assert_eq!(console.execute_line("exit").unwrap(), Flow::Quit);
}

#[test]
fn test_blocked_listing_groups_by_month() {
    let (_, output) = run_script("blocked\nclear-blocked\nblocked\n");
    let lines: Vec<&str> = output.lines().collect();
    assert_eq!(lines[0], "March 2024: 15, 16");
    assert_eq!(lines[1], "April 2024: 01");
    assert_eq!(lines[2], "* Cleared 3 blocked date(s)");
    assert_eq!(lines[3], "No blocked dates");
}

#[test]
fn test_artists_listing_marks_active() {
    let (_, output) = run_script("use dj karim\nartists\n");
    let listing: Vec<&str> = output.lines().skip(1).collect();
    assert_eq!(listing.len(), 3);
    assert!(listing[0].starts_with("  1. Layla Haddad"));
    assert!(listing[1].starts_with("* 2. DJ Karim"));
}

#[test]
fn test_export_prints_json() {
    let (_, output) = run_script("export\n");
    let json: serde_json::Value = serde_json::from_str(&output).unwrap();
    assert_eq!(json["name"], "Layla Haddad");
    assert_eq!(json["pricing"]["default"].as_f64(), Some(500.0));
    assert_eq!(json["blockedDates"].as_array().unwrap().len(), 3);
}

#[test]
fn test_echo_and_prompt() {
    let config = ConsoleConfig {
        prompt: "> ".to_string(),
        echo_commands: true,
    };
    let (_, output) = run_with_config("\nprice wedding ae\n", config);
    assert_eq!(output, "> price wedding ae\nwedding / ae: 2000 (specific combination)\n");
}

#[test]
fn test_script_file_input() {
    use std::io::BufReader;

    let temp_dir = tempfile::TempDir::new().unwrap();
    let path = temp_dir.path().join("setup.abm");
    let script = "# weekend off\nrange on\nselect 2024-08-03\nselect 2024-08-04\nblock\n";
    std::fs::write(&path, script).unwrap();

    let session = Session::from_seed(SeedData::builtin()).unwrap();
    let file = std::fs::File::open(&path).unwrap();
    let input = BufReader::new(file);
    let mut console = Console::new(session, ConsoleConfig::default(), input, Vec::new(), false);
    console.run().unwrap();

    assert!(console.session().active().calendar.blocked().contains(&date(2024, 8, 4)));
    assert_eq!(console.session().history().len(), 2);
}

#[test]
fn test_cancel_discards_pending_range() {
    let (session, output) = run_script(
        "range on\n\
         select 2024-09-01\n\
         cancel\n\
         select 2024-09-05\n\
         selection\n",
    );
    assert!(output.contains("Selection cleared"));
    // The next pick starts a fresh range
    assert_eq!(output.matches("Range start").count(), 2);
    assert_eq!(
        session.active().calendar.selection().range_start(),
        Some(date(2024, 9, 5))
    );
}

#[test]
fn test_catalog_includes_seed_entries() {
    let (_, output) = run_script("catalog\n");
    assert!(output.contains("Event types:"));
    assert!(output.contains("United Arab Emirates"));
    assert!(output.contains("Corporate Event"));
}

#[test]
fn test_overlong_range_end_is_refused() {
    let (session, output) = run_script(
        "range on\n\
         select 0001-01-01\n\
         select 9999-12-31\n\
         select +262000-12-31\n\
         block\n",
    );
    let lines: Vec<&str> = output.lines().collect();
    assert!(lines[2].starts_with("error: range of 3652059 days exceeds the 366-day limit"));
    assert!(lines[3].starts_with("error: "));
    // The refused pick kept the start; block commits just that day
    assert!(output.contains("* Blocked 0001-01-01"));
    assert_eq!(session.active().calendar.blocked().len(), 4);
}
