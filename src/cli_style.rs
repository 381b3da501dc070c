/*!
 * dss CLI Style System
 *
 * Styling helpers for user-facing output: themed text, icons and tables for
 * the structured reports returned by the sync layer.
 */

use crate::core::diff::LocalState;
use crate::sync::{AddReport, OutcomeKind, StatusReport, SyncReport};
use comfy_table::{presets, Attribute, Cell, Color, ContentArrangement, Table};
use console::{style, StyledObject};

// ============================================================================
// THEME COLORS
// ============================================================================

/// Colors for consistent styling
pub struct Theme;

impl Theme {
    /// Primary accent color (cyan)
    pub fn primary<D: std::fmt::Display>(text: D) -> StyledObject<D> {
        style(text).cyan()
    }

    pub fn success<D: std::fmt::Display>(text: D) -> StyledObject<D> {
        style(text).green()
    }

    pub fn warning<D: std::fmt::Display>(text: D) -> StyledObject<D> {
        style(text).yellow()
    }

    pub fn error<D: std::fmt::Display>(text: D) -> StyledObject<D> {
        style(text).red()
    }

    /// Muted/secondary text (dim)
    pub fn muted<D: std::fmt::Display>(text: D) -> StyledObject<D> {
        style(text).dim()
    }

    /// Header style (bold cyan)
    pub fn header<D: std::fmt::Display>(text: D) -> StyledObject<D> {
        style(text).cyan().bold()
    }
}

// ============================================================================
// ICONS
// ============================================================================

pub struct Icons;

impl Icons {
    pub const SUCCESS: &'static str = "✓";
    pub const ERROR: &'static str = "✗";
    pub const WARNING: &'static str = "⚠";
    pub const INFO: &'static str = "ℹ";
    pub const PENDING: &'static str = "○";
    pub const ARROW_RIGHT: &'static str = "→";
}

/// Draw a section header with a line
pub fn section_header(title: &str) {
    let line_len = 50 - title.len().min(40);
    println!(
        "\n{} {}",
        Theme::header(title),
        Theme::muted("─".repeat(line_len))
    );
}

// ============================================================================
// TABLES
// ============================================================================

/// Create a styled data table
pub fn create_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(presets::UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

/// Create a minimal table (no outer borders)
pub fn create_minimal_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(presets::UTF8_NO_BORDERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

/// Create a key-value table for stats
pub fn stats_table(items: &[(&str, String)]) -> Table {
    let mut table = create_minimal_table();

    for (key, value) in items {
        table.add_row(vec![
            Cell::new(key).fg(Color::Cyan),
            Cell::new(value)
                .fg(Color::White)
                .add_attribute(Attribute::Bold),
        ]);
    }

    table
}

fn header_cells(titles: &[&str]) -> Vec<Cell> {
    titles
        .iter()
        .map(|title| Cell::new(title).fg(Color::Cyan).add_attribute(Attribute::Bold))
        .collect()
}

fn outcome_cell(kind: OutcomeKind) -> Cell {
    let text = kind.as_str();
    if kind.is_transferred() && kind != OutcomeKind::IntegrityMismatch {
        Cell::new(format!("{} {}", Icons::SUCCESS, text)).fg(Color::Green)
    } else if kind == OutcomeKind::IntegrityMismatch || kind.is_missing() {
        Cell::new(format!("{} {}", Icons::WARNING, text)).fg(Color::Yellow)
    } else {
        Cell::new(format!("{} {}", Icons::ERROR, text)).fg(Color::Red)
    }
}

/// Per-file outcomes of a push or pull
pub fn sync_outcome_table(report: &SyncReport) -> Table {
    let mut table = create_table();
    table.set_header(header_cells(&["Dataset", "Outcome", "Details"]));

    for outcome in &report.outcomes {
        let details = outcome
            .detail
            .as_deref()
            .map(|d| d.trim_end().to_string())
            .or_else(|| outcome.remote_path.clone())
            .unwrap_or_default();
        table.add_row(vec![
            Cell::new(&outcome.name),
            outcome_cell(outcome.kind),
            Cell::new(details).fg(Color::DarkGrey),
        ]);
    }

    table
}

/// Summary counts of a push or pull
pub fn sync_summary_table(report: &SyncReport) -> Table {
    let summary = report.summary();
    let mut items = vec![
        ("Remote", report.remote.clone()),
        ("Manifest", report.manifest_id.clone()),
        ("Files", summary.total.to_string()),
        ("Transferred", summary.transferred.to_string()),
    ];
    if summary.integrity_mismatch > 0 {
        items.push(("Mismatched", summary.integrity_mismatch.to_string()));
    }
    if summary.missing > 0 {
        items.push(("Missing", summary.missing.to_string()));
    }
    if summary.failed > 0 {
        items.push(("Failed", summary.failed.to_string()));
    }
    stats_table(&items)
}

/// One row per file touched by `add`
pub fn add_table(report: &AddReport) -> Table {
    let mut table = create_table();
    table.set_header(header_cells(&["File", "Result"]));

    for name in &report.added {
        table.add_row(vec![
            Cell::new(name),
            Cell::new(format!("{} added", Icons::SUCCESS)).fg(Color::Green),
        ]);
    }
    for name in &report.updated {
        table.add_row(vec![
            Cell::new(name),
            Cell::new(format!("{} updated", Icons::SUCCESS)).fg(Color::Cyan),
        ]);
    }
    for name in &report.unchanged {
        table.add_row(vec![
            Cell::new(name),
            Cell::new(format!("{} unchanged", Icons::PENDING)).fg(Color::DarkGrey),
        ]);
    }
    for rejection in &report.rejected {
        table.add_row(vec![
            Cell::new(&rejection.path),
            Cell::new(format!("{} skipped ({})", Icons::WARNING, rejection.reason)).fg(Color::Yellow),
        ]);
    }

    table
}

/// Local state and remote copies of every tracked dataset
pub fn status_table(report: &StatusReport) -> Table {
    let mut table = create_table();
    table.set_header(header_cells(&["Dataset", "Size", "Local", "Remotes"]));

    for dataset in &report.datasets {
        let state = match dataset.state {
            LocalState::Unchanged => Cell::new(dataset.state.to_string()).fg(Color::Green),
            LocalState::Modified => Cell::new(dataset.state.to_string()).fg(Color::Yellow),
            LocalState::Missing | LocalState::Ineligible(_) => {
                Cell::new(dataset.state.to_string()).fg(Color::Red)
            }
        };
        table.add_row(vec![
            Cell::new(&dataset.name),
            Cell::new(&dataset.size_human),
            state,
            Cell::new(dataset.remotes.join(", ")).fg(Color::DarkGrey),
        ]);
    }

    table
}

// ============================================================================
// MESSAGES
// ============================================================================

/// Print a styled error message with optional suggestion
pub fn print_error(message: &str, suggestion: Option<&str>) {
    eprintln!(
        "\n{} {}",
        Theme::error(format!("{} Error:", Icons::ERROR)),
        message
    );

    if let Some(hint) = suggestion {
        eprintln!(
            "  {} {}",
            Theme::muted(Icons::ARROW_RIGHT),
            Theme::muted(hint)
        );
    }
    eprintln!();
}

pub fn print_warning(message: &str) {
    eprintln!(
        "{} {}",
        Theme::warning(Icons::WARNING.to_string()),
        Theme::warning(message)
    );
}

pub fn print_success(message: &str) {
    println!(
        "{} {}",
        Theme::success(Icons::SUCCESS.to_string()),
        Theme::success(message)
    );
}

pub fn print_info(message: &str) {
    println!("{} {}", Theme::primary(Icons::INFO.to_string()), message);
}
