//! Draft results export.

use std::str::FromStr;

use draftboard_core::error::DomainError;
use draftboard_core::model::{ItemId, SeasonId, TeamId};
use serde::Serialize;

use super::DraftContext;
use super::query_handlers::{ResultsView, get_results};

/// Supported export formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// One row per pick with a header line.
    Csv,
    /// One block per round, one `R.PP team: item` line per pick.
    Text,
}

impl ExportFormat {
    /// MIME type of the rendered document.
    #[must_use]
    pub fn content_type(self) -> &'static str {
        match self {
            Self::Csv => "text/csv; charset=utf-8",
            Self::Text => "text/plain; charset=utf-8",
        }
    }

    /// File extension for downloads.
    #[must_use]
    pub fn extension(self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Text => "txt",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "csv" => Ok(Self::Csv),
            "text" => Ok(Self::Text),
            other => Err(DomainError::Validation(format!(
                "unknown export format: {other} (expected csv or text)"
            ))),
        }
    }
}

#[derive(Debug, Serialize)]
struct ExportRow<'a> {
    overall_pick: i32,
    round: i32,
    pick_in_round: i32,
    team_id: TeamId,
    team_name: &'a str,
    item_id: ItemId,
    item_name: &'a str,
}

fn rows(results: &ResultsView) -> Vec<ExportRow<'_>> {
    let mut rows: Vec<ExportRow<'_>> = results
        .teams
        .iter()
        .flat_map(|team| {
            team.picks.iter().map(move |pick| ExportRow {
                overall_pick: pick.overall_pick_number,
                round: pick.round,
                pick_in_round: pick.pick_in_round,
                team_id: team.team_id,
                team_name: &team.team_name,
                item_id: pick.item_id,
                item_name: &pick.item_name,
            })
        })
        .collect();
    rows.sort_by_key(|row| row.overall_pick);
    rows
}

fn export_failed(e: impl std::fmt::Display) -> DomainError {
    DomainError::Infrastructure(format!("csv export failed: {e}"))
}

const CSV_HEADER: [&str; 7] = [
    "overall_pick",
    "round",
    "pick_in_round",
    "team_id",
    "team_name",
    "item_id",
    "item_name",
];

fn render_csv(results: &ResultsView) -> Result<String, DomainError> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());
    writer.write_record(CSV_HEADER).map_err(export_failed)?;
    for row in rows(results) {
        writer.serialize(row).map_err(export_failed)?;
    }
    let bytes = writer.into_inner().map_err(export_failed)?;
    String::from_utf8(bytes).map_err(export_failed)
}

fn render_text(results: &ResultsView) -> String {
    let mut out = String::new();
    let mut current_round = None;

    for row in rows(results) {
        if current_round != Some(row.round) {
            if current_round.is_some() {
                out.push('\n');
            }
            out.push_str(&format!("Round {}\n", row.round));
            current_round = Some(row.round);
        }
        out.push_str(&format!(
            "{}.{:02} {}: {}\n",
            row.round, row.pick_in_round, row.team_name, row.item_name
        ));
    }
    out
}

/// Renders the season's results in `format`.
///
/// # Errors
///
/// Returns `DomainError` if loading results fails or the CSV writer fails.
pub async fn export_results(
    ctx: DraftContext<'_>,
    season_id: SeasonId,
    format: ExportFormat,
) -> Result<String, DomainError> {
    let results = get_results(ctx, season_id).await?;
    match format {
        ExportFormat::Csv => render_csv(&results),
        ExportFormat::Text => Ok(render_text(&results)),
    }
}
