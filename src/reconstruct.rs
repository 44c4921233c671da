use std::collections::HashSet;

use tracing::{debug, info, warn};

use crate::assign::{CarryState, assign_row, resolve_record, unknown_left_edge};
use crate::error::{ReportError, RowError};
use crate::grid::ColumnGrid;
use crate::model::{Column, PageFragments, Record};
use crate::options::{GridScope, ParseOptions, QualityMode};
use crate::rows::{Row, group_rows};
use crate::teams::{Matchup, Status};
use crate::warning::{ParseWarning, WarningCode};

#[derive(Debug, Clone, PartialEq)]
pub struct Reconstruction {
    pub records: Vec<Record>,
    pub warnings: Vec<ParseWarning>,
    pub page_count: usize,
    pub dropped_rows: usize,
}

struct PageRows<'a> {
    page: u32,
    rows: Vec<Row<'a>>,
    /// Left edges of column heading rows. They never become records but
    /// still mark where the columns are.
    heading_edges: Vec<f32>,
}

impl PageRows<'_> {
    fn left_edges(&self) -> impl Iterator<Item = f32> + '_ {
        self.rows
            .iter()
            .flat_map(Row::left_edges)
            .chain(self.heading_edges.iter().copied())
    }
}

fn table_rows(page: &PageFragments) -> PageRows<'_> {
    let mut rows = Vec::new();
    let mut heading_edges = Vec::new();
    for row in group_rows(&page.fragments) {
        if row.is_heading() {
            debug!(page = page.page_number, "skipping column heading row");
            heading_edges.extend(row.left_edges());
        } else {
            rows.push(row);
        }
    }
    PageRows {
        page: page.page_number,
        rows,
        heading_edges,
    }
}

/// Grid problems that make every rank on the page meaningless.
fn check_grid(
    page: &PageRows<'_>,
    grid: &ColumnGrid,
    scope: GridScope,
) -> Result<(), ReportError> {
    if grid.is_ambiguous() {
        return Err(ReportError::AmbiguousColumnGrid {
            page: page.page,
            columns: grid.len(),
        });
    }
    // A page grid missing a column shifts every rank to its right.
    if scope == GridScope::PerPage && grid.len() < Column::COUNT {
        return Err(ReportError::IncompleteColumnGrid {
            page: page.page,
            columns: grid.len(),
        });
    }
    if let Some(x0) = page.rows.iter().find_map(|row| unknown_left_edge(row, grid)) {
        return Err(ReportError::UnknownColumn {
            page: page.page,
            x0,
        });
    }
    Ok(())
}

fn vocabulary_warnings(
    record: &Record,
    page: u32,
    row: usize,
    seen_matchups: &mut HashSet<(String, Option<String>)>,
) -> Vec<ParseWarning> {
    let mut warnings = Vec::new();

    if let Some(matchup_text) = record.matchup.as_deref()
        && seen_matchups.insert((matchup_text.to_string(), record.team.clone()))
    {
        match Matchup::parse(matchup_text) {
            None => warnings.push(
                ParseWarning::new(
                    WarningCode::UnrecognizedMatchup,
                    format!("matchup '{matchup_text}' is not AWAY@HOME of known teams"),
                )
                .with_page(page)
                .with_row(row),
            ),
            Some(matchup) => {
                if let Some(team) = record
                    .team
                    .as_deref()
                    .filter(|team| !matchup.involves_team(team))
                {
                    warnings.push(
                        ParseWarning::new(
                            WarningCode::UnrecognizedMatchup,
                            format!("team '{team}' does not play in '{matchup_text}'"),
                        )
                        .with_page(page)
                        .with_row(row),
                    );
                }
            }
        }
    }

    if let Some(status) = record.current_status.as_deref()
        && status.parse::<Status>().is_err()
    {
        warnings.push(
            ParseWarning::new(
                WarningCode::UnrecognizedStatus,
                format!("status '{status}' is not a known injury status"),
            )
            .with_page(page)
            .with_row(row),
        );
    }

    warnings
}

fn resolve_row<'a>(
    state: CarryState<'a>,
    row: &Row<'a>,
    grid: &ColumnGrid,
) -> Result<(CarryState<'a>, Record), RowError> {
    let (next, template) = assign_row(state, row, grid)?;
    let record = resolve_record(&template, grid)?;
    Ok((next, record))
}

/// Rebuilds the report table from the positioned fragments of every page.
///
/// Pages are processed in order and the game context (date, time, matchup,
/// team) carries over page breaks. A row that cannot be resolved leaves the
/// carried context exactly as it was before the row.
pub fn reconstruct_pages(
    pages: &[PageFragments],
    options: &ParseOptions,
) -> Result<Reconstruction, ReportError> {
    let page_rows = pages.iter().map(table_rows).collect::<Vec<_>>();
    let document_grid = match options.grid_scope {
        GridScope::Document => Some(ColumnGrid::from_positions(
            page_rows.iter().flat_map(PageRows::left_edges),
        )),
        GridScope::PerPage => None,
    };

    let mut records = Vec::new();
    let mut warnings = Vec::new();
    let mut dropped_rows = 0;
    let mut seen_matchups = HashSet::new();
    let mut state = CarryState::default();

    for page in &page_rows {
        if page.rows.is_empty() {
            warnings.push(
                ParseWarning::new(WarningCode::EmptyPage, "page has no table rows")
                    .with_page(page.page),
            );
            continue;
        }

        let grid = document_grid
            .clone()
            .unwrap_or_else(|| ColumnGrid::from_positions(page.left_edges()));
        if let Err(error) = check_grid(page, &grid, options.grid_scope) {
            match options.quality_mode {
                QualityMode::Strict => return Err(error),
                QualityMode::BestEffort => {
                    warn!(page = page.page, %error, "skipping page");
                    warnings.push(
                        ParseWarning::new(WarningCode::PageSkipped, error.to_string())
                            .with_page(page.page),
                    );
                    continue;
                }
            }
        }
        if grid.len() < Column::COUNT {
            warnings.push(
                ParseWarning::new(
                    WarningCode::IncompleteColumnGrid,
                    format!("only {} of {} columns observed", grid.len(), Column::COUNT),
                )
                .with_page(page.page),
            );
        }
        debug!(page = page.page, columns = ?grid.positions(), rows = page.rows.len(), "column grid");

        for (index, row) in page.rows.iter().enumerate() {
            let row_number = index + 1;
            match resolve_row(state, row, &grid) {
                Ok((next, record)) => {
                    state = next;
                    warnings.extend(vocabulary_warnings(
                        &record,
                        page.page,
                        row_number,
                        &mut seen_matchups,
                    ));
                    records.push(record);
                }
                Err(source) => match options.quality_mode {
                    QualityMode::Strict => {
                        return Err(ReportError::MalformedRow {
                            page: page.page,
                            row: row_number,
                            source,
                        });
                    }
                    QualityMode::BestEffort => {
                        warn!(page = page.page, row = row_number, %source, "dropping malformed row");
                        warnings.push(
                            ParseWarning::new(WarningCode::MalformedRow, source.to_string())
                                .with_page(page.page)
                                .with_row(row_number),
                        );
                        dropped_rows += 1;
                    }
                },
            }
        }
    }

    info!(
        pages = page_rows.len(),
        records = records.len(),
        dropped_rows,
        "reconstructed injury report"
    );

    Ok(Reconstruction {
        records,
        warnings,
        page_count: page_rows.len(),
        dropped_rows,
    })
}
