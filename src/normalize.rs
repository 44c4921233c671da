use crate::error::RowError;
use crate::grid::ColumnGrid;
use crate::model::{Column, TextFragment};

/// Trims the text and turns every embedded line break into one space.
pub fn normalize_text(raw: &str) -> String {
    raw.trim().replace("\r\n", " ").replace(['\n', '\r'], " ")
}

/// True when the matchup fragment runs past the left edge of the team column,
/// which is how the report renders a matchup and team fused into one box.
#[must_use]
pub fn is_fused_matchup(matchup: &TextFragment, grid: &ColumnGrid) -> bool {
    grid.x0_of(Column::Team)
        .is_some_and(|team_x0| matchup.bounds.x1 > team_x0)
}

/// Splits `"MEM@HOU Memphis Grizzlies"` into `("MEM@HOU", "Memphis Grizzlies")`.
pub fn split_fused_matchup(text: &str) -> Result<(String, String), RowError> {
    let (matchup, team) = text
        .split_once(' ')
        .ok_or_else(|| RowError::UnsplittableMatchup(text.to_string()))?;
    Ok((matchup.to_string(), team.to_string()))
}
