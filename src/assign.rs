use crate::error::RowError;
use crate::grid::ColumnGrid;
use crate::model::{Column, Record, TextFragment};
use crate::normalize::{is_fused_matchup, normalize_text, split_fused_matchup};
use crate::rows::Row;

/// Game context carried from the row that last supplied it.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CarryState<'a> {
    pub date: Option<&'a TextFragment>,
    pub time: Option<&'a TextFragment>,
    pub matchup: Option<&'a TextFragment>,
    pub team: Option<&'a TextFragment>,
}

impl<'a> CarryState<'a> {
    /// Supplying a column clears every sticky column to its right, since a
    /// new date starts a new time slot, a new time a new game, and so on.
    #[must_use]
    pub fn supply(self, column: Column, fragment: &'a TextFragment) -> Self {
        match column {
            Column::GameDate => Self {
                date: Some(fragment),
                ..Self::default()
            },
            Column::GameTime => Self {
                time: Some(fragment),
                matchup: None,
                team: None,
                ..self
            },
            Column::Matchup => Self {
                matchup: Some(fragment),
                team: None,
                ..self
            },
            Column::Team => Self {
                team: Some(fragment),
                ..self
            },
            Column::PlayerName | Column::CurrentStatus | Column::Reason => self,
        }
    }
}

/// One row's seven slots after carry-over has been applied.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RowTemplate<'a> {
    pub slots: [Option<&'a TextFragment>; Column::COUNT],
}

impl<'a> RowTemplate<'a> {
    #[must_use]
    pub fn get(&self, column: Column) -> Option<&'a TextFragment> {
        self.slots[column.rank()]
    }
}

/// Places a row's fragments into the template and advances the carried state.
///
/// Returns the state to use for the next row. Fragments whose left edge is
/// not part of the grid are the caller's concern and are reported through
/// [`unknown_left_edge`] before assignment.
pub fn assign_row<'a>(
    state: CarryState<'a>,
    row: &Row<'a>,
    grid: &ColumnGrid,
) -> Result<(CarryState<'a>, RowTemplate<'a>), RowError> {
    let mut state = state;
    let mut own: [Option<&'a TextFragment>; Column::COUNT] = [None; Column::COUNT];

    for &fragment in &row.fragments {
        let Some(column) = grid.column_of(fragment) else {
            continue;
        };
        if own[column.rank()].replace(fragment).is_some() {
            return Err(RowError::DuplicateColumn {
                column: column.label(),
            });
        }
        if column.is_sticky() {
            state = state.supply(column, fragment);
        }
    }

    let slots = [
        state.date,
        state.time,
        state.matchup,
        state.team,
        own[Column::PlayerName.rank()],
        own[Column::CurrentStatus.rank()],
        own[Column::Reason.rank()],
    ];

    Ok((state, RowTemplate { slots }))
}

/// First left edge in the row that the grid has never seen.
#[must_use]
pub fn unknown_left_edge(row: &Row<'_>, grid: &ColumnGrid) -> Option<f32> {
    row.left_edges().find(|&x0| grid.rank_of(x0).is_none())
}

/// Normalizes a template into a record, undoing a fused matchup/team box.
pub fn resolve_record(template: &RowTemplate<'_>, grid: &ColumnGrid) -> Result<Record, RowError> {
    let mut slots = template
        .slots
        .map(|slot| slot.map(|fragment| normalize_text(&fragment.text)));

    if template
        .get(Column::Matchup)
        .is_some_and(|matchup| is_fused_matchup(matchup, grid))
    {
        let fused = slots[Column::Matchup.rank()]
            .take()
            .filter(|text| !text.is_empty())
            .ok_or(RowError::MissingMatchup)?;
        let (matchup, team) = split_fused_matchup(&fused)?;
        slots[Column::Matchup.rank()] = Some(matchup);
        slots[Column::Team.rank()] = Some(team);
    }

    Ok(Record::from_slots(slots))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::{CarryState, assign_row, resolve_record, unknown_left_edge};
    use crate::error::RowError;
    use crate::grid::ColumnGrid;
    use crate::model::{Rect, TextFragment};
    use crate::rows::Row;

    const XS: [f32; 7] = [20.0, 90.0, 200.0, 260.0, 380.0, 500.0, 580.0];

    fn grid() -> ColumnGrid {
        ColumnGrid::from_positions(XS)
    }

    fn cell(rank: usize, text: &str) -> TextFragment {
        let x0 = XS[rank];
        TextFragment::new(Rect::new(x0, 0.0, x0 + 40.0, 10.0), text)
    }

    fn row<'a>(fragments: &'a [TextFragment]) -> Row<'a> {
        Row {
            fragments: fragments.iter().collect(),
        }
    }

    #[test]
    fn new_date_clears_time_matchup_and_team() {
        let first = [
            cell(0, "03/10/24"),
            cell(1, "07:00 (ET)"),
            cell(2, "BOS@NYK"),
            cell(3, "Boston Celtics"),
            cell(4, "Doe, John"),
        ];
        let second = [cell(0, "03/11/24"), cell(4, "Smith, Al")];

        let (state, _) = assign_row(CarryState::default(), &row(&first), &grid()).expect("row 1");
        let (state, template) = assign_row(state, &row(&second), &grid()).expect("row 2");

        assert_eq!(state.date.map(|f| f.text.as_str()), Some("03/11/24"));
        assert_eq!(state.time, None);
        assert_eq!(state.matchup, None);
        assert_eq!(state.team, None);
        assert_eq!(template.slots[4].map(|f| f.text.as_str()), Some("Smith, Al"));
    }

    #[test]
    fn new_matchup_keeps_date_and_time_but_clears_team() {
        let first = [
            cell(0, "03/10/24"),
            cell(1, "07:00 (ET)"),
            cell(2, "BOS@NYK"),
            cell(3, "Boston Celtics"),
        ];
        let second = [cell(2, "MIA@ORL"), cell(4, "Doe, John")];
        let (state, _) = assign_row(CarryState::default(), &row(&first), &grid()).expect("row 1");
        let (state, _) = assign_row(state, &row(&second), &grid()).expect("row 2");
        assert_eq!(state.date.map(|f| f.text.as_str()), Some("03/10/24"));
        assert_eq!(state.time.map(|f| f.text.as_str()), Some("07:00 (ET)"));
        assert_eq!(state.matchup.map(|f| f.text.as_str()), Some("MIA@ORL"));
        assert_eq!(state.team, None);
    }

    #[test]
    fn per_row_columns_never_carry_over() {
        let first = [
            cell(2, "BOS@NYK"),
            cell(4, "Doe, John"),
            cell(5, "Out"),
            cell(6, "Injury"),
        ];
        let second = [cell(4, "Smith, Al")];
        let (state, _) = assign_row(CarryState::default(), &row(&first), &grid()).expect("row 1");
        let (_, template) = assign_row(state, &row(&second), &grid()).expect("row 2");
        assert_eq!(template.slots[2].map(|f| f.text.as_str()), Some("BOS@NYK"));
        assert_eq!(template.slots[5], None);
        assert_eq!(template.slots[6], None);
    }

    #[test]
    fn two_fragments_in_one_column_is_malformed() {
        let cells = [cell(4, "Doe, John"), cell(4, "Smith, Al")];
        let result = assign_row(CarryState::default(), &row(&cells), &grid());
        assert_eq!(
            result.map(|_| ()),
            Err(RowError::DuplicateColumn {
                column: "Player Name"
            })
        );
    }

    #[test]
    fn reports_left_edges_missing_from_grid() {
        let cells = [cell(0, "03/10/24"), TextFragment::new(Rect::new(33.0, 0.0, 50.0, 10.0), "?")];
        assert_eq!(unknown_left_edge(&row(&cells), &grid()), Some(33.0));
    }

    #[test]
    fn resolves_fused_matchup_into_matchup_and_team() {
        let cells = [TextFragment::new(
            Rect::new(200.0, 0.0, 339.0, 10.0),
            "MEM@HOU Memphis\nGrizzlies",
        )];
        let (_, template) =
            assign_row(CarryState::default(), &row(&cells), &grid()).expect("assign");
        let record = resolve_record(&template, &grid()).expect("resolve");
        assert_eq!(record.matchup.as_deref(), Some("MEM@HOU"));
        assert_eq!(record.team.as_deref(), Some("Memphis Grizzlies"));
    }

    fn fused_row() -> [TextFragment; 2] {
        [
            TextFragment::new(Rect::new(200.0, 0.0, 339.0, 10.0), "MEM@HOU Memphis Grizzlies"),
            cell(4, "Doe, John"),
        ]
    }

    #[test]
    fn carried_fused_matchup_still_splits() {
        let first = fused_row();
        let second = [cell(4, "Smith, Al"), cell(5, "Questionable")];
        let (state, _) = assign_row(CarryState::default(), &row(&first), &grid()).expect("row 1");
        let (_, template) = assign_row(state, &row(&second), &grid()).expect("row 2");

        let record = resolve_record(&template, &grid()).expect("resolve");
        assert_eq!(record.matchup.as_deref(), Some("MEM@HOU"));
        assert_eq!(record.team.as_deref(), Some("Memphis Grizzlies"));
        assert_eq!(record.player_name.as_deref(), Some("Smith, Al"));
        assert_eq!(record.current_status.as_deref(), Some("Questionable"));
    }

    #[test]
    fn fused_split_overwrites_team_from_a_later_row() {
        let first = fused_row();
        let second = [cell(3, "Houston Rockets"), cell(4, "Smith, Al")];
        let (state, _) = assign_row(CarryState::default(), &row(&first), &grid()).expect("row 1");
        let (state, template) = assign_row(state, &row(&second), &grid()).expect("row 2");

        assert_eq!(state.team.map(|f| f.text.as_str()), Some("Houston Rockets"));
        let record = resolve_record(&template, &grid()).expect("resolve");
        assert_eq!(record.matchup.as_deref(), Some("MEM@HOU"));
        assert_eq!(record.team.as_deref(), Some("Memphis Grizzlies"));
    }

    #[test]
    fn row_without_matchup_resolves_with_absent_fields() {
        let cells = [cell(0, "03/11/24"), cell(4, "Doe, John"), cell(5, "Out")];
        let (_, template) =
            assign_row(CarryState::default(), &row(&cells), &grid()).expect("assign");
        let record = resolve_record(&template, &grid()).expect("resolve");
        assert_eq!(record.matchup, None);
        assert_eq!(record.team, None);
        assert_eq!(record.current_status.as_deref(), Some("Out"));
    }

    #[test]
    fn fused_box_without_text_is_malformed() {
        let cells = [TextFragment::new(Rect::new(200.0, 0.0, 339.0, 10.0), " \n ")];
        let (_, template) =
            assign_row(CarryState::default(), &row(&cells), &grid()).expect("assign");
        assert_eq!(resolve_record(&template, &grid()), Err(RowError::MissingMatchup));
    }
}
