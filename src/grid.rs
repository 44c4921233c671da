use crate::model::{Column, TextFragment};

/// Sorted, distinct left edges observed on the rows it was built from.
///
/// Rank `n` in the grid is the `n`th report column, so the grid is the
/// implicit schema of the table. Lookups are exact: the grid is always built
/// from the same fragments it is later applied to.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnGrid {
    positions: Vec<f32>,
}

impl ColumnGrid {
    pub fn from_positions(positions: impl IntoIterator<Item = f32>) -> Self {
        let mut positions = positions.into_iter().collect::<Vec<_>>();
        positions.sort_by(f32::total_cmp);
        positions.dedup();
        Self { positions }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// More columns than the report layout has; ranks would be meaningless.
    #[must_use]
    pub fn is_ambiguous(&self) -> bool {
        self.positions.len() > Column::COUNT
    }

    #[must_use]
    pub fn rank_of(&self, x0: f32) -> Option<usize> {
        self.positions.iter().position(|&position| position == x0)
    }

    #[must_use]
    pub fn column_of(&self, fragment: &TextFragment) -> Option<Column> {
        self.rank_of(fragment.bounds.x0).and_then(Column::from_rank)
    }

    #[must_use]
    pub fn x0_of(&self, column: Column) -> Option<f32> {
        self.positions.get(column.rank()).copied()
    }

    #[must_use]
    pub fn positions(&self) -> &[f32] {
        &self.positions
    }
}
