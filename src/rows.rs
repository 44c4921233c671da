use crate::model::{Column, TextFragment};
use crate::normalize::normalize_text;

/// Fragments of one visual line, left to right.
#[derive(Debug, Clone, PartialEq)]
pub struct Row<'a> {
    pub fragments: Vec<&'a TextFragment>,
}

impl<'a> Row<'a> {
    fn closed(mut fragments: Vec<&'a TextFragment>) -> Self {
        fragments.sort_by(|left, right| left.bounds.x0.total_cmp(&right.bounds.x0));
        Self { fragments }
    }

    pub fn left_edges(&self) -> impl Iterator<Item = f32> + '_ {
        self.fragments.iter().map(|fragment| fragment.bounds.x0)
    }

    /// The "Game Date | Game Time | ..." line repeated at the top of each page.
    #[must_use]
    pub fn is_heading(&self) -> bool {
        self.fragments.len() >= 2
            && self.fragments.iter().all(|fragment| {
                let text = normalize_text(&fragment.text);
                Column::ALL
                    .iter()
                    .any(|column| column.label().eq_ignore_ascii_case(&text))
            })
    }
}

/// `next` sits on a lower line when both of its edges are below `current`'s.
///
/// Wrapped cell text grows downward from the row's top edge, so a box that is
/// only partially lower still belongs to the same visual row.
fn starts_lower_line(current: &TextFragment, next: &TextFragment) -> bool {
    current.bounds.y1 > next.bounds.y1 && current.bounds.y0 > next.bounds.y0
}

/// Groups a page's fragments into visual rows, top to bottom.
///
/// The topmost fragment (page title) and the bottommost one (page footer) are
/// never part of the table.
pub fn group_rows(fragments: &[TextFragment]) -> Vec<Row<'_>> {
    let mut ordered = fragments
        .iter()
        .filter(|fragment| !fragment.is_blank())
        .collect::<Vec<_>>();
    ordered.sort_by(|upper, lower| lower.bounds.y1.total_cmp(&upper.bounds.y1));

    // A table body needs at least two fragments between title and footer.
    if ordered.len() < 4 {
        return Vec::new();
    }
    let body = &ordered[1..ordered.len() - 1];
    let footer = ordered[ordered.len() - 1];

    let mut rows = Vec::new();
    let mut current = Vec::new();
    for (index, fragment) in body.iter().enumerate() {
        current.push(*fragment);
        let next = body.get(index + 1).copied().unwrap_or(footer);
        if starts_lower_line(fragment, next) {
            rows.push(Row::closed(std::mem::take(&mut current)));
        }
    }

    if !current.is_empty() {
        rows.push(Row::closed(current));
    }

    rows
}
