//! Pagination of labels into print grids
//!
//! Two shapes are supported:
//!
//! - [`paginate`]: fixed-size pages (the HTML sheet uses 2 × 7 = 14 slots)
//! - [`arrange_rows`]: one continuous table, `labels_per_row` cells per run
//!
//! Unused positions are [`Slot::Blank`], never an empty label, so a renderer
//! cannot mistake padding for data. Empty input yields no pages and no runs.

use crate::error::{LabelError, Result};

#[derive(Debug, Clone, PartialEq)]
pub enum Slot<T> {
    Filled(T),
    Blank,
}

impl<T> Slot<T> {
    pub fn is_blank(&self) -> bool {
        matches!(self, Slot::Blank)
    }

    pub fn as_filled(&self) -> Option<&T> {
        match self {
            Slot::Filled(item) => Some(item),
            Slot::Blank => None,
        }
    }
}

/// Physical grid of one printed page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridSpec {
    pub columns: usize,
    pub rows: usize,
}

impl GridSpec {
    /// 2 columns × 7 rows of 90mm × 35mm labels on A4.
    pub const A4_LABELS: GridSpec = GridSpec { columns: 2, rows: 7 };

    pub fn capacity(&self) -> usize {
        self.columns * self.rows
    }
}

impl Default for GridSpec {
    fn default() -> Self {
        Self::A4_LABELS
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub slots: Vec<Slot<T>>,
}

impl<T> Page<T> {
    pub fn labels(&self) -> impl Iterator<Item = &T> {
        self.slots.iter().filter_map(Slot::as_filled)
    }

    pub fn filled_count(&self) -> usize {
        self.labels().count()
    }
}

/// Number of labels side by side in the PDF table (1..=3).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LabelsPerRow(u8);

impl LabelsPerRow {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 3;

    pub fn new(count: u8) -> Result<Self> {
        if (Self::MIN..=Self::MAX).contains(&count) {
            Ok(Self(count))
        } else {
            Err(LabelError::InvalidLabelsPerRow(count))
        }
    }

    pub fn get(&self) -> usize {
        self.0 as usize
    }
}

impl Default for LabelsPerRow {
    fn default() -> Self {
        Self(2)
    }
}

impl TryFrom<u8> for LabelsPerRow {
    type Error = LabelError;

    fn try_from(count: u8) -> Result<Self> {
        Self::new(count)
    }
}

/// One row of the continuous PDF table.
#[derive(Debug, Clone, PartialEq)]
pub struct Run<T> {
    pub cells: Vec<Slot<T>>,
}

impl<T> Run<T> {
    pub fn labels(&self) -> impl Iterator<Item = &T> {
        self.cells.iter().filter_map(Slot::as_filled)
    }
}

/// Split `items` into chunks of `size`, padding the last chunk with blanks.
fn chunk_padded<T>(items: Vec<T>, size: usize) -> Vec<Vec<Slot<T>>> {
    let mut chunks = Vec::with_capacity(items.len().div_ceil(size));
    let mut current = Vec::with_capacity(size);
    for item in items {
        current.push(Slot::Filled(item));
        if current.len() == size {
            chunks.push(std::mem::replace(&mut current, Vec::with_capacity(size)));
        }
    }
    if !current.is_empty() {
        current.resize_with(size, || Slot::Blank);
        chunks.push(current);
    }
    chunks
}

/// Fill fixed-capacity pages in order: `ceil(n / capacity)` pages, the last
/// one padded with blanks.
pub fn paginate<T>(items: Vec<T>, grid: GridSpec) -> Vec<Page<T>> {
    let capacity = grid.capacity().max(1);
    chunk_padded(items, capacity)
        .into_iter()
        .map(|slots| Page { slots })
        .collect()
}

/// Group items into runs of `per_row`, the last run padded with blanks.
pub fn arrange_rows<T>(items: Vec<T>, per_row: LabelsPerRow) -> Vec<Run<T>> {
    chunk_padded(items, per_row.get())
        .into_iter()
        .map(|cells| Run { cells })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fifteen_labels_make_two_pages() {
        let pages = paginate((0..15).collect(), GridSpec::A4_LABELS);
        assert_eq!(pages.len(), 2);
        assert_eq!(pages[0].slots.len(), 14);
        assert_eq!(pages[0].filled_count(), 14);
        assert_eq!(pages[1].slots.len(), 14);
        assert_eq!(pages[1].filled_count(), 1);
        assert_eq!(pages[1].slots[0], Slot::Filled(14));
        assert!(pages[1].slots[1..].iter().all(Slot::is_blank));
    }

    #[test]
    fn test_no_labels_no_pages() {
        let pages: Vec<Page<u32>> = paginate(Vec::new(), GridSpec::default());
        assert!(pages.is_empty());
    }

    #[test]
    fn test_exact_fill_has_no_blanks() {
        let pages = paginate((0..28).collect::<Vec<_>>(), GridSpec::A4_LABELS);
        assert_eq!(pages.len(), 2);
        assert!(pages.iter().all(|p| p.slots.iter().all(|s| !s.is_blank())));
    }

    #[test]
    fn test_five_labels_two_per_row() {
        let runs = arrange_rows(vec!['a', 'b', 'c', 'd', 'e'], LabelsPerRow::new(2).unwrap());
        assert_eq!(runs.len(), 3);
        assert_eq!(runs[2].cells, vec![Slot::Filled('e'), Slot::Blank]);
    }

    #[test]
    fn test_no_labels_no_runs() {
        let runs: Vec<Run<char>> = arrange_rows(Vec::new(), LabelsPerRow::new(3).unwrap());
        assert!(runs.is_empty());
    }

    #[test]
    fn test_labels_per_row_bounds() {
        assert!(LabelsPerRow::new(0).is_err());
        assert!(LabelsPerRow::new(4).is_err());
        assert_eq!(LabelsPerRow::try_from(3).unwrap().get(), 3);
        assert_eq!(LabelsPerRow::default().get(), 2);
    }

    mod proptest_tests {
        use crate::layout::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn pages_preserve_every_label(n in 0usize..200, cols in 1usize..4, rows in 1usize..9) {
                let grid = GridSpec { columns: cols, rows };
                let items: Vec<usize> = (0..n).collect();
                let pages = paginate(items.clone(), grid);

                prop_assert_eq!(pages.len(), n.div_ceil(grid.capacity()));
                prop_assert!(pages.iter().all(|p| p.slots.len() == grid.capacity()));

                let flattened: Vec<usize> = pages.iter().flat_map(|p| p.labels().copied()).collect();
                prop_assert_eq!(flattened, items);

                // blanks only ever trail the filled slots
                for page in &pages {
                    let first_blank = page.slots.iter().position(Slot::is_blank).unwrap_or(page.slots.len());
                    prop_assert!(page.slots[first_blank..].iter().all(Slot::is_blank));
                }
            }

            #[test]
            fn runs_are_rectangular(n in 0usize..100, k in 1u8..=3) {
                let per_row = LabelsPerRow::new(k).unwrap();
                let runs = arrange_rows((0..n).collect::<Vec<_>>(), per_row);
                let k = k as usize;

                prop_assert_eq!(runs.len(), n.div_ceil(k));
                prop_assert!(runs.iter().all(|r| r.cells.len() == k));
                if let Some(last) = runs.last() {
                    let expected = if n % k == 0 { k } else { n % k };
                    prop_assert_eq!(last.labels().count(), expected);
                }
                let flattened: Vec<usize> = runs.iter().flat_map(|r| r.labels().copied()).collect();
                prop_assert_eq!(flattened, (0..n).collect::<Vec<_>>());
            }
        }
    }
}
