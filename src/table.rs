//! Untyped tabular data as it arrives from scrapes and APIs
//!
//! A [`RawTable`] carries no ordering or uniqueness guarantees. It is built
//! once per fetch, handed to the normalizer, and discarded.

/// A raw grid of text cells with one or more header levels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawTable {
    /// One entry per header level, outermost first. Grids with multi-level
    /// column labels (e.g. field over ticker) keep every level.
    pub headers: Vec<Vec<String>>,
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    pub fn new(headers: Vec<Vec<String>>, rows: Vec<Vec<String>>) -> Self {
        Self { headers, rows }
    }

    /// Number of columns, taken from the widest header level or data row.
    pub fn width(&self) -> usize {
        self.headers
            .iter()
            .chain(self.rows.iter())
            .map(Vec::len)
            .max()
            .unwrap_or(0)
    }

    /// Column labels at one header level. `None` selects the deepest level;
    /// an out-of-range level clamps to the deepest. A grid without headers
    /// yields an empty label list.
    pub fn header_at(&self, level: Option<usize>) -> Vec<String> {
        if self.headers.is_empty() {
            return Vec::new();
        }
        let deepest = self.headers.len() - 1;
        let level = level.map_or(deepest, |l| l.min(deepest));
        self.headers[level].clone()
    }

    /// Every header cell of every level joined into one string, used for
    /// token scans over grids whose levels do not align column-for-column.
    pub fn flattened_header(&self) -> String {
        self.headers
            .iter()
            .flat_map(|level| level.iter())
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(" ")
    }
}
