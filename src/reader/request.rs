use crate::{filter::Filter, util::Slice};

/// Families and single columns a read is restricted to. An empty selection
/// reads every column of the row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnSelection {
    families: Vec<String>,
    columns: Vec<(String, Slice)>,
}

impl ColumnSelection {
    pub fn is_all(&self) -> bool {
        self.families.is_empty() && self.columns.is_empty()
    }

    pub fn selects(&self, family: &str, qualifier: &[u8]) -> bool {
        self.is_all()
            || self.families.iter().any(|f| f == family)
            || self
                .columns
                .iter()
                .any(|(f, q)| f == family && q.data() == qualifier)
    }

    /// Every family the selection names, for schema validation
    pub fn named_families(&self) -> impl Iterator<Item = &str> {
        self.families
            .iter()
            .map(String::as_str)
            .chain(self.columns.iter().map(|(f, _)| f.as_str()))
    }

    fn add_family(&mut self, family: &str) {
        if !self.families.iter().any(|f| f == family) {
            self.families.push(family.to_string());
        }
    }

    fn add_column(&mut self, family: &str, qualifier: Slice) {
        self.columns.push((family.to_string(), qualifier));
    }
}

/// Point read of one row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Get {
    row: Slice,
    selection: ColumnSelection,
    filter: Option<Filter>,
}

impl Get {
    pub fn new(row: impl Into<Slice>) -> Self {
        Get {
            row: row.into(),
            selection: ColumnSelection::default(),
            filter: None,
        }
    }

    pub fn add_family(mut self, family: &str) -> Self {
        self.selection.add_family(family);
        self
    }

    pub fn add_column(mut self, family: &str, qualifier: impl Into<Slice>) -> Self {
        self.selection.add_column(family, qualifier.into());
        self
    }

    pub fn with_filter(mut self, filter: Filter) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn row(&self) -> &Slice {
        &self.row
    }

    pub fn selection(&self) -> &ColumnSelection {
        &self.selection
    }

    pub fn filter(&self) -> Option<&Filter> {
        self.filter.as_ref()
    }
}

/// Range read over `[start, stop)` in row-key order.
///
/// Without bounds the scan covers the whole table starting from the smallest
/// row key. The batch size only decides how many rows each round trip
/// fetches; it never changes which rows are returned or their order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Scan {
    start: Option<Slice>,
    stop: Option<Slice>,
    selection: ColumnSelection,
    filter: Option<Filter>,
    batch_size: Option<usize>,
}

impl Scan {
    pub fn new() -> Self {
        Scan::default()
    }

    /// Scan `[start, stop)`
    pub fn range(start: impl Into<Slice>, stop: impl Into<Slice>) -> Self {
        Scan::new().with_start_row(start).with_stop_row(stop)
    }

    /// First row key to return (inclusive)
    pub fn with_start_row(mut self, start: impl Into<Slice>) -> Self {
        self.start = Some(start.into());
        self
    }

    /// Row key at which the scan ends (exclusive)
    pub fn with_stop_row(mut self, stop: impl Into<Slice>) -> Self {
        self.stop = Some(stop.into());
        self
    }

    pub fn with_filter(mut self, filter: Filter) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = Some(batch_size);
        self
    }

    pub fn add_family(mut self, family: &str) -> Self {
        self.selection.add_family(family);
        self
    }

    pub fn add_column(mut self, family: &str, qualifier: impl Into<Slice>) -> Self {
        self.selection.add_column(family, qualifier.into());
        self
    }

    pub fn start_row(&self) -> Option<&Slice> {
        self.start.as_ref()
    }

    pub fn stop_row(&self) -> Option<&Slice> {
        self.stop.as_ref()
    }

    pub fn selection(&self) -> &ColumnSelection {
        &self.selection
    }

    pub fn filter(&self) -> Option<&Filter> {
        self.filter.as_ref()
    }

    pub fn batch_size(&self) -> Option<usize> {
        self.batch_size
    }

    /// True if `row` lies inside `[start, stop)`
    pub fn contains(&self, row: &Slice) -> bool {
        self.start.as_ref().is_none_or(|start| row >= start)
            && self.stop.as_ref().is_none_or(|stop| row < stop)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_range_bounds() {
        let scan = Scan::range("c", "d");
        assert!(scan.contains(&Slice::from("c")));
        assert!(scan.contains(&Slice::from("c1")));
        assert!(scan.contains(&Slice::from("cx")));
        assert!(!scan.contains(&Slice::from("d")));
        assert!(!scan.contains(&Slice::from("d1")));
        assert!(!scan.contains(&Slice::from("b")));

        assert!(Scan::new().contains(&Slice::from("anything")));
    }

    #[test]
    fn test_selection() {
        let get = Get::new("hr").add_family("grade").add_column("info", "age");
        let selection = get.selection();

        assert!(selection.selects("grade", b"math"));
        assert!(selection.selects("info", b"age"));
        assert!(!selection.selects("info", b"name"));
        assert_eq!(
            selection.named_families().collect::<Vec<_>>(),
            vec!["grade", "info"]
        );

        assert!(ColumnSelection::default().selects("any", b"thing"));
    }
}
