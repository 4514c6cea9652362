//! Uniform columnar output produced by every query.

use serde::Serialize;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
/// Grouping used when presenting tables.
pub enum DisplayTag {
    Features,
    Properties,
    View,
    Misc,
}

#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
/// One table cell. `spec` is a documentation anchor for linked cells.
pub struct Cell {
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spec: Option<String>,
}

impl Cell {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            spec: None,
        }
    }

    pub fn linked(text: impl Into<String>, spec: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            spec: Some(spec.into()),
        }
    }

    /// A cell with no text that still links to `spec`.
    pub fn link_only(spec: impl Into<String>) -> Self {
        Self {
            text: None,
            spec: Some(spec.into()),
        }
    }

    pub fn as_str(&self) -> &str {
        self.text.as_deref().unwrap_or("")
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct Table {
    pub name_func: &'static str,
    pub name_type: &'static str,
    pub spec: &'static str,
    pub tag: DisplayTag,
    /// Print `name_type` instead of `name_func` as the label.
    pub show_type: bool,
    /// The first row is a header and is not part of the data.
    pub header_row: bool,
    pub columns: Vec<Vec<Cell>>,
    /// When set, the columns are ignored by every consumer.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Table {
    pub fn new(
        name_func: &'static str,
        name_type: &'static str,
        spec: &'static str,
        tag: DisplayTag,
        column_count: usize,
    ) -> Self {
        Self {
            name_func,
            name_type,
            spec,
            tag,
            show_type: false,
            header_row: false,
            columns: vec![Vec::new(); column_count.clamp(1, 3)],
            error: None,
        }
    }

    /// Add a header row. Must be called before any data row.
    pub fn with_header(mut self, cells: impl IntoIterator<Item = Cell>) -> Self {
        self.header_row = true;
        self.push_row(cells);
        self
    }

    /// Append one row, one cell per column; short rows are padded with empty cells.
    pub fn push_row(&mut self, cells: impl IntoIterator<Item = Cell>) {
        let mut cells = cells.into_iter();
        for column in &mut self.columns {
            column.push(cells.next().unwrap_or_default());
        }
    }

    /// Append a `name | value` pair to a two-column table.
    pub fn push_pair(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.push_row([Cell::text(name), Cell::text(value)]);
    }

    pub fn set_error(&mut self, error: impl Into<String>) {
        self.error = Some(error.into());
    }

    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.set_error(error);
        self
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Number of rows, including the header.
    pub fn row_count(&self) -> usize {
        self.columns.first().map_or(0, Vec::len)
    }

    fn first_data_row(&self) -> usize {
        usize::from(self.header_row)
    }

    /// Data rows, header excluded, as per-row cell slices.
    pub fn data_rows(&self) -> impl Iterator<Item = Vec<&Cell>> + '_ {
        (self.first_data_row()..self.row_count())
            .map(move |row| self.columns.iter().map(|column| &column[row]).collect())
    }

    /// Text of the data rows in the first column.
    pub fn first_column_text(&self) -> Vec<&str> {
        self.data_rows().map(|row| row[0].as_str()).collect()
    }

    pub fn label(&self) -> &'static str {
        if self.show_type {
            self.name_type
        } else {
            self.name_func
        }
    }

    /// Case-insensitive match against either name.
    pub fn matches(&self, query: &str) -> bool {
        self.name_func.eq_ignore_ascii_case(query) || self.name_type.eq_ignore_ascii_case(query)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_row_is_excluded_from_data_rows() {
        let mut table = Table::new("xrFoo", "XrFoo", "foo", DisplayTag::Misc, 2)
            .with_header([Cell::text("Name"), Cell::text("Value")]);
        table.push_pair("a", "1");
        table.push_row([Cell::text("b")]);

        assert_eq!(table.row_count(), 3);
        assert_eq!(table.first_column_text(), vec!["a", "b"]);
        let last = table.data_rows().last().unwrap();
        assert_eq!(last[1], &Cell::default());
    }

    #[test]
    fn matches_either_name_ignoring_case() {
        let mut table = Table::new(
            "xrEnumerateReferenceSpaces",
            "XrReferenceSpaceType",
            "reference-spaces",
            DisplayTag::Misc,
            1,
        );
        assert!(table.matches("XRENUMERATEREFERENCESPACES"));
        assert!(table.matches("xrreferencespacetype"));
        assert!(!table.matches("xrEnumerate"));
        assert_eq!(table.label(), "xrEnumerateReferenceSpaces");
        table.show_type = true;
        assert_eq!(table.label(), "XrReferenceSpaceType");
    }

    #[test]
    fn column_count_is_clamped() {
        assert_eq!(Table::new("f", "t", "s", DisplayTag::Misc, 0).column_count(), 1);
        assert_eq!(Table::new("f", "t", "s", DisplayTag::Misc, 9).column_count(), 3);
    }
}
