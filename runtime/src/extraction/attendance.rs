//! Absence report extraction.
//!
//! The report page renders one `<tr>` per absence. Data rows carry the
//! `RowStyle` / `AlternatingRowStyle` classes while header and pager rows do
//! not, so rows are filtered on the exact class value rather than on table
//! structure. Cells map to fields through [`ATTENDANCE_SCHEMA`]. The totals
//! line lives in a separate label element after a full-width colon.

use crate::acquisition::document::{Document, DocumentParser};
use crate::acquisition::http_session::AuthenticatedSession;
use crate::config::PortalConfig;
use crate::error::{PortalError, Result};
use serde::Serialize;
use tracing::{debug, info};

/// Column of the absence table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AttendanceField {
    LeaveType,
    Date,
    Weekday,
    Periods,
}

impl AttendanceField {
    /// Label shown next to the value.
    pub fn label(self) -> &'static str {
        match self {
            Self::LeaveType => "假別",
            Self::Date => "日期",
            Self::Weekday => "星期",
            Self::Periods => "節次",
        }
    }
}

/// Display order of the fields and the table column each one is read from.
pub const ATTENDANCE_SCHEMA: [(AttendanceField, usize); 4] = [
    (AttendanceField::LeaveType, 0),
    (AttendanceField::Date, 1),
    (AttendanceField::Weekday, 2),
    (AttendanceField::Periods, 3),
];

/// One absence.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AttendanceRecord {
    pub leave_type: String,
    pub date: String,
    pub weekday: String,
    pub periods: String,
}

impl AttendanceRecord {
    pub fn get(&self, field: AttendanceField) -> &str {
        match field {
            AttendanceField::LeaveType => &self.leave_type,
            AttendanceField::Date => &self.date,
            AttendanceField::Weekday => &self.weekday,
            AttendanceField::Periods => &self.periods,
        }
    }

    /// Fields in schema order.
    pub fn fields(&self) -> impl Iterator<Item = (AttendanceField, &str)> + '_ {
        ATTENDANCE_SCHEMA
            .iter()
            .map(move |(field, _)| (*field, self.get(*field)))
    }

    /// Build a record from the trimmed cell texts of data row `row`.
    fn from_cells(row: usize, cells: &[String]) -> Result<Self> {
        if cells.len() != ATTENDANCE_SCHEMA.len() {
            return Err(PortalError::MalformedRow {
                row,
                found: cells.len(),
                expected: ATTENDANCE_SCHEMA.len(),
            });
        }

        let mut record = Self::default();
        for (field, column) in ATTENDANCE_SCHEMA {
            let text = cells[column].as_str();
            match field {
                AttendanceField::LeaveType => record.leave_type = text.to_string(),
                AttendanceField::Date => record.date = text.to_string(),
                AttendanceField::Weekday => record.weekday = text.to_string(),
                AttendanceField::Periods => record.periods = normalize_periods(text),
            }
        }
        Ok(record)
    }
}

/// All absences on the report page plus the totals line.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AttendanceReport {
    pub records: Vec<AttendanceRecord>,
    pub summary: String,
}

// ---- Text normalization -----------------------------------------------------

/// `"1,2,3"` → `"1, 2, 3"`. Commas already followed by a space are left
/// alone, so applying it twice changes nothing.
pub fn normalize_periods(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 8);
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        out.push(c);
        if c == ',' && chars.peek() != Some(&' ') {
            out.push(' ');
        }
    }
    out
}

/// Reduce the totals label text to its value part.
///
/// Takes the segment after the first `：`, collapses each run of five spaces
/// into one, drops the spaces around `、`, and trims. `None` when the text has
/// no `：`.
pub fn normalize_summary(text: &str) -> Option<String> {
    let segment = text.split('：').nth(1)?;
    let collapsed = segment.replace("     ", " ").replace(" 、 ", "、");
    Some(collapsed.trim().to_string())
}

// ---- Extraction -------------------------------------------------------------

/// Data rows of the report table, in document order.
pub fn extract_records(
    doc: &dyn Document,
    row_classes: &[String],
) -> Result<Vec<AttendanceRecord>> {
    let mut records = Vec::new();
    for row in doc.select("tr")? {
        let is_data_row = row
            .attr("class")
            .is_some_and(|class| row_classes.iter().any(|c| *c == class));
        if !is_data_row {
            continue;
        }

        let cells: Vec<String> = row
            .select("td")?
            .iter()
            .map(|cell| cell.text().trim().to_string())
            .collect();
        records.push(AttendanceRecord::from_cells(records.len() + 1, &cells)?);
    }
    Ok(records)
}

/// Totals line from the element matched by `selector`.
pub fn extract_summary(doc: &dyn Document, selector: &str) -> Result<String> {
    let missing = || PortalError::SummaryMissing {
        selector: selector.to_string(),
    };

    let elements = doc.select(selector)?;
    let label = elements.first().ok_or_else(missing)?;
    normalize_summary(&label.text()).ok_or_else(missing)
}

pub struct RecordExtractor<'a> {
    config: &'a PortalConfig,
    parser: &'a dyn DocumentParser,
}

impl<'a> RecordExtractor<'a> {
    pub fn new(config: &'a PortalConfig, parser: &'a dyn DocumentParser) -> Self {
        Self { config, parser }
    }

    /// Fetch the report page with `session` and parse it.
    pub async fn extract(&self, session: &AuthenticatedSession) -> Result<AttendanceReport> {
        let page = session.get(&self.config.report_url()).await?;
        self.parse_report(&page.body)
    }

    /// Parse an already fetched report page.
    pub fn parse_report(&self, html: &str) -> Result<AttendanceReport> {
        let doc = self.parser.parse(html);
        let records = extract_records(doc.as_ref(), &self.config.row_classes)?;
        if records.is_empty() {
            info!("report page has no absence rows");
        }
        let summary = extract_summary(doc.as_ref(), &self.config.summary_selector)?;
        debug!(records = records.len(), summary = %summary, "parsed report");
        Ok(AttendanceReport { records, summary })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::acquisition::document::{Element, HtmlParser};
    use std::collections::HashMap;

    const SUMMARY_LABEL: &str = r#"<span id="ctl00_ContentPlaceHolder1_Lab_count">總計：事假 3 節     、 病假 2 節</span>"#;

    fn page(rows: &str, summary: &str) -> String {
        format!(
            r#"<html><body>
            <table id="ctl00_ContentPlaceHolder1_GridView1">
                {rows}
            </table>
            {summary}
            </body></html>"#
        )
    }

    fn parse(html: &str) -> Result<AttendanceReport> {
        let config = PortalConfig::default();
        RecordExtractor::new(&config, &HtmlParser).parse_report(html)
    }

    #[test]
    fn test_only_marked_rows_are_extracted() {
        let rows = r#"
            <tr class="HeaderStyle"><th>假別</th><th>日期</th><th>星期</th><th>節次</th></tr>
            <tr class="RowStyle">
                <td> 事假 </td><td>113/03/04</td><td>一</td><td>1,2,3</td>
            </tr>
            <tr class="AlternatingRowStyle">
                <td>病假</td><td>113/03/06</td><td>三</td><td>5</td>
            </tr>
            <tr class="PagerStyle"><td>1</td><td>2</td><td>3</td><td>4</td></tr>
            <tr class="RowStyle Selected"><td>a</td><td>b</td><td>c</td><td>d</td></tr>
            <tr><td>a</td><td>b</td><td>c</td><td>d</td></tr>
        "#;
        let report = parse(&page(rows, SUMMARY_LABEL)).unwrap();

        assert_eq!(
            report.records,
            vec![
                AttendanceRecord {
                    leave_type: "事假".to_string(),
                    date: "113/03/04".to_string(),
                    weekday: "一".to_string(),
                    periods: "1, 2, 3".to_string(),
                },
                AttendanceRecord {
                    leave_type: "病假".to_string(),
                    date: "113/03/06".to_string(),
                    weekday: "三".to_string(),
                    periods: "5".to_string(),
                },
            ]
        );
        assert_eq!(report.summary, "事假 3 節、病假 2 節");
    }

    #[test]
    fn test_zero_rows_is_not_an_error() {
        let rows = r#"<tr class="HeaderStyle"><th>假別</th></tr>"#;
        let report = parse(&page(rows, SUMMARY_LABEL)).unwrap();

        assert!(report.records.is_empty());
        assert_eq!(report.summary, "事假 3 節、病假 2 節");
    }

    #[test]
    fn test_short_row_is_malformed() {
        let rows = r#"<tr class="RowStyle"><td>事假</td><td>113/03/04</td><td>一</td></tr>"#;
        let err = parse(&page(rows, SUMMARY_LABEL)).unwrap_err();

        assert!(matches!(
            err,
            PortalError::MalformedRow {
                row: 1,
                found: 3,
                expected: 4
            }
        ));
    }

    #[test]
    fn test_missing_summary_element_is_an_error() {
        let err = parse(&page("", "")).unwrap_err();
        assert!(matches!(err, PortalError::SummaryMissing { .. }));
    }

    #[test]
    fn test_summary_without_colon_is_an_error() {
        let label = r#"<span id="ctl00_ContentPlaceHolder1_Lab_count">查無資料</span>"#;
        let err = parse(&page("", label)).unwrap_err();
        assert!(matches!(err, PortalError::SummaryMissing { .. }));
    }

    #[test]
    fn test_normalize_periods_is_idempotent() {
        let once = normalize_periods("A,B");
        assert_eq!(once, "A, B");
        assert_eq!(normalize_periods(&once), "A, B");
        assert_eq!(normalize_periods("1, 2,3"), "1, 2, 3");
        assert_eq!(normalize_periods(""), "");
    }

    #[test]
    fn test_normalize_summary_exact_literal() {
        // Six spaces: the five-space run collapses to one, which leaves
        // " 、 " for the second replacement to remove.
        assert_eq!(
            normalize_summary("總計：3      、 2").as_deref(),
            Some("3 、2")
        );
        assert_eq!(normalize_summary("總計：3 、 2").as_deref(), Some("3、2"));
        assert_eq!(normalize_summary("  總計：  曠課 1 節  ").as_deref(), Some("曠課 1 節"));
        assert_eq!(normalize_summary("總計 3"), None);
    }

    #[test]
    fn test_fields_follow_schema_order() {
        let record = AttendanceRecord {
            leave_type: "公假".to_string(),
            date: "113/05/01".to_string(),
            weekday: "三".to_string(),
            periods: "7, 8".to_string(),
        };
        let labels: Vec<(&str, &str)> = record.fields().map(|(f, v)| (f.label(), v)).collect();
        assert_eq!(
            labels,
            vec![
                ("假別", "公假"),
                ("日期", "113/05/01"),
                ("星期", "三"),
                ("節次", "7, 8"),
            ]
        );
    }

    #[test]
    fn test_schema_covers_each_column_once() {
        let mut columns: Vec<usize> = ATTENDANCE_SCHEMA.iter().map(|(_, c)| *c).collect();
        columns.sort_unstable();
        assert_eq!(columns, (0..ATTENDANCE_SCHEMA.len()).collect::<Vec<_>>());
    }

    // ---- In-memory document, no HTML parsing ----

    #[derive(Default)]
    struct Node {
        tag: &'static str,
        attrs: HashMap<&'static str, &'static str>,
        text: &'static str,
        children: Vec<Node>,
    }

    impl Node {
        fn new(tag: &'static str) -> Self {
            Self {
                tag,
                ..Self::default()
            }
        }

        fn attr(mut self, name: &'static str, value: &'static str) -> Self {
            self.attrs.insert(name, value);
            self
        }

        fn text(mut self, text: &'static str) -> Self {
            self.text = text;
            self
        }

        fn child(mut self, child: Node) -> Self {
            self.children.push(child);
            self
        }

        fn matches(&self, selector: &str) -> bool {
            match selector.strip_prefix('#') {
                Some(id) => self.attrs.get("id") == Some(&id),
                None => self.tag == selector,
            }
        }

        fn collect<'a>(&'a self, selector: &str, out: &mut Vec<Box<dyn Element + 'a>>) {
            for child in &self.children {
                if child.matches(selector) {
                    out.push(Box::new(child));
                }
                child.collect(selector, out);
            }
        }
    }

    impl Element for &Node {
        fn attr(&self, name: &str) -> Option<String> {
            self.attrs.get(name).map(|v| v.to_string())
        }

        fn text(&self) -> String {
            let mut text = self.text.to_string();
            for child in &self.children {
                text.push_str(&Element::text(&child));
            }
            text
        }

        fn select(&self, selector: &str) -> Result<Vec<Box<dyn Element + '_>>> {
            let mut out = Vec::new();
            self.collect(selector, &mut out);
            Ok(out)
        }
    }

    impl Document for Node {
        fn select(&self, selector: &str) -> Result<Vec<Box<dyn Element + '_>>> {
            let mut out = Vec::new();
            self.collect(selector, &mut out);
            Ok(out)
        }
    }

    fn data_row(class: &'static str, cells: [&'static str; 4]) -> Node {
        cells
            .into_iter()
            .fold(Node::new("tr").attr("class", class), |row, cell| {
                row.child(Node::new("td").text(cell))
            })
    }

    #[test]
    fn test_extract_from_in_memory_document() {
        let doc = Node::new("html")
            .child(
                Node::new("table")
                    .child(Node::new("tr").attr("class", "HeaderStyle"))
                    .child(data_row("RowStyle", ["曠課", "113/04/01", "一", "1,2"]))
                    .child(data_row("FooterStyle", ["x", "x", "x", "x"]))
                    .child(data_row("AlternatingRowStyle", ["遲到", "113/04/02", "二", "3"])),
            )
            .child(
                Node::new("span")
                    .attr("id", "total")
                    .text("總計：曠課 2 節 、 遲到 1 節"),
            );

        let classes = PortalConfig::default().row_classes;
        let records = extract_records(&doc, &classes).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].periods, "1, 2");
        assert_eq!(records[1].leave_type, "遲到");

        assert_eq!(
            extract_summary(&doc, "#total").unwrap(),
            "曠課 2 節、遲到 1 節"
        );
    }
}
