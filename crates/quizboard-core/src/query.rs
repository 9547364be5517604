//! Search, sort, and pagination over the response rows.

use std::cmp::Ordering;
use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::model::{QuestionGroup, Row, SortDir, TOTAL_SCORE_ALIASES, TOTAL_SCORE_COLUMN};
use crate::score::{coerce_number, extract_score};

/// Default number of rows per page.
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Column and direction to sort by.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSpec {
    pub key: String,
    #[serde(default)]
    pub dir: SortDir,
}

impl SortSpec {
    pub fn new(key: impl Into<String>, dir: SortDir) -> Self {
        Self {
            key: key.into(),
            dir,
        }
    }
}

/// Everything a query depends on besides the rows themselves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryParams {
    #[serde(default)]
    pub search: String,
    #[serde(default)]
    pub sort: Option<SortSpec>,
    /// 1-indexed.
    #[serde(default = "default_page")]
    pub page: usize,
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

fn default_page() -> usize {
    1
}

fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}

impl Default for QueryParams {
    fn default() -> Self {
        Self {
            search: String::new(),
            sort: None,
            page: default_page(),
            page_size: default_page_size(),
        }
    }
}

/// One page of query results.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryPage<'a> {
    pub rows: Vec<&'a Row>,
    pub page: usize,
    pub total_pages: usize,
    /// Rows matching the search, across all pages.
    pub filtered_count: usize,
}

impl QueryPage<'_> {
    pub fn empty() -> Self {
        Self {
            rows: Vec::new(),
            page: 1,
            total_pages: 1,
            filtered_count: 0,
        }
    }
}

/// Columns compared by parsed score rather than raw text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NumericColumns {
    columns: HashSet<String>,
}

impl NumericColumns {
    /// Every group's score column plus the synthetic total-score column.
    pub fn from_groups(groups: &[QuestionGroup]) -> Self {
        let mut columns: HashSet<String> = groups.iter().map(|g| g.score_key.clone()).collect();
        columns.extend(TOTAL_SCORE_ALIASES.iter().map(|s| s.to_string()));
        Self { columns }
    }

    pub fn contains(&self, column: &str) -> bool {
        self.columns.contains(column)
    }
}

/// Cell used for sorting; the total-score aliases all resolve the same way.
fn sort_cell<'a>(row: &'a Row, key: &str) -> &'a str {
    if key == TOTAL_SCORE_COLUMN || TOTAL_SCORE_ALIASES.contains(&key) {
        row.total_score_cell()
    } else {
        row.get(key)
    }
}

/// Rows with any cell containing `search`, case-insensitively.
pub fn filter_rows<'a>(rows: &'a [Row], search: &str) -> Vec<&'a Row> {
    let needle = search.to_lowercase();
    if needle.is_empty() {
        return rows.iter().collect();
    }
    rows.iter()
        .filter(|row| row.values().any(|cell| cell.to_lowercase().contains(&needle)))
        .collect()
}

/// Text comparison: case-insensitive first, raw order to break ties.
fn compare_text(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

/// Numeric cells rank before text cells, so mixed columns still sort totally.
fn compare_cells(a: &str, b: &str, numeric: bool) -> Ordering {
    if numeric {
        return extract_score(a).score.total_cmp(&extract_score(b).score);
    }
    match (coerce_number(a), coerce_number(b)) {
        (Some(x), Some(y)) => x.total_cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => compare_text(a, b),
    }
}

/// Stable sort by one column.
pub fn sort_rows(rows: &mut [&Row], spec: &SortSpec, numeric: &NumericColumns) {
    let is_numeric = numeric.contains(&spec.key);
    rows.sort_by(|a, b| {
        let ord = compare_cells(sort_cell(a, &spec.key), sort_cell(b, &spec.key), is_numeric);
        match spec.dir {
            SortDir::Asc => ord,
            SortDir::Desc => ord.reverse(),
        }
    });
}

/// `max(1, ceil(count / page_size))`.
pub fn total_pages(count: usize, page_size: usize) -> usize {
    count.div_ceil(page_size.max(1)).max(1)
}

/// The 1-indexed page of `items`; empty when the page is out of range.
pub fn paginate<T: Clone>(items: &[T], page: usize, page_size: usize) -> Vec<T> {
    let page_size = page_size.max(1);
    let start = page.saturating_sub(1).saturating_mul(page_size);
    if page == 0 || start >= items.len() {
        return Vec::new();
    }
    let end = std::cmp::min(start + page_size, items.len());
    items[start..end].to_vec()
}

/// Rows matching the search, sorted, but not paginated.
pub fn select_rows<'a>(
    rows: &'a [Row],
    params: &QueryParams,
    numeric: &NumericColumns,
) -> Vec<&'a Row> {
    let mut filtered = filter_rows(rows, &params.search);
    if let Some(spec) = &params.sort {
        sort_rows(&mut filtered, spec, numeric);
    }
    filtered
}

/// Search, sort, then paginate.
pub fn query<'a>(rows: &'a [Row], params: &QueryParams, numeric: &NumericColumns) -> QueryPage<'a> {
    let selected = select_rows(rows, params, numeric);
    QueryPage {
        rows: paginate(&selected, params.page, params.page_size),
        page: params.page,
        total_pages: total_pages(selected.len(), params.page_size),
        filtered_count: selected.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(user: &str, total: &str, city: &str) -> Row {
        [("Username", user), ("Total score", total), ("City", city)]
            .into_iter()
            .collect()
    }

    fn users(rows: &[&Row]) -> Vec<String> {
        rows.iter().map(|r| r.get("Username").to_string()).collect()
    }

    fn sample() -> Vec<Row> {
        vec![
            row("carol", "7/10", "Leeds"),
            row("alice", "10/10", "york"),
            row("bob", "2/10", "London"),
            row("dave", "9/10", "leeds"),
        ]
    }

    #[test]
    fn search_matches_any_cell_case_insensitively() {
        let rows = sample();
        assert_eq!(users(&filter_rows(&rows, "LEEDS")), vec!["carol", "dave"]);
        assert_eq!(users(&filter_rows(&rows, "10/10")), vec!["alice"]);
        assert_eq!(filter_rows(&rows, "").len(), 4);
        assert!(filter_rows(&rows, "zzz").is_empty());
    }

    #[test]
    fn search_keeps_surrounding_whitespace() {
        let rows = vec![
            row("erin", "5/10", "Paris"),
            row("finn", "5/10", "Parisian"),
            row("gus", "5/10", "Gare de Paris Nord"),
        ];
        assert_eq!(users(&filter_rows(&rows, "Paris")), vec!["erin", "finn", "gus"]);
        assert_eq!(users(&filter_rows(&rows, " Paris")), vec!["gus"]);
        assert_eq!(users(&filter_rows(&rows, "paris ")), vec!["gus"]);
    }

    #[test]
    fn numeric_sort_uses_parsed_score() {
        let rows = sample();
        let numeric = NumericColumns::from_groups(&[]);
        let params = QueryParams {
            sort: Some(SortSpec::new(TOTAL_SCORE_COLUMN, SortDir::Asc)),
            page_size: 10,
            ..Default::default()
        };
        let page = query(&rows, &params, &numeric);
        assert_eq!(users(&page.rows), vec!["bob", "carol", "dave", "alice"]);
    }

    #[test]
    fn asc_then_desc_is_reversed() {
        let rows = sample();
        let numeric = NumericColumns::from_groups(&[]);
        let mut asc = filter_rows(&rows, "");
        sort_rows(&mut asc, &SortSpec::new("Total score", SortDir::Asc), &numeric);
        let mut desc = filter_rows(&rows, "");
        sort_rows(&mut desc, &SortSpec::new("Total score", SortDir::Desc), &numeric);
        let mut reversed = users(&desc);
        reversed.reverse();
        assert_eq!(users(&asc), reversed);
    }

    #[test]
    fn text_sort_is_case_aware() {
        let rows = sample();
        let numeric = NumericColumns::default();
        let mut selected = filter_rows(&rows, "");
        sort_rows(&mut selected, &SortSpec::new("City", SortDir::Asc), &numeric);
        let cities: Vec<_> = selected.iter().map(|r| r.get("City")).collect();
        assert_eq!(cities, vec!["Leeds", "leeds", "London", "york"]);
    }

    #[test]
    fn raw_numeric_coercion_for_plain_columns() {
        let rows: Vec<Row> = ["10", "9", "100"]
            .iter()
            .map(|n| [("Age", *n)].into_iter().collect())
            .collect();
        let mut selected = filter_rows(&rows, "");
        sort_rows(&mut selected, &SortSpec::new("Age", SortDir::Asc), &NumericColumns::default());
        let ages: Vec<_> = selected.iter().map(|r| r.get("Age")).collect();
        assert_eq!(ages, vec!["9", "10", "100"]);
    }

    #[test]
    fn mixed_numeric_and_text_column_sorts_without_panicking() {
        let rows: Vec<Row> = (0..200)
            .map(|v| {
                let room = match v % 3 {
                    0 => format!("{v}"),
                    1 => format!("{v}a"),
                    _ => format!("{}", v / 10),
                };
                [("Room", room.as_str())].into_iter().collect()
            })
            .collect();

        for dir in [SortDir::Asc, SortDir::Desc] {
            let mut selected = filter_rows(&rows, "");
            sort_rows(&mut selected, &SortSpec::new("Room", dir), &NumericColumns::default());
            let mut rooms: Vec<&str> = selected.iter().map(|r| r.get("Room")).collect();
            if dir == SortDir::Desc {
                rooms.reverse();
            }

            let split = rooms
                .iter()
                .position(|r| coerce_number(r).is_none())
                .unwrap_or(rooms.len());
            assert!(rooms[split..].iter().all(|r| coerce_number(r).is_none()));

            let numbers: Vec<f64> = rooms[..split].iter().filter_map(|r| coerce_number(r)).collect();
            assert!(numbers.windows(2).all(|w| w[0] <= w[1]));
            assert!(rooms[split..]
                .windows(2)
                .all(|w| compare_text(w[0], w[1]) != Ordering::Greater));
        }
    }

    #[test]
    fn sort_is_stable_for_ties() {
        let rows = vec![
            row("first", "5/10", "x"),
            row("second", "5/10", "x"),
            row("third", "1/10", "x"),
        ];
        let mut selected = filter_rows(&rows, "");
        sort_rows(
            &mut selected,
            &SortSpec::new("Total score", SortDir::Asc),
            &NumericColumns::from_groups(&[]),
        );
        assert_eq!(users(&selected), vec!["third", "first", "second"]);
    }

    #[test]
    fn no_sort_key_preserves_order() {
        let rows = sample();
        let page = query(&rows, &QueryParams::default(), &NumericColumns::default());
        assert_eq!(users(&page.rows), vec!["carol", "alice", "bob", "dave"]);
    }

    #[test]
    fn pages_concatenate_to_filtered_set() {
        let rows = sample();
        let numeric = NumericColumns::default();
        let mut all = Vec::new();
        let first = query(
            &rows,
            &QueryParams {
                page_size: 3,
                ..Default::default()
            },
            &numeric,
        );
        assert_eq!(first.total_pages, 2);
        for page in 1..=first.total_pages {
            let p = query(
                &rows,
                &QueryParams {
                    page,
                    page_size: 3,
                    ..Default::default()
                },
                &numeric,
            );
            all.extend(users(&p.rows));
        }
        assert_eq!(all, vec!["carol", "alice", "bob", "dave"]);
    }

    #[test]
    fn out_of_range_page_is_empty() {
        let rows = sample();
        let params = QueryParams {
            page: 9,
            page_size: 2,
            ..Default::default()
        };
        let page = query(&rows, &params, &NumericColumns::default());
        assert!(page.rows.is_empty());
        assert_eq!(page.total_pages, 2);
        assert_eq!(page.filtered_count, 4);
    }

    #[test]
    fn total_pages_is_at_least_one() {
        assert_eq!(total_pages(0, 10), 1);
        assert_eq!(total_pages(10, 10), 1);
        assert_eq!(total_pages(11, 10), 2);
        assert_eq!(total_pages(5, 0), 5);
    }

    #[test]
    fn score_columns_are_numeric() {
        let group = QuestionGroup {
            base_name: "Q1".into(),
            normalized_name: "Q1".into(),
            question_key: "Q1".into(),
            score_key: "Q1 [Score]".into(),
            feedback_key: None,
        };
        let numeric = NumericColumns::from_groups(&[group]);
        assert!(numeric.contains("Q1 [Score]"));
        assert!(numeric.contains("TotalScore"));
        assert!(!numeric.contains("Q1"));
    }
}
