//! Day Aggregator Module
//!
//! セルグリッドを行単位で走査し、散在する行を日ごとの活動記録にまとめる
//! 状態機械を提供するモジュール。
//!
//! # 状態遷移
//!
//! | 入力 | Idle | Accumulating |
//! | --- | --- | --- |
//! | 日付セル | 新しい日を開く | フラッシュしてから新しい日を開く |
//! | 活動内容 | 無視 | 活動を追加 |
//! | 時間セル | 無視 | 時間を設定してフラッシュ → Idle |
//! | 入力終了 | - | フラッシュ → Idle |
//!
//! フラッシュ時、活動が1件もない日は（時間が記録されていても）破棄されます。

use chrono::NaiveDate;
use log::debug;

use crate::api::GridLayout;
use crate::types::{Cell, CellGrid, DailyRecord};

/// 開いている日
#[derive(Debug, Clone, PartialEq)]
struct OpenDay {
    date: NaiveDate,
    activities: Vec<String>,
    pending_hours: Option<f64>,
}

/// 日ごとの活動記録を組み立てる状態オブジェクト
///
/// `open` が `None` の状態が `Idle`、`Some` の状態が `Accumulating` です。
///
/// # 使用例
///
/// ```rust
/// use chrono::NaiveDate;
/// use nachweismd::{Cell, DayAggregator};
///
/// let mut aggregator = DayAggregator::new();
/// aggregator.push_date(NaiveDate::from_ymd_opt(2025, 3, 3).unwrap());
/// aggregator.push_activity("Review tickets");
/// let record = aggregator.push_hours(&Cell::Number(8.0)).unwrap();
///
/// assert_eq!(record.activities, vec!["Review tickets".to_string()]);
/// assert_eq!(record.hours, Some(8.0));
/// assert!(aggregator.is_idle());
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DayAggregator {
    open: Option<OpenDay>,
}

impl DayAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// 日が開いていないかどうか
    pub fn is_idle(&self) -> bool {
        self.open.is_none()
    }

    /// 日付セルを受け取る
    ///
    /// 開いている日をフラッシュし、指定日付で新しい日を開きます。
    /// 戻り値はフラッシュで確定した記録です。
    pub fn push_date(&mut self, date: NaiveDate) -> Option<DailyRecord> {
        let flushed = self.flush();
        self.open = Some(OpenDay {
            date,
            activities: Vec::new(),
            pending_hours: None,
        });
        flushed
    }

    /// 活動内容を追加する
    ///
    /// 空白正規化後に空になる文字列、および `Idle` 中の入力は無視されます。
    /// 追加した場合は `true` を返します。
    pub fn push_activity(&mut self, text: &str) -> bool {
        let text = crate::types::normalize_whitespace(text);
        match self.open.as_mut() {
            Some(day) if !text.is_empty() => {
                day.activities.push(text);
                true
            }
            _ => false,
        }
    }

    /// 時間セルを受け取る
    ///
    /// 日が開いている場合のみ作用し、時間を設定した直後にその日を閉じます。
    /// 数値に変換できない値は「時間なし」として扱い、エラーにはしません。
    pub fn push_hours(&mut self, cell: &Cell) -> Option<DailyRecord> {
        let day = self.open.as_mut()?;
        day.pending_hours = parse_hours(cell);
        self.flush()
    }

    /// 開いている日を確定させ、`Idle` に戻る
    ///
    /// 日付があり、活動が1件以上ある場合のみ記録を返します。
    pub fn flush(&mut self) -> Option<DailyRecord> {
        let day = self.open.take()?;
        if day.activities.is_empty() {
            debug!(
                "discarding {} without activities (hours: {:?})",
                day.date, day.pending_hours
            );
            return None;
        }
        Some(DailyRecord {
            date: day.date,
            activities: day.activities,
            hours: day.pending_hours,
        })
    }

    /// 1行分のセルを処理する
    ///
    /// 優先順位は 日付 → 活動内容 → 時間 です。日付セルを含む行では、
    /// 同じ行の活動内容・時間セルは参照しません。
    pub fn push_row(
        &mut self,
        date_cell: Option<&Cell>,
        activity_cell: Option<&Cell>,
        hours_cell: Option<&Cell>,
    ) -> Option<DailyRecord> {
        if let Some(Cell::DateTime(dt)) = date_cell {
            return self.push_date(dt.date());
        }

        if let Some(cell) = activity_cell {
            self.push_activity(&cell.clean_text());
        }

        match hours_cell {
            Some(Cell::Empty) | None => None,
            Some(cell) => self.push_hours(cell),
        }
    }
}

fn parse_hours(cell: &Cell) -> Option<f64> {
    match cell {
        Cell::Number(n) => Some(*n),
        Cell::Text(s) => s.trim().parse().ok(),
        Cell::DateTime(_) | Cell::Empty => None,
    }
}

/// データ開始行を探す
///
/// マーカー列に `"Tag"` を含む最初の行の次の行を返します。
/// 見つからない場合は0行目から走査します。
pub fn find_data_start(grid: &CellGrid, layout: &GridLayout) -> usize {
    (0..grid.height())
        .find(|&row| match grid.get(row, layout.marker_col) {
            Some(Cell::Text(s)) => s.contains(layout.marker_text.as_str()),
            _ => false,
        })
        .map(|row| row + 1)
        .unwrap_or(0)
}

/// グリッド全体を走査して日ごとの記録を返す
///
/// 記録は走査順に並びます。
pub fn scan_days(grid: &CellGrid, layout: &GridLayout) -> Vec<DailyRecord> {
    let start = find_data_start(grid, layout);
    debug!("scanning activity rows from row {}", start);

    let mut aggregator = DayAggregator::new();
    let mut records = Vec::new();

    for row in start..grid.height() {
        let flushed = aggregator.push_row(
            grid.get(row, layout.date_col),
            grid.get(row, layout.activity_col),
            grid.get(row, layout.hours_col),
        );
        records.extend(flushed);
    }
    records.extend(aggregator.flush());

    records
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn date_cell(y: i32, m: u32, d: u32) -> Cell {
        Cell::DateTime(date(y, m, d).and_hms_opt(0, 0, 0).unwrap())
    }

    fn text(s: &str) -> Cell {
        Cell::Text(s.to_string())
    }

    /// 既定レイアウト（B列=日付, C列=活動, L列=時間）で1行を組み立てる
    fn row(date: Cell, activity: Cell, hours: Cell) -> Vec<Cell> {
        let mut cells = vec![Cell::Empty; 12];
        cells[1] = date;
        cells[2] = activity;
        cells[11] = hours;
        cells
    }

    fn marker_row() -> Vec<Cell> {
        row(text("Tag"), text("Tätigkeit"), text("Stunden"))
    }

    #[test]
    fn test_flush_when_idle_returns_none() {
        let mut aggregator = DayAggregator::new();
        assert!(aggregator.flush().is_none());
        assert!(aggregator.is_idle());
    }

    #[test]
    fn test_activity_while_idle_is_ignored() {
        let mut aggregator = DayAggregator::new();
        assert!(!aggregator.push_activity("orphan"));
        assert!(aggregator.is_idle());
    }

    #[test]
    fn test_blank_activity_is_ignored() {
        let mut aggregator = DayAggregator::new();
        aggregator.push_date(date(2025, 3, 3));
        assert!(!aggregator.push_activity(" \n\t "));
        assert!(aggregator.flush().is_none());
    }

    #[test]
    fn test_date_flushes_previous_day() {
        let mut aggregator = DayAggregator::new();
        assert!(aggregator.push_date(date(2025, 3, 3)).is_none());
        aggregator.push_activity("Monday work");

        let flushed = aggregator.push_date(date(2025, 3, 4)).unwrap();
        assert_eq!(flushed.date, date(2025, 3, 3));
        assert_eq!(flushed.hours, None);
        assert!(!aggregator.is_idle());
    }

    #[test]
    fn test_hours_close_day() {
        let mut aggregator = DayAggregator::new();
        aggregator.push_date(date(2025, 3, 3));
        aggregator.push_activity("Work");

        let record = aggregator.push_hours(&Cell::Number(7.5)).unwrap();
        assert_eq!(record.hours, Some(7.5));
        assert!(aggregator.is_idle());
    }

    #[test]
    fn test_hours_while_idle_are_ignored() {
        let mut aggregator = DayAggregator::new();
        assert!(aggregator.push_hours(&Cell::Number(8.0)).is_none());
        assert!(aggregator.is_idle());
    }

    #[test]
    fn test_malformed_hours_leave_hours_unset_but_still_close_day() {
        let mut aggregator = DayAggregator::new();
        aggregator.push_date(date(2025, 3, 3));
        aggregator.push_activity("Work");

        let record = aggregator.push_hours(&text("acht")).unwrap();
        assert_eq!(record.hours, None);
        assert!(aggregator.is_idle());
    }

    #[test]
    fn test_text_hours_are_parsed() {
        let mut aggregator = DayAggregator::new();
        aggregator.push_date(date(2025, 3, 3));
        aggregator.push_activity("Work");
        let record = aggregator.push_hours(&text(" 6 ")).unwrap();
        assert_eq!(record.hours, Some(6.0));
    }

    #[test]
    fn test_day_with_hours_but_no_activities_is_discarded() {
        let mut aggregator = DayAggregator::new();
        aggregator.push_date(date(2025, 3, 3));
        assert!(aggregator.push_hours(&Cell::Number(8.0)).is_none());
        assert!(aggregator.is_idle());
    }

    #[test]
    fn test_date_row_ignores_other_cells_in_same_row() {
        let mut aggregator = DayAggregator::new();
        aggregator.push_row(
            Some(&date_cell(2025, 3, 3)),
            Some(&text("same row")),
            Some(&Cell::Number(8.0)),
        );
        assert!(!aggregator.is_idle());
        assert!(aggregator.flush().is_none());
    }

    #[test]
    fn test_activity_and_hours_in_same_row() {
        let mut aggregator = DayAggregator::new();
        aggregator.push_date(date(2025, 3, 3));
        let record = aggregator
            .push_row(None, Some(&text("Last task")), Some(&Cell::Number(8.0)))
            .unwrap();
        assert_eq!(record.activities, vec!["Last task".to_string()]);
        assert_eq!(record.hours, Some(8.0));
    }

    #[test]
    fn test_find_data_start_after_marker() {
        let grid = CellGrid::from_rows(vec![
            row(Cell::Empty, text("Header"), Cell::Empty),
            marker_row(),
            row(date_cell(2025, 3, 3), Cell::Empty, Cell::Empty),
        ]);
        assert_eq!(find_data_start(&grid, &GridLayout::default()), 2);
    }

    #[test]
    fn test_find_data_start_without_marker() {
        let grid = CellGrid::from_rows(vec![row(Cell::Empty, text("x"), Cell::Empty)]);
        assert_eq!(find_data_start(&grid, &GridLayout::default()), 0);
        assert_eq!(find_data_start(&CellGrid::new(), &GridLayout::default()), 0);
    }

    #[test]
    fn test_marker_substring_match() {
        let grid = CellGrid::from_rows(vec![row(text("Wochentag"), Cell::Empty, Cell::Empty)]);
        assert_eq!(find_data_start(&grid, &GridLayout::default()), 1);
    }

    #[test]
    fn test_scan_single_day_example() {
        let grid = CellGrid::from_rows(vec![
            marker_row(),
            row(date_cell(2025, 3, 3), Cell::Empty, Cell::Empty),
            row(Cell::Empty, text("Review tickets"), Cell::Empty),
            row(Cell::Empty, text("Write report"), Cell::Empty),
            row(Cell::Empty, Cell::Empty, Cell::Number(8.0)),
        ]);

        let records = scan_days(&grid, &GridLayout::default());
        assert_eq!(
            records,
            vec![DailyRecord {
                date: date(2025, 3, 3),
                activities: vec!["Review tickets".to_string(), "Write report".to_string()],
                hours: Some(8.0),
            }]
        );
    }

    #[test]
    fn test_scan_multiple_days_keep_order_and_hours() {
        let mut rows = vec![marker_row()];
        for (day, hours) in [(3u32, 8.0), (4, 7.0), (5, 6.5)] {
            rows.push(row(date_cell(2025, 3, day), Cell::Empty, Cell::Empty));
            rows.push(row(Cell::Empty, text(&format!("Task A {}", day)), Cell::Empty));
            rows.push(row(Cell::Empty, text(&format!("Task B {}", day)), Cell::Empty));
            rows.push(row(Cell::Empty, Cell::Empty, Cell::Number(hours)));
        }

        let records = scan_days(&CellGrid::from_rows(rows), &GridLayout::default());
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].date, date(2025, 3, 3));
        assert_eq!(records[1].activities, vec!["Task A 4", "Task B 4"]);
        assert_eq!(records[2].hours, Some(6.5));
    }

    #[test]
    fn test_scan_flushes_last_day_at_end_of_input() {
        let grid = CellGrid::from_rows(vec![
            row(date_cell(2025, 3, 7), Cell::Empty, Cell::Empty),
            row(Cell::Empty, text("Friday"), Cell::Empty),
        ]);
        let records = scan_days(&grid, &GridLayout::default());
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].hours, None);
    }

    #[test]
    fn test_scan_ignores_activity_before_first_date() {
        let grid = CellGrid::from_rows(vec![
            row(Cell::Empty, text("orphan"), Cell::Empty),
            row(Cell::Empty, Cell::Empty, Cell::Number(4.0)),
        ]);
        assert!(scan_days(&grid, &GridLayout::default()).is_empty());
    }

    #[test]
    fn test_scan_activities_after_hours_row_are_dropped() {
        let grid = CellGrid::from_rows(vec![
            row(date_cell(2025, 3, 3), Cell::Empty, Cell::Empty),
            row(Cell::Empty, text("counted"), Cell::Number(8.0)),
            row(Cell::Empty, text("after close"), Cell::Empty),
            row(date_cell(2025, 3, 4), Cell::Empty, Cell::Empty),
            row(Cell::Empty, text("next day"), Cell::Empty),
        ]);
        let records = scan_days(&grid, &GridLayout::default());
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].activities, vec!["counted"]);
        assert_eq!(records[1].activities, vec!["next day"]);
    }

    #[test]
    fn test_scan_short_rows_are_tolerated() {
        let grid = CellGrid::from_rows(vec![
            vec![Cell::Empty, date_cell(2025, 3, 3)],
            vec![Cell::Empty, Cell::Empty, text("narrow row")],
        ]);
        let records = scan_days(&grid, &GridLayout::default());
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].activities, vec!["narrow row"]);
    }
}
