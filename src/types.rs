//! Types Module
//!
//! クレート全体で使用する共通データ型を定義するモジュール。

use chrono::{NaiveDate, NaiveDateTime};

/// セルの値を表す列挙型
///
/// ワークブックから読み込んだセルは必ずこの4種類のいずれかに正規化されます。
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    /// 空セル
    Empty,

    /// 文字列
    Text(String),

    /// 日時（日付書式のセル）
    DateTime(NaiveDateTime),

    /// 数値（f64）
    Number(f64),
}

impl Cell {
    /// 値が空かどうかを判定
    pub fn is_empty(&self) -> bool {
        matches!(self, Cell::Empty)
    }

    /// 文字列として取得し、空白を正規化する
    ///
    /// 連続する空白（改行・タブを含む）を1つの半角スペースにまとめ、
    /// 前後の空白を取り除きます。空セルは空文字列になります。
    pub fn clean_text(&self) -> String {
        match self {
            Cell::Empty => String::new(),
            Cell::Text(s) => normalize_whitespace(s),
            Cell::DateTime(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
            Cell::Number(n) => n.to_string(),
        }
    }
}

/// 空白を正規化する
pub(crate) fn normalize_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// 読み取り専用のセルグリッド（行 × 列、0始まり）
///
/// 行ごとの長さは揃っていなくても構いません。範囲外の参照は `None` を返し、
/// 呼び出し側では「セルなし」として扱います。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CellGrid {
    rows: Vec<Vec<Cell>>,
}

impl CellGrid {
    /// 空のグリッドを生成
    pub fn new() -> Self {
        Self::default()
    }

    /// 行データからグリッドを生成
    pub fn from_rows(rows: Vec<Vec<Cell>>) -> Self {
        Self { rows }
    }

    /// セルを設定する（必要に応じて行・列を空セルで拡張）
    pub fn set(&mut self, row: usize, col: usize, cell: Cell) {
        if self.rows.len() <= row {
            self.rows.resize_with(row + 1, Vec::new);
        }
        let cells = &mut self.rows[row];
        if cells.len() <= col {
            cells.resize(col + 1, Cell::Empty);
        }
        cells[col] = cell;
    }

    /// セルを取得
    pub fn get(&self, row: usize, col: usize) -> Option<&Cell> {
        self.rows.get(row).and_then(|cells| cells.get(col))
    }

    /// 行を取得（範囲外の場合は空スライス）
    pub fn row(&self, row: usize) -> &[Cell] {
        self.rows.get(row).map(Vec::as_slice).unwrap_or(&[])
    }

    /// 行数
    pub fn height(&self) -> usize {
        self.rows.len()
    }

    /// 最大列数
    pub fn width(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }

    /// 行イテレーター
    pub fn rows(&self) -> impl Iterator<Item = &[Cell]> {
        self.rows.iter().map(Vec::as_slice)
    }
}

/// 報告期間
///
/// ファイル名の2つのトークンから直接導出されるため、`start <= end` は
/// 個別には検証しません。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// ファイルごとに一度だけ解決される報告コンテキスト
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportingContext {
    /// 解決済みの報告年（ヘッダーの `Jahr` に使用）
    pub year: String,

    /// 開始日のISO週番号
    pub iso_week: u32,

    /// 開始日のISO年
    pub iso_year: i32,
}

/// 1日分の活動記録
///
/// `activities` は常に1件以上で、グリッドの走査順を保持します。
#[derive(Debug, Clone, PartialEq)]
pub struct DailyRecord {
    pub date: NaiveDate,
    pub activities: Vec<String>,
    pub hours: Option<f64>,
}

/// ドキュメントヘッダー
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportHeader {
    pub name: String,
    pub course: String,
    pub year: String,
}

/// レンダラーへの入力
#[derive(Debug, Clone, PartialEq)]
pub struct ReportDocument {
    pub header: ReportHeader,
    pub context: ReportingContext,
    pub range: DateRange,
    pub records: Vec<DailyRecord>,
}

/// 変換結果（出力ファイル名と内容のペア）
#[derive(Debug, Clone, PartialEq)]
pub struct ConvertedReport {
    /// 正規化された出力ファイル名
    pub filename: String,

    /// Markdown本文
    pub content: String,

    /// レンダリング元のドキュメント
    pub document: ReportDocument,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_text_collapses_whitespace() {
        let cell = Cell::Text("  Review \n\t tickets  ".to_string());
        assert_eq!(cell.clean_text(), "Review tickets");
    }

    #[test]
    fn test_clean_text_other_variants() {
        assert_eq!(Cell::Empty.clean_text(), "");
        assert_eq!(Cell::Number(8.0).clean_text(), "8");
        assert_eq!(Cell::Number(7.5).clean_text(), "7.5");
        let dt = NaiveDate::from_ymd_opt(2025, 3, 3)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        assert_eq!(Cell::DateTime(dt).clean_text(), "2025-03-03 00:00:00");
    }

    #[test]
    fn test_grid_set_extends_rows_and_columns() {
        let mut grid = CellGrid::new();
        grid.set(2, 11, Cell::Number(2025.0));

        assert_eq!(grid.height(), 3);
        assert_eq!(grid.width(), 12);
        assert_eq!(grid.get(2, 11), Some(&Cell::Number(2025.0)));
        assert_eq!(grid.get(2, 10), Some(&Cell::Empty));
        assert_eq!(grid.get(0, 0), None);
        assert_eq!(grid.get(5, 0), None);
    }

    #[test]
    fn test_grid_row_out_of_range_is_empty() {
        let grid = CellGrid::from_rows(vec![vec![Cell::Text("a".to_string())]]);
        assert_eq!(grid.row(0).len(), 1);
        assert!(grid.row(3).is_empty());
        assert_eq!(grid.rows().count(), 1);
    }
}
