//! Header Metadata Module
//!
//! シート上部のメタデータセル（氏名・職業訓練名）からドキュメントヘッダーを
//! 組み立てるモジュール。セルが空または存在しない場合はフォールバック値を使います。

use crate::api::{CellPos, GridLayout, HeaderDefaults};
use crate::types::{CellGrid, ReportHeader};

/// ヘッダーを抽出する
///
/// `year` には解決済みの報告年を渡します。
pub fn extract_header(
    grid: &CellGrid,
    layout: &GridLayout,
    defaults: &HeaderDefaults,
    year: &str,
) -> ReportHeader {
    ReportHeader {
        name: text_or(grid, layout.name_cell, &defaults.name),
        course: text_or(grid, layout.course_cell, &defaults.course),
        year: year.to_string(),
    }
}

fn text_or(grid: &CellGrid, pos: CellPos, fallback: &str) -> String {
    let text = grid
        .get(pos.row, pos.col)
        .map(|cell| cell.clean_text())
        .unwrap_or_default();

    if text.is_empty() {
        fallback.to_string()
    } else {
        text
    }
}
