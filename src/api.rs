//! Public API Types
//!
//! 公開APIで使用する設定用の型を定義するモジュール。

/// 変換対象シートの選択方式
///
/// 1ファイルにつき1シートのみを変換します。
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SheetSelector {
    /// インデックス指定（0始まり、デフォルトは先頭シート）
    Index(usize),

    /// シート名指定
    ///
    /// 例: `SheetSelector::Name("KW10".to_string())`
    Name(String),
}

impl Default for SheetSelector {
    fn default() -> Self {
        SheetSelector::Index(0)
    }
}

/// グリッド上のセル位置（0始まり）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellPos {
    pub row: usize,
    pub col: usize,
}

impl CellPos {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

/// 入力シートの固定レイアウト
///
/// 列の配置は事前に決まっている前提です。デフォルト値は実際の
/// Ausbildungsnachweisテンプレートのレイアウトに一致します。
///
/// | 項目 | 位置 |
/// | --- | --- |
/// | 日付列・日付マーカー列 | B列 (1) |
/// | 活動内容列 | C列 (2) |
/// | 時間列 | L列 (11) |
/// | 氏名 | H1 (0, 7) |
/// | 職業訓練名 | H2 (1, 7) |
/// | 年 | L3 (2, 11) |
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridLayout {
    /// 日付マーカー（`"Tag"`）を探す列
    pub marker_col: usize,

    /// 日付マーカーとして扱う部分文字列
    pub marker_text: String,

    /// 日付セルの列
    pub date_col: usize,

    /// 活動内容セルの列
    pub activity_col: usize,

    /// 時間合計セルの列
    pub hours_col: usize,

    /// 氏名のメタデータセル
    pub name_cell: CellPos,

    /// 職業訓練名のメタデータセル
    pub course_cell: CellPos,

    /// 年のメタデータセル（年解決の最優先ソース）
    pub year_cell: CellPos,
}

impl Default for GridLayout {
    fn default() -> Self {
        Self {
            marker_col: 1,
            marker_text: "Tag".to_string(),
            date_col: 1,
            activity_col: 2,
            hours_col: 11,
            name_cell: CellPos::new(0, 7),
            course_cell: CellPos::new(1, 7),
            year_cell: CellPos::new(2, 11),
        }
    }
}

/// ヘッダーのフォールバック値
///
/// メタデータセルが空、または存在しない場合に使用されます。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderDefaults {
    pub name: String,
    pub course: String,
}

impl Default for HeaderDefaults {
    fn default() -> Self {
        Self {
            name: "Nicolay, Dimitrios".to_string(),
            course: "Fachinformatiker SI - U27B (IHK)".to_string(),
        }
    }
}
