//! Parser Module
//!
//! calamineを使用してワークブックを読み込み、1シートを `CellGrid` に変換します。

mod workbook;

pub(crate) use workbook::WorkbookParser;
