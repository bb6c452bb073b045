//! Workbook Parser
//!
//! calamineのラッパーとして、シート選択とセル型の正規化を行います。

use calamine::{open_workbook_auto_from_rs, Data, Range, Reader, Sheets};
use chrono::{NaiveDate, NaiveDateTime};
use log::debug;
use std::io::{Cursor, Read};

use crate::api::SheetSelector;
use crate::error::NachweisError;
use crate::security::SecurityConfig;
use crate::types::{Cell, CellGrid};

/// ワークブックパーサー
///
/// 形式（xlsx / xlsm / xlsb / xls / ods）はcalamineが自動判別します。
pub(crate) struct WorkbookParser {
    workbook: Sheets<Cursor<Vec<u8>>>,
}

impl WorkbookParser {
    /// ワークブックを開く
    ///
    /// # 引数
    ///
    /// * `reader` - ワークブックを読み込むためのリーダー
    /// * `security` - 入力サイズ制限
    ///
    /// # 戻り値
    ///
    /// * `Ok(WorkbookParser)` - 読み込みに成功した場合
    /// * `Err(NachweisError::SecurityViolation)` - 入力がサイズ上限を超えた場合
    /// * `Err(NachweisError::Parse)` - ワークブックとして解析できない場合
    pub fn open<R: Read>(mut reader: R, security: &SecurityConfig) -> Result<Self, NachweisError> {
        let mut buffer = Vec::new();
        let bytes_read = reader.read_to_end(&mut buffer)?;
        security.check_input_size(bytes_read as u64)?;

        let workbook = open_workbook_auto_from_rs(Cursor::new(buffer))?;
        Ok(Self { workbook })
    }

    /// すべてのシート名を取得
    pub fn sheet_names(&self) -> Vec<String> {
        self.workbook.sheet_names()
    }

    /// シート選択方式に基づいてシート名を解決
    ///
    /// # 戻り値
    ///
    /// * `Ok(String)` - 選択されたシート名
    /// * `Err(NachweisError::Config)` - シートが見つからない、またはインデックスが範囲外の場合
    pub fn select_sheet(&self, selector: &SheetSelector) -> Result<String, NachweisError> {
        let names = self.sheet_names();

        match selector {
            SheetSelector::Index(index) => names.get(*index).cloned().ok_or_else(|| {
                NachweisError::Config(format!(
                    "Sheet index {} is out of range (total: {})",
                    index,
                    names.len()
                ))
            }),
            SheetSelector::Name(name) => {
                if !names.contains(name) {
                    return Err(NachweisError::Config(format!("Sheet '{}' not found", name)));
                }
                Ok(name.clone())
            }
        }
    }

    /// シートを読み込み、セルグリッドに変換する
    pub fn read_grid(&mut self, selector: &SheetSelector) -> Result<CellGrid, NachweisError> {
        let sheet_name = self.select_sheet(selector)?;
        let range = self.workbook.worksheet_range(&sheet_name)?;
        debug!(
            "sheet '{}': used range {:?} to {:?}",
            sheet_name,
            range.start(),
            range.end()
        );
        Ok(range_to_grid(&range))
    }
}

/// calamineの使用範囲をグリッドに変換する
///
/// 使用範囲の開始位置を加算し、シート上の絶対座標を保ちます。
/// 固定レイアウトの列インデックスはこの絶対座標を前提にしています。
pub(crate) fn range_to_grid(range: &Range<Data>) -> CellGrid {
    let mut grid = CellGrid::new();
    let Some((row0, col0)) = range.start() else {
        return grid;
    };

    for (row_idx, row) in range.rows().enumerate() {
        for (col_idx, data) in row.iter().enumerate() {
            let cell = convert_cell(data);
            if !cell.is_empty() {
                grid.set(row0 as usize + row_idx, col0 as usize + col_idx, cell);
            }
        }
    }

    grid
}

/// calamineのセル値を `Cell` に正規化する
pub(crate) fn convert_cell(data: &Data) -> Cell {
    match data {
        Data::Int(i) => Cell::Number(*i as f64),
        Data::Float(f) => Cell::Number(*f),
        Data::String(s) => Cell::Text(s.clone()),
        Data::Bool(b) => Cell::Text(b.to_string()),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(value) => Cell::DateTime(value),
            None => Cell::Number(dt.as_f64()),
        },
        Data::DateTimeIso(s) => parse_iso_datetime(s)
            .map(Cell::DateTime)
            .unwrap_or_else(|| Cell::Text(s.clone())),
        Data::DurationIso(s) => Cell::Text(s.clone()),
        Data::Error(_) | Data::Empty => Cell::Empty,
    }
}

/// ODSのISO形式の日時を解析する（日付のみの形式も受け付ける）
fn parse_iso_datetime(s: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}
