//! Date Range Resolver Module
//!
//! ファイル名（例: `AusbildungsnachweisU27_03.03-07.03.xlsx`）から報告期間と
//! 報告年を解決し、開始日のISO週番号を導出するモジュール。

use std::path::Path;
use std::sync::OnceLock;

use chrono::{Datelike, NaiveDate};
use log::debug;
use regex::Regex;

use crate::error::NachweisError;
use crate::types::{Cell, DateRange, ReportingContext};

/// `_<開始>-<終了>` のトークンペア
///
/// 各トークンは `DD.MM` または `DD.MM.YY`（末尾のドットは許容）。
/// 終了トークンは `DD-MM` の表記も受け付けます。
fn filename_pattern() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| {
        Regex::new(
            r"_(\d{2}\.\d{2}(?:\.\d{2})?)\.?\s*-\s*(\d{2}[.\-]\d{2}(?:\.\d{2})?)\.?(?:\D|$)",
        )
        .expect("filename date pattern")
    })
}

/// ファイル名にこの部分文字列が含まれる場合、年を2024とみなす
const YEAR_2024_HINT: &str = ".24";

/// 報告年の解決元
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum YearSource {
    /// メタデータセル
    Metadata,
    /// ファイル名中の `.24`
    FilenameHint,
    /// 設定されたデフォルト年
    Default,
}

/// 報告期間リゾルバー
///
/// デフォルト年はグローバル状態ではなく、リゾルバー自身が保持します。
///
/// # 使用例
///
/// ```rust
/// use nachweismd::DateRangeResolver;
///
/// # fn main() -> Result<(), nachweismd::NachweisError> {
/// let resolver = DateRangeResolver::new("2025");
/// let (range, context) = resolver.resolve("AusbildungsnachweisU27_03.03-07.03.xlsx", None)?;
/// assert_eq!(range.start.to_string(), "2025-03-03");
/// assert_eq!(range.end.to_string(), "2025-03-07");
/// assert_eq!(context.iso_week, 10);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateRangeResolver {
    default_year: String,
}

impl DateRangeResolver {
    pub fn new(default_year: impl Into<String>) -> Self {
        Self {
            default_year: default_year.into(),
        }
    }

    pub fn default_year(&self) -> &str {
        &self.default_year
    }

    /// 報告期間と報告コンテキストを解決する
    ///
    /// # 引数
    ///
    /// * `filename` - 入力ファイル名（拡張子は無視されます）
    /// * `year_cell` - 年のメタデータセル（存在する場合）
    ///
    /// # 戻り値
    ///
    /// * `Ok((DateRange, ReportingContext))` - 解決に成功した場合
    /// * `Err(NachweisError::Format)` - トークンペアが見つからない場合
    /// * `Err(NachweisError::DateParse)` - トークンが実在しない日付の場合
    pub fn resolve(
        &self,
        filename: &str,
        year_cell: Option<&Cell>,
    ) -> Result<(DateRange, ReportingContext), NachweisError> {
        let (start_raw, end_raw) = split_filename_tokens(filename)?;
        let (year, source) = self.resolve_year(filename, year_cell);
        debug!("{}: year {} resolved from {:?}", filename, year, source);

        let start = parse_date_token(&start_raw, &year)?;
        let end = parse_date_token(&end_raw, &year)?;
        let (iso_year, iso_week) = iso_week_of(start);

        Ok((
            DateRange { start, end },
            ReportingContext {
                year,
                iso_week,
                iso_year,
            },
        ))
    }

    /// 報告年を解決する
    ///
    /// 1. メタデータセルが整数に変換できればその値
    /// 2. ファイル名に `.24` が含まれれば `"2024"`
    /// 3. それ以外はデフォルト年
    pub fn resolve_year(&self, filename: &str, year_cell: Option<&Cell>) -> (String, YearSource) {
        if let Some(year) = year_cell.and_then(year_from_cell) {
            return (year.to_string(), YearSource::Metadata);
        }
        if filename.contains(YEAR_2024_HINT) {
            return ("2024".to_string(), YearSource::FilenameHint);
        }
        (self.default_year.clone(), YearSource::Default)
    }
}

impl Default for DateRangeResolver {
    fn default() -> Self {
        Self::new(crate::builder::DEFAULT_YEAR)
    }
}

fn year_from_cell(cell: &Cell) -> Option<i64> {
    match cell {
        Cell::Number(n) if n.is_finite() => Some(n.trunc() as i64),
        Cell::Text(s) => s.trim().parse().ok(),
        Cell::Number(_) | Cell::DateTime(_) | Cell::Empty => None,
    }
}

/// ファイル名から開始・終了の生トークンを取り出す
///
/// 終了トークンのダッシュはドットに正規化されます。
///
/// ```rust
/// use nachweismd::split_filename_tokens;
///
/// let (start, end) = split_filename_tokens("AusbildungsnachweisU27_24.02.-28-02.xlsx").unwrap();
/// assert_eq!(start, "24.02");
/// assert_eq!(end, "28.02");
/// ```
pub fn split_filename_tokens(filename: &str) -> Result<(String, String), NachweisError> {
    let stem = Path::new(filename)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(filename);

    let caps = filename_pattern().captures(stem).ok_or_else(|| {
        NachweisError::Format(format!("Cannot parse dates from filename: {}", filename))
    })?;

    let start = caps[1].trim_end_matches('.').to_string();
    let end = caps[2].replace('-', ".").trim_end_matches('.').to_string();
    Ok((start, end))
}

/// 日付トークンを解析する
///
/// * 3要素 → `日.月.2桁年`
/// * 2要素 → `日.月` に `year` を補完
/// * それ以外 → `NachweisError::Format`
pub fn parse_date_token(token: &str, year: &str) -> Result<NaiveDate, NachweisError> {
    let (text, format) = match token.split('.').count() {
        3 => (token.to_string(), "%d.%m.%y"),
        2 => (format!("{}.{}", token, year), "%d.%m.%Y"),
        _ => {
            return Err(NachweisError::Format(format!(
                "Invalid date format: {}",
                token
            )))
        }
    };

    NaiveDate::parse_from_str(&text, format)
        .map_err(|source| NachweisError::DateParse { token: text, source })
}

/// ISO-8601の (ISO年, 週番号) を返す
pub fn iso_week_of(date: NaiveDate) -> (i32, u32) {
    let week = date.iso_week();
    (week.year(), week.week())
}
