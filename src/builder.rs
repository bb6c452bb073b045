//! Builder Module
//!
//! Fluent Builder APIを提供し、`Converter`インスタンスを段階的に構築する。

use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::aggregator;
use crate::api::{GridLayout, HeaderDefaults, SheetSelector};
use crate::error::NachweisError;
use crate::header::extract_header;
use crate::parser::WorkbookParser;
use crate::renderer::DocumentRenderer;
use crate::resolver::DateRangeResolver;
use crate::security::SecurityConfig;
use crate::types::{CellGrid, ConvertedReport, ReportDocument};

/// デフォルトの報告年
pub(crate) const DEFAULT_YEAR: &str = "2025";

/// 変換処理の設定を保持する内部構造体
#[derive(Debug, Clone)]
pub(crate) struct ConversionConfig {
    /// 年のフォールバックチェーンの最後に使う年
    pub default_year: String,

    /// ヘッダーのフォールバック値
    pub header_defaults: HeaderDefaults,

    /// シートのレイアウト
    pub layout: GridLayout,

    /// シート選択方式
    pub sheet_selector: SheetSelector,

    /// 入力サイズ制限
    pub security: SecurityConfig,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            default_year: DEFAULT_YEAR.to_string(),
            header_defaults: HeaderDefaults::default(),
            layout: GridLayout::default(),
            sheet_selector: SheetSelector::default(),
            security: SecurityConfig::default(),
        }
    }
}

/// Fluent Builder APIを提供する構造体
///
/// すべての設定項目にデフォルト値が設定されており、必要な設定のみを
/// オーバーライドできます。
///
/// # 使用例
///
/// ```rust
/// use nachweismd::{ConverterBuilder, SheetSelector};
///
/// # fn main() -> Result<(), nachweismd::NachweisError> {
/// let converter = ConverterBuilder::new()
///     .with_default_year("2024")
///     .with_sheet_selector(SheetSelector::Index(0))
///     .build()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct ConverterBuilder {
    config: ConversionConfig,
}

impl Default for ConverterBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ConverterBuilder {
    /// デフォルト設定を持つビルダーインスタンスを生成する
    ///
    /// # デフォルト設定
    ///
    /// - デフォルト年: `"2025"`
    /// - ヘッダー: `HeaderDefaults::default()`
    /// - レイアウト: `GridLayout::default()`
    /// - シート: 先頭シート
    /// - 入力サイズ上限: 2GB
    pub fn new() -> Self {
        Self {
            config: ConversionConfig::default(),
        }
    }

    /// 年のフォールバックチェーンで最後に使われる年を指定する
    ///
    /// `build()` 時に4桁の数字であることを検証します。
    pub fn with_default_year(mut self, year: impl Into<String>) -> Self {
        self.config.default_year = year.into();
        self
    }

    /// ヘッダー（氏名・職業訓練名）のフォールバック値を指定する
    pub fn with_header_defaults(mut self, defaults: HeaderDefaults) -> Self {
        self.config.header_defaults = defaults;
        self
    }

    /// シートのレイアウトを指定する
    pub fn with_layout(mut self, layout: GridLayout) -> Self {
        self.config.layout = layout;
        self
    }

    /// 変換対象のシートを選択する
    ///
    /// ```rust
    /// use nachweismd::{ConverterBuilder, SheetSelector};
    ///
    /// let builder = ConverterBuilder::new()
    ///     .with_sheet_selector(SheetSelector::Name("Nachweis".to_string()));
    /// ```
    pub fn with_sheet_selector(mut self, selector: SheetSelector) -> Self {
        self.config.sheet_selector = selector;
        self
    }

    /// 入力ファイルの最大サイズ（バイト）を指定する
    pub fn with_max_input_size(mut self, bytes: u64) -> Self {
        self.config.security.max_input_file_size = bytes;
        self
    }

    /// 設定を検証し、`Converter`インスタンスを生成する
    ///
    /// # 発生し得るエラー
    ///
    /// * `NachweisError::Config(String)`:
    ///   * デフォルト年が4桁の数字でない
    ///   * 日付マーカーが空文字列
    pub fn build(self) -> Result<Converter, NachweisError> {
        let year = &self.config.default_year;
        if year.len() != 4 || !year.chars().all(|c| c.is_ascii_digit()) {
            return Err(NachweisError::Config(format!(
                "Invalid default year: '{}' (expected four digits)",
                year
            )));
        }

        if self.config.layout.marker_text.is_empty() {
            return Err(NachweisError::Config(
                "Day marker text must not be empty".to_string(),
            ));
        }

        Ok(Converter::new(self.config))
    }
}

/// 変換処理のファサード
///
/// ファイル名とセルグリッドから、出力ファイル名とMarkdown本文を生成します。
/// 変換はファイルごとに独立した純粋関数で、共有される可変状態はありません。
///
/// # 使用例
///
/// ```rust
/// use chrono::NaiveDate;
/// use nachweismd::{Cell, CellGrid, ConverterBuilder};
///
/// # fn main() -> Result<(), nachweismd::NachweisError> {
/// let mut grid = CellGrid::new();
/// let monday = NaiveDate::from_ymd_opt(2025, 3, 3).unwrap().and_hms_opt(0, 0, 0).unwrap();
/// grid.set(0, 1, Cell::DateTime(monday));
/// grid.set(1, 2, Cell::Text("Review tickets".to_string()));
/// grid.set(2, 11, Cell::Number(8.0));
///
/// let converter = ConverterBuilder::new().build()?;
/// let report = converter.convert_grid("AusbildungsnachweisU27_03.03-07.03.xlsx", &grid)?;
/// assert_eq!(report.filename, "2025-KW10-Ausbildungsnachweis-03.03-07.03.md");
/// assert!(report.content.ends_with("**Stunden:** 8"));
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Converter {
    config: ConversionConfig,
    resolver: DateRangeResolver,
    renderer: DocumentRenderer,
}

impl Converter {
    pub(crate) fn new(config: ConversionConfig) -> Self {
        Self {
            resolver: DateRangeResolver::new(config.default_year.clone()),
            renderer: DocumentRenderer,
            config,
        }
    }

    /// セルグリッドを変換する
    ///
    /// # 処理フロー
    ///
    /// 1. ファイル名と年セルから報告期間・報告コンテキストを解決
    /// 2. ヘッダーを抽出
    /// 3. グリッドを走査して日ごとの記録を組み立て
    /// 4. 本文と出力ファイル名をレンダリング
    ///
    /// # 戻り値
    ///
    /// * `Ok(ConvertedReport)` - 変換に成功した場合
    /// * `Err(NachweisError::Format | NachweisError::DateParse)` - ファイル名を解析できない場合
    pub fn convert_grid(
        &self,
        filename: &str,
        grid: &CellGrid,
    ) -> Result<ConvertedReport, NachweisError> {
        let layout = &self.config.layout;
        let year_cell = grid.get(layout.year_cell.row, layout.year_cell.col);

        let (range, context) = self.resolver.resolve(filename, year_cell)?;
        let header = extract_header(grid, layout, &self.config.header_defaults, &context.year);
        let records = aggregator::scan_days(grid, layout);

        let document = ReportDocument {
            header,
            context,
            range,
            records,
        };

        Ok(ConvertedReport {
            filename: self.renderer.output_filename(&document.context, &document.range),
            content: self.renderer.render(&document),
            document,
        })
    }

    /// ワークブックを読み込んで変換する
    ///
    /// # 引数
    ///
    /// * `filename` - 元のファイル名（日付範囲の解決に使用）
    /// * `input` - ワークブックのバイト列を読み込むリーダー
    ///
    /// # 使用例
    ///
    /// ```rust,no_run
    /// use std::fs::File;
    /// use nachweismd::ConverterBuilder;
    ///
    /// # fn main() -> Result<(), nachweismd::NachweisError> {
    /// let converter = ConverterBuilder::new().build()?;
    /// let name = "AusbildungsnachweisU27_03.03-07.03.xlsx";
    /// let report = converter.convert(name, File::open(name)?)?;
    /// println!("{}", report.content);
    /// # Ok(())
    /// # }
    /// ```
    pub fn convert<R: Read>(&self, filename: &str, input: R) -> Result<ConvertedReport, NachweisError> {
        // 日付トークンのないファイル名はワークブックを開く前に弾く
        crate::resolver::split_filename_tokens(filename)?;

        let mut parser = WorkbookParser::open(input, &self.config.security)?;
        let grid = parser.read_grid(&self.config.sheet_selector)?;
        self.convert_grid(filename, &grid)
    }

    /// パスで指定されたワークブックを変換する
    pub fn convert_file<P: AsRef<Path>>(&self, path: P) -> Result<ConvertedReport, NachweisError> {
        let path = path.as_ref();
        let filename = path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| {
                NachweisError::Format(format!("Invalid file name: {}", path.display()))
            })?;

        self.convert(filename, File::open(path)?)
    }
}
