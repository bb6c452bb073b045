//! Batch Conversion Module
//!
//! 入力ディレクトリ内のワークブックを一括変換し、出力ディレクトリへの書き込み、
//! ZIPアーカイブの作成、結果サマリーの生成を行うモジュール。
//!
//! 1ファイルの失敗はバッチ全体を止めません。失敗は `(ファイル名, メッセージ)`
//! として記録され、残りのファイルの処理が続行されます。バッチ全体が失敗するのは
//! 出力ディレクトリやアーカイブを作成できない場合のみです。

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use log::{info, warn};
use rayon::prelude::*;
use serde::Serialize;
use walkdir::WalkDir;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::builder::Converter;
use crate::error::NachweisError;
use crate::security::validate_archive_entry;
use crate::types::ConvertedReport;

/// 区切り線の幅
const RULE_WIDTH: usize = 70;

/// バッチ処理の設定
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchOptions {
    /// 対象ファイル名の接頭辞
    pub prefix: String,

    /// 対象とする拡張子（小文字、ドットなし）
    pub extensions: Vec<String>,

    /// ZIPアーカイブを作成するか
    pub archive: bool,

    /// アーカイブのファイル名（出力ディレクトリ直下に作成）
    pub archive_name: String,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            prefix: "AusbildungsnachweisU27_".to_string(),
            extensions: vec!["xlsx".to_string()],
            archive: true,
            archive_name: "Ausbildungsnachweise-Markdown.zip".to_string(),
        }
    }
}

/// 1ファイル分の処理結果
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FileOutcome {
    /// 変換・書き込みに成功
    Converted { input: String, output: String },

    /// 変換または書き込みに失敗
    Failed { input: String, error: String },
}

/// バッチ処理のサマリー
///
/// `files` は入力ファイル名順です。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub files: Vec<FileOutcome>,
    pub archive: Option<PathBuf>,
}

impl BatchSummary {
    /// 変換に成功した `(入力, 出力)` の一覧
    pub fn converted(&self) -> impl Iterator<Item = (&str, &str)> {
        self.files.iter().filter_map(|outcome| match outcome {
            FileOutcome::Converted { input, output } => Some((input.as_str(), output.as_str())),
            FileOutcome::Failed { .. } => None,
        })
    }

    /// 失敗した `(入力, メッセージ)` の一覧
    pub fn failed(&self) -> impl Iterator<Item = (&str, &str)> {
        self.files.iter().filter_map(|outcome| match outcome {
            FileOutcome::Failed { input, error } => Some((input.as_str(), error.as_str())),
            FileOutcome::Converted { .. } => None,
        })
    }

    pub fn converted_count(&self) -> usize {
        self.converted().count()
    }

    pub fn failed_count(&self) -> usize {
        self.failed().count()
    }

    /// JSON形式で出力する
    pub fn to_json(&self) -> Result<String, NachweisError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// コンソール向けのテキストレポートを書き出す
    ///
    /// # 出力例
    ///
    /// ```text
    /// Processing 2 file(s)
    ///
    /// ======================================================================
    /// [OK] AusbildungsnachweisU27_03.03-07.03.xlsx -> 2025-KW10-Ausbildungsnachweis-03.03-07.03.md
    /// [ERROR] AusbildungsnachweisU27_x.xlsx: Format error: ...
    /// ======================================================================
    ///
    /// Created: output/Ausbildungsnachweise-Markdown.zip
    /// Total converted: 1 file(s)
    ///
    /// Failed: 1 file(s)
    ///   - AusbildungsnachweisU27_x.xlsx: Format error: ...
    ///
    /// Summary: 1 successful, 1 failed
    /// ```
    pub fn write_report<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        let rule = "=".repeat(RULE_WIDTH);

        writeln!(writer, "Processing {} file(s)\n", self.files.len())?;
        writeln!(writer, "{}", rule)?;
        for outcome in &self.files {
            match outcome {
                FileOutcome::Converted { input, output } => {
                    writeln!(writer, "[OK] {} -> {}", input, output)?
                }
                FileOutcome::Failed { input, error } => {
                    writeln!(writer, "[ERROR] {}: {}", input, error)?
                }
            }
        }
        writeln!(writer, "{}", rule)?;

        let converted = self.converted_count();
        if converted > 0 {
            if let Some(archive) = &self.archive {
                writeln!(writer, "\nCreated: {}", archive.display())?;
            }
            writeln!(writer, "Total converted: {} file(s)", converted)?;
        }

        let failed = self.failed_count();
        if failed > 0 {
            writeln!(writer, "\nFailed: {} file(s)", failed)?;
            for (input, error) in self.failed() {
                writeln!(writer, "  - {}: {}", input, error)?;
            }
        }

        writeln!(writer, "\nSummary: {} successful, {} failed", converted, failed)
    }
}

/// 一括変換器
#[derive(Debug, Clone)]
pub struct BatchConverter {
    converter: Converter,
    options: BatchOptions,
}

impl BatchConverter {
    pub fn new(converter: Converter, options: BatchOptions) -> Self {
        Self { converter, options }
    }

    /// 入力ディレクトリ直下の対象ファイルを名前順に列挙する
    ///
    /// 入力ディレクトリが存在しない場合は空のリストを返します。
    pub fn discover(&self, input_dir: &Path) -> Result<Vec<PathBuf>, NachweisError> {
        if !input_dir.is_dir() {
            return Ok(Vec::new());
        }

        let mut paths = Vec::new();
        for entry in WalkDir::new(input_dir)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
        {
            let entry = entry.map_err(std::io::Error::from)?;
            if entry.file_type().is_file() && self.accepts(entry.file_name().to_string_lossy().as_ref()) {
                paths.push(entry.into_path());
            }
        }

        Ok(paths)
    }

    fn accepts(&self, file_name: &str) -> bool {
        if !file_name.starts_with(&self.options.prefix) {
            return false;
        }
        Path::new(file_name)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| {
                self.options
                    .extensions
                    .iter()
                    .any(|accepted| accepted.eq_ignore_ascii_case(ext))
            })
            .unwrap_or(false)
    }

    /// 複数ファイルを並列に変換する
    ///
    /// 結果は入力順に並びます。
    pub fn convert_paths(
        &self,
        paths: &[PathBuf],
    ) -> Vec<(PathBuf, Result<ConvertedReport, NachweisError>)> {
        let mut results: Vec<(usize, PathBuf, Result<ConvertedReport, NachweisError>)> = paths
            .par_iter()
            .enumerate()
            .map(|(idx, path)| (idx, path.clone(), self.converter.convert_file(path)))
            .collect();

        // 並列処理の順序を保証
        results.sort_by_key(|(idx, _, _)| *idx);
        results
            .into_iter()
            .map(|(_, path, result)| (path, result))
            .collect()
    }

    /// 入力ディレクトリを一括変換し、出力ディレクトリに書き込む
    ///
    /// # 処理フロー
    ///
    /// 1. 入力・出力ディレクトリを作成（存在しない場合）
    /// 2. 対象ファイルを列挙
    /// 3. 並列に変換
    /// 4. 変換結果を書き込み（失敗はファイル単位で記録）
    /// 5. 成功したファイルが1件以上あればアーカイブを作成
    ///
    /// # 戻り値
    ///
    /// * `Ok(BatchSummary)` - ファイル単位の失敗を含むサマリー
    /// * `Err(NachweisError)` - ディレクトリまたはアーカイブを作成できない場合
    pub fn run(&self, input_dir: &Path, output_dir: &Path) -> Result<BatchSummary, NachweisError> {
        fs::create_dir_all(input_dir)?;
        fs::create_dir_all(output_dir)?;

        let paths = self.discover(input_dir)?;
        info!("found {} file(s) in {}", paths.len(), input_dir.display());

        let mut summary = BatchSummary::default();
        let mut written: BTreeMap<String, String> = BTreeMap::new();

        for (path, result) in self.convert_paths(&paths) {
            let input = path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string());

            let outcome = result.and_then(|report| {
                fs::write(output_dir.join(&report.filename), &report.content)?;
                Ok(report)
            });

            match outcome {
                Ok(report) => {
                    info!("{} -> {}", input, report.filename);
                    if written.contains_key(&report.filename) {
                        warn!("{} overwrites an earlier output", report.filename);
                    }
                    summary.files.push(FileOutcome::Converted {
                        input,
                        output: report.filename.clone(),
                    });
                    written.insert(report.filename, report.content);
                }
                Err(err) => {
                    warn!("{}: {}", input, err);
                    summary.files.push(FileOutcome::Failed {
                        input,
                        error: err.to_string(),
                    });
                }
            }
        }

        if self.options.archive && !written.is_empty() {
            let archive_path = output_dir.join(&self.options.archive_name);
            write_archive(&archive_path, &written)?;
            info!("created {}", archive_path.display());
            summary.archive = Some(archive_path);
        }

        Ok(summary)
    }
}

/// Markdownファイルをまとめたアーカイブを作成する
///
/// エントリはフラットに、名前順で格納されます（deflate圧縮）。
pub fn write_archive(path: &Path, entries: &BTreeMap<String, String>) -> Result<(), NachweisError> {
    let file = File::create(path)?;
    let mut zip = ZipWriter::new(BufWriter::new(file));
    let options = FileOptions::default().compression_method(CompressionMethod::Deflated);

    for (name, content) in entries {
        validate_archive_entry(name).map_err(NachweisError::Zip)?;
        zip.start_file(name.as_str(), options)?;
        zip.write_all(content.as_bytes())?;
    }

    let mut writer = zip.finish()?;
    writer.flush()?;
    Ok(())
}
