//! Error Types Module
//!
//! クレート全体で使用する構造化エラー型を定義するモジュール。
//! `thiserror`を使用して、エラーの自動変換とメッセージフォーマットを実現する。

use thiserror::Error;

/// nachweismdクレート全体で使用するエラー型
///
/// ファイル名の解析、ワークブックの読み込み、出力の書き込み中に発生する
/// すべてのエラーを統一的に扱うために使用されます。
///
/// # エラーの種類
///
/// - `Format`: ファイル名が日付トークンの文法に一致しない
/// - `DateParse`: 日付トークンが実在しない日付を表す（例: `31.02`）
/// - `Io`: I/O操作中に発生したエラー
/// - `Parse`: ワークブックの解析中に発生したエラー（calamine由来）
/// - `Zip`: アーカイブ作成時のエラー
/// - `Json`: サマリーのJSON出力エラー
/// - `Config`: 設定の検証に失敗したエラー
/// - `SecurityViolation`: 入力サイズ制限違反
///
/// 1ファイルの変換を中断するのは `Format` と `DateParse` のみで、行単位の
/// 問題（不正な時間セルなど）はエラーにはなりません。
///
/// # 使用例
///
/// ```rust
/// use nachweismd::{DateRangeResolver, NachweisError};
///
/// let resolver = DateRangeResolver::new("2025");
/// match resolver.resolve("notes.xlsx", None) {
///     Err(NachweisError::Format(msg)) => assert!(msg.contains("notes.xlsx")),
///     other => panic!("unexpected: {:?}", other),
/// }
/// ```
#[derive(Error, Debug)]
pub enum NachweisError {
    /// ファイル名またはトークンの形式エラー
    ///
    /// ファイル名に `<開始>-<終了>` の日付ペアが見つからない場合や、
    /// トークンの構成要素数が2でも3でもない場合に発生します。
    #[error("Format error: {0}")]
    Format(String),

    /// 日付トークンの厳密な解析に失敗したエラー
    #[error("Invalid date '{token}': {source}")]
    DateParse {
        /// 解析に失敗したトークン（年を補完した後の文字列）
        token: String,
        /// chronoの解析エラー
        #[source]
        source: chrono::ParseError,
    },

    /// I/O操作中に発生したエラー
    ///
    /// `#[from]`属性により、`std::io::Error`から自動的に変換されます。
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// ワークブックの解析中に発生したエラー
    ///
    /// `#[from]`属性により、`calamine::Error`から自動的に変換されます。
    #[error("Failed to parse workbook: {0}")]
    Parse(#[from] calamine::Error),

    /// ZIPアーカイブの作成エラー
    #[error("ZIP archive error: {0}")]
    Zip(String),

    /// 変換結果サマリーのJSONシリアライズエラー
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// 設定の検証に失敗したエラー
    ///
    /// `ConverterBuilder::build()`時、またはシート選択の解決時に発生します。
    ///
    /// ```rust
    /// use nachweismd::{ConverterBuilder, NachweisError};
    ///
    /// let result = ConverterBuilder::new().with_default_year("25").build();
    /// assert!(matches!(result, Err(NachweisError::Config(_))));
    /// ```
    #[error("Configuration error: {0}")]
    Config(String),

    /// セキュリティ制限に違反したエラー
    #[error("Security violation: {0}")]
    SecurityViolation(String),
}

impl From<zip::result::ZipError> for NachweisError {
    fn from(err: zip::result::ZipError) -> Self {
        NachweisError::Zip(err.to_string())
    }
}
