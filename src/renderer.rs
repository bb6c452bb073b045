//! Document Renderer Module
//!
//! 日ごとの記録をMarkdownドキュメントに変換し、正規化された出力ファイル名を
//! 計算するモジュール。同じ入力に対して常にバイト単位で同一の出力を返します。

use std::fmt::Write;

use chrono::{Datelike, NaiveDate};

use crate::types::{DailyRecord, DateRange, ReportDocument, ReportingContext};

/// 見出し・日付見出しで使う日付書式
const LONG_DATE: &str = "%d.%m.%Y";

/// ファイル名で使う日付書式
const SHORT_DATE: &str = "%d.%m";

/// Markdownレンダラー
///
/// # 出力例
///
/// ```markdown
/// # KW10 - Ausbildungsnachweis (03.03.2025 - 07.03.2025)
///
/// **Name:** Muster, Max
/// **Ausbildung:** Fachinformatiker SI - U27B (IHK)
/// **Jahr:** 2025
///
/// ---
///
/// ## 03.03.2025
///
/// - Review tickets
/// - Write report
///
/// **Stunden:** 8
/// ```
///
/// ヘッダー行の末尾には改行用の半角スペース2つが付きます。
#[derive(Debug, Clone, Copy, Default)]
pub struct DocumentRenderer;

impl DocumentRenderer {
    /// ドキュメント本文をレンダリングする
    ///
    /// 行は `\n` で連結され、先頭・末尾の空白は取り除かれます（末尾改行なし）。
    pub fn render(&self, document: &ReportDocument) -> String {
        let mut out = String::new();
        let header = &document.header;

        // write! to a String never fails
        let _ = writeln!(
            out,
            "# KW{:02} - Ausbildungsnachweis ({} - {})",
            document.context.iso_week,
            document.range.start.format(LONG_DATE),
            document.range.end.format(LONG_DATE)
        );
        out.push('\n');
        let _ = writeln!(out, "**Name:** {}  ", header.name);
        let _ = writeln!(out, "**Ausbildung:** {}  ", header.course);
        let _ = writeln!(out, "**Jahr:** {}  ", header.year);
        out.push('\n');
        out.push_str("---\n\n");

        for record in &document.records {
            self.render_day(record, &mut out);
        }

        out.trim().to_string()
    }

    fn render_day(&self, record: &DailyRecord, out: &mut String) {
        let _ = writeln!(out, "## {}", record.date.format(LONG_DATE));
        out.push('\n');

        for activity in &record.activities {
            let _ = writeln!(out, "- {}", activity);
        }

        if let Some(hours) = record.hours {
            out.push('\n');
            let _ = writeln!(out, "**Stunden:** {}", hours.floor() as i64);
        }

        out.push('\n');
    }

    /// 出力ファイル名を計算する
    ///
    /// `{開始年}-KW{週:02}-Ausbildungsnachweis-{開始DD.MM}-{終了DD.MM}.md`
    ///
    /// 年はISO年ではなく開始日の暦年です。
    pub fn output_filename(&self, context: &ReportingContext, range: &DateRange) -> String {
        format!(
            "{}-KW{:02}-Ausbildungsnachweis-{}-{}.md",
            range.start.year(),
            context.iso_week,
            short(range.start),
            short(range.end)
        )
    }
}

fn short(date: NaiveDate) -> String {
    date.format(SHORT_DATE).to_string()
}
