//! Security Module
//!
//! 入力ワークブックのサイズ制限と、アーカイブに書き込むエントリ名の検証を
//! 提供するモジュール。

use crate::error::NachweisError;

/// 入力ファイルの最大サイズのデフォルト値: 2GB
pub(crate) const DEFAULT_MAX_INPUT_FILE_SIZE: u64 = 2_147_483_648;

/// セキュリティ設定
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SecurityConfig {
    /// 入力ファイルの最大サイズ（バイト）
    pub max_input_file_size: u64,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            max_input_file_size: DEFAULT_MAX_INPUT_FILE_SIZE,
        }
    }
}

impl SecurityConfig {
    /// 読み込んだバイト数が上限を超えていないか検証する
    pub fn check_input_size(&self, bytes_read: u64) -> Result<(), NachweisError> {
        if bytes_read > self.max_input_file_size {
            return Err(NachweisError::SecurityViolation(format!(
                "Input file size exceeds maximum: {} bytes (max: {} bytes)",
                bytes_read, self.max_input_file_size
            )));
        }
        Ok(())
    }
}

/// アーカイブのエントリ名の検証
///
/// アーカイブはフラットな構造なので、ディレクトリ成分を含む名前は拒否します。
///
/// # 戻り値
///
/// * `Ok(())` - 名前が安全な場合
/// * `Err(String)` - 空、絶対パス、`..`、パス区切りを含む場合
pub(crate) fn validate_archive_entry(name: &str) -> Result<(), String> {
    if name.is_empty() {
        return Err("Empty entry name is not allowed".to_string());
    }

    if name.starts_with('/') || name.starts_with("C:\\") || name.starts_with("c:\\") {
        return Err(format!("Absolute path is not allowed: {}", name));
    }

    if name.contains("..") {
        return Err(format!("Path traversal detected: {}", name));
    }

    if name.contains('/') || name.contains('\\') {
        return Err(format!("Path separator in entry name is not allowed: {}", name));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_input_size() {
        let config = SecurityConfig {
            max_input_file_size: 10,
        };
        assert!(config.check_input_size(10).is_ok());
        assert!(matches!(
            config.check_input_size(11),
            Err(NachweisError::SecurityViolation(_))
        ));
    }

    #[test]
    fn test_validate_archive_entry_valid() {
        assert!(validate_archive_entry("2025-KW10-Ausbildungsnachweis-03.03-07.03.md").is_ok());
    }

    #[test]
    fn test_validate_archive_entry_rejects_unsafe_names() {
        assert!(validate_archive_entry("").is_err());
        assert!(validate_archive_entry("/etc/passwd").is_err());
        assert!(validate_archive_entry("c:\\report.md").is_err());
        assert!(validate_archive_entry("../report.md").is_err());
        assert!(validate_archive_entry("out/report.md").is_err());
        assert!(validate_archive_entry("out\\report.md").is_err());
    }
}
