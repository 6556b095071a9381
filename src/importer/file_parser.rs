// ==========================================
// 表格数据导入管道 - 文件解析器实现
// ==========================================
// 职责: 分隔文本 → 表头 + 数据行
// 限制: 不识别引号，字段内的分隔符按列分隔处理
// ==========================================

use crate::domain::import::{DataRow, DroppedRow, ParsedTable};
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::import_trait::FileParser;
use csv::ReaderBuilder;
use std::path::Path;
use tracing::{debug, info, instrument, warn};

// ==========================================
// DelimitedTextParser 实现
// ==========================================
#[derive(Debug, Clone)]
pub struct DelimitedTextParser {
    delimiter: u8,
}

impl Default for DelimitedTextParser {
    fn default() -> Self {
        Self { delimiter: b',' }
    }
}

impl DelimitedTextParser {
    pub fn new(delimiter: u8) -> Self {
        Self { delimiter }
    }

    /// 从文件读取并解析
    ///
    /// # 参数
    /// - file_path: 文件路径
    /// - allowed_extensions: 允许的扩展名（不含点，大小写不敏感）
    ///
    /// # 返回
    /// - Ok(ParsedTable): 解析结果（可能为空表，由调用方判断是否可用）
    /// - Err: 文件不存在、扩展名不支持、读取失败
    #[instrument(skip(self, allowed_extensions), fields(path = %file_path.display()))]
    pub fn parse_file(
        &self,
        file_path: &Path,
        allowed_extensions: &[String],
    ) -> ImportResult<ParsedTable> {
        // 检查文件存在
        if !file_path.exists() {
            return Err(ImportError::FileNotFound(file_path.display().to_string()));
        }

        // 检查扩展名
        let ext = file_path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("");
        if !allowed_extensions
            .iter()
            .any(|allowed| allowed.eq_ignore_ascii_case(ext))
        {
            return Err(ImportError::UnsupportedFormat {
                extension: ext.to_string(),
                allowed: allowed_extensions.join(", "),
            });
        }

        let raw_text = std::fs::read_to_string(file_path)?;
        self.parse_text(&raw_text)
    }
}

impl DelimitedTextParser {
    /// 整行只有空白: 单个空字段；分隔符本身是空白时，所有字段都为空也算
    fn is_blank_line(&self, fields: &[&str]) -> bool {
        let all_empty = fields.iter().all(|f| f.is_empty());
        all_empty && (fields.len() == 1 || self.delimiter.is_ascii_whitespace())
    }
}

impl FileParser for DelimitedTextParser {
    fn parse_text(&self, raw_text: &str) -> ImportResult<ParsedTable> {
        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true) // 允许行长度不一致，由下方按列数过滤
            .quoting(false)
            .delimiter(self.delimiter)
            .from_reader(raw_text.as_bytes());

        let mut table = ParsedTable::default();

        for result in reader.records() {
            let record = result?;
            let line_number = record.position().map(|p| p.line()).unwrap_or(0);
            let fields: Vec<&str> = record.iter().map(str::trim).collect();

            if self.is_blank_line(&fields) {
                continue;
            }

            // 第一条保留行即表头
            if table.headers.is_empty() {
                table.headers = fields.iter().map(|f| f.to_string()).collect();
                debug!(columns = table.headers.len(), "表头解析完成");
                continue;
            }

            // 列数不符的行整行丢弃
            if fields.len() != table.headers.len() {
                warn!(
                    line = line_number,
                    expected = table.headers.len(),
                    actual = fields.len(),
                    "列数不符，丢弃该行"
                );
                table.dropped_rows.push(DroppedRow {
                    line_number,
                    expected_fields: table.headers.len(),
                    actual_fields: fields.len(),
                });
                continue;
            }

            let row: DataRow = table
                .headers
                .iter()
                .cloned()
                .zip(fields.iter().map(|f| f.to_string()))
                .collect();
            table.rows.push(row);
        }

        info!(
            columns = table.headers.len(),
            rows = table.rows.len(),
            dropped = table.dropped_rows.len(),
            "文本解析完成"
        );

        Ok(table)
    }
}
