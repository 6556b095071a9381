// ==========================================
// 表格数据导入管道 - 数据质量校验器实现
// ==========================================
// 职责: 格式规则 + 必填字段校验 + 校验汇总
// 红线: 纯函数，不修改输入；发现仅作提示，不阻断提交
// ==========================================

use crate::domain::import::{DataRow, ValidationFinding, ValidationSummary};
use crate::domain::mapping::FieldMapping;
use crate::importer::import_trait::FormatRule;
use regex::Regex;
use std::collections::BTreeSet;
use std::sync::OnceLock;
use tracing::{debug, info};

/// 必填字段为空时的固定提示
pub const REQUIRED_FIELD_MESSAGE: &str = "Required field cannot be empty";

/// 默认必填字段
pub const DEFAULT_REQUIRED_FIELDS: [&str; 2] = ["name", "email"];

// ==========================================
// 内置格式规则
// ==========================================

fn email_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern"))
}

fn phone_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\+?[0-9()\-\s]{7,}$").expect("phone pattern"))
}

fn zip_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[0-9]{5}(-[0-9]{4})?$").expect("zip pattern"))
}

/// 邮箱: localpart@domain.tld
#[derive(Debug, Clone, Default)]
pub struct EmailRule;

impl FormatRule for EmailRule {
    fn field(&self) -> &str {
        "email"
    }

    fn check(&self, value: &str) -> Option<String> {
        if email_regex().is_match(value) {
            None
        } else {
            Some("Invalid email format".to_string())
        }
    }
}

/// 电话: 数字/空格/括号/连字符，可选前导 +，至少 7 个字符
#[derive(Debug, Clone, Default)]
pub struct PhoneRule;

impl FormatRule for PhoneRule {
    fn field(&self) -> &str {
        "phone"
    }

    fn check(&self, value: &str) -> Option<String> {
        if phone_regex().is_match(value) {
            None
        } else {
            Some("Invalid phone format".to_string())
        }
    }
}

/// 邮编: 5 位数字，可选 -4 位
#[derive(Debug, Clone, Default)]
pub struct ZipRule;

impl FormatRule for ZipRule {
    fn field(&self) -> &str {
        "zip"
    }

    fn check(&self, value: &str) -> Option<String> {
        if zip_regex().is_match(value) {
            None
        } else {
            Some("Invalid zip code format".to_string())
        }
    }
}

// ==========================================
// DqValidator - 校验器
// ==========================================
pub struct DqValidator {
    rules: Vec<Box<dyn FormatRule>>, // 按注册顺序执行
    required_fields: Vec<String>,    // 按配置顺序检查
}

impl DqValidator {
    pub fn new(rules: Vec<Box<dyn FormatRule>>, required_fields: Vec<String>) -> Self {
        Self {
            rules,
            required_fields,
        }
    }

    /// 内置规则（email / phone / zip）+ 默认必填字段（name / email）
    pub fn with_defaults() -> Self {
        Self::with_required_fields(
            DEFAULT_REQUIRED_FIELDS
                .iter()
                .map(|f| f.to_string())
                .collect(),
        )
    }

    /// 内置规则 + 自定义必填字段
    pub fn with_required_fields(required_fields: Vec<String>) -> Self {
        Self::new(
            vec![
                Box::new(EmailRule),
                Box::new(PhoneRule),
                Box::new(ZipRule),
            ],
            required_fields,
        )
    }

    /// 追加一条格式规则
    pub fn add_rule(&mut self, rule: Box<dyn FormatRule>) {
        self.rules.push(rule);
    }

    pub fn required_fields(&self) -> &[String] {
        &self.required_fields
    }

    /// 校验映射后的数据
    ///
    /// # 规则
    /// - 目标字段未映射 → 跳过
    /// - 格式规则只检查非空值
    /// - 必填字段已映射但值为空/空白 → REQUIRED_FIELD_MESSAGE
    ///
    /// # 返回
    /// - 按行优先顺序排列的发现列表（行号 1 起）
    pub fn validate(&self, rows: &[DataRow], mapping: &FieldMapping) -> Vec<ValidationFinding> {
        let reverse = mapping.inverse();
        let mut findings = Vec::new();

        for (idx, row) in rows.iter().enumerate() {
            let row_number = idx + 1;

            // 格式校验
            for rule in &self.rules {
                let Some(source) = reverse.get(rule.field()) else {
                    continue;
                };
                let value = match row.get(source) {
                    Some(v) if !v.is_empty() => v,
                    _ => continue,
                };
                if let Some(error) = rule.check(value) {
                    findings.push(ValidationFinding {
                        row: row_number,
                        field: rule.field().to_string(),
                        value: value.clone(),
                        error,
                    });
                }
            }

            // 必填校验
            for field in &self.required_fields {
                let Some(source) = reverse.get(field) else {
                    continue;
                };
                let is_blank = row.get(source).map_or(true, |v| v.trim().is_empty());
                if is_blank {
                    findings.push(ValidationFinding {
                        row: row_number,
                        field: field.clone(),
                        value: String::new(),
                        error: REQUIRED_FIELD_MESSAGE.to_string(),
                    });
                }
            }
        }

        debug!(rows = rows.len(), mapped = mapping.len(), "校验规则执行完毕");
        info!(findings = findings.len(), "数据校验完成");
        findings
    }

    /// 生成校验汇总
    pub fn summarize(&self, findings: &[ValidationFinding]) -> ValidationSummary {
        let mut summary = ValidationSummary {
            total_findings: findings.len(),
            ..ValidationSummary::default()
        };

        let mut rows = BTreeSet::new();
        for finding in findings {
            rows.insert(finding.row);
            *summary.by_field.entry(finding.field.clone()).or_insert(0) += 1;
        }
        summary.affected_rows = rows.len();

        summary
    }
}

impl Default for DqValidator {
    fn default() -> Self {
        Self::with_defaults()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(pairs: &[(&str, &str)]) -> DataRow {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn identity_mapping(fields: &[&str]) -> FieldMapping {
        fields.iter().map(|f| (*f, *f)).collect()
    }

    #[test]
    fn test_email_rule() {
        let rule = EmailRule;
        assert!(rule.check("a@b.co").is_none());
        assert!(rule.check("first.last@example.org").is_none());
        assert_eq!(rule.check("not-an-email").as_deref(), Some("Invalid email format"));
        assert!(rule.check("a@b").is_some());
        assert!(rule.check("a b@c.d").is_some());
        assert!(rule.check("a@@b.co").is_some());
    }

    #[test]
    fn test_phone_rule() {
        let rule = PhoneRule;
        assert!(rule.check("+1 (555) 123-4567").is_none());
        assert!(rule.check("5551234").is_none());
        assert!(rule.check("555-12").is_some());
        assert!(rule.check("555-CALL-NOW").is_some());
    }

    #[test]
    fn test_zip_rule() {
        let rule = ZipRule;
        assert!(rule.check("12345").is_none());
        assert!(rule.check("12345-6789").is_none());
        assert!(rule.check("1234").is_some());
        assert!(rule.check("12345-67").is_some());
    }

    #[test]
    fn test_single_email_finding() {
        let validator = DqValidator::with_defaults();
        let mapping = identity_mapping(&["email"]);

        let bad = validator.validate(&[row(&[("email", "not-an-email")])], &mapping);
        assert_eq!(bad.len(), 1);
        assert_eq!(bad[0].row, 1);
        assert_eq!(bad[0].field, "email");
        assert_eq!(bad[0].value, "not-an-email");

        let good = validator.validate(&[row(&[("email", "a@b.co")])], &mapping);
        assert!(good.is_empty());
    }

    #[test]
    fn test_required_field_empty() {
        let validator = DqValidator::with_defaults();
        let mapping = identity_mapping(&["name", "email"]);
        let rows = vec![row(&[("name", "   "), ("email", "a@b.co")])];

        let findings = validator.validate(&rows, &mapping);

        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].field, "name");
        assert_eq!(findings[0].error, REQUIRED_FIELD_MESSAGE);
        assert_eq!(findings[0].value, "");
    }

    #[test]
    fn test_empty_email_is_only_required_finding() {
        let validator = DqValidator::with_defaults();
        let mapping = identity_mapping(&["name", "email"]);
        let rows = vec![row(&[("name", "Bob"), ("email", "")])];

        let findings = validator.validate(&rows, &mapping);

        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].error, REQUIRED_FIELD_MESSAGE);
    }

    #[test]
    fn test_unmapped_fields_skipped() {
        let validator = DqValidator::with_defaults();
        let rows = vec![row(&[("name", ""), ("email", "bad")])];

        let findings = validator.validate(&rows, &FieldMapping::new());
        assert!(findings.is_empty());
    }

    #[test]
    fn test_row_major_order() {
        let validator = DqValidator::with_defaults();
        let mapping: FieldMapping = vec![
            ("Full Name", "name"),
            ("Mail", "email"),
            ("Tel", "phone"),
            ("Post", "zip"),
        ]
        .into_iter()
        .collect();
        let rows = vec![
            row(&[("Full Name", ""), ("Mail", "x"), ("Tel", "12"), ("Post", "1")]),
            row(&[("Full Name", "Ann"), ("Mail", "a@b.co"), ("Tel", "5551234"), ("Post", "abc")]),
        ];

        let findings = validator.validate(&rows, &mapping);
        let order: Vec<(usize, &str)> = findings
            .iter()
            .map(|f| (f.row, f.field.as_str()))
            .collect();

        assert_eq!(
            order,
            vec![
                (1, "email"),
                (1, "phone"),
                (1, "zip"),
                (1, "name"),
                (2, "zip"),
            ]
        );
    }

    #[test]
    fn test_validate_is_pure() {
        let validator = DqValidator::with_defaults();
        let mapping = identity_mapping(&["name", "email", "phone"]);
        let rows = vec![
            row(&[("name", ""), ("email", "nope"), ("phone", "1")]),
            row(&[("name", "Eve"), ("email", "e@v.io"), ("phone", "")]),
        ];
        let rows_before = rows.clone();

        let first = validator.validate(&rows, &mapping);
        let second = validator.validate(&rows, &mapping);

        assert_eq!(first, second);
        assert_eq!(rows, rows_before);
    }

    #[test]
    fn test_custom_rule_and_required_fields() {
        struct CountryRule;
        impl FormatRule for CountryRule {
            fn field(&self) -> &str {
                "country"
            }
            fn check(&self, value: &str) -> Option<String> {
                (value.len() != 2).then(|| "Country must be a 2-letter code".to_string())
            }
        }

        let mut validator = DqValidator::with_required_fields(vec!["country".to_string()]);
        validator.add_rule(Box::new(CountryRule));
        let mapping = identity_mapping(&["country"]);

        let findings = validator.validate(
            &[row(&[("country", "France")]), row(&[("country", "")])],
            &mapping,
        );

        assert_eq!(findings.len(), 2);
        assert_eq!(findings[0].error, "Country must be a 2-letter code");
        assert_eq!(findings[1].error, REQUIRED_FIELD_MESSAGE);
    }

    #[test]
    fn test_summarize() {
        let validator = DqValidator::with_defaults();
        let mapping = identity_mapping(&["name", "email"]);
        let rows = vec![
            row(&[("name", ""), ("email", "bad")]),
            row(&[("name", "Ok"), ("email", "bad")]),
            row(&[("name", "Ok"), ("email", "a@b.co")]),
        ];

        let findings = validator.validate(&rows, &mapping);
        let summary = validator.summarize(&findings);

        assert_eq!(summary.total_findings, 3);
        assert_eq!(summary.affected_rows, 2);
        assert_eq!(summary.by_field.get("email"), Some(&2));
        assert_eq!(summary.by_field.get("name"), Some(&1));
    }
}
