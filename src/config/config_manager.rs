// ==========================================
// 表格数据导入管道 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写管理
// 存储: key → JSON 值（JSON 文件 → 环境变量覆写 → 默认值）
// ==========================================

use crate::config::import_config_trait::ImportConfigReader;
use crate::importer::dq_validator::DEFAULT_REQUIRED_FIELDS;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::field_mapper::DuplicateTargetPolicy;
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

/// 默认目标字段目录
pub const DEFAULT_DESTINATION_FIELDS: [&str; 11] = [
    "id",
    "name",
    "email",
    "phone",
    "address",
    "city",
    "state",
    "zip",
    "country",
    "created_at",
    "updated_at",
];

/// 环境变量覆写（环境变量名, 配置键）
const ENV_OVERRIDES: [(&str, &str); 3] = [
    ("TABULAR_IMPORT_ROW_DELAY_MS", config_keys::ROW_DELAY_MS),
    ("TABULAR_IMPORT_DELIMITER", config_keys::DELIMITER),
    ("TABULAR_IMPORT_DUPLICATE_POLICY", config_keys::DUPLICATE_TARGET_POLICY),
];

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct ConfigManager {
    values: BTreeMap<String, Value>,
}

impl ConfigManager {
    /// 创建仅含默认值的 ConfigManager
    pub fn new() -> Self {
        Self::default()
    }

    /// 从 JSON 文件加载（顶层必须是对象）
    ///
    /// # 参数
    /// - path: 配置文件路径
    pub fn from_file(path: &Path) -> ImportResult<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| ImportError::ConfigReadError {
            key: path.display().to_string(),
            message: e.to_string(),
        })?;
        let manager = Self::from_json_str(&raw)?;
        info!(path = %path.display(), keys = manager.values.len(), "配置文件加载完成");
        Ok(manager)
    }

    /// 从 JSON 文本加载
    pub fn from_json_str(raw: &str) -> ImportResult<Self> {
        let parsed: Value = serde_json::from_str(raw).map_err(|e| ImportError::ConfigReadError {
            key: "<root>".to_string(),
            message: e.to_string(),
        })?;

        let Value::Object(map) = parsed else {
            return Err(ImportError::ConfigValueError {
                key: "<root>".to_string(),
                value: raw.chars().take(40).collect(),
                message: "配置文件顶层必须是 JSON 对象".to_string(),
            });
        };

        Ok(Self {
            values: map.into_iter().collect(),
        })
    }

    /// 默认配置文件位置: <config_dir>/tabular-import/config.json
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("tabular-import").join("config.json"))
    }

    /// 加载默认位置的配置（不存在则使用默认值），再应用环境变量覆写
    pub fn load_default() -> ImportResult<Self> {
        let manager = match Self::default_config_path() {
            Some(path) if path.exists() => Self::from_file(&path)?,
            _ => {
                debug!("未找到默认配置文件，使用内置默认值");
                Self::new()
            }
        };
        Ok(manager.with_env_overrides())
    }

    /// 应用进程环境变量覆写
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides_from(std::env::vars())
    }

    /// 应用给定的 (环境变量名, 值) 覆写；只识别 ENV_OVERRIDES 中的变量
    pub fn with_overrides_from<I>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        for (name, value) in vars {
            if let Some((_, key)) = ENV_OVERRIDES.iter().find(|(env, _)| *env == name) {
                debug!(env = %name, key = %key, "应用环境变量覆写");
                self.set(key, value);
            }
        }
        self
    }

    /// 写入一个字符串配置值
    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        self.values.insert(key.to_string(), Value::String(value.into()));
    }

    /// 读取标量配置值（字符串原样返回，数字与布尔值转为文本；null 视为未配置）
    pub fn get_global_config_value(&self, key: &str) -> Option<String> {
        self.values.get(key).and_then(scalar_to_string)
    }

    fn get_config_or_default(&self, key: &str, default: &str) -> String {
        self.get_global_config_value(key)
            .unwrap_or_else(|| default.to_string())
    }

    /// 读取列表配置: JSON 数组逐项取值，字符串按逗号拆分
    fn get_list(&self, key: &str, default: &[&str]) -> Vec<String> {
        let items: Vec<String> = match self.values.get(key) {
            None | Some(Value::Null) => return default.iter().map(|s| s.to_string()).collect(),
            Some(Value::Array(items)) => items.iter().filter_map(scalar_to_string).collect(),
            Some(Value::String(s)) => s.split(',').map(str::to_string).collect(),
            Some(other) => scalar_to_string(other).into_iter().collect(),
        };
        items
            .into_iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    }

    fn get_number(&self, key: &str, default: u64) -> ImportResult<u64> {
        match self.get_global_config_value(key) {
            None => Ok(default),
            Some(value) => value
                .trim()
                .parse::<u64>()
                .map_err(|e| ImportError::ConfigValueError {
                    key: key.to_string(),
                    value: value.to_string(),
                    message: e.to_string(),
                }),
        }
    }
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

impl ImportConfigReader for ConfigManager {
    // ===== 目标 schema 配置 =====

    fn get_destination_fields(&self) -> ImportResult<Vec<String>> {
        let fields = self.get_list(config_keys::DESTINATION_FIELDS, &DEFAULT_DESTINATION_FIELDS);
        if fields.is_empty() {
            return Err(ImportError::ConfigValueError {
                key: config_keys::DESTINATION_FIELDS.to_string(),
                value: String::new(),
                message: "目标字段目录不能为空".to_string(),
            });
        }
        Ok(fields)
    }

    fn get_required_fields(&self) -> ImportResult<Vec<String>> {
        Ok(self.get_list(config_keys::REQUIRED_FIELDS, &DEFAULT_REQUIRED_FIELDS))
    }

    // ===== 解析配置 =====

    fn get_delimiter(&self) -> ImportResult<u8> {
        let raw = self.get_config_or_default(config_keys::DELIMITER, ",");
        let value = if raw == "\\t" || raw.eq_ignore_ascii_case("tab") {
            "\t"
        } else {
            raw.as_str()
        };
        match value.as_bytes() {
            [b] if b.is_ascii() => Ok(*b),
            _ => Err(ImportError::ConfigValueError {
                key: config_keys::DELIMITER.to_string(),
                value: value.to_string(),
                message: "分隔符必须是单个 ASCII 字符".to_string(),
            }),
        }
    }

    fn get_allowed_extensions(&self) -> ImportResult<Vec<String>> {
        Ok(self
            .get_list(config_keys::ALLOWED_EXTENSIONS, &["csv"])
            .into_iter()
            .map(|ext| ext.trim_start_matches('.').to_string())
            .collect())
    }

    fn get_preview_row_limit(&self) -> ImportResult<usize> {
        Ok(self.get_number(config_keys::PREVIEW_ROW_LIMIT, 5)? as usize)
    }

    // ===== 映射配置 =====

    fn get_duplicate_target_policy(&self) -> ImportResult<DuplicateTargetPolicy> {
        let value = self.get_config_or_default(config_keys::DUPLICATE_TARGET_POLICY, "allow");
        DuplicateTargetPolicy::parse(&value).ok_or_else(|| ImportError::ConfigValueError {
            key: config_keys::DUPLICATE_TARGET_POLICY.to_string(),
            value: value.clone(),
            message: "仅支持 allow / reject".to_string(),
        })
    }

    // ===== 提交配置 =====

    fn get_row_delay(&self) -> ImportResult<Duration> {
        Ok(Duration::from_millis(
            self.get_number(config_keys::ROW_DELAY_MS, 0)?,
        ))
    }
}

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    // 目标 schema
    pub const DESTINATION_FIELDS: &str = "destination_fields";
    pub const REQUIRED_FIELDS: &str = "required_fields";

    // 解析
    pub const DELIMITER: &str = "delimiter";
    pub const ALLOWED_EXTENSIONS: &str = "allowed_extensions";
    pub const PREVIEW_ROW_LIMIT: &str = "preview_row_limit";

    // 映射
    pub const DUPLICATE_TARGET_POLICY: &str = "duplicate_target_policy";

    // 提交
    pub const ROW_DELAY_MS: &str = "row_delay_ms";
}
