use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{json, Map, Value};
use tracing::warn;

const SEED: &str = "seed";
const PRESERVE_PREFIXES: &str = "preserve_prefixes";
const ANONYMIZE_IPS: &str = "anonymize_ips";
const ANONYMIZE_DOMAINS: &str = "anonymize_domains";
const COMPANY_NAMES: &str = "company_names";
const CUSTOM_PATTERNS: &str = "custom_patterns";

/// 脱敏配置
///
/// 纯值类型：字段逐一比较即为相等。导入时缺失或为 null 的字段取默认值；
/// 类型不符的已知字段也取默认值，原始值连同未识别的字段一起保存在
/// `extra` 中并在导出时写回。严格校验交给引擎的 `/api/validate-config`。
#[derive(Debug, Clone, PartialEq)]
pub struct MaskingConfiguration {
    /// 空字符串表示使用引擎默认值（非确定性）
    pub seed: String,
    /// 线上字段名为 `preserve_prefixes`
    pub preserve_resource_prefixes: bool,
    pub anonymize_ips: bool,
    pub anonymize_domains: bool,
    pub company_names: Vec<String>,
    /// 名称唯一只是建议，重名条目全部保留
    pub custom_patterns: Vec<CustomPattern>,
    pub extra: Map<String, Value>,
}

impl Default for MaskingConfiguration {
    fn default() -> Self {
        Self {
            seed: String::new(),
            preserve_resource_prefixes: true,
            anonymize_ips: true,
            anonymize_domains: false,
            company_names: Vec::new(),
            custom_patterns: Vec::new(),
            extra: Map::new(),
        }
    }
}

impl MaskingConfiguration {
    /// 非空种子；空种子交由引擎决定
    pub fn effective_seed(&self) -> Option<&str> {
        if self.seed.is_empty() {
            None
        } else {
            Some(&self.seed)
        }
    }

    /// 从任意 JSON 对象构建配置，从不失败
    pub fn from_map(mut raw: Map<String, Value>) -> Self {
        let mut config = Self::default();
        let mut extra = Map::new();

        match raw.remove(SEED) {
            None | Some(Value::Null) => {}
            Some(Value::String(s)) => config.seed = s,
            // YAML 中 `seed: 42` 会被解析为数字
            Some(Value::Number(n)) => config.seed = n.to_string(),
            Some(Value::Bool(b)) => config.seed = b.to_string(),
            Some(other) => {
                warn!("Field \"{}\" has an unexpected type, using default", SEED);
                extra.insert(SEED.to_string(), other);
            }
        }

        if let Some(v) = take_field(&mut raw, &mut extra, PRESERVE_PREFIXES) {
            config.preserve_resource_prefixes = v;
        }
        if let Some(v) = take_field(&mut raw, &mut extra, ANONYMIZE_IPS) {
            config.anonymize_ips = v;
        }
        if let Some(v) = take_field(&mut raw, &mut extra, ANONYMIZE_DOMAINS) {
            config.anonymize_domains = v;
        }
        if let Some(v) = take_field(&mut raw, &mut extra, COMPANY_NAMES) {
            config.company_names = v;
        }
        if let Some(v) = take_field(&mut raw, &mut extra, CUSTOM_PATTERNS) {
            config.custom_patterns = v;
        }

        extra.extend(raw);
        config.extra = extra;
        config
    }

    /// 导出用的 JSON 对象
    ///
    /// 导入时类型不符的原始值只在对应字段仍为默认值时写回，
    /// 之后编辑过的字段以编辑结果为准。
    pub fn to_map(&self) -> Map<String, Value> {
        let mut map = Map::new();
        map.insert(SEED.to_string(), Value::String(self.seed.clone()));
        map.insert(PRESERVE_PREFIXES.to_string(), Value::Bool(self.preserve_resource_prefixes));
        map.insert(ANONYMIZE_IPS.to_string(), Value::Bool(self.anonymize_ips));
        map.insert(ANONYMIZE_DOMAINS.to_string(), Value::Bool(self.anonymize_domains));
        map.insert(COMPANY_NAMES.to_string(), Value::from(self.company_names.clone()));
        map.insert(
            CUSTOM_PATTERNS.to_string(),
            Value::Array(
                self.custom_patterns
                    .iter()
                    .map(|p| json!({"name": p.name, "pattern": p.pattern}))
                    .collect(),
            ),
        );

        for (key, value) in &self.extra {
            if !map.contains_key(key) || self.is_default_field(key) {
                map.insert(key.clone(), value.clone());
            }
        }
        map
    }

    fn is_default_field(&self, key: &str) -> bool {
        let defaults = Self::default();
        match key {
            SEED => self.seed == defaults.seed,
            PRESERVE_PREFIXES => self.preserve_resource_prefixes == defaults.preserve_resource_prefixes,
            ANONYMIZE_IPS => self.anonymize_ips == defaults.anonymize_ips,
            ANONYMIZE_DOMAINS => self.anonymize_domains == defaults.anonymize_domains,
            COMPANY_NAMES => self.company_names.is_empty(),
            CUSTOM_PATTERNS => self.custom_patterns.is_empty(),
            _ => true,
        }
    }
}

/// 取出已知字段；null 视为缺失，类型不符时原值移入 `extra`
fn take_field<T: DeserializeOwned>(
    raw: &mut Map<String, Value>,
    extra: &mut Map<String, Value>,
    key: &str,
) -> Option<T> {
    let value = raw.remove(key)?;
    if value.is_null() {
        return None;
    }
    match serde_json::from_value(value.clone()) {
        Ok(parsed) => Some(parsed),
        Err(e) => {
            warn!("Field \"{}\" has an unexpected type, using default: {}", key, e);
            extra.insert(key.to_string(), value);
            None
        }
    }
}

impl Serialize for MaskingConfiguration {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_map().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for MaskingConfiguration {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Map::<String, Value>::deserialize(deserializer).map(Self::from_map)
    }
}

/// 自定义正则模式
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CustomPattern {
    pub name: String,
    pub pattern: String,
}

impl CustomPattern {
    pub fn new(name: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            pattern: pattern.into(),
        }
    }
}

/// 已保存的命名配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedConfigEntry {
    pub name: String,
    pub config: MaskingConfiguration,
    #[serde(rename = "timestamp", alias = "created_at")]
    pub created_at: DateTime<Utc>,
}

impl SavedConfigEntry {
    pub fn new(name: impl Into<String>, config: MaskingConfiguration) -> Self {
        Self {
            name: name.into(),
            config,
            created_at: Utc::now(),
        }
    }

    pub fn summary(&self) -> SavedConfigSummary {
        SavedConfigSummary {
            name: self.name.clone(),
            created_at: self.created_at,
        }
    }
}

/// 列表视图中的配置元数据
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedConfigSummary {
    pub name: String,
    pub created_at: DateTime<Utc>,
}
