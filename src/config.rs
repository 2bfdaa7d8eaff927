//! 应用配置：从 config/default.toml 与环境变量加载
//!
//! 加载顺序：先读 TOML 文件，再用环境变量 `HIVE__*` 覆盖（双下划线表示嵌套，如 `HIVE__WORKFLOW__MAX_STEPS=3`）。

use std::path::PathBuf;

use serde::Deserialize;

use crate::memory::{ChunkingConfig, ContextStoreConfig, SourceFilter, DEFAULT_DIMENSIONS};

/// 应用配置根（对应 config/default.toml 的顶层）
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub app: AppSection,
    pub llm: LlmSection,
    pub rag: RagSection,
    pub workflow: WorkflowSection,
    pub agents: AgentsSection,
}

/// [app] 段
#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppSection {
    pub name: Option<String>,
}

/// [llm] 段：后端选择与超时
#[derive(Debug, Clone, Deserialize)]
pub struct LlmSection {
    /// 后端：deepseek / openai / mock
    #[serde(default = "default_provider")]
    pub provider: String,
    /// 未设置时由各后端决定默认模型
    pub model: Option<String>,
    pub base_url: Option<String>,
    #[serde(default)]
    pub timeouts: LlmTimeoutsSection,
}

impl Default for LlmSection {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: None,
            base_url: None,
            timeouts: LlmTimeoutsSection::default(),
        }
    }
}

fn default_provider() -> String {
    "mock".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct LlmTimeoutsSection {
    /// 单次请求超时（秒）
    #[serde(default = "default_request_timeout")]
    pub request: u64,
}

impl Default for LlmTimeoutsSection {
    fn default() -> Self {
        Self {
            request: default_request_timeout(),
        }
    }
}

fn default_request_timeout() -> u64 {
    60
}

/// [rag] 段：语料目录、分块与检索参数
#[derive(Debug, Clone, Deserialize)]
pub struct RagSection {
    #[serde(default = "default_corpus_dir")]
    pub corpus_dir: PathBuf,
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
    #[serde(default = "default_chunk_overlap")]
    pub chunk_overlap: usize,
    #[serde(default = "default_top_k")]
    pub top_k: usize,
    #[serde(default = "default_dimensions")]
    pub dimensions: usize,
    #[serde(default)]
    pub min_score: f32,
    /// 覆盖默认检索关键词白名单
    pub retrieval_keywords: Option<Vec<String>>,
    /// 健康分析可检索的来源（来源名子串，大小写不敏感）
    #[serde(default = "default_incident_sources")]
    pub incident_sources: Vec<String>,
    /// 客户洞察可检索的来源
    #[serde(default = "default_feedback_sources")]
    pub feedback_sources: Vec<String>,
}

impl Default for RagSection {
    fn default() -> Self {
        Self {
            corpus_dir: default_corpus_dir(),
            chunk_size: default_chunk_size(),
            chunk_overlap: default_chunk_overlap(),
            top_k: default_top_k(),
            dimensions: default_dimensions(),
            min_score: 0.0,
            retrieval_keywords: None,
            incident_sources: default_incident_sources(),
            feedback_sources: default_feedback_sources(),
        }
    }
}

impl RagSection {
    pub fn store_config(&self) -> ContextStoreConfig {
        ContextStoreConfig {
            corpus_dir: self.corpus_dir.clone(),
            chunking: ChunkingConfig {
                chunk_size: self.chunk_size,
                chunk_overlap: self.chunk_overlap,
                ..Default::default()
            },
            dimensions: self.dimensions,
            min_score: self.min_score,
        }
    }

    pub fn incident_filter(&self) -> SourceFilter {
        SourceFilter::matching(&self.incident_sources)
    }

    pub fn feedback_filter(&self) -> SourceFilter {
        SourceFilter::matching(&self.feedback_sources)
    }
}

fn default_corpus_dir() -> PathBuf {
    PathBuf::from("data/corpus")
}

fn default_incident_sources() -> Vec<String> {
    vec!["incident".into(), "outage".into(), "runbook".into()]
}

fn default_feedback_sources() -> Vec<String> {
    vec!["feedback".into(), "customer".into(), "complaint".into()]
}

fn default_chunk_size() -> usize {
    500
}

fn default_chunk_overlap() -> usize {
    50
}

fn default_top_k() -> usize {
    3
}

fn default_dimensions() -> usize {
    DEFAULT_DIMENSIONS
}

/// [workflow] 段
#[derive(Debug, Clone, Deserialize)]
pub struct WorkflowSection {
    /// ReAct 循环最大步数（不含最终的 synthesize）
    #[serde(default = "default_max_steps")]
    pub max_steps: usize,
}

impl Default for WorkflowSection {
    fn default() -> Self {
        Self {
            max_steps: default_max_steps(),
        }
    }
}

fn default_max_steps() -> usize {
    5
}

/// [agents] 段：专家 Agent 参数
#[derive(Debug, Clone, Deserialize)]
pub struct AgentsSection {
    /// 健康分析跟踪的区域
    #[serde(default = "default_regions")]
    pub regions: Vec<String>,
    #[serde(default = "default_health_temperature")]
    pub health_temperature: f32,
    /// 设置后修复方案的随机扰动可复现
    pub remediation_seed: Option<u64>,
}

impl Default for AgentsSection {
    fn default() -> Self {
        Self {
            regions: default_regions(),
            health_temperature: default_health_temperature(),
            remediation_seed: None,
        }
    }
}

fn default_regions() -> Vec<String> {
    vec![
        "Dallas".into(),
        "New York".into(),
        "Chicago".into(),
        "Los Angeles".into(),
        "Seattle".into(),
    ]
}

fn default_health_temperature() -> f32 {
    0.8
}

/// 从 config 目录加载配置，环境变量 HIVE__* 可覆盖
///
/// 1. 按顺序查找 config/default.toml、../config/default.toml、default.toml，找到则作为第一源
/// 2. 若传入 config_path 且文件存在，则追加该文件（可覆盖前面的键）
/// 3. 最后叠加环境变量 HIVE__*（双下划线表示嵌套键）
pub fn load_config(config_path: Option<PathBuf>) -> Result<AppConfig, config::ConfigError> {
    let mut builder = config::Config::builder();

    let default_names = ["config/default", "../config/default", "default"];
    for name in default_names {
        let path = format!("{}.toml", name);
        if std::path::Path::new(&path).exists() {
            builder = builder.add_source(config::File::with_name(name).required(false));
            break;
        }
    }

    if let Some(ref path) = config_path {
        if path.exists() {
            builder = builder.add_source(config::File::from(path.clone()).required(false));
        }
    }

    builder = builder.add_source(
        config::Environment::with_prefix("HIVE")
            .separator("__")
            .try_parsing(true),
    );

    let c = builder.build()?;
    c.try_deserialize()
}
