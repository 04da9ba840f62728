use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::models::GradingPolicy;

/// 程序配置文件
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    // --- 推理后端配置 ---
    /// 推理后端 API 基础地址（请求发往 `{model_base_url}/generate`）
    pub model_base_url: String,
    pub model_name: String,
    /// 单次模型调用的最长等待时间（秒）
    pub request_timeout_secs: u64,
    // --- 评分策略 ---
    pub max_score: u32,
    /// 及格比例（百分比），达到后判定为正确
    pub pass_percent: u32,
    // --- 批处理配置 ---
    /// 同时批改的作业数量
    pub max_concurrent: usize,
    /// 待批改图片存放目录
    pub image_folder: String,
    /// 批改结果输出文件
    pub output_log_file: String,
    /// 是否显示详细日志
    pub verbose_logging: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            model_base_url: "http://localhost:11434/api".to_string(),
            model_name: "qwq".to_string(),
            request_timeout_secs: 60,
            max_score: 10,
            pass_percent: 70,
            max_concurrent: 4,
            image_folder: "homework_images".to_string(),
            output_log_file: "grading_results.txt".to_string(),
            verbose_logging: false,
        }
    }
}

impl Config {
    /// 从环境变量读取配置，未设置或无法解析的项使用默认值
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            model_base_url: std::env::var("MODEL_BASE_URL").unwrap_or(default.model_base_url),
            model_name: std::env::var("MODEL_NAME").unwrap_or(default.model_name),
            request_timeout_secs: std::env::var("REQUEST_TIMEOUT_SECS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.request_timeout_secs),
            max_score: std::env::var("MAX_SCORE").ok().and_then(|v| v.parse().ok()).unwrap_or(default.max_score),
            pass_percent: std::env::var("PASS_PERCENT").ok().and_then(|v| v.parse().ok()).unwrap_or(default.pass_percent),
            max_concurrent: std::env::var("MAX_CONCURRENT").ok().and_then(|v| v.parse().ok()).unwrap_or(default.max_concurrent),
            image_folder: std::env::var("IMAGE_FOLDER").unwrap_or(default.image_folder),
            output_log_file: std::env::var("OUTPUT_LOG_FILE").unwrap_or(default.output_log_file),
            verbose_logging: std::env::var("VERBOSE_LOGGING").ok().and_then(|v| v.parse().ok()).unwrap_or(default.verbose_logging),
        }
    }

    /// 从 TOML 文件读取配置，缺失的项使用默认值
    pub fn from_toml_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("无法读取配置文件: {}", path.display()))?;
        Self::from_toml_str(&content)
            .with_context(|| format!("无法解析配置文件: {}", path.display()))
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// 设置了 `GRADER_CONFIG` 时读取该 TOML 文件，否则读取环境变量
    pub fn load() -> Result<Self> {
        match std::env::var("GRADER_CONFIG") {
            Ok(path) => Self::from_toml_file(Path::new(&path)),
            Err(_) => Ok(Self::from_env()),
        }
    }

    pub fn grading_policy(&self) -> GradingPolicy {
        GradingPolicy::new(self.max_score, self.pass_percent)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }
}
