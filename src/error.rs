//! 错误类型
//!
//! 核心只向调用方暴露两层错误：
//! - `ModelError`：推理后端调用失败（传输层 / 应用层）
//! - `GradeError`：带阶段信息的流水线错误，包装 `ModelError`
//!
//! 解析阶段永远不会产生错误（解析失败只会降级结果质量）。

use thiserror::Error;

use crate::models::Stage;

/// 推理后端错误
#[derive(Debug, Error)]
pub enum ModelError {
    /// 后端不可达、连接失败或等待超时
    #[error("推理后端不可用 ({endpoint}): {source}")]
    Unavailable {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    /// 后端可达，但返回了应用层错误
    #[error("推理后端返回错误 ({endpoint}): status={status:?}, message={message}")]
    Backend {
        endpoint: String,
        status: Option<u16>,
        message: String,
    },

    /// 提示词为空，请求未发出
    #[error("提示词不能为空")]
    EmptyPrompt,
}

impl ModelError {
    /// 是否为传输层错误（不可达 / 超时）
    pub fn is_unavailable(&self) -> bool {
        matches!(self, ModelError::Unavailable { .. })
    }

    /// 创建应用层错误
    pub fn backend(endpoint: impl Into<String>, status: Option<u16>, message: impl Into<String>) -> Self {
        ModelError::Backend {
            endpoint: endpoint.into(),
            status,
            message: message.into(),
        }
    }
}

/// 批改流水线错误
#[derive(Debug, Error)]
pub enum GradeError {
    /// 识别阶段失败，未进行评估
    #[error("识别失败: {0}")]
    ExtractionFailed(#[source] ModelError),

    /// 评估阶段失败，识别结果已丢弃
    #[error("评估失败: {0}")]
    AssessmentFailed(#[source] ModelError),
}

impl GradeError {
    /// 失败发生的阶段
    pub fn stage(&self) -> Stage {
        match self {
            GradeError::ExtractionFailed(_) => Stage::Extracting,
            GradeError::AssessmentFailed(_) => Stage::Assessing,
        }
    }

    /// 底层的模型错误
    pub fn model_error(&self) -> &ModelError {
        match self {
            GradeError::ExtractionFailed(e) | GradeError::AssessmentFailed(e) => e,
        }
    }
}

/// 流水线结果类型
pub type GradeResult<T> = Result<T, GradeError>;
