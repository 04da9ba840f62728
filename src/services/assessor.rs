//! 评估服务 - 业务能力层
//!
//! 只负责"让模型评估识别出的解题过程"，不解释模型的回答

use std::sync::Arc;

use tracing::debug;

use crate::clients::InferenceBackend;
use crate::error::{GradeError, GradeResult};
use crate::models::GradingPolicy;

/// 评估服务
pub struct Assessor {
    backend: Arc<dyn InferenceBackend>,
    policy: GradingPolicy,
}

impl Assessor {
    pub fn new(backend: Arc<dyn InferenceBackend>, policy: GradingPolicy) -> Self {
        Self { backend, policy }
    }

    /// 评估解题过程，原样返回模型的回答
    pub async fn assess(&self, extracted_text: &str) -> GradeResult<String> {
        let prompt = build_assessment_prompt(extracted_text, self.policy.max_score());
        debug!("开始评估，识别文本长度: {} 字符", extracted_text.len());

        self.backend
            .invoke(&prompt, None)
            .await
            .map_err(GradeError::AssessmentFailed)
    }
}

/// 构建评估提示词
fn build_assessment_prompt(extracted_text: &str, max_score: u32) -> String {
    let work = if extracted_text.trim().is_empty() {
        "(no work could be read from the submission)"
    } else {
        extracted_text
    };

    format!(
        r#"Evaluate the following math homework solution and determine if it is correct.
Explain your reasoning, give a correctness assessment, and state a score out of {max} in the form "Score: N/{max}".
Begin your explanation for the student with "Feedback:".

{work}"#,
        max = max_score,
        work = work
    )
}
