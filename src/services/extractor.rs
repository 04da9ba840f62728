//! 识别服务 - 业务能力层
//!
//! 只负责"从图片中转写手写数学内容"，不关心评估

use std::sync::Arc;

use tracing::{debug, warn};

use crate::clients::InferenceBackend;
use crate::error::{GradeError, GradeResult};

/// 识别提示词
pub const EXTRACTION_PROMPT: &str = "Please perform OCR on this image and extract all the mathematical \
expressions and workings shown. Transcribe everything verbatim, exactly as written, and preserve the \
original line structure (one line of work per line). Do not solve, correct or comment on the work:";

/// 识别服务
pub struct Extractor {
    backend: Arc<dyn InferenceBackend>,
}

impl Extractor {
    pub fn new(backend: Arc<dyn InferenceBackend>) -> Self {
        Self { backend }
    }

    /// 转写图片中的数学内容
    ///
    /// 只去掉首尾空白。结果为空不算错误，空白作业本身也是有效的提交
    pub async fn extract_text(&self, image: &[u8]) -> GradeResult<String> {
        debug!("开始识别，图片大小: {} 字节", image.len());

        let response = self
            .backend
            .invoke(EXTRACTION_PROMPT, Some(image))
            .await
            .map_err(GradeError::ExtractionFailed)?;

        let text = response.trim().to_string();
        if text.is_empty() {
            warn!("识别结果为空，将按空白作业继续评估");
        }

        Ok(text)
    }
}
