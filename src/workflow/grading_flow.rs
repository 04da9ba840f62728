//! 作业批改流程 - 流程层
//!
//! 核心职责：定义"一张作业"的完整批改流程
//!
//! 流程顺序：
//! 1. 识别（Extractor）→ 失败则整体失败，不再评估
//! 2. 评估（Assessor）→ 失败则整体失败，识别结果丢弃
//! 3. 解析（ResponseParser）→ 不会失败，最差返回保守的默认结果

use std::sync::Arc;

use anyhow::Result;
use tracing::{error, info};

use crate::clients::{InferenceBackend, ModelClient};
use crate::config::Config;
use crate::error::GradeResult;
use crate::models::{GradeRecord, GradingPolicy, Stage};
use crate::services::{Assessor, Extractor, ResponseParser};
use crate::utils::logging::truncate_text;
use crate::workflow::pending_request::PendingRequest;

/// 作业批改流程
///
/// - 不持有可变状态，可通过 `Arc` 在多个并发批改之间共享
/// - 每次调用互相独立，不缓存任何中间结果
pub struct GradingFlow {
    extractor: Extractor,
    assessor: Assessor,
    parser: ResponseParser,
}

impl GradingFlow {
    /// 识别和评估共用同一个推理后端
    pub fn new(backend: Arc<dyn InferenceBackend>, policy: GradingPolicy) -> Self {
        Self::with_backends(backend.clone(), backend, policy)
    }

    /// 识别和评估分别使用不同的推理后端
    pub fn with_backends(
        extraction_backend: Arc<dyn InferenceBackend>,
        assessment_backend: Arc<dyn InferenceBackend>,
        policy: GradingPolicy,
    ) -> Self {
        Self {
            extractor: Extractor::new(extraction_backend),
            assessor: Assessor::new(assessment_backend, policy),
            parser: ResponseParser::new(policy),
        }
    }

    /// 根据配置创建基于 HTTP 推理后端的流程
    pub fn from_config(config: &Config) -> Result<Self> {
        let client = ModelClient::new(config)?;
        Ok(Self::new(Arc::new(client), config.grading_policy()))
    }

    /// 批改一张作业图片
    pub async fn grade_homework(&self, image: &[u8]) -> GradeResult<GradeRecord> {
        let mut request = PendingRequest::new("-", image);
        self.grade_request(&mut request).await
    }

    /// 批改一个请求，并在请求上记录所处阶段
    ///
    /// 成功时阶段为 `Done`，失败时为 `Failed`
    pub async fn grade_request(&self, request: &mut PendingRequest<'_>) -> GradeResult<GradeRecord> {
        match self.run_stages(request).await {
            Ok(record) => {
                request.advance(Stage::Done);
                info!(
                    "{} ✓ 批改完成: {} 分 / {} 分, 正确: {}, 置信度: {:.2}",
                    request,
                    record.score(),
                    record.max_score(),
                    record.is_correct(),
                    record.confidence()
                );
                Ok(record)
            }
            Err(e) => {
                error!("{} ❌ 批改失败: {}", request, e);
                request.advance(Stage::Failed);
                Err(e)
            }
        }
    }

    async fn run_stages(&self, request: &mut PendingRequest<'_>) -> GradeResult<GradeRecord> {
        // ========== 阶段 1: 识别 ==========
        request.advance(Stage::Extracting);
        info!("{} 🔍 正在识别手写内容...", request);
        let extracted_text = self.extractor.extract_text(request.image).await?;
        info!(
            "{} ✓ 识别完成: {}",
            request,
            truncate_text(&extracted_text.replace('\n', " ⏎ "), 80)
        );

        // ========== 阶段 2: 评估 ==========
        request.advance(Stage::Assessing);
        info!("{} 🤖 正在评估解题过程...", request);
        let raw_assessment = self.assessor.assess(&extracted_text).await?;

        // ========== 阶段 3: 解析 ==========
        request.advance(Stage::Parsing);
        let evaluation = self.parser.parse(&raw_assessment);

        Ok(GradeRecord::new(extracted_text, evaluation))
    }
}
