//! 批改结果模型

use serde::Serialize;

/// 默认满分
pub const DEFAULT_MAX_SCORE: u32 = 10;
/// 默认及格比例（百分比）
pub const DEFAULT_PASS_PERCENT: u32 = 70;
/// 无法判断时的基线置信度
pub const BASELINE_CONFIDENCE: f64 = 0.5;

/// 评分策略
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GradingPolicy {
    max_score: u32,
    pass_percent: u32,
}

impl GradingPolicy {
    /// 创建评分策略
    ///
    /// `max_score` 为 0 时使用默认满分，`pass_percent` 超过 100 时按 100 处理
    pub fn new(max_score: u32, pass_percent: u32) -> Self {
        Self {
            max_score: if max_score == 0 { DEFAULT_MAX_SCORE } else { max_score },
            pass_percent: pass_percent.min(100),
        }
    }

    pub fn max_score(&self) -> u32 {
        self.max_score
    }

    pub fn pass_percent(&self) -> u32 {
        self.pass_percent
    }

    /// 分数是否达到及格线
    pub fn is_passing(&self, score: u32) -> bool {
        u64::from(score) * 100 >= u64::from(self.max_score) * u64::from(self.pass_percent)
    }

    /// 将分数限制在 `[0, max_score]`
    pub fn clamp_score(&self, score: u32) -> u32 {
        score.min(self.max_score)
    }
}

impl Default for GradingPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_SCORE, DEFAULT_PASS_PERCENT)
    }
}

/// 对模型评估文本的结构化解析结果
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Evaluation {
    #[serde(rename = "correct")]
    is_correct: bool,
    feedback: String,
    confidence: f64,
    #[serde(rename = "partial_points")]
    score: u32,
    #[serde(rename = "total_points")]
    max_score: u32,
}

impl Evaluation {
    /// 创建评估结果，分数和置信度越界时会被截断
    pub fn new(
        is_correct: bool,
        score: u32,
        max_score: u32,
        confidence: f64,
        feedback: impl Into<String>,
    ) -> Self {
        let max_score = if max_score == 0 { DEFAULT_MAX_SCORE } else { max_score };
        let confidence = if confidence.is_nan() {
            BASELINE_CONFIDENCE
        } else {
            confidence.clamp(0.0, 1.0)
        };

        Self {
            is_correct,
            feedback: feedback.into(),
            confidence,
            score: score.min(max_score),
            max_score,
        }
    }

    pub fn is_correct(&self) -> bool {
        self.is_correct
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn max_score(&self) -> u32 {
        self.max_score
    }

    pub fn confidence(&self) -> f64 {
        self.confidence
    }

    pub fn feedback(&self) -> &str {
        &self.feedback
    }
}

/// 一次批改的最终结果
///
/// 构造后不可修改。序列化格式与展示层约定一致：
///
/// ```json
/// { "ocr_text": "...", "evaluation": { "correct": true, "feedback": "...",
///   "confidence": 0.75, "partial_points": 9, "total_points": 10 } }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GradeRecord {
    #[serde(rename = "ocr_text")]
    extracted_text: String,
    evaluation: Evaluation,
}

impl GradeRecord {
    pub fn new(extracted_text: impl Into<String>, evaluation: Evaluation) -> Self {
        Self {
            extracted_text: extracted_text.into(),
            evaluation,
        }
    }

    pub fn extracted_text(&self) -> &str {
        &self.extracted_text
    }

    pub fn evaluation(&self) -> &Evaluation {
        &self.evaluation
    }

    pub fn is_correct(&self) -> bool {
        self.evaluation.is_correct
    }

    pub fn score(&self) -> u32 {
        self.evaluation.score
    }

    pub fn max_score(&self) -> u32 {
        self.evaluation.max_score
    }

    pub fn confidence(&self) -> f64 {
        self.evaluation.confidence
    }

    pub fn feedback(&self) -> &str {
        &self.evaluation.feedback
    }
}
