//! 评估文本解析 - 业务能力层
//!
//! 把模型返回的自然语言评估转换为结构化的 `Evaluation`。
//!
//! 解析是纯函数：不访问网络，相同输入总是得到相同输出。
//! 规则按固定顺序执行，每条规则只在匹配时覆盖前面的结果：
//!
//! 1. 默认值：错误、0 分、置信度 0.5、反馈为原文
//! 2. 正确性关键词（correct / right / valid / accurate）→ 暂定正确、满分
//! 3. 显式分数（`N/满分` 或 `score: N`）→ 覆盖分数，按及格线重新判定正确性
//! 4. 置信度关键词：肯定语气 0.95 优先于推测语气 0.75
//! 5. `feedback:` 段落 → 只保留该段作为反馈
//!
//! 任何一条规则出错时停止解析，返回已经得到的结果，不向上抛出错误。

use std::num::IntErrorKind;

use regex::{Regex, RegexBuilder};
use tracing::{debug, warn};

use crate::models::grade::BASELINE_CONFIDENCE;
use crate::models::{Evaluation, GradingPolicy};

const CORRECTNESS_CUES: &[&str] = &["correct", "right", "valid", "accurate"];
const HIGH_CERTAINTY_CUES: &[&str] = &["definitely", "certainly", "absolutely", "clearly"];
const MODERATE_CERTAINTY_CUES: &[&str] = &["likely", "probably", "seems", "appears"];

const HIGH_CONFIDENCE: f64 = 0.95;
const MODERATE_CONFIDENCE: f64 = 0.75;

const REGEX_SIZE_LIMIT: usize = 1 << 20;

/// 解析过程中的中间结果
#[derive(Debug, Clone)]
struct Draft {
    is_correct: bool,
    score: u32,
    confidence: f64,
    feedback: String,
}

type Rule = fn(&ResponseParser, &str, Draft) -> Result<Draft, regex::Error>;

const RULES: &[(&str, Rule)] = &[
    ("correctness", ResponseParser::apply_correctness_cues),
    ("score", ResponseParser::apply_score),
    ("confidence", ResponseParser::apply_confidence),
    ("feedback", ResponseParser::apply_feedback),
];

/// 评估文本解析器
#[derive(Debug, Clone)]
pub struct ResponseParser {
    policy: GradingPolicy,
    regex_size_limit: usize,
}

impl Default for ResponseParser {
    fn default() -> Self {
        Self::new(GradingPolicy::default())
    }
}

impl ResponseParser {
    pub fn new(policy: GradingPolicy) -> Self {
        Self {
            policy,
            regex_size_limit: REGEX_SIZE_LIMIT,
        }
    }

    pub fn policy(&self) -> GradingPolicy {
        self.policy
    }

    /// 解析模型的评估文本
    pub fn parse(&self, raw_text: &str) -> Evaluation {
        self.parse_with_rules(raw_text, RULES)
    }

    /// 按给定顺序执行规则，任一规则失败时保留之前的结果
    fn parse_with_rules(&self, raw_text: &str, rules: &[(&str, Rule)]) -> Evaluation {
        let mut draft = Draft {
            is_correct: false,
            score: 0,
            confidence: BASELINE_CONFIDENCE,
            feedback: raw_text.to_string(),
        };

        for (name, rule) in rules {
            match rule(self, raw_text, draft.clone()) {
                Ok(next) => draft = next,
                Err(e) => {
                    warn!("解析规则 {} 执行失败，使用已解析的结果: {}", name, e);
                    break;
                }
            }
        }

        debug!(
            "解析结果: correct={}, score={}/{}, confidence={}",
            draft.is_correct,
            draft.score,
            self.policy.max_score(),
            draft.confidence
        );

        Evaluation::new(
            draft.is_correct,
            draft.score,
            self.policy.max_score(),
            draft.confidence,
            draft.feedback,
        )
    }

    fn build_regex(&self, pattern: &str) -> Result<Regex, regex::Error> {
        RegexBuilder::new(pattern)
            .case_insensitive(true)
            .size_limit(self.regex_size_limit)
            .build()
    }

    fn lexicon_regex(&self, words: &[&str]) -> Result<Regex, regex::Error> {
        let alternatives: Vec<String> = words.iter().map(|w| regex::escape(w)).collect();
        self.build_regex(&alternatives.join("|"))
    }

    fn apply_correctness_cues(&self, raw_text: &str, mut draft: Draft) -> Result<Draft, regex::Error> {
        if self.lexicon_regex(CORRECTNESS_CUES)?.is_match(raw_text) {
            draft.is_correct = true;
            draft.score = self.policy.max_score();
        }
        Ok(draft)
    }

    fn apply_score(&self, raw_text: &str, mut draft: Draft) -> Result<Draft, regex::Error> {
        let pattern = format!(
            r"([0-9]+)\s*/\s*{}\b|score\s*:?\s*([0-9]+)",
            self.policy.max_score()
        );
        let re = self.build_regex(&pattern)?;

        if let Some(caps) = re.captures(raw_text) {
            if let Some(digits) = caps.get(1).or_else(|| caps.get(2)) {
                let value = match digits.as_str().parse::<u32>() {
                    Ok(value) => value,
                    // 数字过长时按满分截断
                    Err(e) if *e.kind() == IntErrorKind::PosOverflow => u32::MAX,
                    Err(e) => {
                        warn!("无法解析分数 {:?}: {}", digits.as_str(), e);
                        return Ok(draft);
                    }
                };
                draft.score = self.policy.clamp_score(value);
                draft.is_correct = self.policy.is_passing(draft.score);
            }
        }
        Ok(draft)
    }

    fn apply_confidence(&self, raw_text: &str, mut draft: Draft) -> Result<Draft, regex::Error> {
        if self.lexicon_regex(HIGH_CERTAINTY_CUES)?.is_match(raw_text) {
            draft.confidence = HIGH_CONFIDENCE;
        } else if self.lexicon_regex(MODERATE_CERTAINTY_CUES)?.is_match(raw_text) {
            draft.confidence = MODERATE_CONFIDENCE;
        }
        Ok(draft)
    }

    fn apply_feedback(&self, raw_text: &str, mut draft: Draft) -> Result<Draft, regex::Error> {
        let re = self.build_regex(r"(?s)feedback\s*:\s*(.+?)(?:\n[ \t\r]*\n|\z)")?;

        if let Some(segment) = re.captures(raw_text).and_then(|caps| caps.get(1)) {
            let feedback = segment.as_str().trim();
            if !feedback.is_empty() {
                draft.feedback = feedback.to_string();
            }
        }
        Ok(draft)
    }
}
