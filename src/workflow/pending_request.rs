//! 批改请求上下文
//!
//! 封装"正在批改哪张图片、进行到哪一步"这一信息，只在一次批改期间存在

use std::fmt::Display;

use crate::models::Stage;

/// 一次进行中的批改请求
#[derive(Debug, Clone)]
pub struct PendingRequest<'a> {
    /// 图片标识（仅用于日志显示）
    pub label: String,

    /// 作业图片内容
    pub image: &'a [u8],

    stage: Stage,
}

impl<'a> PendingRequest<'a> {
    /// 创建新的批改请求，初始阶段为识别
    pub fn new(label: impl Into<String>, image: &'a [u8]) -> Self {
        Self {
            label: label.into(),
            image,
            stage: Stage::Extracting,
        }
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// 进入下一阶段，已终止的请求不再变化
    pub(crate) fn advance(&mut self, stage: Stage) {
        if !self.stage.is_terminal() {
            self.stage = stage;
        }
    }
}

impl Display for PendingRequest<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[作业 {} 阶段#{}]", self.label, self.stage)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_stage_is_sticky() {
        let mut request = PendingRequest::new("hw.png", b"img");
        assert_eq!(request.stage(), Stage::Extracting);

        request.advance(Stage::Failed);
        request.advance(Stage::Assessing);
        assert_eq!(request.stage(), Stage::Failed);
    }
}
