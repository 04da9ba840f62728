use std::fmt::Display;

use serde::Serialize;

/// 批改请求所处的阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// 识别图片中的手写内容
    Extracting,
    /// 模型评估识别结果
    Assessing,
    /// 解析评估文本
    Parsing,
    /// 已完成
    Done,
    /// 已失败
    Failed,
}

impl Stage {
    /// 是否为终止状态
    pub fn is_terminal(self) -> bool {
        matches!(self, Stage::Done | Stage::Failed)
    }

    pub fn name(self) -> &'static str {
        match self {
            Stage::Extracting => "识别",
            Stage::Assessing => "评估",
            Stage::Parsing => "解析",
            Stage::Done => "完成",
            Stage::Failed => "失败",
        }
    }
}

impl Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
