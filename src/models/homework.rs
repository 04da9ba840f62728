/// 一张待批改的作业图片
#[derive(Debug, Clone)]
pub struct HomeworkImage {
    /// 图片标识（通常为文件名，仅用于日志和结果记录）
    label: String,
    bytes: Vec<u8>,
}

impl HomeworkImage {
    pub fn new(label: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            label: label.into(),
            bytes,
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}
