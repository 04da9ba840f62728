//! 单张作业处理器 - 编排层
//!
//! ## 职责
//!
//! 批改单张作业图片，并把结果（或失败原因）以一行 JSON 追加到结果文件。
//! 具体的批改流程由 `workflow::GradingFlow` 负责。

use anyhow::Result;
use serde_json::json;
use tracing::{debug, warn};

use crate::models::{GradeRecord, HomeworkImage};
use crate::utils::logging::append_log_line;
use crate::workflow::{GradingFlow, PendingRequest};

/// 批改单张作业图片
///
/// # 参数
/// - `flow`: 批改流程
/// - `image`: 作业图片
/// - `image_index`: 图片序号（仅用于日志）
/// - `log_file_path`: 结果文件路径
pub async fn grade_image(
    flow: &GradingFlow,
    image: &HomeworkImage,
    image_index: usize,
    log_file_path: &str,
) -> Result<GradeRecord> {
    let mut request = PendingRequest::new(
        format!("#{} {}", image_index, image.label()),
        image.bytes(),
    );

    match flow.grade_request(&mut request).await {
        Ok(record) => {
            let line = json!({
                "image": image.label(),
                "result": &record,
            });
            match append_log_line(log_file_path, &line.to_string()) {
                Ok(()) => debug!("{} 结果已写入 {}", request, log_file_path),
                Err(write_err) => warn!("{} 写入批改结果出错: {}", request, write_err),
            }
            Ok(record)
        }
        Err(e) => {
            let line = json!({
                "image": image.label(),
                "stage": e.stage(),
                "error": e.to_string(),
            });
            if let Err(write_err) = append_log_line(log_file_path, &line.to_string()) {
                warn!("{} 写入失败记录出错: {}", request, write_err);
            }
            Err(e.into())
        }
    }
}
