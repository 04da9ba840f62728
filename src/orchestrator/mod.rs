//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层负责批量批改和任务调度。
//!
//! ## 模块划分
//!
//! ### `batch_processor` - 批量作业批改器
//! - 管理应用生命周期（初始化、运行）
//! - 批量加载作业图片（Vec<HomeworkImage>）
//! - 控制并发数量（Semaphore）
//! - 输出全局统计信息
//!
//! ### `image_processor` - 单张作业处理器
//! - 为单张图片创建批改请求并调用 GradingFlow
//! - 把结果写入结果文件
//!
//! ## 层次关系
//!
//! ```text
//! batch_processor (处理 Vec<HomeworkImage>)
//!     ↓
//! image_processor (处理单张 HomeworkImage)
//!     ↓
//! workflow::GradingFlow (识别 → 评估 → 解析)
//!     ↓
//! services (能力层：extractor / assessor / response_parser)
//!     ↓
//! clients (基础设施：ModelClient)
//! ```

pub mod batch_processor;
pub mod image_processor;

pub use batch_processor::{App, GradingStats};
pub use image_processor::grade_image;
