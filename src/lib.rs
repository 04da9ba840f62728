//! # Homework Grader
//!
//! 一个用于自动批改手写数学作业照片的 Rust 应用程序
//!
//! ## 架构设计
//!
//! 本系统采用四层架构：
//!
//! ### ① 基础设施层（Clients）
//! - `clients/` - 持有 HTTP 客户端，只暴露"发送提示词、取回文本"的能力
//! - `InferenceBackend` - 推理后端能力抽象
//! - `ModelClient` - 基于 `/generate` 接口的实现
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"，只处理单次调用
//! - `Extractor` - 从图片中转写手写内容
//! - `Assessor` - 让模型评估解题过程
//! - `ResponseParser` - 把评估文本解析为结构化结果（纯函数）
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义"一张作业"的完整批改流程
//! - `PendingRequest` - 请求上下文（图片 + 当前阶段）
//! - `GradingFlow` - 流程编排（识别 → 评估 → 解析）
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/batch_processor` - 批量批改，管理并发和取消
//! - `orchestrator/image_processor` - 单张作业批改并记录结果
//!
//! ## 模块结构

pub mod clients;
pub mod config;
pub mod error;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use clients::{InferenceBackend, ModelClient};
pub use config::Config;
pub use error::{GradeError, GradeResult, ModelError};
pub use models::{Evaluation, GradeRecord, GradingPolicy, HomeworkImage, Stage};
pub use orchestrator::{App, GradingStats};
pub use services::{Assessor, Extractor, ResponseParser};
pub use workflow::{GradingFlow, PendingRequest};
