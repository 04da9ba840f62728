//! 批量作业批改器 - 编排层
//!
//! ## 职责
//!
//! 本模块是整个应用的入口，负责批量作业的批改和资源管理。
//!
//! ## 核心功能
//!
//! 1. **应用初始化**：写入结果文件表头、创建推理客户端和批改流程
//! 2. **批量加载**：扫描并加载所有待批改的图片（`Vec<HomeworkImage>`）
//! 3. **并发控制**：使用 Semaphore 限制同时进行的批改数量
//! 4. **取消传播**：收到 Ctrl-C 时中止所有未完成的任务（连同进行中的 HTTP 请求）
//! 5. **全局统计**：汇总所有作业的批改结果
//!
//! 每次批改互相独立，任务之间只共享只读的 `GradingFlow`。

use crate::config::Config;
use crate::models::{loaders, HomeworkImage};
use crate::orchestrator::image_processor;
use crate::utils::logging::{init_log_file, log_images_loaded, log_startup, print_final_stats};
use crate::workflow::GradingFlow;
use anyhow::Result;
use futures::stream::{FuturesUnordered, StreamExt};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{error, info, warn};

/// 应用主结构
pub struct App {
    config: Config,
    flow: Arc<GradingFlow>,
}

/// 批改统计
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct GradingStats {
    pub total: usize,
    pub success: usize,
    pub failed: usize,
    /// 判定为正确的作业数
    pub passed: usize,
    /// 因中断而取消的作业数
    pub cancelled: usize,
}

impl App {
    /// 初始化应用
    pub async fn initialize(config: Config) -> Result<Self> {
        let flow = GradingFlow::from_config(&config)?;
        Self::with_flow(config, flow)
    }

    /// 使用指定的批改流程初始化应用
    pub fn with_flow(config: Config, flow: GradingFlow) -> Result<Self> {
        init_log_file(&config.output_log_file)?;

        log_startup(&config.model_name, config.max_concurrent);

        Ok(Self {
            config,
            flow: Arc::new(flow),
        })
    }

    /// 运行应用主逻辑
    pub async fn run(&self) -> Result<GradingStats> {
        let images = self.load_images().await?;

        if images.is_empty() {
            warn!("⚠️ 没有找到待批改的作业图片，程序结束");
            return Ok(GradingStats::default());
        }

        log_images_loaded(images.len(), self.config.max_concurrent);

        let stats = self.grade_all(images).await;

        print_final_stats(
            stats.success,
            stats.failed,
            stats.passed,
            stats.total,
            &self.config.output_log_file,
        );

        Ok(stats)
    }

    /// 加载作业图片
    async fn load_images(&self) -> Result<Vec<HomeworkImage>> {
        info!("\n📁 正在扫描待批改的作业...");
        loaders::load_all_images(&self.config.image_folder).await
    }

    /// 并发批改所有作业
    pub async fn grade_all(&self, images: Vec<HomeworkImage>) -> GradingStats {
        let semaphore = Arc::new(Semaphore::new(self.config.max_concurrent.max(1)));
        let mut stats = GradingStats {
            total: images.len(),
            ..Default::default()
        };

        let mut tasks = FuturesUnordered::new();
        let mut abort_handles = Vec::with_capacity(images.len());

        for (idx, image) in images.into_iter().enumerate() {
            let image_index = idx + 1;
            let flow = self.flow.clone();
            let semaphore = semaphore.clone();
            let log_file = self.config.output_log_file.clone();

            let handle = tokio::spawn(async move {
                let _permit = match semaphore.acquire_owned().await {
                    Ok(permit) => permit,
                    Err(e) => return Err(anyhow::Error::from(e)),
                };
                image_processor::grade_image(&flow, &image, image_index, &log_file).await
            });
            abort_handles.push(handle.abort_handle());
            tasks.push(async move { (image_index, handle.await) });
        }

        let ctrl_c = tokio::signal::ctrl_c();
        tokio::pin!(ctrl_c);
        let mut listening = true;

        loop {
            tokio::select! {
                next = tasks.next() => match next {
                    None => break,
                    Some((_, Ok(Ok(record)))) => {
                        stats.success += 1;
                        if record.is_correct() {
                            stats.passed += 1;
                        }
                    }
                    Some((_, Ok(Err(_)))) => {
                        // 失败原因已在流程中记录
                        stats.failed += 1;
                    }
                    Some((image_index, Err(e))) => {
                        error!("[作业 #{}] 任务执行失败: {}", image_index, e);
                        stats.failed += 1;
                    }
                },
                signal = &mut ctrl_c, if listening => {
                    if let Err(e) = signal {
                        warn!("无法监听中断信号: {}", e);
                        listening = false;
                        continue;
                    }
                    warn!("⚠️ 收到中断信号，取消剩余 {} 个批改任务", tasks.len());
                    for handle in &abort_handles {
                        handle.abort();
                    }
                    stats.cancelled = tasks.len();
                    break;
                }
            }
        }

        stats
    }
}
