use crate::models::homework::HomeworkImage;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tokio::fs;

/// 单张图片大小上限（10 MiB）
pub const MAX_IMAGE_BYTES: u64 = 10 * 1024 * 1024;

/// 支持的图片扩展名
const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "bmp", "webp"];

/// 是否为支持的图片文件（按扩展名判断，忽略大小写）
pub fn is_image_file(path: &Path) -> bool {
    path.extension()
        .and_then(|s| s.to_str())
        .map(|ext| {
            let ext = ext.to_ascii_lowercase();
            IMAGE_EXTENSIONS.contains(&ext.as_str())
        })
        .unwrap_or(false)
}

/// 加载单张作业图片
pub async fn load_image(image_path: &Path) -> Result<HomeworkImage> {
    if !is_image_file(image_path) {
        anyhow::bail!("不支持的图片格式: {}", image_path.display());
    }

    let metadata = fs::metadata(image_path)
        .await
        .with_context(|| format!("无法读取图片信息: {}", image_path.display()))?;

    if metadata.len() > MAX_IMAGE_BYTES {
        anyhow::bail!(
            "图片过大: {} ({} 字节，上限 {} 字节)",
            image_path.display(),
            metadata.len(),
            MAX_IMAGE_BYTES
        );
    }

    let bytes = fs::read(image_path)
        .await
        .with_context(|| format!("无法读取图片: {}", image_path.display()))?;

    let label = image_path
        .file_name()
        .unwrap_or_default()
        .to_string_lossy()
        .to_string();

    Ok(HomeworkImage::new(label, bytes))
}

/// 从文件夹中加载所有作业图片
///
/// 加载失败的文件会被跳过并记录警告，结果按文件名排序
pub async fn load_all_images(folder_path: &str) -> Result<Vec<HomeworkImage>> {
    let folder = PathBuf::from(folder_path);

    if !folder.exists() {
        anyhow::bail!("文件夹不存在: {}", folder_path);
    }

    let mut image_paths = Vec::new();
    let mut entries = fs::read_dir(&folder)
        .await
        .with_context(|| format!("无法读取文件夹: {}", folder_path))?;

    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if is_image_file(&path) {
            image_paths.push(path);
        }
    }
    image_paths.sort();

    let mut images = Vec::with_capacity(image_paths.len());
    for path in image_paths {
        match load_image(&path).await {
            Ok(image) => {
                tracing::info!("正在加载: {} ({} 字节)", image.label(), image.len());
                images.push(image);
            }
            Err(e) => {
                tracing::warn!("加载图片失败 {}: {}", path.display(), e);
            }
        }
    }

    Ok(images)
}
