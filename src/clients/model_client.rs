//! 推理后端客户端
//!
//! 封装对模型服务 `/generate` 接口的调用：
//! - 请求体：`{ model, prompt, images?: [base64], stream: false }`
//! - 响应体：`{ response }`
//!
//! 本层不做重试，所有错误原样返回给调用方。
//! 超时由 reqwest 客户端统一设置，超时按"后端不可用"处理。
//! 丢弃返回的 future 即可取消正在进行的请求。

use anyhow::{Context, Result};
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::ModelError;

/// 推理后端能力：发送提示词（可附带一张图片），返回模型的完整文本输出
#[async_trait]
pub trait InferenceBackend: Send + Sync {
    async fn invoke(&self, prompt: &str, image: Option<&[u8]>) -> Result<String, ModelError>;
}

/// 基于 HTTP 的推理后端客户端
pub struct ModelClient {
    client: Client,
    endpoint: String,
    model_name: String,
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    images: Option<Vec<String>>,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    response: Option<String>,
    error: Option<String>,
}

impl ModelClient {
    /// 根据配置创建客户端
    pub fn new(config: &Config) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .build()
            .context("无法创建 HTTP 客户端")?;

        Ok(Self::with_client(client, &config.model_base_url, &config.model_name))
    }

    /// 使用已有的 reqwest 客户端创建
    pub fn with_client(client: Client, base_url: &str, model_name: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: format!("{}/generate", base_url.trim_end_matches('/')),
            model_name: model_name.into(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn build_request<'a>(&'a self, prompt: &'a str, image: Option<&[u8]>) -> GenerateRequest<'a> {
        GenerateRequest {
            model: &self.model_name,
            prompt,
            images: image.map(|bytes| vec![STANDARD.encode(bytes)]),
            stream: false,
        }
    }
}

#[async_trait]
impl InferenceBackend for ModelClient {
    async fn invoke(&self, prompt: &str, image: Option<&[u8]>) -> Result<String, ModelError> {
        if prompt.trim().is_empty() {
            return Err(ModelError::EmptyPrompt);
        }

        debug!("调用推理后端，模型: {}", self.model_name);
        debug!("提示词长度: {} 字符", prompt.len());
        if let Some(bytes) = image {
            debug!("附带图片: {} 字节", bytes.len());
        }

        let request = self.build_request(prompt, image);

        let response = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                warn!("推理后端请求失败: {}", e);
                ModelError::Unavailable {
                    endpoint: self.endpoint.clone(),
                    source: e,
                }
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            warn!("读取推理后端响应失败: {}", e);
            ModelError::Unavailable {
                endpoint: self.endpoint.clone(),
                source: e,
            }
        })?;

        let text = decode_generate_body(&self.endpoint, status.as_u16(), &body)?;
        debug!("推理后端调用成功，响应长度: {} 字符", text.len());

        Ok(text)
    }
}

/// 解析 `/generate` 的响应体
///
/// 非 2xx、带 `error` 字段、或缺少 `response` 字段都视为应用层错误
fn decode_generate_body(endpoint: &str, status: u16, body: &str) -> Result<String, ModelError> {
    let parsed = serde_json::from_str::<GenerateResponse>(body);

    if !(200..300).contains(&status) {
        let message = match parsed {
            Ok(GenerateResponse {
                error: Some(message),
                ..
            }) => message,
            _ => body.trim().to_string(),
        };
        warn!("推理后端返回 {}: {}", status, message);
        return Err(ModelError::backend(endpoint, Some(status), message));
    }

    match parsed {
        Ok(GenerateResponse {
            error: Some(message),
            ..
        }) => Err(ModelError::backend(endpoint, Some(status), message)),
        Ok(GenerateResponse {
            response: Some(text),
            ..
        }) => Ok(text),
        Ok(_) => Err(ModelError::backend(endpoint, Some(status), "响应中缺少 response 字段")),
        Err(e) => Err(ModelError::backend(
            endpoint,
            Some(status),
            format!("无法解析响应: {}", e),
        )),
    }
}
