#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use homework_grader::{InferenceBackend, ModelError};
use serde_json::Value;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

/// 记录下来的一次后端调用
#[derive(Debug, Clone)]
pub struct Call {
    pub prompt: String,
    pub image: Option<Vec<u8>>,
}

/// 预设回复
pub enum Reply {
    Text(&'static str),
    Fail(&'static str),
}

/// 按顺序返回预设回复的后端
pub struct ScriptedBackend {
    replies: Mutex<VecDeque<Reply>>,
    calls: Mutex<Vec<Call>>,
}

impl ScriptedBackend {
    pub fn new(replies: Vec<Reply>) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.into()),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl InferenceBackend for ScriptedBackend {
    async fn invoke(&self, prompt: &str, image: Option<&[u8]>) -> Result<String, ModelError> {
        self.calls.lock().unwrap().push(Call {
            prompt: prompt.to_string(),
            image: image.map(|bytes| bytes.to_vec()),
        });

        match self.replies.lock().unwrap().pop_front() {
            Some(Reply::Text(text)) => Ok(text.to_string()),
            Some(Reply::Fail(message)) => Err(ModelError::backend("scripted", Some(500), message)),
            None => Err(ModelError::backend("scripted", None, "no scripted reply left")),
        }
    }
}

/// 回显后端：识别时把图片内容当作文字返回，评估时把作业最后一行当作分数
///
/// 图片内容为 `fail` 时识别失败
pub struct EchoBackend;

#[async_trait]
impl InferenceBackend for EchoBackend {
    async fn invoke(&self, prompt: &str, image: Option<&[u8]>) -> Result<String, ModelError> {
        tokio::task::yield_now().await;

        match image {
            Some(b"fail") => Err(ModelError::backend("echo", Some(503), "model is loading")),
            Some(bytes) => Ok(String::from_utf8_lossy(bytes).to_string()),
            None => {
                let work = prompt.lines().last().unwrap_or_default();
                Ok(format!("Feedback: echoed\n\nscore: {}", work))
            }
        }
    }
}

/// 在本地端口上启动一个只回复预设内容的 HTTP 服务
///
/// 每个连接处理一个请求，返回 `(状态码, 响应体)`。收到的请求体按 JSON 记录下来
pub async fn spawn_http_backend(replies: Vec<(u16, &'static str)>) -> (String, Arc<Mutex<Vec<Value>>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let captured = Arc::new(Mutex::new(Vec::new()));
    let sink = captured.clone();

    tokio::spawn(async move {
        for (status, body) in replies {
            let Ok((mut socket, _)) = listener.accept().await else {
                return;
            };
            let request = read_request_body(&mut socket).await;
            sink.lock()
                .unwrap()
                .push(serde_json::from_slice(&request).unwrap_or(Value::Null));

            let response = format!(
                "HTTP/1.1 {} Canned\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            let _ = socket.write_all(response.as_bytes()).await;
            let _ = socket.shutdown().await;
        }
    });

    (format!("http://{}/api", addr), captured)
}

/// 启动一个接受连接但从不回复的 HTTP 服务
pub async fn spawn_silent_backend(hold_for: Duration) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        while let Ok((socket, _)) = listener.accept().await {
            tokio::spawn(async move {
                tokio::time::sleep(hold_for).await;
                drop(socket);
            });
        }
    });

    format!("http://{}/api", addr)
}

async fn read_request_body(socket: &mut TcpStream) -> Vec<u8> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];

    loop {
        let n = socket.read(&mut chunk).await.unwrap_or(0);
        if n == 0 {
            return Vec::new();
        }
        buf.extend_from_slice(&chunk[..n]);

        if let Some(header_end) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            let headers = String::from_utf8_lossy(&buf[..header_end]).to_ascii_lowercase();
            let content_length = headers
                .lines()
                .find_map(|line| line.strip_prefix("content-length:"))
                .and_then(|v| v.trim().parse::<usize>().ok())
                .unwrap_or(0);

            let body_start = header_end + 4;
            while buf.len() < body_start + content_length {
                let n = socket.read(&mut chunk).await.unwrap_or(0);
                if n == 0 {
                    break;
                }
                buf.extend_from_slice(&chunk[..n]);
            }

            let body_end = (body_start + content_length).min(buf.len());
            return buf[body_start..body_end].to_vec();
        }
    }
}

/// 测试用的临时目录
pub fn scratch_dir(name: &str) -> std::path::PathBuf {
    let dir = std::env::temp_dir().join(format!("homework_grader_it_{}_{}", name, std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    dir
}
