//! Ollama 本地守护进程提供商
//!
//! 走本地 HTTP 守护进程，无需凭据。
//!
//! ## 调用约定
//! - `GET /api/tags` 做可用性探测和模型列表
//! - `POST /api/generate` 出题，stream 固定为 false
//! - 本地大模型更慢，默认超时 60 秒

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::models::note::Note;
use crate::models::question::QuizQuestion;
use crate::providers::prompt::build_generation_prompt;
use crate::providers::validation_context_for;
use crate::services::parser::{parse_response, ParseMode};
use crate::services::validator::validate_all;
use crate::utils::logging::truncate_text;

const PROVIDER_NAME: &str = "ollama";

// ========== 请求/响应数据结构 ==========

#[derive(Debug, Serialize)]
struct OllamaGenerateRequest {
    model: String,
    prompt: String,
    stream: bool,
    options: OllamaOptions,
}

#[derive(Debug, Serialize)]
struct OllamaOptions {
    temperature: f32,
    top_p: f32,
}

#[derive(Debug, Deserialize)]
struct OllamaGenerateResponse {
    #[serde(default)]
    model: String,
    #[serde(default)]
    response: String,
    #[serde(default)]
    done: bool,
}

#[derive(Debug, Deserialize)]
struct OllamaTagsResponse {
    #[serde(default)]
    models: Vec<OllamaModel>,
}

#[derive(Debug, Deserialize)]
struct OllamaModel {
    name: String,
}

// ========== 提供商实现 ==========

/// Ollama 提供商
///
/// base_url、模型名和采样参数在构造时固定，实例不可变。
#[derive(Debug)]
pub struct OllamaProvider {
    client: reqwest::Client,
    base_url: String,
    model: String,
    temperature: f32,
    top_p: f32,
    degraded_parses: AtomicU64,
}

impl OllamaProvider {
    /// 本地路径生成的题目次日到期
    ///
    /// 与云端路径的 0 天不一致，是否统一待产品确认，
    /// 先按各自路径保留。
    pub const INITIAL_INTERVAL_DAYS: i64 = 1;

    /// 创建新的 Ollama 提供商
    pub fn new(config: &Config) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.ollama_timeout_secs))
            .build()
            .map_err(|e| AppError::Other(format!("构建 HTTP 客户端失败: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.ollama_base_url.trim_end_matches('/').to_string(),
            model: config.ollama_model.clone(),
            temperature: config.ollama_temperature,
            top_p: config.ollama_top_p,
            degraded_parses: AtomicU64::new(0),
        })
    }

    /// 探测守护进程是否在运行
    ///
    /// `GET /api/tags` 返回 2xx 才算可用。探测永远不报错。
    pub async fn check_availability(&self) -> bool {
        let url = format!("{}/api/tags", self.base_url);
        match self.client.get(&url).send().await {
            Ok(resp) => {
                let ok = resp.status().is_success();
                if !ok {
                    debug!("Ollama 探测返回 HTTP {}", resp.status().as_u16());
                }
                ok
            }
            Err(e) => {
                debug!("Ollama 探测失败: {}", e);
                false
            }
        }
    }

    /// 列出守护进程已安装的模型
    pub async fn list_models(&self) -> AppResult<Vec<String>> {
        let url = format!("{}/api/tags", self.base_url);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| AppError::request_failed(PROVIDER_NAME, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::upstream(
                PROVIDER_NAME,
                Some(status.as_u16()),
                "模型列表请求失败",
            ));
        }

        let tags: OllamaTagsResponse = response
            .json()
            .await
            .map_err(|e| AppError::request_failed(PROVIDER_NAME, e))?;

        Ok(tags.models.into_iter().map(|m| m.name).collect())
    }

    /// 根据笔记生成测验题
    pub async fn generate(
        &self,
        notes: &[Note],
        max_questions: usize,
    ) -> AppResult<Vec<QuizQuestion>> {
        if notes.is_empty() {
            return Ok(Vec::new());
        }

        if !self.check_availability().await {
            return Err(AppError::provider_unavailable(PROVIDER_NAME));
        }

        let prompt = build_generation_prompt(notes, max_questions);
        debug!(
            "Ollama 提示词长度: {} 字符，模型: {}",
            prompt.chars().count(),
            self.model
        );

        let request = OllamaGenerateRequest {
            model: self.model.clone(),
            prompt,
            stream: false,
            options: OllamaOptions {
                temperature: self.temperature,
                top_p: self.top_p,
            },
        };

        let url = format!("{}/api/generate", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| AppError::request_failed(PROVIDER_NAME, e))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(AppError::upstream(
                PROVIDER_NAME,
                Some(status.as_u16()),
                truncate_text(&detail, 200),
            ));
        }

        let body: OllamaGenerateResponse = response
            .json()
            .await
            .map_err(|e| AppError::request_failed(PROVIDER_NAME, e))?;

        debug!("Ollama 响应完成: model={}, done={}", body.model, body.done);

        if body.response.trim().is_empty() {
            return Err(AppError::empty_response(PROVIDER_NAME));
        }

        let (raws, mode) = parse_response(&body.response, notes);
        if mode == ParseMode::Fallback {
            self.degraded_parses.fetch_add(1, Ordering::Relaxed);
            warn!("⚠️ Ollama 返回非 JSON 响应，已降级为行配对解析");
        }

        let ctx = validation_context_for(notes, Self::INITIAL_INTERVAL_DAYS);
        let mut questions = validate_all(raws, &ctx);
        questions.truncate(max_questions);

        info!("🤖 Ollama 生成 {} 道题", questions.len());
        Ok(questions)
    }

    /// 降级解析发生的次数
    pub fn degraded_parse_count(&self) -> u64 {
        self.degraded_parses.load(Ordering::Relaxed)
    }
}
