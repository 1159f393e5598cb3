//! Gemini 云端提供商
//!
//! 单次请求/响应的云端文本生成 API，需要 API Key。
//!
//! ## 调用约定
//! - `POST {endpoint}?key={api_key}`，body 为 contents/parts/text 结构
//! - 响应缺少 candidates 按零道题处理，不算错误
//! - 每次 generate 只发一个请求，不在提供商内部重试

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

const PROVIDER_NAME: &str = "gemini";

// ========== 请求/响应数据结构 ==========

#[derive(Debug, Serialize)]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct GeminiContent {
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct GeminiPart {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    #[serde(default)]
    content: GeminiContent,
}

// ========== 提供商实现 ==========

/// Gemini 提供商
///
/// 端点、凭据和超时在构造时固定，实例创建后不可变，
/// 多个并发的 generate 调用之间没有共享可变状态。
#[derive(Debug)]
pub struct GeminiProvider {
    client: reqwest::Client,
    api_key: String,
    endpoint: String,
    degraded_parses: AtomicU64,
}

impl GeminiProvider {
    /// 云端路径生成的题目立即到期
    ///
    /// 两条生成路径的初始间隔不同（本地路径为 1 天），
    /// 是否统一待产品确认，先按各自路径保留。
    pub const INITIAL_INTERVAL_DAYS: i64 = 0;

    /// 创建新的 Gemini 提供商
    pub fn new(config: &Config) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.gemini_timeout_secs))
            .build()
            .map_err(|e| AppError::Other(format!("构建 HTTP 客户端失败: {}", e)))?;

        Ok(Self {
            client,
            api_key: config.gemini_api_key.clone(),
            endpoint: config.gemini_endpoint.clone(),
            degraded_parses: AtomicU64::new(0),
        })
    }

    /// 探测端点是否可达
    ///
    /// 任何 HTTP 状态（包括 4xx）都说明端点可达，
    /// 只有传输层失败才算不可用。探测永远不报错。
    pub async fn check_availability(&self) -> bool {
        match self.client.get(&self.endpoint).send().await {
            Ok(resp) => {
                debug!("Gemini 端点可达 (HTTP {})", resp.status().as_u16());
                true
            }
            Err(e) => {
                debug!("Gemini 端点探测失败: {}", e);
                false
            }
        }
    }

    /// 根据笔记生成测验题
    ///
    /// # 参数
    /// - `notes`: 来源笔记，为空时直接返回空列表
    /// - `max_questions`: 出题数上限
    pub async fn generate(
        &self,
        notes: &[Note],
        max_questions: usize,
    ) -> AppResult<Vec<QuizQuestion>> {
        if notes.is_empty() {
            return Ok(Vec::new());
        }

        if self.api_key.is_empty() {
            return Err(AppError::missing_credential(PROVIDER_NAME, "GEMINI_API_KEY"));
        }

        if !self.check_availability().await {
            return Err(AppError::provider_unavailable(PROVIDER_NAME));
        }

        let prompt = build_generation_prompt(notes, max_questions);
        debug!("Gemini 提示词长度: {} 字符", prompt.chars().count());

        let request = GeminiRequest {
            contents: vec![GeminiContent {
                parts: vec![GeminiPart { text: prompt }],
            }],
        };

        let response = self
            .client
            .post(&self.endpoint)
            .query(&[("key", self.api_key.as_str())])
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

        let body: GeminiResponse = response
            .json()
            .await
            .map_err(|e| AppError::request_failed(PROVIDER_NAME, e))?;

        // candidates 缺失按零道题处理
        let raw_text = match body.candidates.first() {
            Some(candidate) => candidate
                .content
                .parts
                .iter()
                .map(|p| p.text.as_str())
                .collect::<Vec<_>>()
                .join(""),
            None => {
                info!("Gemini 未返回 candidates，视为零道题");
                return Ok(Vec::new());
            }
        };

        if raw_text.trim().is_empty() {
            return Err(AppError::empty_response(PROVIDER_NAME));
        }

        let (raws, mode) = parse_response(&raw_text, notes);
        if mode == ParseMode::Fallback {
            self.degraded_parses.fetch_add(1, Ordering::Relaxed);
            warn!("⚠️ Gemini 返回非 JSON 响应，已降级为行配对解析");
        }

        let ctx = validation_context_for(notes, Self::INITIAL_INTERVAL_DAYS);
        let mut questions = validate_all(raws, &ctx);
        questions.truncate(max_questions);

        info!("✓ Gemini 生成 {} 道题", questions.len());
        Ok(questions)
    }

    /// 降级解析发生的次数
    pub fn degraded_parse_count(&self) -> u64 {
        self.degraded_parses.load(Ordering::Relaxed)
    }
}
