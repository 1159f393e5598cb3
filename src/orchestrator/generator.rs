//! 出题编排器 - 编排层
//!
//! ## 职责
//!
//! 本模块把多个生成提供商组织成一条按优先级排列的调用链：
//!
//! 1. **请求整形**：限制单次请求的笔记数量和单条笔记长度
//! 2. **优先级轮询**：按配置顺序逐个尝试，第一个成功即返回
//! 3. **错误归并**：单个提供商的失败只记录不上抛，
//!    全部失败才以 `NoProviderAvailable` 报给调用方
//!
//! 一次调用只采用一个提供商的结果，绝不跨提供商聚合
//! （避免重复或互相矛盾的题目混在一套里）。

use tracing::{error, info, warn};

use crate::config::Config;
use crate::error::{AppError, AppResult, ConfigError};
use crate::models::note::Note;
use crate::models::question::QuizQuestion;
use crate::providers::{GeminiProvider, OllamaProvider, Provider, ProviderKind};

/// 出题编排器
///
/// 提供商列表和整形参数在构造时固定，实例创建后不可变，
/// 可以安全地被多个并发任务共享。
#[derive(Debug)]
pub struct QuizGenerator {
    providers: Vec<Provider>,
    max_questions: usize,
    max_notes_per_request: usize,
    max_note_chars: usize,
}

impl QuizGenerator {
    /// 根据配置创建编排器
    ///
    /// 优先级列表里出现未知提供商名会直接报配置错误，
    /// 重复的名字只保留第一次出现的位置。
    pub fn new(config: &Config) -> AppResult<Self> {
        let mut kinds: Vec<ProviderKind> = Vec::new();
        for name in config.provider_priority.split(',') {
            let name = name.trim();
            if name.is_empty() {
                continue;
            }
            let kind =
                ProviderKind::from_str(name).ok_or_else(|| AppError::unknown_provider(name))?;
            if !kinds.contains(&kind) {
                kinds.push(kind);
            }
        }

        if kinds.is_empty() {
            return Err(AppError::Config(ConfigError::EmptyPriority));
        }

        let mut providers = Vec::new();
        for kind in &kinds {
            providers.push(match kind {
                ProviderKind::Gemini => Provider::Gemini(GeminiProvider::new(config)?),
                ProviderKind::Ollama => Provider::Ollama(OllamaProvider::new(config)?),
            });
        }

        Ok(Self {
            providers,
            max_questions: config.max_questions,
            max_notes_per_request: config.max_notes_per_request,
            max_note_chars: config.max_note_chars,
        })
    }

    /// 配置的提供商顺序
    pub fn provider_kinds(&self) -> Vec<ProviderKind> {
        self.providers.iter().map(|p| p.kind()).collect()
    }

    /// 根据笔记生成一套测验题
    ///
    /// 按配置的优先级顺序尝试提供商。
    pub async fn generate_quiz(&self, notes: &[Note]) -> AppResult<Vec<QuizQuestion>> {
        self.generate_quiz_with(notes, None).await
    }

    /// 根据笔记生成一套测验题，可指定首选提供商
    ///
    /// # 参数
    /// - `notes`: 来源笔记，为空时直接返回空列表
    /// - `preferred`: 首选提供商，排到调用链最前，其余保持配置顺序
    ///
    /// # 返回
    /// 第一个成功的提供商的题目列表；全部失败时返回
    /// `NoProviderAvailable`，附带每个提供商的失败原因。
    pub async fn generate_quiz_with(
        &self,
        notes: &[Note],
        preferred: Option<ProviderKind>,
    ) -> AppResult<Vec<QuizQuestion>> {
        if notes.is_empty() {
            info!("输入笔记为空，直接返回空题目列表");
            return Ok(Vec::new());
        }

        let shaped = self.shape_notes(notes);
        if shaped.len() < notes.len() {
            info!(
                "📋 请求整形: {} 条笔记截取前 {} 条",
                notes.len(),
                shaped.len()
            );
        }

        let mut order: Vec<&Provider> = self.providers.iter().collect();
        if let Some(kind) = preferred {
            // 稳定排序，未命中的提供商保持配置顺序
            order.sort_by_key(|p| if p.kind() == kind { 0 } else { 1 });
        }

        let mut attempts: Vec<(String, String)> = Vec::new();
        for provider in order {
            let kind = provider.kind();
            info!("🔍 尝试提供商: {}", kind);

            match provider.generate(&shaped, self.max_questions).await {
                Ok(questions) => {
                    info!("✅ {} 成功生成 {} 道题", kind, questions.len());
                    return Ok(questions);
                }
                Err(e) => {
                    warn!("⚠️ {} 失败，尝试下一个提供商: {}", kind, e);
                    attempts.push((kind.as_str().to_string(), e.to_string()));
                }
            }
        }

        error!("❌ 所有提供商都失败，共尝试 {} 个", attempts.len());
        Err(AppError::NoProviderAvailable { attempts })
    }

    /// 所有提供商累计的降级解析次数
    pub fn degraded_parse_count(&self) -> u64 {
        self.providers.iter().map(|p| p.degraded_parse_count()).sum()
    }

    /// 请求整形：截取笔记数量并截断超长正文
    fn shape_notes(&self, notes: &[Note]) -> Vec<Note> {
        notes
            .iter()
            .take(self.max_notes_per_request)
            .map(|n| {
                let mut note = n.clone();
                if note.content.chars().count() > self.max_note_chars {
                    note.content = note.content.chars().take(self.max_note_chars).collect();
                }
                note
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with_priority(priority: &str) -> Config {
        Config {
            provider_priority: priority.to_string(),
            ..Config::default()
        }
    }

    #[test]
    fn test_new_respects_priority_order() {
        let generator = QuizGenerator::new(&config_with_priority("ollama,gemini")).unwrap();
        assert_eq!(
            generator.provider_kinds(),
            vec![ProviderKind::Ollama, ProviderKind::Gemini]
        );
    }

    #[test]
    fn test_new_deduplicates_priority() {
        let generator = QuizGenerator::new(&config_with_priority("gemini, gemini ,ollama")).unwrap();
        assert_eq!(
            generator.provider_kinds(),
            vec![ProviderKind::Gemini, ProviderKind::Ollama]
        );
    }

    #[test]
    fn test_new_rejects_unknown_provider() {
        let err = QuizGenerator::new(&config_with_priority("gemini,gpt4")).unwrap_err();
        assert!(err.to_string().contains("未知的提供商名"));
    }

    #[test]
    fn test_new_rejects_empty_priority() {
        let err = QuizGenerator::new(&config_with_priority(" , ,")).unwrap_err();
        assert!(err.to_string().contains("优先级列表不能为空"));
    }

    #[tokio::test]
    async fn test_empty_notes_short_circuits() {
        // 提供商一个都不会被调用，也就不需要网络
        let generator = QuizGenerator::new(&Config::default()).unwrap();
        let questions = generator.generate_quiz(&[]).await.unwrap();
        assert!(questions.is_empty());
        assert_eq!(generator.degraded_parse_count(), 0);
    }

    #[test]
    fn test_shape_notes_truncates() {
        let config = Config {
            max_notes_per_request: 2,
            max_note_chars: 5,
            ..Config::default()
        };
        let generator = QuizGenerator::new(&config).unwrap();

        let make_note = |id: &str, content: &str| Note {
            id: id.to_string(),
            folder_id: String::new(),
            user_id: String::new(),
            title: "t".to_string(),
            content: content.to_string(),
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        };

        let notes = vec![
            make_note("n-1", "细胞是生命活动的基本单位"),
            make_note("n-2", "short"),
            make_note("n-3", "dropped"),
        ];

        let shaped = generator.shape_notes(&notes);
        assert_eq!(shaped.len(), 2);
        assert_eq!(shaped[0].content.chars().count(), 5);
        assert_eq!(shaped[1].content, "short");
    }
}
