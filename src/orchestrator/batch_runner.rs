//! 批量出题处理器 - 编排层
//!
//! ## 职责
//!
//! 本模块是整个应用的入口，负责批量笔记集的处理和资源管理。
//!
//! ## 核心功能
//!
//! 1. **应用初始化**：启动日志、构建出题编排器
//! 2. **批量加载**：扫描并加载所有待处理的笔记集（`Vec<NoteSet>`）
//! 3. **并发控制**：使用 Semaphore 限制并发数量
//! 4. **分批处理**：将笔记集分批次处理，每批完成后再开始下一批
//! 5. **结果落盘**：每套生成的题目写成一个 JSON 文件
//! 6. **全局统计**：汇总所有笔记集的处理结果和降级解析次数
//!
//! ## 设计特点
//!
//! - **顶层编排**：不处理单套笔记的细节
//! - **资源共享**：`QuizGenerator` 不可变，用 Arc 在任务间共享
//! - **并发安全**：通过 Semaphore 和 tokio::spawn 实现并发
//! - **库外持久化**：写文件只发生在这一层，核心库不落盘

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::models::note::NoteSet;
use crate::models::question::QuizQuestion;
use crate::orchestrator::generator::QuizGenerator;
use crate::utils::logging;

/// 应用主结构
pub struct App {
    config: Config,
    generator: Arc<QuizGenerator>,
}

impl App {
    /// 初始化应用
    pub async fn initialize(config: Config) -> Result<Self> {
        // 初始化日志文件
        logging::init_log_file(&config.output_log_file)?;

        logging::log_startup(config.max_concurrent_sets, &config.provider_priority);

        // 构建出题编排器
        let generator = Arc::new(QuizGenerator::new(&config)?);

        Ok(Self { config, generator })
    }

    /// 运行应用主逻辑
    pub async fn run(&self) -> Result<()> {
        // 加载所有待处理的笔记集
        let all_sets = self.load_note_sets().await?;

        if all_sets.is_empty() {
            warn!("⚠️ 没有找到待处理的TOML文件，程序结束");
            return Ok(());
        }

        // 准备输出目录
        tokio::fs::create_dir_all(&self.config.output_folder)
            .await
            .with_context(|| format!("无法创建输出目录: {}", self.config.output_folder))?;

        let total_sets = all_sets.len();
        logging::log_sets_loaded(total_sets, self.config.max_concurrent_sets);

        // 处理所有笔记集
        let stats = self.process_all_sets(all_sets).await?;

        // 输出最终统计
        logging::print_final_stats(
            stats.success,
            stats.failed,
            stats.total,
            &self.config.output_log_file,
        );

        let degraded = self.generator.degraded_parse_count();
        if degraded > 0 {
            warn!("⚠️ 共发生 {} 次降级解析，建议检查提供商输出质量", degraded);
        }

        Ok(())
    }

    /// 加载笔记集
    async fn load_note_sets(&self) -> Result<Vec<NoteSet>> {
        info!("\n📁 正在扫描待处理的笔记集...");
        Ok(crate::models::load_all_note_sets(&self.config.notes_folder).await?)
    }

    /// 处理所有笔记集
    async fn process_all_sets(&self, all_sets: Vec<NoteSet>) -> Result<ProcessingStats> {
        let semaphore = Arc::new(Semaphore::new(self.config.max_concurrent_sets));
        let total_sets = all_sets.len();
        let mut stats = ProcessingStats {
            total: total_sets,
            ..Default::default()
        };

        // 分批处理
        for batch_start in (0..total_sets).step_by(self.config.max_concurrent_sets) {
            let batch_end = (batch_start + self.config.max_concurrent_sets).min(total_sets);
            let batch_sets = &all_sets[batch_start..batch_end];
            let batch_num = (batch_start / self.config.max_concurrent_sets) + 1;
            let total_batches = (total_sets + self.config.max_concurrent_sets - 1)
                / self.config.max_concurrent_sets;

            logging::log_batch_start(
                batch_num,
                total_batches,
                batch_start + 1,
                batch_end,
                total_sets,
            );

            // 处理本批
            let batch_result = self
                .process_batch(batch_sets, batch_start, semaphore.clone())
                .await?;

            stats.success += batch_result.success;
            stats.failed += batch_result.failed;

            logging::log_batch_complete(
                batch_num,
                batch_result.success,
                batch_result.success + batch_result.failed,
            );
        }

        Ok(stats)
    }

    /// 处理单个批次
    async fn process_batch(
        &self,
        batch_sets: &[NoteSet],
        batch_start: usize,
        semaphore: Arc<Semaphore>,
    ) -> Result<BatchResult> {
        let mut batch_handles = Vec::new();

        // 为本批创建并发任务
        for (idx, note_set) in batch_sets.iter().enumerate() {
            let set_index = batch_start + idx + 1;
            let permit = semaphore.clone().acquire_owned().await?;

            // QuizGenerator 不可变，clone Arc 即可安全共享
            let generator = Arc::clone(&self.generator);
            let note_set_clone = note_set.clone();
            let config_clone = self.config.clone();

            let handle = tokio::spawn(async move {
                let _permit = permit;
                match process_note_set(&generator, &note_set_clone, set_index, &config_clone).await
                {
                    Ok(produced) => Ok(produced),
                    Err(e) => {
                        error!("[笔记集 {}] ❌ 处理过程中发生错误: {}", set_index, e);
                        Err(e)
                    }
                }
            });
            batch_handles.push((set_index, handle));
        }

        // 等待本批所有任务完成
        let mut result = BatchResult::default();

        for (set_index, handle) in batch_handles {
            match handle.await {
                Ok(Ok(true)) => {
                    result.success += 1;
                }
                Ok(Ok(false)) | Ok(Err(_)) => {
                    result.failed += 1;
                }
                Err(e) => {
                    error!("[笔记集 {}] 任务执行失败: {}", set_index, e);
                    result.failed += 1;
                }
            }
        }

        Ok(result)
    }
}

/// 处理统计
#[derive(Debug, Default)]
struct ProcessingStats {
    success: usize,
    failed: usize,
    total: usize,
}

/// 批次处理结果
#[derive(Debug, Default)]
struct BatchResult {
    success: usize,
    failed: usize,
}

/// 处理单套笔记：生成题目并写出 JSON
///
/// # 返回
/// `Ok(true)` 表示成功写出；`Ok(false)` 表示跳过（空输入或空结果）
async fn process_note_set(
    generator: &QuizGenerator,
    note_set: &NoteSet,
    set_index: usize,
    config: &Config,
) -> Result<bool> {
    info!(
        "[笔记集 {}] 📄 开始处理: {} ({} 条笔记)",
        set_index,
        note_set.name,
        note_set.notes.len()
    );

    if note_set.notes.is_empty() {
        warn!("[笔记集 {}] ⚠️ 笔记为空，跳过", set_index);
        return Ok(false);
    }

    let questions = generator.generate_quiz(&note_set.notes).await?;

    if questions.is_empty() {
        warn!("[笔记集 {}] ⚠️ 生成结果为空，不写出文件", set_index);
        return Ok(false);
    }

    // 详细日志（如果启用）
    if config.verbose_logging {
        log_generated_questions(set_index, &questions);
    }

    let output_path = output_path_for(note_set, set_index, &config.output_folder);
    write_quiz_file(&output_path, &questions).await?;

    info!(
        "[笔记集 {}] ✅ 生成 {} 道题，已写入 {}",
        set_index,
        questions.len(),
        output_path.display()
    );

    Ok(true)
}

/// 输出文件路径：沿用来源文件名，丢失时退回序号命名
fn output_path_for(note_set: &NoteSet, set_index: usize, output_folder: &str) -> PathBuf {
    let stem = note_set
        .file_path
        .as_deref()
        .and_then(|p| Path::new(p).file_stem())
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| format!("note_set_{}", set_index));

    PathBuf::from(output_folder).join(format!("{}_quiz.json", stem))
}

/// 把题目列表写成 JSON 文件
async fn write_quiz_file(path: &Path, questions: &[QuizQuestion]) -> Result<()> {
    let json = serde_json::to_string_pretty(questions)?;
    tokio::fs::write(path, json)
        .await
        .with_context(|| format!("无法写入输出文件: {}", path.display()))?;
    Ok(())
}

// ========== 日志辅助函数 ==========

/// 逐题输出生成结果（verbose 模式）
fn log_generated_questions(set_index: usize, questions: &[QuizQuestion]) {
    for (i, q) in questions.iter().enumerate() {
        info!(
            "[笔记集 {}]   {}. [{}] {}",
            set_index,
            i + 1,
            q.question_type,
            logging::truncate_text(&q.question, 40)
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set_with_path(file_path: Option<&str>) -> NoteSet {
        NoteSet {
            name: "测试".to_string(),
            folder_id: "f-1".to_string(),
            user_id: "u-1".to_string(),
            notes: vec![],
            file_path: file_path.map(|s| s.to_string()),
        }
    }

    #[test]
    fn test_output_path_uses_source_stem() {
        let set = set_with_path(Some("notes_toml/生物第一章.toml"));
        let path = output_path_for(&set, 3, "output_quiz");
        assert_eq!(path, PathBuf::from("output_quiz/生物第一章_quiz.json"));
    }

    #[test]
    fn test_output_path_falls_back_to_index() {
        let set = set_with_path(None);
        let path = output_path_for(&set, 7, "output_quiz");
        assert_eq!(path, PathBuf::from("output_quiz/note_set_7_quiz.json"));
    }

    #[tokio::test]
    async fn test_empty_note_set_is_skipped() {
        let generator = QuizGenerator::new(&Config::default()).unwrap();
        let produced = process_note_set(&generator, &set_with_path(None), 1, &Config::default())
            .await
            .unwrap();
        assert!(!produced);
    }
}
