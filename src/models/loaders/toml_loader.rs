use crate::error::{AppError, AppResult};
use crate::models::note::NoteSet;
use std::path::{Path, PathBuf};
use tokio::fs;

/// 从 TOML 文件加载数据并转换为 NoteSet 对象
pub async fn load_note_set(toml_file_path: &Path) -> AppResult<NoteSet> {
    let content = fs::read_to_string(toml_file_path)
        .await
        .map_err(|e| AppError::file_read_failed(toml_file_path.display().to_string(), e))?;

    let set: NoteSet = toml::from_str(&content)
        .map_err(|e| AppError::toml_parse_failed(toml_file_path.display().to_string(), e))?;

    // 记录来源文件路径，并把集合级归属补写到笔记
    Ok(set
        .with_file_path(toml_file_path.to_string_lossy().to_string())
        .with_inherited_ownership())
}

/// 从文件夹中加载所有 TOML 文件并转换为 NoteSet 对象列表
///
/// 单个文件加载失败只告警并跳过，不中断整体加载。
pub async fn load_all_note_sets(folder_path: &str) -> AppResult<Vec<NoteSet>> {
    let folder = PathBuf::from(folder_path);

    if !folder.exists() {
        return Err(AppError::folder_not_found(folder_path));
    }

    let mut note_sets = Vec::new();
    let mut entries = fs::read_dir(&folder)
        .await
        .map_err(|e| AppError::file_read_failed(folder_path, e))?;

    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if path.extension().and_then(|s| s.to_str()) == Some("toml") {
            tracing::info!(
                "正在加载: {}",
                path.file_name().unwrap_or_default().to_string_lossy()
            );

            match load_note_set(&path).await {
                Ok(set) => {
                    tracing::info!("成功加载 {} 条笔记", set.notes.len());
                    note_sets.push(set);
                }
                Err(e) => {
                    tracing::warn!("加载文件失败 {}: {}", path.display(), e);
                }
            }
        }
    }

    Ok(note_sets)
}
