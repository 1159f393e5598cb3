use std::fmt;

/// 应用程序错误类型
#[derive(Debug)]
pub enum AppError {
    /// 提供商相关错误（单个提供商调用失败）
    Provider(ProviderError),
    /// 配置错误
    Config(ConfigError),
    /// 文件操作错误
    File(FileError),
    /// 所有配置的提供商都不可用或调用失败
    ///
    /// `attempts` 记录每个提供商的失败原因 (提供商名, 原因)
    NoProviderAvailable { attempts: Vec<(String, String)> },
    /// 其他错误（用于包装第三方库错误）
    Other(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Provider(e) => write!(f, "提供商错误: {}", e),
            AppError::Config(e) => write!(f, "配置错误: {}", e),
            AppError::File(e) => write!(f, "文件错误: {}", e),
            AppError::NoProviderAvailable { attempts } => {
                let detail = attempts
                    .iter()
                    .map(|(name, reason)| format!("{}: {}", name, reason))
                    .collect::<Vec<_>>()
                    .join("; ");
                write!(f, "没有可用的生成提供商 (尝试了 {} 个: {})", attempts.len(), detail)
            }
            AppError::Other(msg) => write!(f, "错误: {}", msg),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Provider(e) => Some(e),
            AppError::Config(e) => Some(e),
            AppError::File(e) => Some(e),
            AppError::NoProviderAvailable { .. } => None,
            AppError::Other(_) => None,
        }
    }
}

/// 提供商相关错误
#[derive(Debug)]
pub enum ProviderError {
    /// 可用性探测失败（网络不通、守护进程未启动）
    Unavailable {
        provider: String,
    },
    /// 缺少必需的凭据（如 API Key）
    MissingCredential {
        provider: String,
        key: String,
    },
    /// 远端返回非成功状态
    Upstream {
        provider: String,
        status: Option<u16>,
        detail: String,
    },
    /// 网络请求中途失败
    RequestFailed {
        provider: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 远端响应解码后没有可用文本
    EmptyResponse {
        provider: String,
    },
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderError::Unavailable { provider } => {
                write!(f, "提供商 {} 不可用", provider)
            }
            ProviderError::MissingCredential { provider, key } => {
                write!(f, "提供商 {} 缺少凭据: {}", provider, key)
            }
            ProviderError::Upstream {
                provider,
                status,
                detail,
            } => match status {
                Some(code) => write!(f, "提供商 {} 上游错误 (HTTP {}): {}", provider, code, detail),
                None => write!(f, "提供商 {} 上游错误: {}", provider, detail),
            },
            ProviderError::RequestFailed { provider, source } => {
                write!(f, "提供商 {} 请求失败: {}", provider, source)
            }
            ProviderError::EmptyResponse { provider } => {
                write!(f, "提供商 {} 返回内容为空", provider)
            }
        }
    }
}

impl std::error::Error for ProviderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ProviderError::RequestFailed { source, .. } => {
                Some(source.as_ref() as &(dyn std::error::Error + 'static))
            }
            _ => None,
        }
    }
}

/// 配置错误
#[derive(Debug)]
pub enum ConfigError {
    /// 优先级列表中出现未知的提供商名
    UnknownProvider {
        name: String,
    },
    /// 优先级列表为空
    EmptyPriority,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::UnknownProvider { name } => {
                write!(f, "未知的提供商名: {}", name)
            }
            ConfigError::EmptyPriority => {
                write!(f, "提供商优先级列表不能为空")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// 文件操作错误
#[derive(Debug)]
pub enum FileError {
    /// 文件夹不存在
    FolderNotFound {
        path: String,
    },
    /// 文件读取失败
    ReadFailed {
        path: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 文件写入失败
    WriteFailed {
        path: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// TOML 解析失败
    TomlParseFailed {
        path: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl fmt::Display for FileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileError::FolderNotFound { path } => {
                write!(f, "文件夹不存在: {}", path)
            }
            FileError::ReadFailed { path, source } => {
                write!(f, "读取文件失败 {}: {}", path, source)
            }
            FileError::WriteFailed { path, source } => {
                write!(f, "写入文件失败 {}: {}", path, source)
            }
            FileError::TomlParseFailed { path, source } => {
                write!(f, "解析TOML文件失败 {}: {}", path, source)
            }
        }
    }
}

impl std::error::Error for FileError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FileError::ReadFailed { source, .. }
            | FileError::WriteFailed { source, .. }
            | FileError::TomlParseFailed { source, .. } => {
                Some(source.as_ref() as &(dyn std::error::Error + 'static))
            }
            FileError::FolderNotFound { .. } => None,
        }
    }
}

// ========== 从常见错误类型转换 ==========
// 注意：不需要手动实现 From<AppError> for anyhow::Error，
// 因为 anyhow 已经为所有实现了 std::error::Error 的类型提供了自动实现

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::File(FileError::ReadFailed {
            path: String::new(), // IO错误通常不包含路径信息
            source: Box::new(err),
        })
    }
}

// ========== 便捷构造函数 ==========

impl AppError {
    /// 创建提供商不可用错误
    pub fn provider_unavailable(provider: impl Into<String>) -> Self {
        AppError::Provider(ProviderError::Unavailable {
            provider: provider.into(),
        })
    }

    /// 创建缺少凭据错误
    pub fn missing_credential(provider: impl Into<String>, key: impl Into<String>) -> Self {
        AppError::Provider(ProviderError::MissingCredential {
            provider: provider.into(),
            key: key.into(),
        })
    }

    /// 创建上游错误
    pub fn upstream(
        provider: impl Into<String>,
        status: Option<u16>,
        detail: impl Into<String>,
    ) -> Self {
        AppError::Provider(ProviderError::Upstream {
            provider: provider.into(),
            status,
            detail: detail.into(),
        })
    }

    /// 创建网络请求失败错误
    pub fn request_failed(
        provider: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::Provider(ProviderError::RequestFailed {
            provider: provider.into(),
            source: Box::new(source),
        })
    }

    /// 创建空响应错误
    pub fn empty_response(provider: impl Into<String>) -> Self {
        AppError::Provider(ProviderError::EmptyResponse {
            provider: provider.into(),
        })
    }

    /// 创建未知提供商错误
    pub fn unknown_provider(name: impl Into<String>) -> Self {
        AppError::Config(ConfigError::UnknownProvider { name: name.into() })
    }

    /// 创建文件夹不存在错误
    pub fn folder_not_found(path: impl Into<String>) -> Self {
        AppError::File(FileError::FolderNotFound { path: path.into() })
    }

    /// 创建文件读取错误
    pub fn file_read_failed(
        path: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::File(FileError::ReadFailed {
            path: path.into(),
            source: Box::new(source),
        })
    }

    /// 创建文件写入错误
    pub fn file_write_failed(
        path: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::File(FileError::WriteFailed {
            path: path.into(),
            source: Box::new(source),
        })
    }

    /// 创建TOML解析错误
    pub fn toml_parse_failed(
        path: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::File(FileError::TomlParseFailed {
            path: path.into(),
            source: Box::new(source),
        })
    }

    /// 判断是否属于"跳过当前提供商、尝试下一个"的错误
    ///
    /// 提供商层面的失败（不可用、缺凭据、上游错误）都不致命，
    /// 编排器会继续尝试优先级列表中的下一个提供商。
    pub fn is_provider_level(&self) -> bool {
        matches!(self, AppError::Provider(_))
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
