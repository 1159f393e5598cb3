/// 程序配置文件
#[derive(Clone, Debug)]
pub struct Config {
    /// 提供商优先级列表（逗号分隔，按顺序尝试）
    pub provider_priority: String,
    /// 每套笔记最多生成的题目数
    pub max_questions: usize,
    /// 单次请求最多携带的笔记数
    pub max_notes_per_request: usize,
    /// 单条笔记正文的最大字符数（超出截断）
    pub max_note_chars: usize,
    /// 同时处理的笔记集数量
    pub max_concurrent_sets: usize,
    /// 笔记集 TOML 文件存放目录
    pub notes_folder: String,
    /// 生成结果输出目录
    pub output_folder: String,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    /// 输出日志文件
    pub output_log_file: String,
    // --- Gemini 配置 ---
    pub gemini_api_key: String,
    pub gemini_endpoint: String,
    pub gemini_timeout_secs: u64,
    // --- Ollama 配置 ---
    pub ollama_base_url: String,
    pub ollama_model: String,
    pub ollama_temperature: f32,
    pub ollama_top_p: f32,
    pub ollama_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            provider_priority: "gemini,ollama".to_string(),
            max_questions: 10,
            max_notes_per_request: 20,
            max_note_chars: 4000,
            max_concurrent_sets: 3,
            notes_folder: "notes_toml".to_string(),
            output_folder: "output_quiz".to_string(),
            verbose_logging: false,
            output_log_file: "quiz_gen.log".to_string(),
            // 凭据没有默认值，必须通过环境变量提供
            gemini_api_key: String::new(),
            gemini_endpoint: "https://generativelanguage.googleapis.com/v1beta/models/gemini-1.5-flash:generateContent".to_string(),
            gemini_timeout_secs: 30,
            ollama_base_url: "http://localhost:11434".to_string(),
            ollama_model: "llama3.1".to_string(),
            ollama_temperature: 0.7,
            ollama_top_p: 0.9,
            ollama_timeout_secs: 60,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            provider_priority: std::env::var("PROVIDER_PRIORITY").unwrap_or(default.provider_priority),
            max_questions: std::env::var("MAX_QUESTIONS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.max_questions),
            max_notes_per_request: std::env::var("MAX_NOTES_PER_REQUEST").ok().and_then(|v| v.parse().ok()).unwrap_or(default.max_notes_per_request),
            max_note_chars: std::env::var("MAX_NOTE_CHARS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.max_note_chars),
            max_concurrent_sets: std::env::var("MAX_CONCURRENT_SETS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.max_concurrent_sets),
            notes_folder: std::env::var("NOTES_FOLDER").unwrap_or(default.notes_folder),
            output_folder: std::env::var("OUTPUT_FOLDER").unwrap_or(default.output_folder),
            verbose_logging: std::env::var("VERBOSE_LOGGING").ok().and_then(|v| v.parse().ok()).unwrap_or(default.verbose_logging),
            output_log_file: std::env::var("OUTPUT_LOG_FILE").unwrap_or(default.output_log_file),
            gemini_api_key: std::env::var("GEMINI_API_KEY").unwrap_or(default.gemini_api_key),
            gemini_endpoint: std::env::var("GEMINI_ENDPOINT").unwrap_or(default.gemini_endpoint),
            gemini_timeout_secs: std::env::var("GEMINI_TIMEOUT_SECS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.gemini_timeout_secs),
            ollama_base_url: std::env::var("OLLAMA_BASE_URL").unwrap_or(default.ollama_base_url),
            ollama_model: std::env::var("OLLAMA_MODEL").unwrap_or(default.ollama_model),
            ollama_temperature: std::env::var("OLLAMA_TEMPERATURE").ok().and_then(|v| v.parse().ok()).unwrap_or(default.ollama_temperature),
            ollama_top_p: std::env::var("OLLAMA_TOP_P").ok().and_then(|v| v.parse().ok()).unwrap_or(default.ollama_top_p),
            ollama_timeout_secs: std::env::var("OLLAMA_TIMEOUT_SECS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.ollama_timeout_secs),
        }
    }
}
