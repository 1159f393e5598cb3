use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use chrono::Utc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use note_quiz_gen::models::{Note, QuestionResult};
use note_quiz_gen::providers::{GeminiProvider, OllamaProvider};
use note_quiz_gen::scheduler::record_outcome;
use note_quiz_gen::services::{parse_response, validate_all, ParseMode, ValidationContext};
use note_quiz_gen::utils::logging;
use note_quiz_gen::{AppError, Config, ProviderKind, QuizGenerator};

fn sample_notes() -> Vec<Note> {
    vec![
        Note {
            id: "n-1".to_string(),
            folder_id: "f-1".to_string(),
            user_id: "u-1".to_string(),
            title: "细胞的结构".to_string(),
            content: "细胞是生物体结构和功能的基本单位。细胞膜主要由磷脂和蛋白质构成。"
                .to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        },
        Note {
            id: "n-2".to_string(),
            folder_id: "f-1".to_string(),
            user_id: "u-1".to_string(),
            title: "细胞器".to_string(),
            content: "核糖体负责蛋白质合成，线粒体负责能量代谢。".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        },
    ]
}

/// 两个提供商都指向不可达端点的配置
fn unroutable_config() -> Config {
    Config {
        provider_priority: "gemini,ollama".to_string(),
        gemini_api_key: "test-key".to_string(),
        gemini_endpoint: "http://127.0.0.1:9/v1beta/models/gemini-1.5-flash:generateContent"
            .to_string(),
        ollama_base_url: "http://127.0.0.1:9".to_string(),
        ..Config::default()
    }
}

/// 读完一个 HTTP 请求（头加正文），返回请求头部分
async fn read_request_head(stream: &mut TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    loop {
        let n = stream.read(&mut chunk).await.expect("读取请求失败");
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            let head = String::from_utf8_lossy(&buf[..pos]).to_string();
            let body_len = head
                .lines()
                .find_map(|line| {
                    line.to_ascii_lowercase()
                        .strip_prefix("content-length:")
                        .and_then(|v| v.trim().parse::<usize>().ok())
                })
                .unwrap_or(0);
            let mut missing = body_len.saturating_sub(buf.len() - pos - 4);
            while missing > 0 {
                let n = stream.read(&mut chunk).await.expect("读取请求体失败");
                if n == 0 {
                    break;
                }
                missing = missing.saturating_sub(n);
            }
            return head;
        }
    }
    String::from_utf8_lossy(&buf).to_string()
}

/// 在回环地址起一个假 Ollama 服务：探测返回模型列表，
/// 出题请求返回固定的模型回复。返回服务的 base_url。
async fn spawn_fake_ollama(reply: String) -> String {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("绑定本地端口失败");
    let addr = listener.local_addr().expect("获取本地地址失败");

    tokio::spawn(async move {
        while let Ok((mut stream, _)) = listener.accept().await {
            let reply = reply.clone();
            tokio::spawn(async move {
                let head = read_request_head(&mut stream).await;
                let body = if head.starts_with("GET /api/tags") {
                    r#"{"models":[{"name":"llama3.1"}]}"#.to_string()
                } else {
                    serde_json::json!({
                        "model": "llama3.1",
                        "response": reply,
                        "done": true,
                    })
                    .to_string()
                };
                let response = format!(
                    "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    body.len(),
                    body
                );
                let _ = stream.write_all(response.as_bytes()).await;
                let _ = stream.shutdown().await;
            });
        }
    });

    format!("http://{}", addr)
}

/// 在回环地址起一个只数连接次数、不应答的端口
async fn spawn_connection_counter() -> (String, Arc<AtomicUsize>) {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("绑定本地端口失败");
    let addr = listener.local_addr().expect("获取本地地址失败");
    let hits = Arc::new(AtomicUsize::new(0));

    let hits_in_task = Arc::clone(&hits);
    tokio::spawn(async move {
        while let Ok((stream, _)) = listener.accept().await {
            hits_in_task.fetch_add(1, Ordering::SeqCst);
            drop(stream);
        }
    });

    (format!("http://{}", addr), hits)
}

#[tokio::test]
async fn test_offline_pipeline_parse_validate_schedule() {
    // 模拟一段带前后噪声的模型输出
    let raw_text = r#"好的，以下是根据笔记生成的题目：
[
  {"question": "细胞膜的主要成分是什么？", "answer": "磷脂和蛋白质", "type": "shortAnswer", "note_id": "n-1"},
  {"question": "细胞是生物体结构和功能的基本单位。", "answer": "正确", "type": "trueFalse", "note_id": "n-1"},
  {"question": "下列哪个结构负责蛋白质合成？", "answer": "核糖体", "type": "multipleChoice", "options": ["核糖体", "线粒体", "高尔基体"], "note_id": "n-2"}
]
希望这些题目对你有帮助。"#;

    let notes = sample_notes();

    // 解析
    let (raws, mode) = parse_response(raw_text, &notes);
    assert_eq!(mode, ParseMode::Strict, "应该走严格解析路径");
    assert_eq!(raws.len(), 3);

    // 校验
    let ctx = ValidationContext::new("f-1", "u-1", "n-1", 0);
    let questions = validate_all(raws, &ctx);
    assert_eq!(questions.len(), 3, "校验不丢题");

    for q in &questions {
        assert_eq!(q.ease_factor, 2.5);
        assert_eq!(q.interval, 0);
        assert!(q.last_reviewed.is_none());
        assert!(q.is_due(Utc::now()), "新题应该立即到期");
    }

    // 作答后更新调度
    let mut first = questions[0].clone();
    let result = QuestionResult {
        question_id: first.id.clone(),
        correct: true,
        user_answer: "磷脂和蛋白质".to_string(),
        response_time_secs: 4.0,
        confidence: 0.9,
        difficulty: 0.5,
    };

    record_outcome(&mut first, &result);

    assert_eq!(first.interval, 1, "首次答对至少推进一天");
    assert!(first.ease_factor > 2.5, "自信快速答对应该提升简易度");
    assert!(first.last_reviewed.is_some());
    assert!(!first.is_due(Utc::now()), "更新后不再立即到期");
}

#[tokio::test]
async fn test_all_providers_failed_reports_each_attempt() {
    let generator = QuizGenerator::new(&unroutable_config()).expect("创建编排器失败");

    let err = generator
        .generate_quiz(&sample_notes())
        .await
        .expect_err("不可达端点应该报错");

    match err {
        AppError::NoProviderAvailable { attempts } => {
            assert_eq!(attempts.len(), 2, "每个提供商都应该被尝试一次");
            assert_eq!(attempts[0].0, "gemini");
            assert_eq!(attempts[1].0, "ollama");
        }
        other => panic!("预期 NoProviderAvailable，实际: {}", other),
    }
}

#[tokio::test]
async fn test_preferred_provider_is_tried_first() {
    let generator = QuizGenerator::new(&unroutable_config()).expect("创建编排器失败");

    let err = generator
        .generate_quiz_with(&sample_notes(), Some(ProviderKind::Ollama))
        .await
        .expect_err("不可达端点应该报错");

    match err {
        AppError::NoProviderAvailable { attempts } => {
            assert_eq!(attempts[0].0, "ollama", "首选提供商应该排在最前");
            assert_eq!(attempts[1].0, "gemini");
        }
        other => panic!("预期 NoProviderAvailable，实际: {}", other),
    }
}

#[tokio::test]
async fn test_empty_notes_returns_empty_quiz() {
    let generator = QuizGenerator::new(&unroutable_config()).expect("创建编排器失败");

    // 空输入不触发任何网络请求
    let questions = generator.generate_quiz(&[]).await.expect("空输入不应报错");
    assert!(questions.is_empty());
}

#[tokio::test]
async fn test_missing_gemini_key_fails_without_network() {
    // 默认配置凭据为空，只配置 gemini 一个提供商
    let config = Config {
        provider_priority: "gemini".to_string(),
        ..Config::default()
    };
    let generator = QuizGenerator::new(&config).expect("创建编排器失败");

    let err = generator
        .generate_quiz(&sample_notes())
        .await
        .expect_err("缺少凭据应该报错");

    match err {
        AppError::NoProviderAvailable { attempts } => {
            assert_eq!(attempts.len(), 1);
            assert!(
                attempts[0].1.contains("GEMINI_API_KEY"),
                "失败原因应该指明缺失的环境变量: {}",
                attempts[0].1
            );
        }
        other => panic!("预期 NoProviderAvailable，实际: {}", other),
    }
}

#[tokio::test]
async fn test_first_success_skips_remaining_providers() {
    // 假 Ollama 返回一段标准 JSON 数组回复
    let reply = r#"[{"question": "细胞膜的主要成分是什么？", "answer": "磷脂和蛋白质", "type": "shortAnswer"}]"#;
    let ollama_url = spawn_fake_ollama(reply.to_string()).await;
    // 排在后面的提供商只统计有没有被访问过
    let (gemini_url, gemini_hits) = spawn_connection_counter().await;

    let config = Config {
        provider_priority: "ollama,gemini".to_string(),
        ollama_base_url: ollama_url,
        gemini_api_key: "test-key".to_string(),
        gemini_endpoint: format!(
            "{}/v1beta/models/gemini-1.5-flash:generateContent",
            gemini_url
        ),
        ..Config::default()
    };
    let generator = QuizGenerator::new(&config).expect("创建编排器失败");

    let questions = generator
        .generate_quiz(&sample_notes())
        .await
        .expect("第一个提供商成功时不应报错");

    assert_eq!(questions.len(), 1);
    assert_eq!(questions[0].question, "细胞膜的主要成分是什么？");
    assert_eq!(questions[0].folder_id, "f-1");
    assert_eq!(questions[0].user_id, "u-1");
    assert_eq!(questions[0].note_id, "n-1", "缺省 note_id 取第一条来源笔记");
    assert_eq!(questions[0].ease_factor, 2.5);
    assert_eq!(questions[0].interval, 1, "本地路径生成的题目次日到期");
    assert_eq!(generator.degraded_parse_count(), 0, "标准回复应走严格解析");
    // 第一个提供商成功后，排在后面的提供商一次都不会被访问
    assert_eq!(gemini_hits.load(Ordering::SeqCst), 0);
}

#[tokio::test]
#[ignore] // 默认忽略，需要手动运行：cargo test -- --ignored
async fn test_live_ollama_generate() {
    // 初始化日志
    logging::init();

    // 加载配置
    let config = Config::from_env();

    let provider = OllamaProvider::new(&config).expect("创建 Ollama 提供商失败");

    let questions = provider
        .generate(&sample_notes(), 5)
        .await
        .expect("Ollama 生成失败");

    assert!(!questions.is_empty(), "应该至少生成一道题");
    println!("Ollama 生成 {} 道题", questions.len());
    println!("第一题: {}", questions[0].question);
}

#[tokio::test]
#[ignore]
async fn test_live_gemini_generate() {
    // 初始化日志
    logging::init();

    // 加载配置（需要设置 GEMINI_API_KEY）
    let config = Config::from_env();

    let provider = GeminiProvider::new(&config).expect("创建 Gemini 提供商失败");

    let questions = provider
        .generate(&sample_notes(), 5)
        .await
        .expect("Gemini 生成失败");

    assert!(!questions.is_empty(), "应该至少生成一道题");
    println!("Gemini 生成 {} 道题", questions.len());
}

#[tokio::test]
#[ignore]
async fn test_load_note_sets_from_folder() {
    // 初始化日志
    logging::init();

    // 加载配置
    let config = Config::from_env();

    // 测试加载所有 TOML 笔记集
    let result = note_quiz_gen::models::load_all_note_sets(&config.notes_folder).await;

    assert!(result.is_ok(), "应该能够加载 TOML 笔记集");

    let sets = result.unwrap();
    println!("找到 {} 个笔记集", sets.len());
}
