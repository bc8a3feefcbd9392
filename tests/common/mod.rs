// tests/common/mod.rs

#![allow(dead_code)]

use std::sync::Arc;

use lopdf::{Document, Object, Stream, dictionary};
use quizify::{
    clients::{
        ai::QuizGenerator,
        mock::ScriptedGenerator,
        storage::{LocalObjectStore, ObjectStore},
        store::MemoryQuizStore,
    },
    config::{Config, UploadLimits},
    models::{question::Question, quiz::Quiz},
    routes,
    state::AppState,
    utils::jwt::sign_jwt,
};
use serde_json::json;
use tempfile::TempDir;

pub const JWT_SECRET: &str = "test_secret_for_integration_tests";

pub struct TestApp {
    pub address: String,
    pub store: Arc<MemoryQuizStore>,
    pub generator: Arc<ScriptedGenerator>,
    pub config: Config,
    pub client: reqwest::Client,
    // Keeps the storage directory alive for the test's duration.
    _storage_dir: TempDir,
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }

    pub fn token(&self, user_id: &str) -> String {
        sign_jwt(user_id, JWT_SECRET, 600).expect("Failed to sign token")
    }

    pub fn bearer(&self, user_id: &str) -> String {
        format!("Bearer {}", self.token(user_id))
    }

    /// Posts a create-quiz form.
    pub async fn upload(
        &self,
        user_id: &str,
        bytes: Vec<u8>,
        mime: &str,
        question_count: &str,
    ) -> reqwest::Response {
        let part = reqwest::multipart::Part::bytes(bytes)
            .file_name("lecture-notes.pdf")
            .mime_str(mime)
            .expect("valid mime");
        let form = reqwest::multipart::Form::new()
            .text("questionCount", question_count.to_string())
            .part("pdfFile", part);

        self.client
            .post(self.url("/api/quizzes"))
            .header("Authorization", self.bearer(user_id))
            .multipart(form)
            .send()
            .await
            .expect("Failed to execute request")
    }
}

pub fn test_config(storage_dir: &str, upload: UploadLimits) -> Config {
    Config {
        database_url: "postgres://unused".to_string(),
        jwt_secret: JWT_SECRET.to_string(),
        rust_log: "error".to_string(),
        bind_addr: "127.0.0.1:0".to_string(),
        gemini_api_key: "unused".to_string(),
        gemini_model: "test-model".to_string(),
        ai_timeout_secs: 5,
        storage_dir: storage_dir.to_string(),
        public_base_url: "http://127.0.0.1".to_string(),
        upload,
    }
}

/// Spawns the app on a random port with in-memory collaborators.
pub async fn spawn_app(generator: ScriptedGenerator) -> TestApp {
    spawn_app_with(generator, UploadLimits::default(), None).await
}

pub async fn spawn_app_with(
    generator: ScriptedGenerator,
    upload: UploadLimits,
    storage: Option<Arc<dyn ObjectStore>>,
) -> TestApp {
    let storage_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let storage_path = storage_dir.path().to_string_lossy().to_string();

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    let mut config = test_config(&storage_path, upload);
    config.public_base_url = address.clone();

    let storage = match storage {
        Some(storage) => storage,
        None => Arc::new(
            LocalObjectStore::new(&storage_path, &address).expect("valid base url"),
        ),
    };

    let store = Arc::new(MemoryQuizStore::new());
    let generator = Arc::new(generator);
    let generator_handle: Arc<dyn QuizGenerator> = generator.clone();

    let state = AppState {
        config: config.clone(),
        store: store.clone(),
        generator: generator_handle,
        storage,
    };
    let app = routes::create_router(state);

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    TestApp {
        address,
        store,
        generator,
        config,
        client: reqwest::Client::new(),
        _storage_dir: storage_dir,
    }
}

/// A minimal valid PDF with `pages` blank pages.
pub fn pdf_with_pages(pages: usize) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let mut kids: Vec<Object> = Vec::new();
    for _ in 0..pages {
        let content_id = doc.add_object(Stream::new(dictionary! {}, Vec::new()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
        });
        kids.push(page_id.into());
    }

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => pages as i64,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut buf = Vec::new();
    doc.save_to(&mut buf).expect("Failed to write PDF");
    buf
}

/// Model output with `n` well-formed questions; question i has answer i % 4.
pub fn ai_quiz_json(n: usize) -> String {
    let questions: Vec<serde_json::Value> = (0..n)
        .map(|i| {
            json!({
                "questionText": format!("Question {}?", i + 1),
                "options": ["Alpha", "Beta", "Gamma", "Delta"],
                "correctAnswerIndex": i % 4,
            })
        })
        .collect();

    json!({ "title": "Cell Biology Basics", "questions": questions }).to_string()
}

/// A stored quiz owned by `owner` with `n` questions; question i has answer i % 4.
pub fn sample_quiz(owner: &str, n: usize) -> Quiz {
    let questions: Vec<Question> = (0..n)
        .map(|i| Question {
            id: uuid::Uuid::new_v4().to_string(),
            question_text: format!("Question {}?", i + 1),
            options: vec![
                "Alpha".to_string(),
                "Beta".to_string(),
                "Gamma".to_string(),
                "Delta".to_string(),
            ],
            correct_answer_index: (i % 4) as u8,
        })
        .collect();

    Quiz {
        id: uuid::Uuid::new_v4().to_string(),
        title: "Sample Quiz".to_string(),
        description: None,
        question_count: n as u32,
        questions,
        user_id: owner.to_string(),
        is_public: true,
        is_pinned: Some(false),
        pdf_storage_url: None,
        created_at: chrono::Utc::now(),
    }
}

pub fn unique_user(prefix: &str) -> String {
    format!("{}_{}", prefix, &uuid::Uuid::new_v4().to_string()[..8])
}
