// src/config.rs

use std::env;
use std::str::FromStr;

use dotenvy::dotenv;

/// Default maximum upload size in megabytes.
pub const UPLOAD_LIMIT_MB: u64 = 10;

/// Default allowed range for the requested number of questions.
pub const QUESTIONS_RANGE: (u32, u32) = (5, 50);

/// Default maximum number of PDF pages processed.
pub const PAGES_LIMIT: usize = 200;

/// Hard bounds the generation request accepts regardless of configuration.
pub const GENERATION_QUESTION_BOUNDS: (u32, u32) = (1, 50);

/// Maximum length (in characters) of a quiz title after rename.
pub const MAX_TITLE_LENGTH: usize = 150;

/// Upload constraints consumed by the upload validator and request builder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadLimits {
    pub max_upload_mb: u64,
    pub min_questions: u32,
    pub max_questions: u32,
    pub max_pages: usize,
}

impl Default for UploadLimits {
    fn default() -> Self {
        Self {
            max_upload_mb: UPLOAD_LIMIT_MB,
            min_questions: QUESTIONS_RANGE.0,
            max_questions: QUESTIONS_RANGE.1,
            max_pages: PAGES_LIMIT,
        }
    }
}

impl UploadLimits {
    pub fn max_file_size(&self) -> u64 {
        self.max_upload_mb * 1024 * 1024
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub rust_log: String,
    pub bind_addr: String,
    pub gemini_api_key: String,
    pub gemini_model: String,
    pub ai_timeout_secs: u64,
    pub storage_dir: String,
    pub public_base_url: String,
    pub upload: UploadLimits,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        let database_url = env::var("DATABASE_URL")
            .expect("DATABASE_URL must be set");

        let jwt_secret = env::var("JWT_SECRET")
            .expect("JWT_SECRET must be set");

        let gemini_api_key = env::var("GEMINI_API_KEY")
            .expect("GEMINI_API_KEY must be set");

        let defaults = UploadLimits::default();
        let upload = UploadLimits {
            max_upload_mb: parse_or("UPLOAD_LIMIT_MB", defaults.max_upload_mb),
            min_questions: parse_or("MIN_QUESTIONS", defaults.min_questions),
            max_questions: parse_or("MAX_QUESTIONS", defaults.max_questions),
            max_pages: parse_or("PAGES_LIMIT", defaults.max_pages),
        };

        let (lo, hi) = GENERATION_QUESTION_BOUNDS;
        assert!(
            lo <= upload.min_questions
                && upload.min_questions <= upload.max_questions
                && upload.max_questions <= hi,
            "question range must lie within {}..={}",
            lo,
            hi
        );

        Self {
            database_url,
            jwt_secret,
            rust_log: env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            bind_addr: env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string()),
            gemini_api_key,
            gemini_model: env::var("GEMINI_MODEL")
                .unwrap_or_else(|_| "gemini-2.5-flash".to_string()),
            ai_timeout_secs: parse_or("AI_TIMEOUT_SECS", 120),
            storage_dir: env::var("STORAGE_DIR").unwrap_or_else(|_| "storage".to_string()),
            public_base_url: env::var("PUBLIC_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:3000".to_string()),
            upload,
        }
    }
}

fn parse_or<T: FromStr>(key: &str, default: T) -> T {
    match env::var(key) {
        Ok(raw) => raw
            .parse()
            .unwrap_or_else(|_| panic!("{} must be a valid number, got '{}'", key, raw)),
        Err(_) => default,
    }
}
