//! Command-line flags with environment fallbacks.
//!
//! [`Args::into_configs`] turns parsed flags into the immutable
//! [`NetworkConfig`] and [`ServiceConfig`] the server is built from.

use std::collections::HashSet;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context as _;
use clap::{Parser, ValueEnum};
use dts_core::{FileType, UploadLimits};
use tracing::warn;

use crate::network::NetworkConfig;
use crate::service::config::{
    LlmConfig, OAuthConfig, OcrConfig, Secret, ServiceConfig, SessionConfig, DEFAULT_MODEL,
};

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// One JSON object per event.
    Json,
    /// Multi-line, human-readable.
    Pretty,
}

#[derive(Debug, Parser)]
#[command(
    name = "dts-server",
    version,
    about = "Document translation and summarization HTTP server"
)]
pub struct Args {
    #[arg(long, env = "DTS_HOST", default_value = "0.0.0.0")]
    pub host: String,

    #[arg(long, env = "DTS_PORT", default_value_t = 8000)]
    pub port: u16,

    /// Comma-separated allowed CORS origins; `*` allows any.
    #[arg(long, env = "DTS_CORS_ORIGINS", value_delimiter = ',', default_value = "*")]
    pub cors_origins: Vec<String>,

    /// Per-request timeout in seconds.
    #[arg(long, env = "DTS_REQUEST_TIMEOUT_SECS", default_value_t = 120)]
    pub request_timeout_secs: u64,

    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub openai_api_key: Option<String>,

    #[arg(long, env = "OPENAI_BASE_URL", default_value = "https://api.openai.com/v1")]
    pub openai_base_url: String,

    #[arg(long, env = "OPENAI_MODEL", default_value = DEFAULT_MODEL)]
    pub openai_model: String,

    #[arg(long, env = "GOOGLE_CLIENT_ID")]
    pub google_client_id: Option<String>,

    #[arg(long, env = "GOOGLE_CLIENT_SECRET", hide_env_values = true)]
    pub google_client_secret: Option<String>,

    #[arg(
        long,
        env = "GOOGLE_REDIRECT_URI",
        default_value = "http://localhost:3000/auth/google/callback"
    )]
    pub google_redirect_uri: String,

    /// Where the OAuth callback sends the browser with `?token=...`.
    #[arg(long, env = "FRONTEND_URL", default_value = "http://localhost:3000/")]
    pub frontend_url: String,

    /// Session signing secret. A random one is generated when absent, so
    /// tokens do not survive a restart.
    #[arg(long, env = "JWT_SECRET_KEY", hide_env_values = true)]
    pub jwt_secret_key: Option<String>,

    #[arg(long, env = "JWT_TTL_HOURS", default_value_t = 7 * 24)]
    pub jwt_ttl_hours: u64,

    /// Maximum decoded upload size in bytes.
    #[arg(long, env = "MAX_FILE_SIZE", default_value_t = dts_core::DEFAULT_MAX_UPLOAD_BYTES)]
    pub max_file_size: usize,

    /// Comma-separated MIME allow-list; empty means every supported type.
    #[arg(long, env = "ALLOWED_FILE_TYPES", value_delimiter = ',')]
    pub allowed_file_types: Vec<String>,

    #[arg(long, env = "TESSERACT_PATH", default_value = "tesseract")]
    pub tesseract_path: PathBuf,

    #[arg(long, env = "TESSERACT_LANG", default_value = "kor+eng")]
    pub tesseract_lang: String,

    #[arg(long, env = "DTS_LOG_FORMAT", value_enum, default_value_t = LogFormat::Pretty)]
    pub log_format: LogFormat,

    /// Serve Prometheus metrics on this address when set.
    #[arg(long, env = "DTS_METRICS_ADDR")]
    pub metrics_addr: Option<SocketAddr>,
}

impl Args {
    /// Builds the network and service configuration.
    ///
    /// # Errors
    ///
    /// Fails on an unknown MIME type in the allow-list.
    pub fn into_configs(self) -> anyhow::Result<(NetworkConfig, ServiceConfig)> {
        let upload = UploadLimits {
            max_bytes: self.max_file_size,
            allowed_types: parse_allowed_types(&self.allowed_file_types)?,
        };

        let session_secret = if let Some(secret) = self.jwt_secret_key.filter(|s| !s.is_empty()) {
            Secret::new(secret)
        } else {
            warn!("JWT_SECRET_KEY not set; using a random per-process session secret");
            Secret::random()
        };

        // Uploads travel base64-encoded inside JSON.
        let max_body_bytes = (upload.max_bytes.div_ceil(3) * 4)
            .saturating_add(64 * 1024)
            .max(NetworkConfig::default().max_body_bytes);

        let request_timeout = Duration::from_secs(self.request_timeout_secs);
        let network = NetworkConfig {
            host: self.host,
            port: self.port,
            cors_origins: self.cors_origins,
            request_timeout,
            max_body_bytes,
        };

        // Backend calls must give up before the transport answers 408.
        let backend_timeout = request_timeout
            .saturating_sub(Duration::from_secs(5))
            .max(Duration::from_secs(1));

        let service = ServiceConfig {
            llm: LlmConfig {
                api_key: self.openai_api_key.filter(|k| !k.is_empty()).map(Secret::new),
                base_url: self.openai_base_url,
                model: self.openai_model,
                timeout: backend_timeout,
                ..LlmConfig::default()
            },
            oauth: OAuthConfig {
                client_id: self.google_client_id.filter(|s| !s.is_empty()),
                client_secret: self
                    .google_client_secret
                    .filter(|s| !s.is_empty())
                    .map(Secret::new),
                redirect_uri: self.google_redirect_uri,
                frontend_url: self.frontend_url,
                timeout: backend_timeout.min(OAuthConfig::default().timeout),
                ..OAuthConfig::default()
            },
            session: SessionConfig {
                secret: session_secret,
                ttl: Duration::from_secs(self.jwt_ttl_hours * 60 * 60),
            },
            upload,
            ocr: OcrConfig {
                tesseract_path: self.tesseract_path,
                language: self.tesseract_lang,
            },
        };

        Ok((network, service))
    }
}

fn parse_allowed_types(raw: &[String]) -> anyhow::Result<HashSet<FileType>> {
    let listed: Vec<&str> = raw.iter().map(|s| s.trim()).filter(|s| !s.is_empty()).collect();
    if listed.is_empty() {
        return Ok(FileType::ALL.into_iter().collect());
    }
    listed
        .into_iter()
        .map(|mime| {
            mime.parse::<FileType>()
                .with_context(|| format!("invalid ALLOWED_FILE_TYPES entry `{mime}`"))
        })
        .collect()
}
