//! Configuration module
//!
//! Configuration is read once from the environment (with `.env` support via dotenvy) and
//! validated at startup. Handlers and services receive it through application state.

use std::env;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::constants::{
    DEFAULT_MAX_CONCURRENT_UPLOADS, DEFAULT_MAX_UPLOAD_BYTES, DEFAULT_PRESIGN_TTL_SECS,
    DEFAULT_VIDEO_CONTENT_TYPE,
};

// Common constants
const SERVER_PORT: u16 = 8091;
const MAX_CONNECTIONS: u32 = 20;
const CONNECTION_TIMEOUT_SECS: u64 = 30;

/// What the ingest pipeline does when the prober cannot classify an upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProbeFailurePolicy {
    /// Abort the upload with a processing failure.
    #[default]
    Fatal,
    /// Log a warning and store the video under the `other` prefix.
    Degrade,
}

impl FromStr for ProbeFailurePolicy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "fatal" => Ok(ProbeFailurePolicy::Fatal),
            "degrade" => Ok(ProbeFailurePolicy::Degrade),
            _ => Err(anyhow::anyhow!("Invalid probe failure policy: {}", s)),
        }
    }
}

impl Display for ProbeFailurePolicy {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            ProbeFailurePolicy::Fatal => write!(f, "fatal"),
            ProbeFailurePolicy::Degrade => write!(f, "degrade"),
        }
    }
}

/// HTTP server, database and authentication settings
#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub server_port: u16,
    pub environment: String,
    pub cors_origins: Vec<String>,
    pub database_url: String,
    pub db_max_connections: u32,
    pub db_timeout_seconds: u64,
    pub jwt_secret: String,
    pub log_format: String,
}

/// Upload pipeline and object storage settings
#[derive(Clone, Debug)]
pub struct IngestConfig {
    pub s3_bucket: Option<String>,
    pub s3_region: Option<String>,
    // Custom endpoint for S3-compatible providers (MinIO, DigitalOcean Spaces, etc.)
    pub s3_endpoint: Option<String>,
    pub aws_region: Option<String>,
    pub max_upload_bytes: usize,
    pub max_concurrent_uploads: usize,
    pub accepted_content_type: String,
    pub temp_dir: Option<PathBuf>,
    pub ffprobe_path: String,
    pub ffmpeg_path: String,
    pub presign_ttl_secs: u64,
    pub probe_failure_policy: ProbeFailurePolicy,
}

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config {
    pub server: ServerConfig,
    pub ingest: IngestConfig,
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let environment = env::var("ENVIRONMENT")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string());

        let cors_origins_str = env::var("CORS_ORIGINS").unwrap_or_else(|_| "*".to_string());
        let is_production =
            environment.to_lowercase() == "production" || environment.to_lowercase() == "prod";
        if is_production && cors_origins_str.trim() == "*" {
            return Err(anyhow::anyhow!(
                "CORS_ORIGINS cannot be '*' in production. Please specify explicit origins."
            ));
        }

        let server = ServerConfig {
            server_port: env::var("PORT")
                .unwrap_or_else(|_| SERVER_PORT.to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number"))?,
            environment,
            cors_origins: cors_origins_str
                .split(',')
                .map(|s| s.trim().to_string())
                .collect(),
            database_url: env::var("DATABASE_URL")
                .map_err(|_| anyhow::anyhow!("DATABASE_URL must be set"))?,
            db_max_connections: env::var("DB_MAX_CONNECTIONS")
                .unwrap_or_else(|_| MAX_CONNECTIONS.to_string())
                .parse()
                .unwrap_or(MAX_CONNECTIONS),
            db_timeout_seconds: env::var("DB_TIMEOUT_SECONDS")
                .unwrap_or_else(|_| CONNECTION_TIMEOUT_SECS.to_string())
                .parse()
                .unwrap_or(CONNECTION_TIMEOUT_SECS),
            jwt_secret: env::var("JWT_SECRET")
                .map_err(|_| anyhow::anyhow!("JWT_SECRET must be set for authentication"))?,
            log_format: env::var("LOG_FORMAT")
                .unwrap_or_else(|_| "text".to_string())
                .to_lowercase(),
        };

        let max_upload_bytes = env::var("MAX_UPLOAD_SIZE_MB")
            .ok()
            .and_then(|s| s.parse::<usize>().ok())
            .map(|mb| mb * 1024 * 1024)
            .unwrap_or(DEFAULT_MAX_UPLOAD_BYTES);

        let probe_failure_policy = match env::var("PROBE_FAILURE_POLICY") {
            Ok(value) => value.parse()?,
            Err(_) => ProbeFailurePolicy::default(),
        };

        let ingest = IngestConfig {
            s3_bucket: env::var("S3_BUCKET").ok(),
            s3_region: env::var("S3_REGION").ok(),
            s3_endpoint: env::var("S3_ENDPOINT").ok(),
            aws_region: env::var("AWS_REGION").ok(),
            max_upload_bytes,
            max_concurrent_uploads: env::var("MAX_CONCURRENT_UPLOADS")
                .unwrap_or_else(|_| DEFAULT_MAX_CONCURRENT_UPLOADS.to_string())
                .parse()
                .unwrap_or(DEFAULT_MAX_CONCURRENT_UPLOADS),
            accepted_content_type: env::var("VIDEO_ACCEPTED_CONTENT_TYPE")
                .unwrap_or_else(|_| DEFAULT_VIDEO_CONTENT_TYPE.to_string())
                .trim()
                .to_lowercase(),
            temp_dir: env::var("UPLOAD_TEMP_DIR").ok().map(PathBuf::from),
            ffprobe_path: env::var("FFPROBE_PATH").unwrap_or_else(|_| "ffprobe".to_string()),
            ffmpeg_path: env::var("FFMPEG_PATH").unwrap_or_else(|_| "ffmpeg".to_string()),
            presign_ttl_secs: env::var("PRESIGN_TTL_SECONDS")
                .unwrap_or_else(|_| DEFAULT_PRESIGN_TTL_SECS.to_string())
                .parse()
                .unwrap_or(DEFAULT_PRESIGN_TTL_SECS),
            probe_failure_policy,
        };

        Ok(Config { server, ingest })
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let env = self.server.environment.to_lowercase();
        env == "production" || env == "prod"
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.server.jwt_secret.len() < 32 {
            return Err(anyhow::anyhow!(
                "JWT_SECRET must be at least 32 characters long"
            ));
        }

        if !self.server.database_url.starts_with("postgres://")
            && !self.server.database_url.starts_with("postgresql://")
        {
            return Err(anyhow::anyhow!(
                "DATABASE_URL must be a valid PostgreSQL connection string"
            ));
        }

        match self.ingest.s3_bucket.as_deref() {
            None | Some("") => {
                return Err(anyhow::anyhow!("S3_BUCKET must be set"));
            }
            Some(bucket) if bucket.contains(',') => {
                return Err(anyhow::anyhow!("S3_BUCKET must not contain ','"));
            }
            Some(_) => {}
        }

        if self.s3_region().is_none() {
            return Err(anyhow::anyhow!("S3_REGION or AWS_REGION must be set"));
        }

        if self.ingest.max_upload_bytes == 0 {
            return Err(anyhow::anyhow!("MAX_UPLOAD_SIZE_MB must be greater than zero"));
        }

        if self.ingest.max_concurrent_uploads == 0 {
            return Err(anyhow::anyhow!("MAX_CONCURRENT_UPLOADS must be greater than zero"));
        }

        if !self.ingest.accepted_content_type.contains('/') {
            return Err(anyhow::anyhow!(
                "VIDEO_ACCEPTED_CONTENT_TYPE must be a type/subtype media type"
            ));
        }

        if self.ingest.presign_ttl_secs == 0 {
            return Err(anyhow::anyhow!("PRESIGN_TTL_SECONDS must be greater than zero"));
        }

        Ok(())
    }

    // Convenience getters for common fields
    pub fn server_port(&self) -> u16 {
        self.server.server_port
    }

    pub fn environment(&self) -> &str {
        &self.server.environment
    }

    pub fn cors_origins(&self) -> &[String] {
        &self.server.cors_origins
    }

    pub fn database_url(&self) -> &str {
        &self.server.database_url
    }

    pub fn db_max_connections(&self) -> u32 {
        self.server.db_max_connections
    }

    pub fn db_timeout_seconds(&self) -> u64 {
        self.server.db_timeout_seconds
    }

    pub fn jwt_secret(&self) -> &str {
        &self.server.jwt_secret
    }

    pub fn log_format(&self) -> &str {
        &self.server.log_format
    }

    pub fn s3_bucket(&self) -> Option<&str> {
        self.ingest.s3_bucket.as_deref()
    }

    /// S3 region, falling back to `AWS_REGION`.
    pub fn s3_region(&self) -> Option<&str> {
        self.ingest
            .s3_region
            .as_deref()
            .or(self.ingest.aws_region.as_deref())
    }

    pub fn s3_endpoint(&self) -> Option<&str> {
        self.ingest.s3_endpoint.as_deref()
    }

    pub fn max_upload_bytes(&self) -> usize {
        self.ingest.max_upload_bytes
    }

    pub fn max_concurrent_uploads(&self) -> usize {
        self.ingest.max_concurrent_uploads
    }

    pub fn accepted_content_type(&self) -> &str {
        &self.ingest.accepted_content_type
    }

    /// Directory for staged uploads; the system temp dir when unset.
    pub fn temp_dir(&self) -> PathBuf {
        self.ingest.temp_dir.clone().unwrap_or_else(env::temp_dir)
    }

    pub fn ffprobe_path(&self) -> &str {
        &self.ingest.ffprobe_path
    }

    pub fn ffmpeg_path(&self) -> &str {
        &self.ingest.ffmpeg_path
    }

    pub fn presign_ttl(&self) -> Duration {
        Duration::from_secs(self.ingest.presign_ttl_secs)
    }

    pub fn probe_failure_policy(&self) -> ProbeFailurePolicy {
        self.ingest.probe_failure_policy
    }
}
