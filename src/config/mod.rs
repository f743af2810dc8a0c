use std::env;
use std::fmt;
use anyhow::{Context, Result};
use tracing::{info, warn};

pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434/api/generate";
pub const DEFAULT_MODEL_NAME: &str = "deepseek-r1:1.5b";
pub const DEFAULT_SMTP_SERVER: &str = "smtp.gmail.com";

#[derive(Clone)]
pub struct Config {
    pub server_host: String,
    pub server_port: u16,
    pub max_file_size_mb: usize,
    pub ollama_url: String,
    pub model_name: String,
    pub smtp_server: String,
    pub smtp_port: u16,
    pub sender_email: String,
    pub sender_password: String,
    pub ocr_language: String,
    pub ocr_dpi: u32,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("server_host", &self.server_host)
            .field("server_port", &self.server_port)
            .field("max_file_size_mb", &self.max_file_size_mb)
            .field("ollama_url", &self.ollama_url)
            .field("model_name", &self.model_name)
            .field("smtp_server", &self.smtp_server)
            .field("smtp_port", &self.smtp_port)
            .field("sender_email", &self.sender_email)
            .field("sender_password", &"<redacted>")
            .field("ocr_language", &self.ocr_language)
            .field("ocr_dpi", &self.ocr_dpi)
            .finish()
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        info!("Loading configuration from environment variables");
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let string_or = |key: &str, default: &str| {
            lookup(key).unwrap_or_else(|| {
                info!("{} not set, using default: {}", key, default);
                default.to_string()
            })
        };

        // PORT takes precedence for platform deployments
        let server_port = match lookup("PORT") {
            Some(_) => parse_var(&lookup, "PORT", 8000),
            None => parse_var(&lookup, "SERVER_PORT", 8000),
        };

        let config = Config {
            server_host: string_or("SERVER_HOST", "0.0.0.0"),
            server_port,
            max_file_size_mb: parse_var(&lookup, "MAX_FILE_SIZE_MB", 10),
            ollama_url: string_or("OLLAMA_URL", DEFAULT_OLLAMA_URL),
            model_name: string_or("MODEL_NAME", DEFAULT_MODEL_NAME),
            smtp_server: string_or("SMTP_SERVER", DEFAULT_SMTP_SERVER),
            smtp_port: parse_var(&lookup, "SMTP_PORT", 587),
            sender_email: lookup("SENDER_EMAIL")
                .filter(|v| !v.trim().is_empty())
                .context("SENDER_EMAIL must be set")?,
            sender_password: lookup("SENDER_PASSWORD")
                .filter(|v| !v.is_empty())
                .context("SENDER_PASSWORD must be set")?,
            ocr_language: string_or("OCR_LANGUAGE", "eng"),
            ocr_dpi: parse_var(&lookup, "OCR_DPI", 200),
        };

        config.validate()?;

        info!("Configuration loaded successfully: {:?}", config);
        Ok(config)
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }

    pub fn max_file_size_bytes(&self) -> usize {
        self.max_file_size_mb * 1024 * 1024
    }

    fn validate(&self) -> Result<()> {
        if self.server_port == 0 {
            return Err(anyhow::anyhow!("SERVER_PORT must be greater than 0"));
        }
        if self.max_file_size_mb == 0 {
            return Err(anyhow::anyhow!("MAX_FILE_SIZE_MB must be greater than 0"));
        }
        if self.smtp_port == 0 {
            return Err(anyhow::anyhow!("SMTP_PORT must be greater than 0"));
        }
        if self.ocr_dpi == 0 {
            return Err(anyhow::anyhow!("OCR_DPI must be greater than 0"));
        }
        if !self.ollama_url.starts_with("http://") && !self.ollama_url.starts_with("https://") {
            return Err(anyhow::anyhow!("OLLAMA_URL must be an http(s) URL"));
        }
        Ok(())
    }
}

fn parse_var<F, T>(lookup: &F, var_name: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr + Copy + fmt::Debug,
    T::Err: fmt::Display,
{
    match lookup(var_name) {
        Some(val) => match val.trim().parse() {
            Ok(parsed) => parsed,
            Err(e) => {
                warn!("Failed to parse {}: {} (using default: {:?})", var_name, e, default);
                default
            }
        },
        None => {
            info!("{} not set, using default: {:?}", var_name, default);
            default
        }
    }
}
