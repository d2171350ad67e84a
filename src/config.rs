use std::time::Duration;

/// Runtime configuration, read once at startup. `.env` is honored.
#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: String,
    pub database_url: String,
    /// A connection with no frames (not even heartbeats) for this long is
    /// forcibly closed.
    pub idle_window: Duration,
    pub history_limit: i64,
    pub max_image_bytes: usize,
    pub inference_url: String,
    pub inference_api_key: String,
    pub storage_url: String,
    pub emoji_search_url: String,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self {
            bind_addr: var_or("BIND_ADDR", "0.0.0.0:8080"),
            database_url: dotenv::var("DATABASE_URL")?,
            idle_window: Duration::from_secs(var_or("IDLE_TIMEOUT_SECS", "300").parse()?),
            history_limit: var_or("HISTORY_LIMIT", "100").parse()?,
            max_image_bytes: var_or("MAX_IMAGE_BYTES", "10485760").parse()?,
            inference_url: var_or("INFERENCE_URL", "http://localhost:9000"),
            inference_api_key: dotenv::var("INFERENCE_API_KEY").unwrap_or_default(),
            storage_url: var_or("STORAGE_URL", "http://localhost:9001"),
            emoji_search_url: var_or("EMOJI_SEARCH_URL", "http://localhost:9002"),
        })
    }
}

fn var_or(key: &str, default: &str) -> String {
    dotenv::var(key).unwrap_or_else(|_| default.to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn var_or_falls_back() {
        assert_eq!(var_or("KINCHAT_TEST_UNSET_VAR", "fallback"), "fallback");
    }
}
