use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    /// Gemini API key. AI-backed modes are disabled when unset.
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
    pub gemini_base_url: String,
    /// Local ceiling on generation calls, protecting the upstream free-tier quota
    pub gemini_requests_per_minute: u32,
    pub deezer_base_url: String,
    pub server_host: String,
    pub server_port: u16,
    /// Allowed CORS origins (comma-separated). Use "*" for any origin (development only).
    pub cors_origins: Vec<String>,
    pub http_timeout_secs: u64,
    /// Catalog lookups kept in flight while resolving a candidate list
    pub resolve_concurrency: usize,
    pub log_json: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            gemini_api_key: None,
            gemini_model: "gemini-2.5-flash".to_string(),
            gemini_base_url: "https://generativelanguage.googleapis.com".to_string(),
            gemini_requests_per_minute: 15,
            deezer_base_url: "https://api.deezer.com".to_string(),
            server_host: "0.0.0.0".to_string(),
            server_port: 8000,
            cors_origins: vec![
                "http://localhost:3000".to_string(),
                "http://localhost:8000".to_string(),
            ],
            http_timeout_secs: 30,
            resolve_concurrency: 1,
            log_json: false,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let defaults = Config::default();

        let cors_origins = match env::var("CORS_ORIGINS") {
            Ok(raw) => parse_list(&raw),
            Err(_) => defaults.cors_origins.clone(),
        };

        let gemini_requests_per_minute = parse_or("GEMINI_REQUESTS_PER_MINUTE", defaults.gemini_requests_per_minute)?;
        if gemini_requests_per_minute == 0 {
            return Err(anyhow::anyhow!("GEMINI_REQUESTS_PER_MINUTE must be greater than zero"));
        }

        let resolve_concurrency = parse_or("RESOLVE_CONCURRENCY", defaults.resolve_concurrency)?;
        if resolve_concurrency == 0 {
            return Err(anyhow::anyhow!("RESOLVE_CONCURRENCY must be greater than zero"));
        }

        Ok(Config {
            gemini_api_key: env::var("GEMINI_API_KEY")
                .ok()
                .filter(|key| !key.trim().is_empty()),
            gemini_model: env::var("GEMINI_MODEL").unwrap_or(defaults.gemini_model),
            gemini_base_url: env::var("GEMINI_BASE_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or(defaults.gemini_base_url),
            gemini_requests_per_minute,
            deezer_base_url: env::var("DEEZER_BASE_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or(defaults.deezer_base_url),
            server_host: env::var("SERVER_HOST").unwrap_or(defaults.server_host),
            server_port: parse_or("SERVER_PORT", defaults.server_port)?,
            cors_origins,
            http_timeout_secs: parse_or("HTTP_TIMEOUT_SECS", defaults.http_timeout_secs)?,
            resolve_concurrency,
            log_json: env::var("LOG_FORMAT")
                .map(|format| format.eq_ignore_ascii_case("json"))
                .unwrap_or(false),
        })
    }

    pub fn ai_enabled(&self) -> bool {
        self.gemini_api_key.is_some()
    }
}

fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn parse_or<T>(key: &str, default: T) -> Result<T, anyhow::Error>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|e| anyhow::anyhow!("{} has an invalid value '{}': {}", key, raw, e)),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_list_drops_blanks() {
        assert_eq!(
            parse_list(" http://a.test , ,http://b.test,"),
            vec!["http://a.test".to_string(), "http://b.test".to_string()]
        );
    }

    #[test]
    fn test_defaults_are_sequential_and_keyless() {
        let config = Config::default();
        assert_eq!(config.resolve_concurrency, 1);
        assert!(!config.ai_enabled());
        assert_eq!(config.deezer_base_url, "https://api.deezer.com");
    }

    #[test]
    fn test_parse_or_uses_default_when_unset() {
        let value: u16 = parse_or("SONGSCOUT_TEST_UNSET_VARIABLE", 8123).unwrap();
        assert_eq!(value, 8123);
    }
}
