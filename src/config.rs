use std::env;
use std::time::Duration;

pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com";
pub const DEFAULT_IPFS_HOST: &str = "ipfs.infura.io";
pub const DEFAULT_IPFS_PORT: u16 = 5001;
pub const DEFAULT_IPFS_PROTOCOL: &str = "https";
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Reads `key`, treating an unset or whitespace-only value as absent.
fn env_value(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    pub api_key: Option<String>,
    pub base_url: String,
}

#[derive(Debug, Clone)]
pub struct IpfsConfig {
    pub host: String,
    pub port: u16,
    pub protocol: String,
    pub project_id: Option<String>,
    pub project_secret: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub openai: OpenAiConfig,
    pub ipfs: IpfsConfig,
    pub timeout_secs: u64,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        OpenAiConfig {
            api_key: None,
            base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
        }
    }
}

impl OpenAiConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// `OPENAI_API_KEY` wins over the legacy `REACT_APP_API_KEY`.
    pub fn from_env() -> Self {
        let api_key = env_value("OPENAI_API_KEY").or_else(|| env_value("REACT_APP_API_KEY"));
        let base_url =
            env_value("OPENAI_BASE_URL").unwrap_or_else(|| DEFAULT_OPENAI_BASE_URL.to_string());

        OpenAiConfig { api_key, base_url }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Key prefix that is safe to print.
    pub fn masked_key(&self) -> String {
        match &self.api_key {
            Some(key) => format!("{}...", key.chars().take(5).collect::<String>()),
            None => "<unset>".to_string(),
        }
    }
}

impl Default for IpfsConfig {
    fn default() -> Self {
        IpfsConfig {
            host: DEFAULT_IPFS_HOST.to_string(),
            port: DEFAULT_IPFS_PORT,
            protocol: DEFAULT_IPFS_PROTOCOL.to_string(),
            project_id: None,
            project_secret: None,
        }
    }
}

impl IpfsConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Self {
        let defaults = Self::default();
        let host = env_value("IPFS_HOST").unwrap_or(defaults.host);
        let port = env_value("IPFS_PORT")
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or(defaults.port);
        let protocol = env_value("IPFS_PROTOCOL").unwrap_or(defaults.protocol);
        let project_id = env_value("IPFS_PROJECT_ID");
        let project_secret = env_value("IPFS_PROJECT_SECRET");

        IpfsConfig {
            host,
            port,
            protocol,
            project_id,
            project_secret,
        }
    }

    pub fn with_endpoint(
        mut self,
        protocol: impl Into<String>,
        host: impl Into<String>,
        port: u16,
    ) -> Self {
        self.protocol = protocol.into();
        self.host = host.into();
        self.port = port;
        self
    }

    pub fn with_credentials(
        mut self,
        project_id: impl Into<String>,
        project_secret: impl Into<String>,
    ) -> Self {
        self.project_id = Some(project_id.into());
        self.project_secret = Some(project_secret.into());
        self
    }

    pub fn api_base(&self) -> String {
        format!("{}://{}:{}/api/v0", self.protocol, self.host, self.port)
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            openai: OpenAiConfig::default(),
            ipfs: IpfsConfig::default(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// A zero or unparsable `HTTP_TIMEOUT_SECS` falls back to the default.
    pub fn from_env() -> Self {
        let timeout_secs = env_value("HTTP_TIMEOUT_SECS")
            .and_then(|s| s.trim().parse().ok())
            .filter(|secs| *secs > 0)
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        Config {
            openai: OpenAiConfig::from_env(),
            ipfs: IpfsConfig::from_env(),
            timeout_secs,
        }
    }

    pub fn with_openai(mut self, config: OpenAiConfig) -> Self {
        self.openai = config;
        self
    }

    pub fn with_ipfs(mut self, config: IpfsConfig) -> Self {
        self.ipfs = config;
        self
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_point_at_infura() {
        let config = Config::new();
        assert_eq!(config.ipfs.api_base(), "https://ipfs.infura.io:5001/api/v0");
        assert_eq!(config.openai.base_url, DEFAULT_OPENAI_BASE_URL);
        assert!(config.openai.api_key.is_none());
        assert_eq!(config.timeout(), Duration::from_secs(60));
    }

    #[test]
    fn test_builders() {
        let config = Config::new()
            .with_openai(OpenAiConfig::new().with_api_key("sk-test-123456"))
            .with_ipfs(
                IpfsConfig::new()
                    .with_endpoint("http", "127.0.0.1", 5002)
                    .with_credentials("id", "secret"),
            )
            .with_timeout(5);

        assert_eq!(config.ipfs.api_base(), "http://127.0.0.1:5002/api/v0");
        assert_eq!(config.ipfs.project_id.as_deref(), Some("id"));
        assert_eq!(config.openai.masked_key(), "sk-te...");
        assert_eq!(config.timeout_secs, 5);
    }

    const ENV_KEYS: [&str; 9] = [
        "OPENAI_API_KEY",
        "REACT_APP_API_KEY",
        "OPENAI_BASE_URL",
        "IPFS_HOST",
        "IPFS_PORT",
        "IPFS_PROTOCOL",
        "IPFS_PROJECT_ID",
        "IPFS_PROJECT_SECRET",
        "HTTP_TIMEOUT_SECS",
    ];

    fn clear_env() {
        for key in ENV_KEYS {
            env::remove_var(key);
        }
    }

    // The process environment is shared, so every case lives in one test.
    #[test]
    fn test_from_env() {
        clear_env();
        let config = Config::from_env();
        assert_eq!(config.openai.api_key, None);
        assert_eq!(config.openai.base_url, DEFAULT_OPENAI_BASE_URL);
        assert_eq!(config.ipfs.api_base(), "https://ipfs.infura.io:5001/api/v0");
        assert_eq!(config.ipfs.project_id, None);
        assert_eq!(config.ipfs.project_secret, None);
        assert_eq!(config.timeout_secs, DEFAULT_TIMEOUT_SECS);

        env::set_var("REACT_APP_API_KEY", "sk-legacy");
        assert_eq!(
            OpenAiConfig::from_env().api_key.as_deref(),
            Some("sk-legacy")
        );
        env::set_var("OPENAI_API_KEY", "sk-current");
        assert_eq!(
            OpenAiConfig::from_env().api_key.as_deref(),
            Some("sk-current")
        );
        env::set_var("OPENAI_API_KEY", "  ");
        assert_eq!(
            OpenAiConfig::from_env().api_key.as_deref(),
            Some("sk-legacy")
        );

        env::set_var("IPFS_PORT", "abc");
        assert_eq!(IpfsConfig::from_env().port, DEFAULT_IPFS_PORT);
        env::set_var("IPFS_PORT", "5002");
        assert_eq!(IpfsConfig::from_env().port, 5002);

        env::set_var("IPFS_HOST", "");
        env::set_var("IPFS_PROTOCOL", " ");
        env::set_var("IPFS_PROJECT_ID", "");
        env::set_var("IPFS_PROJECT_SECRET", "   ");
        env::set_var("HTTP_TIMEOUT_SECS", "0");
        let config = Config::from_env();
        assert_eq!(config.ipfs.host, DEFAULT_IPFS_HOST);
        assert_eq!(config.ipfs.protocol, DEFAULT_IPFS_PROTOCOL);
        assert_eq!(config.ipfs.project_id, None);
        assert_eq!(config.ipfs.project_secret, None);
        assert_eq!(config.timeout_secs, DEFAULT_TIMEOUT_SECS);

        env::set_var("IPFS_HOST", "ipfs.local");
        env::set_var("IPFS_PROJECT_ID", "id");
        env::set_var("IPFS_PROJECT_SECRET", "secret");
        env::set_var("HTTP_TIMEOUT_SECS", "15");
        let config = Config::from_env();
        assert_eq!(config.ipfs.host, "ipfs.local");
        assert_eq!(config.ipfs.project_id.as_deref(), Some("id"));
        assert_eq!(config.ipfs.project_secret.as_deref(), Some("secret"));
        assert_eq!(config.timeout(), Duration::from_secs(15));

        clear_env();
    }

    #[test]
    fn test_masked_key_short_and_unset() {
        assert_eq!(OpenAiConfig::new().masked_key(), "<unset>");
        assert_eq!(OpenAiConfig::new().with_api_key("ab").masked_key(), "ab...");
    }
}
