use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub collector: CollectorConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
    #[serde(default = "default_metrics_path")]
    pub metrics_path: String,
}

fn default_metrics_path() -> String {
    "/metrics".into()
}

#[derive(Debug, Clone, Deserialize)]
pub struct CollectorConfig {
    /// Pause between collection cycles.
    pub interval_ms: u64,
    /// Kernel statistics file, read after switching into each container's namespace.
    #[serde(default = "default_netstat_path")]
    pub netstat_path: String,
}

fn default_netstat_path() -> String {
    "/proc/thread-self/net/netstat".into()
}

impl AppConfig {
    pub fn load() -> anyhow::Result<Self> {
        let path = std::env::var("CONFIG_FILE").unwrap_or_else(|_| "config.toml".into());
        let s = std::fs::read_to_string(&path)?;
        Self::load_from_str(&s)
    }

    /// Parse and validate config from a string (e.g. for tests).
    pub fn load_from_str(s: &str) -> anyhow::Result<Self> {
        let config: AppConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            self.server.port > 0,
            "server.port must be between 1 and 65535, got {}",
            self.server.port
        );
        anyhow::ensure!(
            self.server.metrics_path.starts_with('/'),
            "server.metrics_path must start with '/', got {:?}",
            self.server.metrics_path
        );
        anyhow::ensure!(
            !self.server.metrics_path.contains([':', '*', '{', '}']),
            "server.metrics_path must be a literal path without ':', '*', '{{' or '}}', got {:?}",
            self.server.metrics_path
        );
        anyhow::ensure!(
            self.server.metrics_path != "/version",
            "server.metrics_path must not shadow /version"
        );
        anyhow::ensure!(
            self.collector.interval_ms > 0,
            "collector.interval_ms must be > 0, got {}",
            self.collector.interval_ms
        );
        anyhow::ensure!(
            !self.collector.netstat_path.is_empty(),
            "collector.netstat_path must be non-empty"
        );
        Ok(())
    }
}
