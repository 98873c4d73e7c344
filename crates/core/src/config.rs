use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub sandbox: SandboxConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub provider: ProviderConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SandboxConfig {
    pub root: String,
    /// Glob patterns skipped by the indexer (the audit log directory by
    /// default).
    #[serde(default = "default_exclude")]
    pub exclude: Vec<String>,
}

impl Default for SandboxConfig {
    fn default() -> Self {
        Self {
            root: "sandbox".to_string(),
            exclude: default_exclude(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: ".data/agent.db".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Registry key of the provider set to use ("openai" or "noop").
    pub name: String,
    #[serde(default = "default_model")]
    pub chat_model: String,
    #[serde(default = "default_model")]
    pub summary_model: String,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            name: "noop".to_string(),
            chat_model: default_model(),
            summary_model: default_model(),
        }
    }
}

fn default_exclude() -> Vec<String> {
    vec!["**/logs/**".to_string()]
}

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

pub fn load(path: Option<&str>) -> anyhow::Result<AppConfig> {
    let mut settings = config::Config::builder();
    if let Some(p) = path {
        settings = settings.add_source(config::File::with_name(p));
    } else {
        settings = settings.add_source(config::File::with_name("config/default").required(false));
    }
    let cfg = settings.build()?;
    Ok(cfg.try_deserialize()?)
}
