use clap::Parser;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

use crate::resources::Resource;

#[derive(Parser, Debug, Default)]
#[command(name = "dummydash", about = "CRUD dashboard for the DummyJSON demo API")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Host to bind to
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind to
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Path to data directory
    #[arg(long)]
    pub data_dir: Option<PathBuf>,

    /// Base URL of the remote API
    #[arg(long)]
    pub api_base: Option<String>,

    /// Keep cached snapshots in memory only
    #[arg(long)]
    pub ephemeral: bool,
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub api: ApiConfig,
    pub pages: PagesConfig,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct DatabaseConfig {
    pub path: Option<PathBuf>,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout_secs: u64,
    pub limits: ApiLimits,
}

/// How many records the first fetch of each resource asks for. Zero means all.
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(default)]
pub struct ApiLimits {
    pub products: u32,
    pub recipes: u32,
    pub todos: u32,
    pub posts: u32,
    pub comments: u32,
    pub users: u32,
}

#[derive(Deserialize, Debug, Clone, Copy)]
#[serde(default)]
pub struct PagesConfig {
    pub comments_per_page: usize,
    pub products_per_page: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://dummyjson.com".to_string(),
            timeout_secs: 10,
            limits: ApiLimits::default(),
        }
    }
}

impl Default for ApiLimits {
    fn default() -> Self {
        Self {
            products: 30,
            recipes: 30,
            todos: 30,
            posts: 20,
            comments: 0,
            users: 10,
        }
    }
}

impl ApiLimits {
    pub fn for_resource(&self, resource: Resource) -> u32 {
        match resource {
            Resource::Products => self.products,
            Resource::Recipes => self.recipes,
            Resource::Todos => self.todos,
            Resource::Posts => self.posts,
            Resource::Comments => self.comments,
            Resource::Users => self.users,
        }
    }
}

impl Default for PagesConfig {
    fn default() -> Self {
        Self {
            comments_per_page: 10,
            products_per_page: 12,
        }
    }
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }
}

impl Config {
    pub fn load(cli: &Cli) -> anyhow::Result<Self> {
        let data_dir = Self::data_dir(cli)?;
        let config_path = cli
            .config
            .clone()
            .unwrap_or_else(|| data_dir.join("config.toml"));

        let mut config = if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            toml::from_str(&content)?
        } else {
            Config::default()
        };

        // CLI overrides
        if let Some(ref host) = cli.host {
            config.server.host = host.clone();
        }
        if let Some(port) = cli.port {
            config.server.port = port;
        }
        if let Some(ref base) = cli.api_base {
            config.api.base_url = base.clone();
        }

        if config.database.path.is_none() {
            config.database.path = Some(data_dir.join("dummydash.db"));
        }

        Ok(config)
    }

    pub fn data_dir(cli: &Cli) -> anyhow::Result<PathBuf> {
        match cli.data_dir.clone() {
            Some(dir) => Ok(dir),
            None => dirs::home_dir()
                .map(|home| home.join(".dummydash"))
                .ok_or_else(|| anyhow::anyhow!("Could not determine home directory")),
        }
    }

    pub fn db_path(&self) -> PathBuf {
        self.database
            .path
            .clone()
            .unwrap_or_else(|| PathBuf::from("dummydash.db"))
    }
}
