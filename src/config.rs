use clap::{Parser, Subcommand};
use serde::Deserialize;
use std::path::PathBuf;

use crate::catalog::DEFAULT_PAGE_SIZE;
use crate::models::UserId;
use crate::session::{ActingUser, Session};

#[derive(Parser, Debug)]
#[command(name = "wardrobe", about = "Browse and moderate the outfit catalog")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Path to data directory
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Base URL of the catalog API
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Rows per catalog page
    #[arg(long, global = true)]
    pub page_size: Option<usize>,

    /// Bearer token for the catalog API
    #[arg(long, global = true)]
    pub token: Option<String>,

    /// Use a seeded in-process catalog instead of the remote API
    #[arg(long, global = true)]
    pub demo: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// List outfits, filtered and paginated
    List {
        #[arg(long)]
        search: Option<String>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        section: Option<String>,
        /// active or inactive
        #[arg(long)]
        status: Option<String>,
        #[arg(long, default_value_t = 1)]
        page: usize,
    },
    /// Show one outfit with its comments and replies
    Show { outfit: String },
    /// Comment on an outfit
    Comment { outfit: String, text: String },
    /// Reply to a comment
    Reply {
        outfit: String,
        comment: String,
        text: String,
    },
    /// Remove a comment and its replies
    RemoveComment { outfit: String, comment: String },
    /// Remove a reply
    RemoveReply {
        outfit: String,
        comment: String,
        reply: String,
    },
    /// Toggle a like or dislike on an outfit, comment or reply
    React {
        outfit: String,
        #[arg(long)]
        comment: Option<String>,
        #[arg(long, requires = "comment")]
        reply: Option<String>,
        /// like or dislike
        kind: String,
    },
    /// Delete an outfit
    Delete { outfit: String },
    /// Mark an outfit active
    Activate { outfit: String },
    /// Mark an outfit inactive
    Deactivate { outfit: String },
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub api: ApiConfig,
    pub auth: AuthConfig,
    pub catalog: CatalogConfig,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct AuthConfig {
    pub token: Option<String>,
    pub user_id: Option<String>,
    pub display_name: Option<String>,
    pub is_admin: bool,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct CatalogConfig {
    pub page_size: usize,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000/api".to_string(),
        }
    }
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl Config {
    pub fn load(cli: &Cli) -> anyhow::Result<Self> {
        let config_path = cli
            .config
            .clone()
            .unwrap_or_else(|| Self::data_dir(cli).join("config.toml"));

        let mut config = if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            toml::from_str(&content)?
        } else {
            Config::default()
        };

        // CLI overrides
        if let Some(ref url) = cli.api_url {
            config.api.base_url = url.clone();
        }
        if let Some(ref token) = cli.token {
            config.auth.token = Some(token.clone());
        }
        if let Some(page_size) = cli.page_size {
            config.catalog.page_size = page_size;
        }

        if config.catalog.page_size == 0 {
            anyhow::bail!("catalog.page_size must be at least 1");
        }

        Ok(config)
    }

    pub fn data_dir(cli: &Cli) -> PathBuf {
        cli.data_dir.clone().unwrap_or_else(|| {
            dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".wardrobe")
        })
    }

    /// Session for the configured identity. Without a user id the session is anonymous.
    pub fn session(&self) -> Session {
        let user = self.auth.user_id.as_ref().map(|id| ActingUser {
            id: UserId::new(id.as_str()),
            display_name: self
                .auth
                .display_name
                .clone()
                .unwrap_or_else(|| id.clone()),
            is_admin: self.auth.is_admin,
        });
        Session {
            token: self.auth.token.clone(),
            user,
        }
    }
}
