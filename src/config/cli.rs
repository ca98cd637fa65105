use clap::{Parser, Subcommand};

#[derive(Debug, Clone, Parser)]
#[command(name = "portal-noticias")]
#[command(about = "News portal home aggregation and back-office tool")]
pub struct CliConfig {
    /// Path to TOML configuration file (falls back to PORTAL_* environment variables)
    #[arg(short, long, default_value = "portal.toml")]
    pub config: String,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Bearer token for an authenticated admin session
    #[arg(long, env = "PORTAL_ADMIN_TOKEN")]
    pub token: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Build the home page render model
    Home,
    /// Show one article with related articles
    Article { slug: String },
    /// Show a category page
    Category {
        slug: String,
        #[arg(long, default_value = "1")]
        page: u32,
    },
    /// Search articles
    Search {
        query: String,
        #[arg(long, default_value = "1")]
        page: u32,
    },
    /// Manage home layout blocks
    Layout {
        #[command(subcommand)]
        action: LayoutAction,
    },
    /// Read or write a raw site setting
    Setting {
        #[command(subcommand)]
        action: SettingAction,
    },
    /// Rotate through the latest headlines like the home ticker
    Headlines {
        #[arg(long, default_value = "5")]
        ticks: usize,
    },
}

#[derive(Debug, Clone, Subcommand)]
pub enum LayoutAction {
    List,
    Add {
        /// carousel or section
        #[arg(long)]
        kind: String,
        #[arg(long)]
        category: String,
    },
    Update {
        id: String,
        #[arg(long)]
        kind: Option<String>,
        #[arg(long)]
        category: Option<String>,
    },
    Toggle {
        id: String,
        #[arg(long, action = clap::ArgAction::Set)]
        active: bool,
    },
    Move {
        id: String,
        position: usize,
    },
    Remove {
        id: String,
    },
}

#[derive(Debug, Clone, Subcommand)]
pub enum SettingAction {
    Get { key: String },
    Set { key: String, value: String },
}
