use anyhow::Context;
use clap::Parser;
use portal_noticias::config::cli::{Command, LayoutAction, SettingAction};
use portal_noticias::core::home::HomeController;
use portal_noticias::core::settings::AD_SLOTS_KEY;
use portal_noticias::core::ConfigProvider;
use portal_noticias::core::ConfigStore;
use portal_noticias::core::ContentGateway;
use portal_noticias::domain::model::BlockKind;
use portal_noticias::utils::error::ErrorSeverity;
use portal_noticias::utils::{logger, validation::Validate};
use portal_noticias::{
    CliConfig, HttpContentGateway, LayoutManager, PageController, PortalConfig, PortalError,
    RestConfigStore, RotationTimer, Session, SettingsRepository,
};
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

#[tokio::main]
async fn main() {
    let cli = CliConfig::parse();

    // 先載入設定，日誌格式由設定決定
    let config = match load_config(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());
            std::process::exit(1);
        }
    };

    let verbose = cli.verbose || config.verbose();
    if config.json_logs() {
        logger::init_json_logger(verbose);
    } else {
        logger::init_cli_logger(verbose);
    }

    tracing::info!("Starting portal-noticias CLI");
    if verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    let session = Session::new(config.gateway_base_url(), config.store_base_url());
    if let Some(token) = &cli.token {
        session.sign_in(token.clone());
    }

    let result = run(cli.command, &config, session.clone()).await;
    session.sign_out();

    if let Err(e) = result {
        match e.downcast_ref::<PortalError>() {
            Some(portal_error) => {
                tracing::error!(
                    "❌ Command failed: {} (Category: {:?}, Severity: {:?})",
                    portal_error,
                    portal_error.category(),
                    portal_error.severity()
                );
                eprintln!("❌ {}", portal_error.user_friendly_message());
                eprintln!("💡 {}", portal_error.recovery_suggestion());

                let exit_code = match portal_error.severity() {
                    ErrorSeverity::Low => 4,
                    ErrorSeverity::Medium => 2,
                    ErrorSeverity::High => 1,
                    ErrorSeverity::Critical => 3,
                };
                std::process::exit(exit_code);
            }
            None => {
                tracing::error!("❌ Command failed: {:#}", e);
                eprintln!("❌ {:#}", e);
                std::process::exit(1);
            }
        }
    }
}

fn load_config(path: &str) -> portal_noticias::Result<PortalConfig> {
    if Path::new(path).exists() {
        PortalConfig::from_file(path)
    } else {
        PortalConfig::from_env()
    }
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn parse_kind(raw: &str) -> anyhow::Result<BlockKind> {
    raw.parse::<BlockKind>()
        .map_err(|message| PortalError::ValidationError { message }.into())
}

async fn run(command: Command, config: &PortalConfig, session: Session) -> anyhow::Result<()> {
    let gateway = Arc::new(HttpContentGateway::from_config(session.clone(), config)?);
    let store = Arc::new(RestConfigStore::new(
        session,
        config.store_api_key(),
        config.settings_table(),
        config.request_timeout(),
    )?);

    match command {
        Command::Home => {
            let blocks = LayoutManager::new(Arc::clone(&store)).list().await;
            let settings = SettingsRepository::new(Arc::clone(&store));
            let controller = HomeController::new(Arc::clone(&gateway), config.home_limits());

            let (model, frontend, weather, videos, ads, html_blocks) = tokio::join!(
                controller.load(blocks),
                settings.frontend_settings(),
                settings.weather_settings(),
                settings.video_settings(),
                settings.ads_for_position("header"),
                settings.html_blocks("home"),
            );

            print_json(&serde_json::json!({
                "site": config.site_name(),
                "frontend": frontend,
                "weather": weather,
                "videos": videos,
                "header_ads": ads,
                "html_blocks": html_blocks,
                "home": model,
            }))
        }
        Command::Article { slug } => {
            let pages = PageController::new(gateway, config.related_count());
            print_json(&pages.article_page(&slug).await)
        }
        Command::Category { slug, page } => {
            let pages = PageController::new(gateway, config.related_count());
            print_json(&pages.category_page(&slug, page).await)
        }
        Command::Search { query, page } => {
            let pages = PageController::new(gateway, config.related_count());
            print_json(&pages.search_page(&query, page).await)
        }
        Command::Layout { action } => run_layout(action, LayoutManager::new(store)).await,
        Command::Setting { action } => match action {
            SettingAction::Get { key } => print_json(&store.get(&key).await),
            SettingAction::Set { key, value } => {
                let value: serde_json::Value = serde_json::from_str(&value)
                    .with_context(|| format!("value for '{}' is not valid JSON", key))?;
                if key == AD_SLOTS_KEY && !value.is_array() {
                    anyhow::bail!("'{}' must be a JSON array", AD_SLOTS_KEY);
                }
                store.set(&key, value).await?;
                println!("✅ Setting '{}' saved", key);
                Ok(())
            }
        },
        Command::Headlines { ticks } => {
            let settings = SettingsRepository::new(Arc::clone(&store));
            let interval = settings.frontend_settings().await.ticker_interval_seconds.max(1);
            let headlines = gateway
                .latest_articles(1)
                .await
                .map(|page| page.data)
                .unwrap_or_default();
            if headlines.is_empty() {
                println!("Nenhuma notícia encontrada");
                return Ok(());
            }

            let mut timer = RotationTimer::new(Duration::from_secs(interval), headlines.len());
            let mut index = timer.subscribe();
            println!("{}", headlines[timer.current()].title);
            timer.start();
            for _ in 0..ticks {
                index.changed().await?;
                let current = *index.borrow_and_update();
                println!("{}", headlines[current].title);
            }
            timer.stop();
            Ok(())
        }
    }
}

async fn run_layout<S: ConfigStore>(action: LayoutAction, manager: LayoutManager<S>) -> anyhow::Result<()> {
    match action {
        LayoutAction::List => print_json(&manager.list().await),
        LayoutAction::Add { kind, category } => {
            let block = manager.create(parse_kind(&kind)?, &category).await?;
            print_json(&block)
        }
        LayoutAction::Update { id, kind, category } => {
            let kind = kind.as_deref().map(parse_kind).transpose()?;
            let block = manager.update(&id, kind, category.as_deref()).await?;
            print_json(&block)
        }
        LayoutAction::Toggle { id, active } => print_json(&manager.set_active(&id, active).await?),
        LayoutAction::Move { id, position } => print_json(&manager.move_to(&id, position).await?),
        LayoutAction::Remove { id } => print_json(&manager.delete(&id).await?),
    }
}
