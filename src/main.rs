use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

use baby_bot::bot::{BotAdapter, BotRouteState, TurnDispatcher, bot_routes};
use baby_bot::channels::CliChannel;
use baby_bot::config::BotConfig;
use baby_bot::store::{Database, LibSqlBackend};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = BotConfig::from_env().context("Invalid configuration")?;

    // Initialize tracing; keep the guard alive so file logs are flushed.
    let _log_guard = init_tracing(&config);

    let questions = config
        .load_questions()
        .context("Failed to load question file")?;
    let flow = config.resolve_flow(questions.as_ref())?;

    eprintln!("🤖 Baby bot v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Flow: {} (trigger: {:?})", flow, config.trigger);
    if let Some(ref path) = config.questions_path {
        eprintln!("   Questions: {}", path.display());
    }

    // ── Database ─────────────────────────────────────────────────────────
    let db: Arc<dyn Database> = Arc::new(if config.db_path == ":memory:" {
        LibSqlBackend::new_memory().await?
    } else {
        LibSqlBackend::new_local(std::path::Path::new(&config.db_path))
            .await
            .with_context(|| format!("Failed to open database at {}", config.db_path))?
    });
    eprintln!("   Database: {}", config.db_path);

    let bot = Arc::new(TurnDispatcher::new(
        &config,
        flow,
        questions,
        Arc::clone(&db),
    ));

    // ── HTTP endpoint ────────────────────────────────────────────────────
    if let Some(port) = config.http_port {
        let app = bot_routes(BotRouteState {
            bot: Arc::clone(&bot),
            db: Arc::clone(&db),
        });
        let listener = tokio::net::TcpListener::bind(("0.0.0.0", port))
            .await
            .with_context(|| format!("Failed to bind port {port}"))?;
        eprintln!("   HTTP: http://0.0.0.0:{port}/api/messages");
        tokio::spawn(async move {
            tracing::info!(port, "HTTP endpoint started");
            if let Err(e) = axum::serve(listener, app).await {
                tracing::error!("HTTP server stopped: {}", e);
            }
        });
    }

    eprintln!("   Type a message and press Enter. /quit to exit.\n");

    let channel = CliChannel::new(config.bot_id.clone());
    BotAdapter::new(bot, Box::new(channel)).run().await?;

    Ok(())
}

fn init_tracing(config: &BotConfig) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let stderr_layer = fmt::layer().with_target(false).with_writer(std::io::stderr);

    match config.log_dir {
        Some(ref dir) => {
            let appender = tracing_appender::rolling::daily(dir, "baby-bot.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::registry()
                .with(filter)
                .with(stderr_layer)
                .with(fmt::layer().with_ansi(false).with_writer(writer))
                .init();
            Some(guard)
        }
        None => {
            tracing_subscriber::registry()
                .with(filter)
                .with(stderr_layer)
                .init();
            None
        }
    }
}
