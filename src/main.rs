use clap::Parser;
use courseforge::{completion::OpenAiClient, db::Db, names, router, AppState};

#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// SQLite database URL.
    #[arg(long, env, default_value = "sqlite://courses.db")]
    database_url: String,

    /// The address to bind to.
    #[arg(short, long, env, default_value = "127.0.0.1:8000")]
    address: String,

    /// API key for the completion service. Generation endpoints fail when empty.
    #[arg(long, env, default_value = "", hide_env_values = true)]
    ai_api_key: String,

    /// Base URL of an OpenAI-compatible API.
    #[arg(long, env, default_value = names::DEFAULT_AI_API_BASE)]
    ai_api_base: String,

    #[arg(long, env, default_value = names::DEFAULT_AI_MODEL)]
    ai_model: String,
}

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "tower=info,sqlx=warn,courseforge=debug".to_owned());
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_span_events(tracing_subscriber::fmt::format::FmtSpan::CLOSE)
        .init();

    let args = Args::parse();

    if args.ai_api_key.is_empty() {
        tracing::warn!("AI_API_KEY is not set, generation endpoints will fail");
    }

    let db = Db::new(&args.database_url).await?;
    let client = OpenAiClient::new(args.ai_api_base, args.ai_api_key, args.ai_model);
    let app = router(AppState::new(db, client));

    let listener = tokio::net::TcpListener::bind(&args.address).await?;
    tracing::info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}
