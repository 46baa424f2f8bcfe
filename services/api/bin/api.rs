//! Main Entrypoint for the Interviewer API Service
//!
//! This binary is responsible for:
//! 1. Loading configuration from the environment.
//! 2. Initializing the store (PostgreSQL with migrations, or in-memory for `mock`).
//! 3. Constructing the capability clients and the interview orchestrator.
//! 4. Constructing the Axum router and applying middleware.
//! 5. Starting the web server and handling graceful shutdown.

use anyhow::Context;
use async_openai::config::OpenAIConfig;
use interviewer_api::{
    config::{Config, Provider},
    db::Db,
    router::create_router,
    state::AppState,
};
use interviewer_core::{
    InterviewOrchestrator,
    capability::{AnswerEvaluation, QuestionGeneration, QuestionValidation},
    evaluator::AnswerEvaluator,
    generator::QuestionGenerator,
    llm_client::{MockInterviewModel, OpenAICompatibleClient},
    store::{InMemoryStore, InterviewStore},
    validator::QuestionValidator,
};
use sqlx::PgPool;
use std::{collections::HashMap, fs, net::SocketAddr, sync::Arc};
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

/// Listens for the `Ctrl+C` signal to gracefully shut down the server.
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to install Ctrl+C handler");
        std::future::pending::<()>().await;
    }
    info!("Received shutdown signal. Shutting down gracefully...");
}

/// A helper function to load prompts from a directory.
fn load_prompts(prompts_path: &std::path::Path) -> anyhow::Result<HashMap<String, String>> {
    let mut prompts = HashMap::new();
    let entries = fs::read_dir(prompts_path)
        .with_context(|| format!("Failed to read prompts directory {}", prompts_path.display()))?;
    for entry in entries {
        let path = entry?.path();
        if path.is_file() && path.extension().and_then(|s| s.to_str()) == Some("md") {
            let prompt_key = path
                .file_stem()
                .and_then(|s| s.to_str())
                .context("Could not get file stem")?
                .to_string();
            let content = fs::read_to_string(&path)?;
            prompts.insert(prompt_key, content);
        }
    }
    Ok(prompts)
}

type Capabilities = (
    Arc<dyn QuestionGeneration>,
    Arc<dyn QuestionValidation>,
    Arc<dyn AnswerEvaluation>,
);

fn build_capabilities(config: &Config) -> anyhow::Result<Capabilities> {
    let api_base = match config.provider {
        Provider::Mock => {
            info!("Using deterministic mock capabilities.");
            let model = Arc::new(MockInterviewModel);
            return Ok(share(model));
        }
        Provider::OpenAI => "https://api.openai.com/v1/",
        Provider::Gemini => "https://generativelanguage.googleapis.com/v1beta/openai",
    };

    let api_key = match config.provider {
        Provider::Gemini => config.gemini_api_key.as_ref(),
        _ => config.openai_api_key.as_ref(),
    }
    .context("API key missing for the configured provider")?;
    info!(provider = ?config.provider, "Using OpenAI-compatible provider.");

    let openai_config = OpenAIConfig::new()
        .with_api_key(api_key)
        .with_api_base(api_base);
    let prompts = load_prompts(&config.prompts_path)?;
    let client = Arc::new(OpenAICompatibleClient::new(
        openai_config,
        config.chat_model.clone(),
        prompts,
        config.capability_timeout,
    )?);
    Ok(share(client))
}

/// Hands one provider to all three capability slots.
fn share<T>(provider: Arc<T>) -> Capabilities
where
    T: QuestionGeneration + QuestionValidation + AnswerEvaluation + 'static,
{
    let generation: Arc<dyn QuestionGeneration> = provider.clone();
    let validation: Arc<dyn QuestionValidation> = provider.clone();
    let evaluation: Arc<dyn AnswerEvaluation> = provider;
    (generation, validation, evaluation)
}

async fn build_store(config: &Config) -> anyhow::Result<Arc<dyn InterviewStore>> {
    match &config.database_url {
        Some(database_url) => {
            let pool = PgPool::connect(database_url)
                .await
                .context("Failed to connect to database")?;
            let db = Db::new(pool);
            db.run_migrations().await?;
            info!("Database connection established and migrations are up-to-date.");
            Ok(Arc::new(db))
        }
        None => {
            info!("No DATABASE_URL set; sessions are kept in memory.");
            Ok(Arc::new(InMemoryStore::new()))
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // --- 1. Load Configuration ---
    let config = Config::from_env().context("Failed to load configuration")?;

    // --- 2. Initialize Logging ---
    tracing_subscriber::fmt()
        .with_max_level(config.log_level)
        .with_timer(tracing_subscriber::fmt::time::ChronoLocal::rfc_3339())
        .init();
    info!("Configuration loaded. Initializing application state...");

    // --- 3. Initialize Store ---
    let store = build_store(&config).await?;

    // --- 4. Initialize Capabilities and Orchestrator ---
    let (generation, validation, evaluation) = build_capabilities(&config)?;
    let orchestrator = InterviewOrchestrator::new(
        store,
        QuestionGenerator::new(generation, QuestionValidator::new(validation)),
        AnswerEvaluator::new(evaluation),
    );

    let app_state = Arc::new(AppState { orchestrator });

    // --- 5. Create Router and Apply Middleware ---
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = create_router(app_state).layer(cors);

    // --- 6. Start Server ---
    info!(
        provider = ?config.provider,
        model = %config.chat_model,
        bind_address = %config.bind_address,
        "Service configured. Starting server..."
    );
    let listener = tokio::net::TcpListener::bind(config.bind_address).await?;

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    info!("Server has shut down.");
    Ok(())
}
