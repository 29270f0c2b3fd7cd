use anyhow::{Context, Result};
use clap::Parser;
use colored::*;
use std::env;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use aida_agent::{Agent, AgentConfig};
use aida_cli::{render_markdown, run_interactive, BannerInfo, ChatSession, CliObserver};
use aida_history::{HistoryConfig, SessionStore};
use aida_llm::{build_provider, EmbeddingModelConfig, LLMProvider, LlmConfig, OllamaEmbedder};
use aida_rag::{
    build_vector_store, DocumentIndexer, EmbeddingKind, EmbeddingProvider, HashingEmbedder,
    RagConfig, Retriever,
};
use aida_tools::{ToolRegistry, ToolsConfig};

const DEFAULT_SESSION: &str = "aida_chat_session";

#[derive(Parser)]
#[command(name = "aida")]
#[command(version, about = "AiDA: chat with your documents and the web", long_about = None)]
struct Cli {
    /// LLM provider: groq, ollama or azure
    #[arg(long)]
    provider: Option<String>,

    /// Model (or Azure deployment) to use
    #[arg(long)]
    model: Option<String>,

    /// Agent profile: v0.1 or v0.1.1
    #[arg(long)]
    profile: Option<String>,

    /// Chat session id
    #[arg(long, default_value = DEFAULT_SESSION)]
    session: String,

    /// Ask a single question and exit
    #[arg(short, long)]
    query: Option<String>,

    /// Debug logging on stderr
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    /// Environment lookup with command-line flags layered on top
    fn lookup(&self, key: &str) -> Option<String> {
        let flag = match key {
            "DEFAULT_PROVIDER" => self.provider.clone(),
            "AIDA_PROFILE" => self.profile.clone(),
            _ => None,
        };
        flag.or_else(|| env::var(key).ok())
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let lookup = |key: &str| cli.lookup(key);

    // Configuration problems are fatal at startup
    let mut llm_config = LlmConfig::from_lookup(lookup).context("LLM configuration")?;
    if let Some(model) = &cli.model {
        llm_config = llm_config.with_model(model.clone());
    }
    let rag_config = RagConfig::from_lookup(lookup).context("RAG configuration")?;
    let agent_config = AgentConfig::from_lookup(lookup).context("agent configuration")?;
    let tools_config = ToolsConfig::from_lookup(lookup);
    let history_config = HistoryConfig::from_lookup(lookup);

    let llm: Arc<dyn LLMProvider> = Arc::from(build_provider(&llm_config)?);

    let embedder: Arc<dyn EmbeddingProvider> = match rag_config.embedding {
        EmbeddingKind::Hash => Arc::new(HashingEmbedder::default()),
        EmbeddingKind::Ollama => Arc::new(OllamaEmbedder::new(EmbeddingModelConfig::from_lookup(lookup))?),
    };
    let store = build_vector_store(&rag_config)?;
    let indexer = DocumentIndexer::new(store, embedder, rag_config.indexing.clone());
    let retriever = Arc::new(Retriever::new(indexer, rag_config.search.clone()));

    let tools = ToolRegistry::from_config(&tools_config, agent_config.profile.tools(), retriever)?;
    let profile = agent_config.profile;
    let agent = Agent::new(llm, Arc::new(tools), agent_config);

    let history = SessionStore::open(&history_config.db_path)
        .await
        .with_context(|| format!("opening chat history at {}", history_config.db_path.display()))?;
    let session = ChatSession::new(agent, history, cli.session.clone(), history_config.chats_dir);
    tracing::debug!(session = %cli.session, profile = %profile, "session ready");

    if let Some(query) = &cli.query {
        let outcome = session.send(query, &CliObserver::default()).await?;
        if outcome.hit_iteration_limit {
            eprintln!("{} Stopped after {} LLM calls", "⚠️ ".yellow(), outcome.iterations);
        }
        println!("{}", render_markdown(&outcome.answer));
        return Ok(());
    }

    let banner = BannerInfo {
        version: env!("CARGO_PKG_VERSION").to_string(),
        provider: llm_config.provider.display_name().to_string(),
        model: llm_config.model.clone(),
        profile: profile.to_string(),
    };
    run_interactive(&session, &banner).await?;
    Ok(())
}
