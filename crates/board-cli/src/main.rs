use anyhow::Result;
use board_application::{ConversationBinding, ConversationStore, ConversationView, PersonaCatalog};
use board_core::auth::{LoginRequest, RegisterRequest};
use board_core::config::BoardConfig;
use board_core::conversation::CreateConversationRequest;
use board_infrastructure::{HttpBoardApi, HttpClient, LocalConversationStore, TokenStore};
use board_realtime::RealtimeClient;
use clap::{Parser, Subcommand};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::warn;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "board")]
#[command(about = "Board - multi-persona AI brainstorming client", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in with email and password
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Register a new account
    Register {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        first_name: String,
        #[arg(long)]
        last_name: String,
    },
    /// Log out (clears the stored token)
    Logout,
    /// List the persona catalog
    Personas,
    /// List conversations
    List {
        #[arg(long, default_value_t = 1)]
        page: u32,
    },
    /// Create a conversation
    New {
        #[arg(long)]
        title: String,
        /// Persona identifiers to include (repeatable)
        #[arg(long = "persona")]
        personas: Vec<String>,
    },
    /// Delete a conversation
    Delete { id: String },
    /// Open a conversation and chat live
    Open { id: String },
    /// Print a generated discussion summary
    Summary { id: String },
    /// Advance a conversation by one persona turn
    Step { id: String },
}

struct App {
    config: BoardConfig,
    tokens: Arc<TokenStore>,
    api: Arc<HttpBoardApi>,
    store: Arc<ConversationStore>,
    catalog: PersonaCatalog,
    local: LocalConversationStore,
}

impl App {
    fn new() -> Result<Self> {
        let config = BoardConfig::from_env();
        let tokens = Arc::new(TokenStore::new_default()?);
        let http = HttpClient::new(config.api_base_url.clone(), tokens.clone());
        let api = Arc::new(HttpBoardApi::new(http));
        let store = ConversationStore::new(api.clone());
        let catalog = PersonaCatalog::new(api.clone());
        let local = LocalConversationStore::new_default()?;
        Ok(Self {
            config,
            tokens,
            api,
            store,
            catalog,
            local,
        })
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let app = App::new()?;

    match cli.command {
        Commands::Login { email, password } => {
            use board_core::api::BoardApi;
            let session = app.api.login(LoginRequest { email, password }).await?;
            println!("logged in as {}", session.user.email);
        }
        Commands::Register {
            email,
            password,
            first_name,
            last_name,
        } => {
            use board_core::api::BoardApi;
            let user = app
                .api
                .register(RegisterRequest {
                    email,
                    password,
                    first_name,
                    last_name,
                })
                .await?;
            println!("registered {}", user.email);
        }
        Commands::Logout => {
            app.tokens.clear().await?;
            println!("logged out");
        }
        Commands::Personas => {
            // Falls back to the built-in catalog when the backend is down.
            let _ = app.catalog.load().await;
            for persona in app.catalog.all().await {
                println!("{:<12} {:<16} {}", persona.id, persona.name, persona.description);
            }
        }
        Commands::List { page } => list_conversations(&app, page).await,
        Commands::New { title, personas } => {
            let conversation = app
                .store
                .create_conversation(CreateConversationRequest {
                    title,
                    active_personas: personas,
                    max_rounds: None,
                    current_speaker: None,
                    turn_index: None,
                })
                .await?;
            println!("created {} ({})", conversation.id, conversation.title);
        }
        Commands::Delete { id } => {
            app.store.delete_conversation(&id).await?;
            app.local.delete(&id).await?;
            println!("deleted {id}");
        }
        Commands::Open { id } => open_conversation(app, id).await?,
        Commands::Summary { id } => {
            let summary = app.store.generate_summary(&id).await?;
            println!("{summary}");
        }
        Commands::Step { id } => {
            let conversation = app.store.step_conversation(&id).await?;
            println!(
                "round {}/{} speaker {}",
                conversation.current_round,
                conversation.max_rounds,
                conversation.current_speaker.as_deref().unwrap_or("-")
            );
        }
    }

    Ok(())
}

/// Lists conversations from the backend, degrading to the local fallback
/// history when it is unreachable.
async fn list_conversations(app: &App, page: u32) {
    match app
        .store
        .fetch_conversations(page, app.config.page_size)
        .await
    {
        Ok(result) => {
            for conversation in result.data {
                println!("{}  {}  [{:?}]", conversation.id, conversation.title, conversation.status);
            }
        }
        Err(err) => {
            warn!("backend unavailable, showing local history: {err}");
            for conversation in app.local.all().await {
                println!("{}  {}  (local)", conversation.id, conversation.title);
            }
        }
    }
}

/// Opens a conversation: hydrates from REST (or local fallback), joins the
/// realtime room, prints arrivals live, and sends stdin lines as user
/// messages.
async fn open_conversation(app: App, id: String) -> Result<()> {
    let App {
        config,
        tokens,
        api: _api,
        store,
        catalog,
        local,
    } = app;

    let _ = catalog.load().await;

    match store.fetch_conversation(&id).await {
        Ok(conversation) => {
            local.save(conversation).await?;
        }
        Err(err) => {
            warn!("conversation fetch failed: {err}");
            if let Some(conversation) = local.find(&id).await {
                store
                    .dispatch(board_application::Action::SetCurrentConversation(Some(
                        conversation,
                    )))
                    .await;
            }
        }
    }
    if let Err(err) = store.fetch_messages(&id).await {
        warn!("message fetch failed, showing local state: {err}");
    }
    local.set_active(Some(&id)).await?;

    // Realtime is best-effort; REST remains the authoritative fallback.
    let client = Arc::new(RealtimeClient::new(&config));
    if let Err(err) = client.connect(tokens.get().await.as_deref()).await {
        warn!("realtime unavailable, messages arrive on refresh only: {err}");
    }
    let binding =
        ConversationBinding::bind(store.clone(), client.clone(), id.clone(), config.stagger_delay)
            .await;

    // Render task: print rows the previous frame did not have.
    let render_store = store.clone();
    let catalog = Arc::new(catalog);
    let render_catalog = catalog.clone();
    let mut changed = store.subscribe();
    tokio::spawn(async move {
        let mut view = ConversationView::new();
        let mut printed = 0usize;
        while changed.changed().await.is_ok() {
            let state = render_store.snapshot().await;
            let mut resolved = Vec::new();
            for message in &state.messages {
                if let Some(persona_id) = message.persona_id.as_deref() {
                    resolved.push((persona_id.to_string(), render_catalog.resolve(persona_id).await));
                }
            }
            let snapshot = view.project(&state, |persona_id| {
                resolved
                    .iter()
                    .find(|(id, _)| id == persona_id)
                    .map(|(_, persona)| persona.clone())
                    .unwrap_or_else(|| board_core::persona::Persona::placeholder(persona_id))
            });
            for row in snapshot.messages.iter().skip(printed) {
                if row.streaming {
                    continue;
                }
                println!("[{}] {}", row.persona.name, row.content);
            }
            printed = snapshot.messages.iter().filter(|m| !m.streaming).count();
            for typing in &snapshot.typing {
                println!("... {} is typing", typing.persona.name);
            }
        }
    });

    println!("connected to {id}; type a message, or /quit to exit");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim().to_string();
        if line.is_empty() {
            continue;
        }
        if line == "/quit" {
            break;
        }
        if store.send_message(&id, &line).await.is_ok() {
            if let Err(err) = store.process_message(&id, &line).await {
                warn!("processing failed: {err}");
            }
        }
        let state = store.snapshot().await;
        local.update_messages(&id, state.messages.clone()).await.ok();
    }

    binding.unbind().await;
    client.disconnect().await;
    Ok(())
}
