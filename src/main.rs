use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use krishi_chat::config::WidgetConfig;
use krishi_chat::conversation::{ConversationManager, SubmitOutcome};
use krishi_chat::i18n::{self, Key};
use krishi_chat::language::Language;
use krishi_chat::markup::to_plain_text;
use krishi_chat::persistence::{ConversationStore, FileStore, Role, StoreError};
use krishi_chat::surface::{MemorySurface, MessageNode, Sender};
use krishi_chat::throttle::SubmitThrottle;
use krishi_chat::transport::{HttpTransport, TransportError};

type Manager = ConversationManager<MemorySurface>;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("storage failed: {0}")]
    Store(#[from] StoreError),
    #[error("transport setup failed: {0}")]
    Transport(#[from] TransportError),
    #[error("terminal I/O failed: {0}")]
    Io(#[from] io::Error),
    #[error("message is empty")]
    EmptyMessage,
}

#[derive(Parser, Debug)]
#[command(name = "krishi-chat", about = "Streaming farm-advice chat in the terminal")]
struct Cli {
    #[arg(long, env = "KRISHI_API_BASE_URL")]
    base_url: Option<String>,

    #[arg(long, env = "KRISHI_STORE_DIR")]
    store_dir: Option<PathBuf>,

    /// Print rendered markup instead of plain text.
    #[arg(long)]
    raw: bool,

    /// Log at info level instead of warn.
    #[arg(long, short)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Interactive session (`/open`, `/close`, `/clear`, `/lang en|hi`, `/suggest N`, `/quit`).
    Chat,
    /// Send one message and print the reply.
    Send { message: Vec<String> },
    /// Print the persisted conversation.
    History,
    /// Delete the persisted conversation.
    Clear,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), CliError> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let level = if cli.verbose { tracing::Level::INFO } else { tracing::Level::WARN };
    tracing_subscriber::fmt().with_max_level(level).with_writer(io::stderr).init();

    let config = WidgetConfig::from_env();
    let base_url = cli.base_url.unwrap_or(config.api_base_url);
    let store_dir = cli.store_dir.unwrap_or(config.store_dir);
    let store = ConversationStore::new(Arc::new(FileStore::open(store_dir)?));

    match cli.command {
        Command::History => {
            run_history(&store);
            Ok(())
        }
        Command::Clear => {
            store.clear_history()?;
            println!("history cleared");
            Ok(())
        }
        Command::Send { message } => {
            let mut manager = build_manager(store, &base_url, config.min_submit_interval)?;
            run_send(&mut manager, &message.join(" "), cli.raw).await
        }
        Command::Chat => {
            let mut manager = build_manager(store, &base_url, config.min_submit_interval)?;
            run_chat(&mut manager, cli.raw).await
        }
    }
}

fn build_manager(store: ConversationStore, base_url: &str, min_interval: Duration) -> Result<Manager, CliError> {
    let transport = Arc::new(HttpTransport::new(base_url)?);
    let mut manager = ConversationManager::new(store, MemorySurface::new(), transport)
        .with_throttle(SubmitThrottle::new(min_interval));
    manager.restore();
    Ok(manager)
}

// =============================================================================
// SUBCOMMANDS
// =============================================================================

fn run_history(store: &ConversationStore) {
    let turns = store.load_history();
    if turns.is_empty() {
        println!("(no history)");
    }
    for turn in turns {
        let who = match turn.role {
            Role::User => "you",
            Role::Assistant => "krishi",
        };
        println!("{who}> {}", turn.content);
    }
}

async fn run_send(manager: &mut Manager, message: &str, raw: bool) -> Result<(), CliError> {
    if message.trim().is_empty() {
        return Err(CliError::EmptyMessage);
    }
    submit_and_print(manager, message, raw).await;
    Ok(())
}

enum ChatCommand<'a> {
    Quit,
    Open,
    Close,
    Clear,
    Lang(Option<Language>),
    Suggest(Option<usize>),
    Say(&'a str),
}

fn parse_command(line: &str) -> ChatCommand<'_> {
    let line = line.trim();
    let (head, arg) = line.split_once(' ').map_or((line, ""), |(h, a)| (h, a.trim()));
    match head {
        "/quit" | "/exit" => ChatCommand::Quit,
        "/open" => ChatCommand::Open,
        "/close" => ChatCommand::Close,
        "/clear" => ChatCommand::Clear,
        "/lang" => ChatCommand::Lang(Language::from_tag(arg)),
        "/suggest" => ChatCommand::Suggest(arg.parse::<usize>().ok().and_then(|n| n.checked_sub(1))),
        _ => ChatCommand::Say(line),
    }
}

async fn run_chat(manager: &mut Manager, raw: bool) -> Result<(), CliError> {
    print_nodes(manager.surface().nodes(), raw, true);
    print_suggestions(manager);
    println!("({})", i18n::text(manager.language(), Key::InputPlaceholder));

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        print!("{} > ", manager.visibility().as_str());
        io::stdout().flush()?;
        let Some(line) = lines.next() else {
            break;
        };
        let line = line?;
        match parse_command(&line) {
            ChatCommand::Quit => break,
            ChatCommand::Open => {
                manager.open();
                println!("(opened, unread cleared)");
            }
            ChatCommand::Close => {
                manager.close();
                println!("(minimized)");
            }
            ChatCommand::Clear => {
                println!("{}", i18n::text(manager.language(), Key::ClearConfirm));
                print!("[y/N] ");
                io::stdout().flush()?;
                let answer = lines.next().transpose()?.unwrap_or_default();
                if answer.trim().eq_ignore_ascii_case("y") {
                    manager.clear_history();
                    print_nodes(manager.surface().nodes(), raw, true);
                    print_suggestions(manager);
                }
            }
            ChatCommand::Lang(Some(language)) => {
                manager.set_language(language);
                print_suggestions(manager);
            }
            ChatCommand::Lang(None) => println!("usage: /lang en|hi"),
            ChatCommand::Suggest(index) => {
                let prompt = index.and_then(|i| manager.suggestion(i));
                if let Some(prompt) = prompt {
                    println!("you> {prompt}");
                    submit_and_print(manager, prompt, raw).await;
                } else {
                    println!("usage: /suggest 1-5");
                }
            }
            ChatCommand::Say(message) => {
                submit_and_print(manager, message, raw).await;
            }
        }
    }
    Ok(())
}

// =============================================================================
// OUTPUT
// =============================================================================

async fn submit_and_print(manager: &mut Manager, message: &str, raw: bool) {
    let seen = manager.surface().nodes().len();
    let outcome = manager.submit(message).await;
    print_nodes(&manager.surface().nodes()[seen..], raw, false);
    match outcome {
        SubmitOutcome::Busy => println!("(still answering the previous message)"),
        SubmitOutcome::Completed { reply: None } => println!("(empty reply)"),
        SubmitOutcome::Failed { error } => tracing::warn!(%error, "chat: exchange failed"),
        SubmitOutcome::Ignored | SubmitOutcome::Throttled { .. } | SubmitOutcome::Completed { .. } => {}
    }
    if manager.unread() > 0 {
        println!("({} unread)", manager.unread());
    }
}

fn print_nodes(nodes: &[MessageNode], raw: bool, include_user: bool) {
    for node in nodes {
        if node.sender == Sender::User && !include_user {
            continue;
        }
        let body = if raw { node.markup.clone() } else { to_plain_text(&node.markup) };
        if body.is_empty() {
            continue;
        }
        let who = match node.sender {
            Sender::User => "you",
            Sender::Assistant => "krishi",
            Sender::Notice => "notice",
        };
        println!("{who}> {body}\n");
    }
}

fn print_suggestions(manager: &Manager) {
    let suggestions = manager.suggestions();
    println!("{}", suggestions.heading);
    for (i, item) in suggestions.items.iter().enumerate() {
        println!("  {}. {item}", i + 1);
    }
}
