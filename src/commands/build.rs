//! Interactive build session handler
//!
//! Creates the generator and the builder flow, starts the preview server,
//! seeds the session from the command line or the entry prompt, then runs
//! a readline loop that submits each request to the builder.

use crate::commands::entry;
use crate::commands::special_commands::{parse_special_command, print_help, SpecialCommand};
use crate::config::Config;
use crate::error::Result;
use crate::formatter::display_source;
use crate::preview::{PreviewContext, PreviewServer, PreviewState};
use crate::providers::{create_generator, CodeGenerator};
use crate::session::{BuilderFlow, Phase, Role, SessionSnapshot, SubmitOutcome};

use colored::Colorize;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};
use tokio_util::sync::CancellationToken;

const NO_DOCUMENT_YET: &str = "Nothing has been generated yet.";

/// Start an interactive build session
///
/// # Arguments
///
/// * `config` - Global configuration (consumed)
/// * `initial_prompt` - Request that seeds the session; when `None` the
///   entry prompt asks for one
///
/// # Errors
///
/// Returns error if credentials are missing, the generator cannot be
/// created, the preview server cannot bind, or the terminal fails
pub async fn run_build(config: Config, initial_prompt: Option<String>) -> Result<()> {
    tracing::info!("Starting build session");
    config.require_credentials()?;

    let generator: Arc<dyn CodeGenerator> = Arc::from(create_generator(&config)?);
    let flow = Arc::new(BuilderFlow::from_config(generator, &config.builder));
    let view = Arc::new(RwLock::new(PreviewState::new(
        config.preview.default_mode,
        config.preview.default_viewport,
    )));

    let server = if config.preview.enabled {
        let context = PreviewContext::new(flow.subscribe(), view.clone());
        Some(PreviewServer::spawn(&config.preview.host, config.preview.port, context).await?)
    } else {
        tracing::debug!("Preview server disabled");
        None
    };
    let preview_url = server.as_ref().map(PreviewServer::url);

    let mut rl = DefaultEditor::new()?;
    print_welcome_banner(flow.generator(), preview_url.as_deref());

    if config.preview.open_browser {
        open_preview(preview_url.as_deref());
    }

    let seed = match initial_prompt.filter(|prompt| !prompt.trim().is_empty()) {
        Some(prompt) => Some(prompt),
        None => entry::read_initial_prompt(&mut rl)?,
    };

    match seed {
        Some(prompt) => {
            println!("{} {}\n", "you:".bold(), prompt);
            let session: &BuilderFlow = &flow;
            let first: &str = &prompt;
            let seeded =
                interruptible(move |cancel| session.seed_with_cancel(first, cancel)).await;
            if let Some(outcome) = seeded {
                report_outcome(&outcome, &flow.snapshot(), preview_url.as_deref());
            }
            run_loop(&mut rl, &flow, &view, preview_url.as_deref()).await?;
        }
        None => tracing::info!("No initial request given, leaving"),
    }

    if let Some(server) = server {
        server.shutdown().await;
    }
    println!("Goodbye!");
    Ok(())
}

async fn run_loop(
    rl: &mut DefaultEditor,
    flow: &BuilderFlow,
    view: &RwLock<PreviewState>,
    preview_url: Option<&str>,
) -> Result<()> {
    let prompt = format!("{} ", "build>".green().bold());

    loop {
        match rl.readline(&prompt) {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }

                let command = match parse_special_command(trimmed) {
                    Ok(command) => command,
                    Err(e) => {
                        eprintln!("{}", e.to_string().red());
                        continue;
                    }
                };

                match command {
                    SpecialCommand::ShowSource => print_source(&flow.snapshot()),
                    SpecialCommand::CopySource => copy_source(&flow.snapshot()),
                    SpecialCommand::Save(dir) => save_document(&flow.snapshot(), dir),
                    SpecialCommand::Open => open_preview(preview_url),
                    SpecialCommand::SetViewport(viewport) => {
                        update_view(view, |state| state.viewport = viewport);
                        println!("Preview viewport set to {} ({})\n", viewport, viewport.css_width());
                    }
                    SpecialCommand::SetView(mode) => {
                        update_view(view, |state| state.mode = mode);
                        println!("Preview opens in {} mode\n", mode.colored_tag());
                    }
                    SpecialCommand::History => print_history(&flow.snapshot()),
                    SpecialCommand::ShowStatus => {
                        print_status_display(flow, &read_view(view), preview_url)
                    }
                    SpecialCommand::Help => print_help(),
                    SpecialCommand::Exit => break,
                    SpecialCommand::None => {
                        rl.add_history_entry(trimmed)?;
                        let outcome = submit_interruptible(flow, &line).await;
                        report_outcome(&outcome, &flow.snapshot(), preview_url);
                    }
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("CTRL-C");
                break;
            }
            Err(ReadlineError::Eof) => {
                println!("CTRL-D");
                break;
            }
            Err(err) => {
                tracing::error!("Readline error: {:?}", err);
                break;
            }
        }
    }

    Ok(())
}

/// Submit a request; CTRL-C while it runs cancels it instead of quitting
async fn submit_interruptible(flow: &BuilderFlow, text: &str) -> SubmitOutcome {
    interruptible(move |cancel| flow.submit_with_cancel(text, cancel)).await
}

/// Run a generation with CTRL-C wired to its cancellation token
async fn interruptible<F, Fut, T>(start: F) -> T
where
    F: FnOnce(CancellationToken) -> Fut,
    Fut: Future<Output = T>,
{
    println!("{}", "Generating...".dimmed());

    let cancel = CancellationToken::new();
    let generation = start(cancel.clone());
    tokio::pin!(generation);

    tokio::select! {
        result = &mut generation => result,
        _ = tokio::signal::ctrl_c() => {
            println!("{}", "Cancelling...".yellow());
            cancel.cancel();
            generation.await
        }
    }
}

fn report_outcome(outcome: &SubmitOutcome, snapshot: &SessionSnapshot, preview_url: Option<&str>) {
    match outcome {
        SubmitOutcome::Completed { summary } => {
            println!("\n{} {}", "sitewright:".cyan().bold(), summary);
            if let Some(url) = preview_url {
                println!("{}", format!("Preview updated at {}", url).dimmed());
            }
            println!();
        }
        SubmitOutcome::Failed { kind } => {
            tracing::debug!("Reporting failed generation: {}", kind);
            if let Some(turn) = snapshot.conversation.last() {
                println!("\n{} {}\n", "sitewright:".cyan().bold(), turn.content.red());
            }
        }
        SubmitOutcome::Rejected => {
            println!("{}\n", "A generation is already running; wait for it to finish.".yellow());
        }
        SubmitOutcome::Ignored => {}
    }
}

fn print_source(snapshot: &SessionSnapshot) {
    match snapshot.document.as_context() {
        Some(html) => println!("\n{}", display_source(html)),
        None => println!("{}\n", NO_DOCUMENT_YET.yellow()),
    }
}

fn copy_source(snapshot: &SessionSnapshot) {
    let Some(html) = snapshot.document.as_context() else {
        println!("{}\n", NO_DOCUMENT_YET.yellow());
        return;
    };

    let source = display_source(html);
    let copied = arboard::Clipboard::new().and_then(|mut clipboard| clipboard.set_text(source));
    match copied {
        Ok(()) => println!("{}\n", "Copied!".green()),
        Err(e) => {
            tracing::warn!("Clipboard unavailable: {}", e);
            eprintln!("{}\n", format!("Failed to copy: {}", e).red());
        }
    }
}

fn save_document(snapshot: &SessionSnapshot, dir: Option<PathBuf>) {
    let dir = dir.unwrap_or_else(|| PathBuf::from("."));
    match export_snapshot(snapshot, &dir) {
        Ok(path) => println!("{}\n", format!("Saved {}", path.display()).green()),
        Err(e) => eprintln!("{}\n", e.to_string().red()),
    }
}

/// Write the snapshot's document to `dir/index.html`
pub fn export_snapshot(snapshot: &SessionSnapshot, dir: &Path) -> Result<PathBuf> {
    let path = snapshot.document.export_to(dir)?;
    tracing::info!("Exported document to {}", path.display());
    Ok(path)
}

fn open_preview(preview_url: Option<&str>) {
    match preview_url {
        Some(url) => {
            if let Err(e) = open::that(url) {
                tracing::warn!("Failed to open browser: {}", e);
                eprintln!("{}", format!("Could not open a browser; visit {}", url).yellow());
            }
        }
        None => println!(
            "{}\n",
            "The preview server is disabled (started with --no-preview).".yellow()
        ),
    }
}

fn update_view(view: &RwLock<PreviewState>, change: impl FnOnce(&mut PreviewState)) {
    let mut guard = view.write().unwrap_or_else(|poisoned| poisoned.into_inner());
    change(&mut guard);
}

fn read_view(view: &RwLock<PreviewState>) -> PreviewState {
    *view.read().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn print_history(snapshot: &SessionSnapshot) {
    if snapshot.conversation.is_empty() {
        println!("{}\n", entry::EMPTY_CONVERSATION_HINT.dimmed());
        return;
    }

    println!();
    for turn in snapshot.conversation.turns() {
        let speaker = match turn.role {
            Role::User => "you:".bold(),
            Role::Assistant => "sitewright:".cyan().bold(),
        };
        println!(
            "{} {} {}",
            turn.created_at.format("%H:%M:%S").to_string().dimmed(),
            speaker,
            turn.content
        );
    }
    println!();
}

/// Display a welcome banner at the start of a build session
fn print_welcome_banner(generator: &dyn CodeGenerator, preview_url: Option<&str>) {
    println!("\n╔══════════════════════════════════════════════════════════════╗");
    println!("║              Sitewright Build Session - Welcome!             ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");
    println!("Model:   {} ({})", generator.model().cyan(), generator.name());
    match preview_url {
        Some(url) => println!("Preview: {}\n", url.underline()),
        None => println!("Preview: {}\n", "disabled".dimmed()),
    }
    println!("Type '/help' for available commands, 'exit' to quit\n");
}

/// Display detailed status information about the current session
fn print_status_display(flow: &BuilderFlow, view: &PreviewState, preview_url: Option<&str>) {
    let snapshot = flow.snapshot();
    let generator = flow.generator();

    println!("\n╔══════════════════════════════════════════════════════════════╗");
    println!("║                   Sitewright Session Status                  ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");
    println!("Generator:         {} ({})", generator.name(), generator.model());
    println!(
        "Phase:             {}",
        match snapshot.phase {
            Phase::Idle => "idle".green(),
            Phase::Generating => "generating".yellow(),
        }
    );
    println!("Conversation Size: {} turns", snapshot.conversation.len());
    println!(
        "Document:          {}",
        snapshot
            .document
            .as_context()
            .map(|html| format!("{} bytes", html.len()))
            .unwrap_or_else(|| "none yet".to_string())
    );
    println!("Preview Mode:      {}", view.mode.colored_tag());
    println!(
        "Viewport:          {} ({})",
        view.viewport.label(),
        view.viewport.css_width()
    );
    println!("Preview URL:       {}", preview_url.unwrap_or("disabled"));
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preview::Viewport;
    use crate::test_utils::{temp_dir, ScriptedGenerator};
    use std::time::Duration;

    fn flow() -> BuilderFlow {
        BuilderFlow::new(Arc::new(ScriptedGenerator::new()), Duration::from_secs(5))
    }

    #[tokio::test]
    async fn test_run_build_requires_credentials() {
        let mut config = Config::default();
        config.provider.gemini.api_key = None;
        let err = run_build(config, Some("x".to_string())).await.unwrap_err();
        assert!(err.to_string().contains("Missing credentials"));
    }

    #[tokio::test]
    async fn test_export_snapshot_writes_exact_bytes() {
        let flow = flow();
        flow.submit("a bakery").await;
        let dir = temp_dir();

        let path = export_snapshot(&flow.snapshot(), dir.path()).unwrap();
        assert_eq!(path, dir.path().join("index.html"));
        let written = std::fs::read_to_string(path).unwrap();
        assert_eq!(Some(written.as_str()), flow.snapshot().document.html());
    }

    #[test]
    fn test_export_snapshot_without_document_fails() {
        let dir = temp_dir();
        assert!(export_snapshot(&SessionSnapshot::default(), dir.path()).is_err());
        assert!(!dir.path().join("index.html").exists());
    }

    #[tokio::test]
    async fn test_seed_runs_through_interruptible() {
        let flow = flow();
        let outcome = interruptible(|cancel| flow.seed_with_cancel("a bakery", cancel)).await;

        assert!(matches!(outcome, Some(SubmitOutcome::Completed { .. })));
        assert_eq!(flow.snapshot().conversation.len(), 2);
    }

    #[tokio::test]
    async fn test_interruptible_hands_out_a_live_token() {
        let cancelled = interruptible(|cancel| async move { cancel.is_cancelled() }).await;
        assert!(!cancelled);
    }

    #[test]
    fn test_update_view_changes_shared_state() {
        let view = RwLock::new(PreviewState::default());
        update_view(&view, |state| state.viewport = Viewport::Mobile);
        assert_eq!(read_view(&view).viewport, Viewport::Mobile);
    }

    #[tokio::test]
    async fn test_printing_helpers_do_not_panic() {
        let flow = flow();
        print_history(&flow.snapshot());
        print_source(&flow.snapshot());
        flow.submit("a bakery").await;
        print_history(&flow.snapshot());
        print_source(&flow.snapshot());
        print_status_display(&flow, &PreviewState::default(), None);
        report_outcome(
            &SubmitOutcome::Completed {
                summary: "done".to_string(),
            },
            &flow.snapshot(),
            Some("http://127.0.0.1:4173/"),
        );
    }
}
