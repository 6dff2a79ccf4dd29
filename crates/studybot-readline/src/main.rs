use std::borrow::Cow::{self, Borrowed, Owned};
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context as _, Result};
use clap::Parser;
use colored::Colorize;
use rustyline::completion::{Completer, Pair};
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::validate::Validator;
use rustyline::{Context, Editor, Helper};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use studybot_application::ConversationSession;
use studybot_core::assistant::{KNOWN_TOPICS, ProviderLabel, ProviderPolicy, ReplyComposer};
use studybot_core::config::AssistantConfig;
use studybot_core::session::{RejectReason, SubmitOutcome};
use studybot_infrastructure::{load_config, load_default_config};

const COMMANDS: [&str; 8] = [
    "/clear", "/topic", "/prompts", "/ask", "/hide", "/show", "/stop", "/status",
];

/// Interactive study assistant.
#[derive(Parser)]
#[command(name = "studybot")]
#[command(about = "Studybot REPL - ask questions about the topic you are reading", long_about = None)]
struct Args {
    /// Config file (defaults to ~/.config/studybot/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Initial navigation context, e.g. "/topics/javascript/closures"
    #[arg(long, default_value = "")]
    context: String,

    /// Emit logs as JSON lines on stderr
    #[arg(long)]
    log_json: bool,
}

/// Rustyline helper: completes commands, `/topic` keys and `/ask` numbers.
#[derive(Clone)]
struct CliHelper {
    commands: Vec<String>,
    topics: Vec<String>,
    prompts: Vec<String>,
}

impl CliHelper {
    fn new(prompts: &[&str]) -> Self {
        Self {
            commands: COMMANDS.iter().map(|c| c.to_string()).collect(),
            topics: KNOWN_TOPICS.iter().map(|t| t.to_string()).collect(),
            prompts: prompts.iter().map(|p| p.to_string()).collect(),
        }
    }

    /// Quick prompts change with the navigation context.
    fn set_prompts(&mut self, prompts: &[&str]) {
        self.prompts = prompts.iter().map(|p| p.to_string()).collect();
    }

    fn argument_candidates(&self, command: &str, partial: &str) -> Vec<Pair> {
        match command {
            "/topic" => self
                .topics
                .iter()
                .filter(|topic| topic.starts_with(partial))
                .map(|topic| Pair {
                    display: topic.clone(),
                    replacement: topic.clone(),
                })
                .collect(),
            "/ask" => self
                .prompts
                .iter()
                .enumerate()
                .map(|(i, prompt)| ((i + 1).to_string(), prompt))
                .filter(|(number, _)| number.starts_with(partial))
                .map(|(number, prompt)| Pair {
                    display: format!("{}. {}", number, prompt),
                    replacement: number,
                })
                .collect(),
            _ => Vec::new(),
        }
    }

    fn hint_for(&self, line: &str) -> Option<String> {
        match line.split_once(' ') {
            None if line.starts_with('/') => self
                .commands
                .iter()
                .find(|cmd| cmd.starts_with(line) && cmd.len() > line.len())
                .map(|cmd| cmd[line.len()..].to_string()),
            Some(("/topic", partial)) if !partial.is_empty() => self
                .topics
                .iter()
                .find(|topic| topic.starts_with(partial) && topic.len() > partial.len())
                .map(|topic| topic[partial.len()..].to_string()),
            _ => None,
        }
    }
}

impl Helper for CliHelper {}

impl Completer for CliHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let line = &line[..pos];

        match line.split_once(' ') {
            None if line.starts_with('/') => {
                let candidates = self
                    .commands
                    .iter()
                    .filter(|cmd| cmd.starts_with(line))
                    .map(|cmd| Pair {
                        display: cmd.clone(),
                        replacement: cmd.clone(),
                    })
                    .collect();
                Ok((0, candidates))
            }
            Some((command, partial)) => Ok((
                command.len() + 1,
                self.argument_candidates(command, partial),
            )),
            None => Ok((0, vec![])),
        }
    }
}

impl Highlighter for CliHelper {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        if !line.starts_with('/') {
            return Borrowed(line);
        }
        match line.split_once(' ') {
            Some((command, argument)) if self.topics.iter().any(|t| t == argument.trim()) => {
                Owned(format!("{} {}", command.bright_cyan(), argument.green()))
            }
            Some((command, argument)) => Owned(format!("{} {}", command.bright_cyan(), argument)),
            None => Owned(line.bright_cyan().to_string()),
        }
    }

    fn highlight_char(&self, _line: &str, _pos: usize, _forced: bool) -> bool {
        true
    }
}

impl Hinter for CliHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, _ctx: &Context<'_>) -> Option<String> {
        self.hint_for(&line[..pos])
    }
}

impl Validator for CliHelper {}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn print_assistant_text(text: &str) {
    for line in text.lines() {
        println!("{}", line.bright_blue());
    }
}

fn print_rejection(reason: RejectReason) {
    let text = match reason {
        RejectReason::EmptyInput => "Nothing to send.",
        RejectReason::StreamInProgress => "Still answering the previous question...",
        RejectReason::UnknownPrompt => "No quick prompt with that number. Try /prompts.",
    };
    println!("{}", text.yellow());
}

/// How following a reply ended.
#[derive(Debug, PartialEq, Eq)]
enum FollowEnd {
    Finished,
    Interrupted,
}

/// Writes the part of `content` not yet written.
fn write_delta(out: &mut impl Write, content: &str, printed: &mut usize) -> io::Result<()> {
    if content.len() > *printed {
        write!(out, "{}", content[*printed..].bright_blue())?;
        out.flush()?;
        *printed = content.len();
    }
    Ok(())
}

/// Prints the reply as it is revealed, until the session is idle again.
///
/// If `interrupt` resolves first the stream is stopped and the frozen
/// partial reply is kept.
async fn follow_reply(
    session: &ConversationSession,
    reply_id: Uuid,
    interrupt: impl Future<Output = ()>,
    out: &mut impl Write,
) -> io::Result<FollowEnd> {
    let mut updates = session.subscribe();
    let mut printed = 0;
    tokio::pin!(interrupt);

    loop {
        let snapshot = updates.borrow_and_update().clone();
        if let Some(reply) = snapshot.messages.iter().find(|m| m.id == reply_id) {
            write_delta(out, &reply.content, &mut printed)?;
            if !snapshot.is_streaming() {
                writeln!(out)?;
                for source in &reply.sources {
                    writeln!(
                        out,
                        "{}",
                        format!("  ↳ {} ({})", source.label, source.path).bright_black()
                    )?;
                }
                return Ok(FollowEnd::Finished);
            }
        }

        tokio::select! {
            changed = updates.changed() => {
                if changed.is_err() {
                    writeln!(out)?;
                    return Ok(FollowEnd::Finished);
                }
            }
            _ = &mut interrupt => {
                session.stop();
                if let Some(reply) = session.snapshot().messages.iter().find(|m| m.id == reply_id) {
                    write_delta(out, &reply.content, &mut printed)?;
                }
                writeln!(out, " {}", "[stopped]".yellow())?;
                return Ok(FollowEnd::Interrupted);
            }
        }
    }
}

/// Resolves on Ctrl-C. Never resolves if the handler cannot be installed.
async fn ctrl_c() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("[Startup] Cannot listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
}

async fn handle_outcome(
    session: &ConversationSession,
    policy: &ProviderPolicy,
    outcome: SubmitOutcome,
    hidden: bool,
) {
    match outcome {
        SubmitOutcome::Rejected(reason) => print_rejection(reason),
        SubmitOutcome::Accepted {
            reply_id, provider, ..
        } => {
            if hidden {
                println!(
                    "{}",
                    "Widget hidden: the reply will arrive in the background (/show to open)."
                        .bright_black()
                );
                return;
            }
            println!("{}", format!("[{}]", policy.display_name(provider)).bright_magenta());
            let mut stdout = io::stdout();
            if let Err(e) = follow_reply(session, reply_id, ctrl_c(), &mut stdout).await {
                eprintln!("{}", format!("Error: {}", e).red());
            }
        }
    }
}

/// The main entry point for the Studybot REPL.
///
/// Loads configuration, creates one conversation session for the given
/// navigation context, and streams replies to the terminal.
#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.log_json);

    // ===== Backend Initialization =====
    let config: AssistantConfig = match &args.config {
        Some(path) => load_config(path),
        None => load_default_config(),
    }
    .context("Failed to load configuration")?;

    let composer = Arc::new(ReplyComposer::from_config(&config));
    let policy = composer.policy().clone();
    let session = ConversationSession::new(composer, &config, args.context.clone())
        .context("Failed to create session")?;
    tracing::info!("[Startup] Session {} ready (context: '{}')", session.id(), args.context);

    // ===== REPL Setup =====
    let mut rl = Editor::new()?;
    rl.set_helper(Some(CliHelper::new(session.quick_prompts())));

    println!("{}", "=== Studybot ===".bright_magenta().bold());
    println!(
        "{}",
        "Ask a question, or use /prompts, /ask <n>, /topic <path>, /clear, /hide, /show, /stop, /status. 'quit' exits."
            .bright_black()
    );
    println!();
    print_assistant_text(&config.texts.greeting);
    println!();

    let mut hidden = false;

    // ===== Main REPL Loop =====
    loop {
        let readline = rl.readline(">> ");

        match readline {
            Ok(line) => {
                let trimmed = line.trim();

                if trimmed == "quit" || trimmed == "exit" {
                    println!("{}", "Goodbye!".bright_green());
                    break;
                }

                if trimmed.is_empty() {
                    continue;
                }

                let _ = rl.add_history_entry(&line);

                let (command, argument) = match trimmed.split_once(' ') {
                    Some((command, argument)) => (command, argument.trim()),
                    None => (trimmed, ""),
                };

                match command {
                    "/clear" => {
                        session.reset();
                        if let Some(message) = session.snapshot().messages.first() {
                            print_assistant_text(&message.content);
                        }
                    }
                    "/topic" => {
                        session.navigate(argument);
                        if let Some(helper) = rl.helper_mut() {
                            helper.set_prompts(session.quick_prompts());
                        }
                        println!("{}", format!("Context set to '{}'", argument).green());
                    }
                    "/prompts" => {
                        for (i, prompt) in session.quick_prompts().iter().enumerate() {
                            println!("{}", format!("  {}. {}", i + 1, prompt).cyan());
                        }
                    }
                    "/ask" => {
                        let outcome = match argument.parse::<usize>() {
                            Ok(n) if n > 0 => session.submit_quick_prompt(n - 1),
                            _ => SubmitOutcome::Rejected(RejectReason::UnknownPrompt),
                        };
                        handle_outcome(&session, &policy, outcome, hidden).await;
                    }
                    "/hide" => {
                        hidden = true;
                        session.background();
                        println!("{}", "Widget hidden.".bright_black());
                    }
                    "/show" => {
                        hidden = false;
                        let snapshot = session.snapshot();
                        session.foreground();
                        if snapshot.unread {
                            println!("{}", "New reply while you were away:".bright_yellow());
                            if let Some(reply) = snapshot.last_assistant() {
                                print_assistant_text(&reply.content);
                            }
                        }
                    }
                    "/stop" => {
                        if session.stop() {
                            println!("{}", "Stopped.".yellow());
                        }
                    }
                    "/status" => {
                        let snapshot = session.snapshot();
                        println!(
                            "{}",
                            format!(
                                "{} messages, {} after {}",
                                snapshot.messages.len(),
                                policy.display_name(ProviderLabel::Fallback),
                                policy.threshold()
                            )
                            .bright_black()
                        );
                        match snapshot.to_json() {
                            Ok(json) => println!("{}", json.bright_black()),
                            Err(e) => eprintln!("{}", format!("Error: {}", e).red()),
                        }
                    }
                    _ if command.starts_with('/') => {
                        println!("{}", "Unknown command".bright_black());
                    }
                    _ => {
                        println!("{}", format!("> {}", trimmed).green());
                        let outcome = session.submit(trimmed);
                        handle_outcome(&session, &policy, outcome, hidden).await;
                    }
                }
            }
            Err(rustyline::error::ReadlineError::Interrupted) => {
                if session.stop() {
                    println!("{}", "Stopped.".yellow());
                } else {
                    println!("{}", "CTRL-C detected. Type 'quit' to exit.".yellow());
                }
            }
            Err(rustyline::error::ReadlineError::Eof) => {
                println!("{}", "CTRL-D detected. Exiting...".bright_green());
                break;
            }
            Err(err) => {
                eprintln!("{}", format!("Error: {:?}", err).red());
                break;
            }
        }
    }

    session.teardown();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn javascript_session() -> ConversationSession {
        let config = AssistantConfig::default();
        let composer = Arc::new(ReplyComposer::from_config(&config));
        ConversationSession::new(composer, &config, "/topics/javascript".to_string()).unwrap()
    }

    fn accepted_id(outcome: SubmitOutcome) -> Uuid {
        match outcome {
            SubmitOutcome::Accepted { reply_id, .. } => reply_id,
            SubmitOutcome::Rejected(reason) => panic!("rejected: {:?}", reason),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_follow_reply_prints_full_answer_and_sources() {
        colored::control::set_override(false);
        let session = javascript_session();
        let reply_id = accepted_id(session.submit("What is a closure?"));

        let mut out = Vec::new();
        let end = follow_reply(&session, reply_id, std::future::pending(), &mut out)
            .await
            .unwrap();

        assert_eq!(end, FollowEnd::Finished);
        let printed = String::from_utf8(out).unwrap();
        let reply = &session.snapshot().messages[2];
        assert!(printed.starts_with(&reply.content));
        for source in &reply.sources {
            assert!(printed.contains(&source.label));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_interrupt_stops_stream_and_keeps_partial() {
        colored::control::set_override(false);
        let session = javascript_session();
        let reply_id = accepted_id(session.submit("What is a closure?"));

        let mut out = Vec::new();
        let interrupt = tokio::time::sleep(Duration::from_millis(12 * 10 + 1));
        let end = follow_reply(&session, reply_id, interrupt, &mut out)
            .await
            .unwrap();

        assert_eq!(end, FollowEnd::Interrupted);
        assert!(!session.is_streaming());
        let partial = session.snapshot().messages[2].content.clone();
        assert!(!partial.is_empty());
        assert!(partial.len() < 50);
        assert_eq!(String::from_utf8(out).unwrap(), format!("{} [stopped]\n", partial));

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(session.snapshot().messages[2].content, partial);
    }

    #[test]
    fn test_topic_argument_completion_and_hint() {
        let helper = CliHelper::new(&[]);
        let candidates = helper.argument_candidates("/topic", "py");
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].replacement, "python");
        assert_eq!(helper.hint_for("/topic ja"), Some("vascript".to_string()));
        assert_eq!(helper.hint_for("/topic rust"), None);
        assert_eq!(helper.hint_for("/pro"), Some("mpts".to_string()));
    }

    #[test]
    fn test_ask_completion_follows_current_prompts() {
        let mut helper = CliHelper::new(&["Flexbox or Grid?", "How does specificity work?"]);
        let candidates = helper.argument_candidates("/ask", "");
        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[1].replacement, "2");
        assert_eq!(candidates[1].display, "2. How does specificity work?");

        helper.set_prompts(&["What is ownership?"]);
        assert_eq!(helper.argument_candidates("/ask", "").len(), 1);
        assert!(helper.argument_candidates("/ask", "2").is_empty());
    }
}
