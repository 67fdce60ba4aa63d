//! Interactive court session.
//!
//! Plain lines are chat messages sent as the selected role; lines starting
//! with `/` are commands. Phase generation and chat replies run in the
//! background while the prompt keeps accepting commands.

use std::future::Future;
use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::mpsc;

use crate::core::{Action, ChatError, Court, Effect, Notice};
use crate::domain::{ChatMessage, CourtPhase, EvidenceDraft, Speaker, EVIDENCE_TYPES};

const HELP: &str = "\
Commands:
  /phases                                   list court phases
  /phase <id|number>                        show a phase, generating it if needed
  /regen <id|number>                        generate a phase again
  /evidence                                 list evidence
  /evidence add <type> | <name> | <summary> add evidence (type optional)
  /new <file>                               start a new case from a facts file
  /reset                                    load the demo case
  /role <judge|plaintiff|defendant>         change your chat role
  /context                                  print the case context
  /help                                     show this help
  /quit                                     leave once pending replies arrive
Any other line is sent to the assistant as a chat message.";

/// A parsed input line
#[derive(Debug, Clone)]
pub enum SessionCommand {
    Chat(String),
    Phases,
    Phase(CourtPhase),
    Regenerate(CourtPhase),
    ListEvidence,
    AddEvidence(EvidenceDraft),
    NewCase(PathBuf),
    Reset,
    Role(Speaker),
    Context,
    Help,
    Quit,
    Blank,
}

/// Input lines that could not be parsed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("Unknown command '/{0}', type /help")]
    UnknownCommand(String),

    #[error("Usage: {0}")]
    Usage(&'static str),

    #[error("Unknown phase '{0}', type /phases")]
    UnknownPhase(String),

    #[error("{0}")]
    Role(String),
}

/// Parse one input line
pub fn parse_command(line: &str) -> Result<SessionCommand, CommandError> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(SessionCommand::Blank);
    }
    let Some(command) = line.strip_prefix('/') else {
        return Ok(SessionCommand::Chat(line.to_string()));
    };

    let (name, rest) = match command.split_once(char::is_whitespace) {
        Some((name, rest)) => (name, rest.trim()),
        None => (command, ""),
    };

    match name.to_ascii_lowercase().as_str() {
        "phases" => Ok(SessionCommand::Phases),
        "phase" | "p" => parse_phase(rest, "/phase <id|number>").map(SessionCommand::Phase),
        "regen" => parse_phase(rest, "/regen <id|number>").map(SessionCommand::Regenerate),
        "evidence" | "e" => parse_evidence(rest),
        "new" => {
            if rest.is_empty() {
                return Err(CommandError::Usage("/new <file>"));
            }
            Ok(SessionCommand::NewCase(PathBuf::from(rest)))
        }
        "reset" => Ok(SessionCommand::Reset),
        "role" => rest
            .parse::<Speaker>()
            .map(SessionCommand::Role)
            .map_err(|e| CommandError::Role(e.to_string())),
        "context" => Ok(SessionCommand::Context),
        "help" | "?" => Ok(SessionCommand::Help),
        "quit" | "exit" | "q" => Ok(SessionCommand::Quit),
        other => Err(CommandError::UnknownCommand(other.to_string())),
    }
}

fn parse_phase(selector: &str, usage: &'static str) -> Result<CourtPhase, CommandError> {
    if selector.is_empty() {
        return Err(CommandError::Usage(usage));
    }
    CourtPhase::parse_selector(selector)
        .ok_or_else(|| CommandError::UnknownPhase(selector.to_string()))
}

fn parse_evidence(rest: &str) -> Result<SessionCommand, CommandError> {
    const USAGE: &str = "/evidence add <type> | <name> | <summary>";

    if rest.is_empty() {
        return Ok(SessionCommand::ListEvidence);
    }
    let (verb, fields) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
    if !verb.eq_ignore_ascii_case("add") {
        return Err(CommandError::Usage(USAGE));
    }

    let parts: Vec<&str> = fields.split('|').map(str::trim).collect();
    let draft = match parts.as_slice() {
        [kind, name, summary] => EvidenceDraft::new(*name, *summary).with_kind(*kind),
        [name, summary] => EvidenceDraft::new(*name, *summary),
        _ => return Err(CommandError::Usage(USAGE)),
    };
    Ok(SessionCommand::AddEvidence(draft))
}

/// Model calls started from the prompt, finished in the background
enum Completion {
    Phase {
        phase: CourtPhase,
        notices: Vec<Notice>,
    },
    Chat(Result<ChatMessage, ChatError>),
}

/// Spawned model calls and the channel their results come back on
struct Background {
    tx: mpsc::UnboundedSender<Completion>,
    rx: mpsc::UnboundedReceiver<Completion>,
    pending: usize,
}

impl Background {
    fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self { tx, rx, pending: 0 }
    }

    fn spawn<F>(&mut self, task: F)
    where
        F: Future<Output = Completion> + Send + 'static,
    {
        let tx = self.tx.clone();
        self.pending += 1;
        tokio::spawn(async move {
            // The receiver is only gone once the session has ended
            let _ = tx.send(task.await);
        });
    }

    /// Next finished call; `None` when nothing is running
    async fn next(&mut self) -> Option<Completion> {
        if self.pending == 0 {
            return None;
        }
        let completion = self.rx.recv().await;
        if completion.is_some() {
            self.pending -= 1;
        }
        completion
    }
}

enum Event {
    Line(Option<String>),
    Finished(Completion),
}

/// Run the session until `/quit` or end of input.
///
/// Model calls run on spawned tasks, so the prompt stays responsive while a
/// phase is generating. Results are printed as they arrive. Pending calls
/// are awaited before returning.
pub async fn run<R, W>(court: &Court, input: R, mut out: W) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    writeln!(
        out,
        "lexsim mock court ({} / {})",
        court.gateway().name(),
        court.gateway().model()
    )?;
    writeln!(out, "Type /help for commands.\n")?;

    let mut lines = input.lines();
    let mut background = Background::new();
    loop {
        let role = court.snapshot().chat.role();
        write!(out, "[{}] > ", role)?;
        out.flush()?;

        let event = tokio::select! {
            line = lines.next_line() => Event::Line(line.context("Failed to read input")?),
            Some(done) = background.next() => Event::Finished(done),
        };

        let line = match event {
            Event::Finished(done) => {
                writeln!(out)?;
                report(court, done, &mut out)?;
                continue;
            }
            Event::Line(None) => {
                writeln!(out)?;
                break;
            }
            Event::Line(Some(line)) => line,
        };

        let command = match parse_command(&line) {
            Ok(command) => command,
            Err(e) => {
                writeln!(out, "{}", e)?;
                continue;
            }
        };

        if matches!(command, SessionCommand::Quit) {
            break;
        }
        execute(court, command, &mut out, &mut background)?;
    }

    if background.pending > 0 {
        writeln!(out, "Waiting for {} pending request(s)...", background.pending)?;
    }
    while let Some(done) = background.next().await {
        report(court, done, &mut out)?;
    }

    Ok(())
}

/// Execute one command, printing immediate results and spawning model calls
fn execute<W: Write>(
    court: &Court,
    command: SessionCommand,
    out: &mut W,
    background: &mut Background,
) -> Result<()> {
    match command {
        SessionCommand::Blank | SessionCommand::Quit => {}
        SessionCommand::Help => writeln!(out, "{}", HELP)?,
        SessionCommand::Phases => {
            let state = court.snapshot();
            for (idx, phase) in CourtPhase::ALL.iter().enumerate() {
                let marker = if *phase == state.active_phase { "*" } else { " " };
                let status = if state.phases.contains(*phase) {
                    " (ready)"
                } else if state.phases.is_generating(*phase) {
                    " (generating)"
                } else {
                    ""
                };
                writeln!(
                    out,
                    "{}{:>2}. {:<22} {}{}",
                    marker,
                    idx + 1,
                    phase.id(),
                    phase.label(),
                    status
                )?;
            }
        }
        SessionCommand::Phase(phase) => {
            let effects = court.dispatch(Action::Activate(phase));
            start_phase(court, phase, effects, out, background)?;
        }
        SessionCommand::Regenerate(phase) => {
            let effects = court.dispatch(Action::Regenerate(phase));
            start_phase(court, phase, effects, out, background)?;
        }
        SessionCommand::ListEvidence => {
            let state = court.snapshot();
            if state.evidence.is_empty() {
                writeln!(out, "No evidence uploaded yet.")?;
            }
            for (idx, item) in state.evidence.iter().enumerate() {
                writeln!(out, "{:>2}. [{}] {}", idx + 1, item.kind, item.name)?;
                writeln!(out, "    {}", item.summary)?;
            }
        }
        SessionCommand::AddEvidence(draft) => match court.add_evidence(draft) {
            Ok(item) => {
                writeln!(out, "Added '{}'. Generated phases will be refreshed.", item.name)?;
                if !EVIDENCE_TYPES.contains(&item.kind.as_str()) {
                    writeln!(out, "(custom type '{}')", item.kind)?;
                }
            }
            Err(e) => writeln!(out, "{}", e)?,
        },
        SessionCommand::NewCase(path) => {
            let opened = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read case file: {}", path.display()))
                .and_then(|text| court.open_case(text).map_err(anyhow::Error::from));
            match opened {
                Ok(()) => writeln!(
                    out,
                    "New case opened from {}. Evidence cleared.",
                    path.display()
                )?,
                Err(e) => writeln!(out, "{:#}", e)?,
            }
        }
        SessionCommand::Reset => {
            court.reset();
            writeln!(out, "Demo case loaded.")?;
        }
        SessionCommand::Role(role) => {
            court.select_role(role);
            writeln!(out, "Speaking as {}.", role)?;
        }
        SessionCommand::Context => writeln!(out, "{}", court.snapshot().context)?,
        SessionCommand::Chat(message) => {
            if let Err(e) = court.snapshot().chat.check_send(&message) {
                writeln!(out, "{}", e)?;
                return Ok(());
            }
            let court = court.clone();
            background.spawn(async move { Completion::Chat(court.send_chat(&message).await) });
        }
    }
    Ok(())
}

/// Print what an activation produced now; spawn its model calls, if any
fn start_phase<W: Write>(
    court: &Court,
    phase: CourtPhase,
    effects: Vec<Effect>,
    out: &mut W,
    background: &mut Background,
) -> Result<()> {
    let mut notices = Vec::new();
    let mut work = Vec::new();
    for effect in effects {
        match effect {
            Effect::Notify(notice) => notices.push(notice),
            effect => work.push(effect),
        }
    }

    if work.is_empty() {
        return print_phase(court, phase, &notices, out);
    }

    writeln!(out, "== {} ==", phase.label())?;
    for notice in &notices {
        writeln!(out, "! {}", notice)?;
    }
    writeln!(out, "Generating... keep working, the result is printed when ready.")?;

    let court = court.clone();
    background.spawn(async move {
        let notices = court.run_effects(work).await;
        Completion::Phase { phase, notices }
    });
    Ok(())
}

/// Print a finished background call
fn report<W: Write>(court: &Court, done: Completion, out: &mut W) -> Result<()> {
    match done {
        Completion::Phase { phase, notices } => print_phase(court, phase, &notices, out),
        Completion::Chat(Ok(reply)) => {
            writeln!(out, "{}: {}", reply.role, reply.content)?;
            if reply.failed {
                writeln!(out, "(reply failed, see logs)")?;
            }
            Ok(())
        }
        Completion::Chat(Err(e)) => {
            writeln!(out, "{}", e)?;
            Ok(())
        }
    }
}

fn print_phase<W: Write>(
    court: &Court,
    phase: CourtPhase,
    notices: &[Notice],
    out: &mut W,
) -> Result<()> {
    writeln!(out, "== {} ==", phase.label())?;
    for notice in notices {
        writeln!(out, "! {}", notice)?;
    }

    if !phase.is_generated() {
        writeln!(out, "Type a message to discuss the case freely.")?;
        return Ok(());
    }

    match court.phase_output(phase) {
        Some(output) => {
            writeln!(out, "{}", output.display_text())?;
            if output.is_failure() {
                writeln!(out, "(generation failed, use /regen {} to retry)", phase.id())?;
            }
        }
        None if court.snapshot().phases.is_generating(phase) => {
            writeln!(out, "Still generating...")?;
        }
        None => writeln!(out, "Nothing generated yet. Use /phase {} to generate.", phase.id())?,
    }
    Ok(())
}
