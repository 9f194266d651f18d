//! MediaSort - Command-line front end for the transfer engine.
//!
//! Moves or copies the given files into one directory. The transfer runs on
//! a background thread; this thread polls it on a short tick, prints
//! progress, and asks on stdin whenever a file name is already taken.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::thread;
use std::time::{Duration, Instant};

use clap::{ArgAction, Parser};
use engine::{
    logging::{init_logging, LogFormat},
    ConfigStore, ConflictDecision, ConflictOutcome, ItemOutcome, Mode, TransferEvent,
    TransferSession,
};
use tracing::{debug, info};

const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// MediaSort - move or copy files into a folder
#[derive(Parser, Debug)]
#[command(name = "mediasort")]
#[command(version = "0.1.0")]
#[command(about = "Move or copy files into a folder, asking what to do about name clashes")]
struct Args {
    /// Files to transfer, processed in the order given
    #[arg(value_name = "FILE")]
    files: Vec<PathBuf>,

    /// Destination directory (defaults to the last one used)
    #[arg(long, short = 'd', value_name = "DIR")]
    dest: Option<PathBuf>,

    /// Operation mode: move or copy
    #[arg(long, value_name = "MODE", default_value = "move")]
    mode: String,

    /// When a file already exists: ask, replace, skip, or keep-both
    #[arg(long, value_name = "POLICY", default_value = "ask")]
    on_conflict: String,

    /// Config file remembering the last destination
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Show each file as it is processed; repeat for more log output
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    /// Write log output as JSON
    #[arg(long)]
    log_json: bool,
}

/// Who answers conflict prompts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ConflictPolicy {
    /// Ask on the terminal for each conflict
    Ask,
    /// Answer the first conflict with this outcome for the whole run
    Always(ConflictOutcome),
}

impl ConflictPolicy {
    fn parse(s: &str) -> Option<Self> {
        if s.eq_ignore_ascii_case("ask") {
            return Some(ConflictPolicy::Ask);
        }
        ConflictOutcome::parse(s).map(ConflictPolicy::Always)
    }
}

/// Terminal rendering of run events
struct CliProgress {
    verbose: bool,
    start_time: Instant,
}

impl CliProgress {
    fn new(verbose: bool) -> Self {
        CliProgress {
            verbose,
            start_time: Instant::now(),
        }
    }

    fn format_duration(elapsed: Duration) -> String {
        let secs = elapsed.as_secs();
        let hours = secs / 3600;
        let mins = (secs % 3600) / 60;
        let secs = secs % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, mins, secs)
        } else if mins > 0 {
            format!("{}m {}s", mins, secs)
        } else {
            format!("{}s", secs)
        }
    }

    fn print_progress_bar(percent: u32) -> String {
        let filled = (percent.min(100) / 5) as usize;
        let empty = 20 - filled;
        format!("[{}{}] {}%", "=".repeat(filled), " ".repeat(empty), percent)
    }

    fn render(&mut self, event: &TransferEvent) {
        match event {
            TransferEvent::RunStarted {
                total,
                mode,
                destination,
                ..
            } => {
                self.start_time = Instant::now();
                eprintln!("{} {} file(s) to {}", mode, total, destination.display());
            }
            TransferEvent::ItemStarted { .. } => {}
            TransferEvent::ItemCompleted { index, source, outcome } => {
                if self.verbose {
                    let name = source
                        .file_name()
                        .map(|n| n.to_string_lossy().into_owned())
                        .unwrap_or_else(|| "(unknown)".to_string());
                    match outcome.destination() {
                        Some(dst) if matches!(outcome, ItemOutcome::Renamed { .. }) => eprintln!(
                            "\r[{:3}] {}: {} -> {}",
                            index + 1,
                            outcome.label(),
                            name,
                            dst.display()
                        ),
                        _ => eprintln!("\r[{:3}] {}: {}", index + 1, outcome.label(), name),
                    }
                }
            }
            TransferEvent::Progress(progress) => {
                if progress.total > 0 {
                    eprint!(
                        "\rProgress: {} | {}/{} files",
                        Self::print_progress_bar(progress.percent()),
                        progress.completed,
                        progress.total
                    );
                    let _ = io::stderr().flush();
                }
            }
            TransferEvent::Completed(summary) => {
                eprintln!();
                eprintln!("Operation completed");
                eprintln!(
                    "Summary: {} done, {} replaced, {} renamed, {} skipped",
                    summary.transferred, summary.replaced, summary.renamed, summary.skipped
                );
                eprintln!(
                    "Finished at {} (elapsed {})",
                    summary.finished_at.format("%H:%M:%S"),
                    Self::format_duration(self.start_time.elapsed())
                );
            }
            TransferEvent::Failed { message, remaining } => {
                eprintln!();
                eprintln!("Transfer stopped: {}", message);
                eprintln!("{} file(s) not processed", remaining);
            }
        }
    }
}

/// Interpret one answer to the conflict prompt.
///
/// `r`, `s`, `k` (or `replace`, `skip`, `keep`) pick the outcome; a trailing
/// `a` or `!` applies it to every remaining conflict. Empty means keep both.
fn parse_choice(answer: &str) -> Option<ConflictDecision> {
    let answer = answer.trim().to_lowercase();
    if answer.is_empty() {
        return Some(ConflictDecision::default());
    }

    let (word, remember) = if let Some(rest) = answer.strip_suffix('!') {
        (rest.trim().to_string(), true)
    } else if answer.len() == 2 && answer.ends_with('a') {
        (answer[..1].to_string(), true)
    } else if let Some(rest) = answer.strip_suffix(" all") {
        (rest.trim().to_string(), true)
    } else {
        (answer.clone(), false)
    };

    let outcome = match word.as_str() {
        "r" => ConflictOutcome::Replace,
        "s" => ConflictOutcome::Skip,
        "k" => ConflictOutcome::KeepBoth,
        other => ConflictOutcome::parse(other)?,
    };
    Some(ConflictDecision { outcome, remember })
}

/// Ask on `output` until `input` yields a usable answer.
///
/// End of input counts as the default answer so a run never stalls.
fn prompt_decision<R: BufRead, W: Write>(
    file_name: &str,
    input: &mut R,
    output: &mut W,
) -> io::Result<ConflictDecision> {
    writeln!(output)?;
    writeln!(output, "File already exists: {}", file_name)?;
    for (key, outcome) in ["r", "s", "k"].iter().zip(ConflictOutcome::ALL) {
        writeln!(output, "  [{}] {}", key, outcome)?;
    }
    writeln!(output, "Add 'a' to apply to all remaining conflicts (e.g. \"sa\").")?;

    loop {
        write!(output, "Choice [k]: ")?;
        output.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            return Ok(ConflictDecision::default());
        }
        match parse_choice(&line) {
            Some(decision) => return Ok(decision),
            None => writeln!(output, "Please answer r, s or k.")?,
        }
    }
}

/// Parse and validate command-line arguments, then run the transfer
fn main() {
    let args = Args::parse();

    let format = if args.log_json {
        LogFormat::Json
    } else {
        LogFormat::Text
    };
    let _ = init_logging(args.verbose, format);

    let exit_code = match run_cli(&args) {
        Ok(()) => 0,
        Err(msg) => {
            eprintln!("Error: {}", msg);
            2
        }
    };

    std::process::exit(exit_code);
}

/// Main CLI logic, answering conflicts on the terminal
fn run_cli(args: &Args) -> Result<(), String> {
    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut ask = |file_name: &str| {
        prompt_decision(file_name, &mut input, &mut io::stderr())
            .unwrap_or_else(|_| ConflictDecision::default())
    };
    run_with(args, &mut ask)
}

/// Main CLI logic - separated for testability
fn run_with(
    args: &Args,
    ask: &mut dyn FnMut(&str) -> ConflictDecision,
) -> Result<(), String> {
    let mode = Mode::parse(&args.mode)
        .ok_or_else(|| format!("Invalid mode '{}'. Must be 'move' or 'copy'", args.mode))?;

    let policy = ConflictPolicy::parse(&args.on_conflict).ok_or_else(|| {
        format!(
            "Invalid conflict policy '{}'. Must be 'ask', 'replace', 'skip', or 'keep-both'",
            args.on_conflict
        )
    })?;

    let store = match &args.config {
        Some(path) => ConfigStore::new(path),
        None => ConfigStore::at_default_location(),
    };
    let destination = match &args.dest {
        Some(dest) => dest.display().to_string(),
        None => store.load_or_default().last_destination,
    };

    let mut session = TransferSession::new();
    for path in &args.files {
        let added = session.add_file(path).map_err(|e| e.to_string())?;
        if !added {
            debug!(path = %path.display(), "not a regular file, ignored");
        }
    }

    if session.batch().is_empty() || destination.is_empty() {
        return Err("Select files and destination".to_string());
    }

    if args.dest.is_some() {
        store.remember_destination(&destination);
    }

    session
        .start(&destination, mode)
        .map_err(|e| format!("Transfer could not start: {}", e))?;
    info!(destination = %destination, %mode, "transfer requested");

    let mut progress = CliProgress::new(args.verbose > 0);
    let mut result = Ok(());

    while session.is_running() {
        for event in session.poll_events() {
            progress.render(&event);
            if let TransferEvent::Failed { message, remaining } = &event {
                result = Err(format!(
                    "Transfer stopped: {} ({} file(s) not processed)",
                    message, remaining
                ));
            }
        }

        if let Some(request) = session.next_conflict() {
            let decision = match policy {
                ConflictPolicy::Ask => ask(&request.file_name),
                ConflictPolicy::Always(outcome) => ConflictDecision::for_all(outcome),
            };
            session
                .resolve_conflict(decision)
                .map_err(|e| e.to_string())?;
            continue;
        }

        if session.is_running() {
            thread::sleep(POLL_INTERVAL);
        }
    }

    result
}
