//! CLI entry point for hlscope.
//!
//! Runs a single folder-scoped highlight rule over a directory tree and
//! reports where it matches, optionally re-scanning as files change.
//!
//! # Usage
//!
//! ```bash
//! hlscope [OPTIONS] <COMMAND>
//!
//! # Find every whole-word TODO under ./src
//! hlscope scan ./src --pattern TODO --whole-word
//!
//! # Only Rust and Markdown files, JSON output
//! hlscope scan ./src --pattern 'fn \w+' --regex --filter '*.rs; *.md' --format json
//!
//! # Keep the totals current while files change
//! hlscope watch ./src --pattern TODO
//!
//! # Show the scopes a rule on a file could use
//! hlscope scopes ./src/main.rs
//! ```

#![deny(clippy::all)]
#![warn(missing_docs)]

use std::io::Write;
use std::sync::Arc;

use camino::{Utf8Path, Utf8PathBuf};
use clap::{Args, Parser, Subcommand, ValueEnum};
use color_eyre::eyre::{WrapErr, eyre};
use hl_core::{Config, Location, RuleDraft, RuleId, RuleOptions, ScopeKey, TextRange};
use hl_engine::{Engine, EngineEvent, MemoryHost, RuleSnapshot, ScopeResolver};
use hl_scanner::StatsSnapshot;
use hl_watcher::{CompositeFilter, ExcludeDirsFilter, FileWatcher, GlobFilter};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

// =============================================================================
// CLI ARGUMENT TYPES
// =============================================================================

/// Scoped text highlighting over a directory tree.
///
/// Creates a highlight rule on a folder scope, scans every file the scope
/// covers, and reports the matches in navigation order.
#[derive(Parser)]
#[command(name = "hlscope", version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Command to execute.
    #[command(subcommand)]
    command: Commands,

    /// JSON configuration file.
    #[arg(short, long, global = true, env = "HLSCOPE_CONFIG")]
    config: Option<Utf8PathBuf>,

    /// Maximum number of files one folder scan reads.
    #[arg(long, global = true, env = "HLSCOPE_MAX_FILES")]
    max_files: Option<usize>,

    /// Enable verbose logging (debug level).
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output.
    #[arg(long, global = true)]
    no_color: bool,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Scan a folder once and list every match.
    Scan {
        /// Rule to run.
        #[command(flatten)]
        rule: RuleArgs,

        /// Output format.
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Scan a folder, then rescan as files change until interrupted.
    Watch {
        /// Rule to run.
        #[command(flatten)]
        rule: RuleArgs,

        /// Debounce window for file events, in milliseconds.
        #[arg(long)]
        debounce_ms: Option<u64>,
    },

    /// List the scopes a rule anchored at a file could use.
    Scopes {
        /// File path or URI.
        file: String,
    },
}

/// The highlight rule a scan runs.
#[derive(Args)]
struct RuleArgs {
    /// Folder to scan.
    path: Utf8PathBuf,

    /// Text or regular expression to highlight.
    #[arg(short, long)]
    pattern: String,

    /// Highlight color, reported in output.
    #[arg(long, default_value = "#ffcc00")]
    color: String,

    /// Treat the pattern as a regular expression.
    #[arg(long)]
    regex: bool,

    /// Match case exactly.
    #[arg(long)]
    case_sensitive: bool,

    /// Only match whole words.
    #[arg(long)]
    whole_word: bool,

    /// File-name globs separated by `,` or `;`, e.g. `*.rs; *.md`.
    #[arg(long)]
    filter: Option<String>,

    /// Only scan the folder itself, not its subfolders.
    #[arg(long)]
    no_recursive: bool,
}

impl RuleArgs {
    fn draft(&self) -> RuleDraft {
        let draft = RuleDraft::new(&self.pattern, &self.color).with_options(RuleOptions {
            case_sensitive: self.case_sensitive,
            whole_word: self.whole_word,
            use_regex: self.regex,
        });
        match &self.filter {
            Some(filter) => draft.with_filter(filter),
            None => draft,
        }
    }
}

/// Output format for `scan`.
#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// `path:line:column: text` lines.
    Text,
    /// The rule snapshot and its matches as JSON.
    Json,
}

// =============================================================================
// INITIALIZATION FUNCTIONS
// =============================================================================

/// Initializes the tracing subscriber for logging.
///
/// Respects the `RUST_LOG` environment variable if set. Otherwise, uses
/// `debug` level if `--verbose` is set, or `warn` level by default so that
/// scan output stays readable. The file watcher backends are capped at
/// `warn`.
fn init_tracing(verbose: bool, no_color: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = if verbose { "debug" } else { "warn" };
        EnvFilter::new(format!("{level},mio=warn,notify=warn"))
    });

    // Check if colors should be disabled (flag or NO_COLOR env var)
    let use_ansi = !no_color && std::env::var("NO_COLOR").is_err();

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .with_ansi(use_ansi)
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .init();
}

/// Loads the configuration file, if any, and applies CLI overrides.
fn build_config(cli: &Cli) -> color_eyre::Result<Config> {
    let mut config = match &cli.config {
        Some(path) => {
            Config::load(path).wrap_err_with(|| format!("Failed to load config: {path}"))?
        }
        None => Config::default(),
    };

    if let Some(max_files) = cli.max_files {
        config.scan.max_files = max_files;
    }
    if let Commands::Watch { rule, debounce_ms } = &cli.command {
        if let Some(ms) = debounce_ms {
            config.watch.debounce_ms = *ms;
        }
        config.watch.recursive = !rule.no_recursive;
    }

    config.validate()?;
    debug!(?config, "Configuration loaded");
    Ok(config)
}

/// Canonicalizes a folder argument.
fn resolve_folder(path: &Utf8Path) -> color_eyre::Result<Utf8PathBuf> {
    if !path.exists() {
        return Err(eyre!("Path does not exist: {path}"));
    }
    if !path.is_dir() {
        return Err(eyre!("Path is not a directory: {path}"));
    }
    Ok(path.canonicalize_utf8()?)
}

/// Accepts an existing path (made absolute) or anything [`Location::parse`]
/// understands.
fn resolve_location(input: &str) -> color_eyre::Result<Location> {
    let path = Utf8Path::new(input);
    if path.exists() {
        return Ok(Location::from_path(&path.canonicalize_utf8()?));
    }
    Ok(Location::parse(input)?)
}

/// A headless engine with one folder rule whose first scan has finished.
struct Session {
    engine: Engine,
    rule: RuleId,
    root: Utf8PathBuf,
    events: broadcast::Receiver<EngineEvent>,
    /// Counters of the first scan.
    initial: Option<StatsSnapshot>,
}

impl Session {
    async fn start(config: &Config, args: &RuleArgs) -> color_eyre::Result<Self> {
        let root = resolve_folder(&args.path)?;
        let engine = Engine::with_disk(Arc::new(MemoryHost::new()), config)?;
        let events = engine.subscribe();

        let key = ScopeKey::folder(Location::from_path(&root), !args.no_recursive);
        info!(scope = %key, pattern = %args.pattern, "Starting scan");
        let rule = engine.create_rule_in(key, args.draft())?;

        engine.wait_for_scans().await;
        let mut session = Self {
            engine,
            rule,
            root,
            events,
            initial: None,
        };
        session.initial = session.drain_events()?;
        Ok(session)
    }

    /// Consumes queued engine events. Fails if a scan could not run.
    fn drain_events(&mut self) -> color_eyre::Result<Option<StatsSnapshot>> {
        let mut stats = None;
        loop {
            match self.events.try_recv() {
                Ok(EngineEvent::ScanCompleted { rule, stats: s }) if rule == self.rule => {
                    stats = Some(s);
                }
                Ok(EngineEvent::ScanFailed { rule, error }) if rule == self.rule => {
                    return Err(eyre!("Scan failed: {error}"));
                }
                Ok(_) => {}
                Err(broadcast::error::TryRecvError::Lagged(skipped)) => {
                    warn!(skipped, "Missed engine events");
                }
                Err(_) => return Ok(stats),
            }
        }
    }

    fn snapshot(&self) -> color_eyre::Result<RuleSnapshot> {
        Ok(self.engine.snapshot(self.rule, None)?)
    }

    fn matches(&self) -> Vec<(Location, TextRange)> {
        self.engine.global_order(self.rule)
    }
}

// =============================================================================
// COMMAND IMPLEMENTATIONS
// =============================================================================

/// Runs a one-shot scan and prints the matches.
async fn run_scan(config: &Config, args: &RuleArgs, format: OutputFormat) -> color_eyre::Result<()> {
    let session = Session::start(config, args).await?;
    let snapshot = session.snapshot()?;
    let matches = session.matches();

    let stdout = std::io::stdout();
    let mut handle = stdout.lock();
    match format {
        OutputFormat::Text => {
            write_text_matches(&mut handle, &session.root, &matches)?;
            writeln!(handle)?;
            write_summary(&mut handle, &snapshot, &matches, session.initial.as_ref())?;
        }
        OutputFormat::Json => {
            let report = generate_json_report(&snapshot, &matches)?;
            writeln!(handle, "{report}")?;
        }
    }
    Ok(())
}

/// Scans once, then rescans on file changes until Ctrl-C or SIGTERM.
async fn run_watch(config: &Config, args: &RuleArgs) -> color_eyre::Result<()> {
    let mut session = Session::start(config, args).await?;
    print_totals(&session.snapshot()?, &session.matches())?;

    let separators = config.engine.filter_separators.as_str();
    let glob = match &args.filter {
        Some(input) => GlobFilter::parse(input, separators)?,
        None => None,
    };
    let filter = CompositeFilter::new()
        .and(ExcludeDirsFilter::new(config.scan.exclude_dirs.iter().cloned()))
        .and_maybe(glob);
    let mut watcher = FileWatcher::new(&session.root, &config.watch, filter)?;
    info!(root = %session.root, "Watching for changes (Ctrl-C to stop)");

    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            batch = watcher.recv_batch() => {
                let Some(batch) = batch else {
                    warn!("File watcher stopped");
                    break;
                };
                let scheduled: usize = batch
                    .locations()
                    .iter()
                    .map(|location| session.engine.file_changed_on_disk(location))
                    .sum();
                debug!(events = batch.len(), scheduled, "Processed file events");
                if scheduled == 0 {
                    continue;
                }
                session.engine.wait_for_scans().await;
                if let Err(e) = session.drain_events() {
                    warn!(error = %e, "Rescan failed");
                    continue;
                }
                print_totals(&session.snapshot()?, &session.matches())?;
            }
            result = &mut shutdown => {
                result?;
                break;
            }
        }
    }

    watcher.shutdown().await?;
    Ok(())
}

/// Resolves on Ctrl-C, or SIGTERM on Unix.
async fn shutdown_signal() -> color_eyre::Result<()> {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        let mut sigterm = signal(SignalKind::terminate())?;
        tokio::select! {
            result = tokio::signal::ctrl_c() => {
                result?;
                info!("Received Ctrl-C, shutting down");
            }
            _ = sigterm.recv() => {
                info!("Received SIGTERM, shutting down");
            }
        }
    }

    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c().await?;
        info!("Received Ctrl-C, shutting down");
    }

    Ok(())
}

/// Prints the scope choices for a file.
fn run_scopes(config: &Config, file: &str) -> color_eyre::Result<()> {
    let location = resolve_location(file)?;
    let resolver = ScopeResolver::new(config.scan.max_hierarchy_depth);

    let stdout = std::io::stdout();
    let mut handle = stdout.lock();
    for option in resolver.scope_options(&location) {
        writeln!(handle, "{:<16} {}", option.scope.to_string(), option.label)?;
    }
    Ok(())
}

// =============================================================================
// OUTPUT HELPERS
// =============================================================================

/// Writes one `path:line:column: text` line per match.
fn write_text_matches(
    out: &mut impl Write,
    root: &Utf8Path,
    matches: &[(Location, TextRange)],
) -> std::io::Result<()> {
    let mut current: Option<(&Location, Option<String>)> = None;
    for (location, range) in matches {
        if current.as_ref().is_none_or(|(l, _)| *l != location) {
            let text = location
                .to_file_path()
                .and_then(|p| std::fs::read_to_string(p.as_std_path()).ok());
            current = Some((location, text));
        }
        let display = display_path(location, root);
        match current.as_ref().and_then(|(_, text)| text.as_deref()) {
            Some(text) => {
                let (line, column, content) = line_context(text, range.start);
                writeln!(out, "{display}:{line}:{column}: {}", content.trim())?;
            }
            None => writeln!(out, "{display}: {}..{}", range.start, range.end)?,
        }
    }
    Ok(())
}

fn write_summary(
    out: &mut impl Write,
    snapshot: &RuleSnapshot,
    matches: &[(Location, TextRange)],
    stats: Option<&StatsSnapshot>,
) -> std::io::Result<()> {
    writeln!(out, "Rule {} \"{}\" ({} {})", snapshot.id, snapshot.pattern, snapshot.scope, snapshot.target)?;
    writeln!(
        out,
        "  Matches:          {} in {} files",
        snapshot.global_count,
        count_files(matches)
    )?;
    if let Some(stats) = stats {
        write_scan_stats(out, stats)?;
    }
    Ok(())
}

fn write_scan_stats(out: &mut impl Write, stats: &StatsSnapshot) -> std::io::Result<()> {
    writeln!(out, "  Files considered: {}", stats.files_considered)?;
    if stats.has_failures() {
        writeln!(out, "  Files unreadable: {}", stats.files_failed)?;
    }
    Ok(())
}

/// Prints a one-line running total.
fn print_totals(snapshot: &RuleSnapshot, matches: &[(Location, TextRange)]) -> std::io::Result<()> {
    let stdout = std::io::stdout();
    let mut handle = stdout.lock();
    writeln!(
        handle,
        "{} matches in {} files (revision {})",
        snapshot.global_count,
        count_files(matches),
        snapshot.revision
    )
}

/// Generates the JSON report.
fn generate_json_report(
    snapshot: &RuleSnapshot,
    matches: &[(Location, TextRange)],
) -> color_eyre::Result<String> {
    #[derive(serde::Serialize)]
    struct Match<'a> {
        location: &'a Location,
        start: usize,
        end: usize,
    }

    #[derive(serde::Serialize)]
    struct Report<'a> {
        rule: &'a RuleSnapshot,
        matches: Vec<Match<'a>>,
    }

    let report = Report {
        rule: snapshot,
        matches: matches
            .iter()
            .map(|(location, range)| Match {
                location,
                start: range.start,
                end: range.end,
            })
            .collect(),
    };
    serde_json::to_string_pretty(&report).map_err(|e| eyre!("Failed to serialize JSON: {e}"))
}

fn count_files(matches: &[(Location, TextRange)]) -> usize {
    let mut files = 0;
    let mut last: Option<&Location> = None;
    for (location, _) in matches {
        if last != Some(location) {
            files += 1;
            last = Some(location);
        }
    }
    files
}

/// Path relative to the scanned root when possible.
fn display_path(location: &Location, root: &Utf8Path) -> String {
    match location.to_file_path() {
        Some(path) => path
            .strip_prefix(root)
            .map_or_else(|_| path.to_string(), ToString::to_string),
        None => location.to_string(),
    }
}

/// 1-based line and column of a byte offset, plus the line's text.
fn line_context(text: &str, offset: usize) -> (usize, usize, &str) {
    let offset = offset.min(text.len());
    let before = text.get(..offset).unwrap_or(text);
    let line_start = before.rfind('\n').map_or(0, |i| i + 1);
    let line = before.matches('\n').count() + 1;
    let column = before.len() - line_start + 1;
    let rest = &text[line_start..];
    let content = rest.split('\n').next().unwrap_or(rest);
    (line, column, content)
}

// =============================================================================
// MAIN ENTRY POINT
// =============================================================================

/// Application entry point.
#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    // 1. Install color-eyre FIRST (before any potential panics)
    color_eyre::install()?;

    // 2. Parse CLI arguments
    let cli = Cli::parse();

    // 3. Initialize tracing (handles --no-color for log output)
    init_tracing(cli.verbose, cli.no_color);

    // 4. Load configuration
    let config = build_config(&cli)?;

    // 5. Route to appropriate command
    match &cli.command {
        Commands::Scan { rule, format } => run_scan(&config, rule, *format).await,
        Commands::Watch { rule, .. } => run_watch(&config, rule).await,
        Commands::Scopes { file } => run_scopes(&config, file),
    }
}
