use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use similar::{ChangeTag, TextDiff};
use std::env;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::debug;
use zod_client_patcher::config::{load_or_default, PatcherConfig};
use zod_client_patcher::logging::init_tracing;
use zod_client_patcher::{PatchError, PatchOutcome, Patcher, RunMode, WorkspaceGuard};

/// Exit code for a missing target file.
const EXIT_MISSING: u8 = 2;

/// Environment variable naming the target file.
const TARGET_ENV: &str = "ZOD_CLIENT_PATCHER_TARGET";

#[derive(Parser)]
#[command(name = "zod-client-patcher")]
#[command(about = "Patch a generated TypeScript zod client after code generation", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable debug logging on stderr (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Patch the generated client in place
    Apply {
        #[command(flatten)]
        target: TargetArgs,

        /// Dry run - report what would change without writing
        #[arg(short = 'n', long)]
        dry_run: bool,

        /// Show unified diff of changes
        #[arg(short, long)]
        diff: bool,
    },

    /// Report whether the generated client still needs patching
    Status {
        #[command(flatten)]
        target: TargetArgs,
    },
}

#[derive(Args)]
struct TargetArgs {
    /// Generated file to patch (overrides config and environment)
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// Config file (defaults to ./zod-client-patcher.toml when present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Workspace root the target must live in (defaults to the current directory)
    #[arg(short, long)]
    root: Option<PathBuf>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Apply {
            target,
            dry_run,
            diff,
        } => cmd_apply(&target, dry_run, diff),

        Commands::Status { target } => cmd_status(&target),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => match err.downcast_ref::<PatchError>() {
            Some(PatchError::MissingTarget(path)) => {
                eprintln!("missing: {}", path.display());
                ExitCode::from(EXIT_MISSING)
            }
            _ => {
                eprintln!("{} {:#}", "error:".red(), err);
                ExitCode::FAILURE
            }
        },
    }
}

/// Everything a command needs: the configured patcher, the guard and the
/// target path as given (relative paths resolve against the guard's root).
struct Resolved {
    patcher: Patcher,
    guard: WorkspaceGuard,
    target: PathBuf,
}

fn resolve(args: &TargetArgs) -> Result<Resolved> {
    let cwd = env::current_dir()?;
    let (config, config_path) = load_or_default(args.config.as_deref(), &cwd)?;

    match &config_path {
        Some(path) => debug!(config = %path.display(), "loaded config"),
        None => debug!("no config file, using defaults"),
    }

    let root = args
        .root
        .clone()
        .or_else(|| config.target.root.clone())
        .unwrap_or_else(|| cwd.clone());
    let guard = WorkspaceGuard::new(&root)?;
    let target = resolve_target(args.file.clone(), &config);

    debug!(
        root = %guard.workspace_root().display(),
        target = %target.display(),
        "resolved target"
    );

    Ok(Resolved {
        patcher: Patcher::from_config(&config),
        guard,
        target,
    })
}

/// Resolve the target path
///
/// Priority order:
/// 1. Explicit --file flag
/// 2. ZOD_CLIENT_PATCHER_TARGET environment variable
/// 3. `[target].file` from the config (or its default)
fn resolve_target(cli_file: Option<PathBuf>, config: &PatcherConfig) -> PathBuf {
    if let Some(path) = cli_file {
        return path;
    }

    if let Some(env_path) = env::var_os(TARGET_ENV).filter(|v| !v.is_empty()) {
        return PathBuf::from(env_path);
    }

    config.target.file.clone()
}

/// Helper: Show unified diff between original and patched content
fn display_diff(file: &Path, original: &str, patched: &str) {
    println!(
        "\n{}",
        format!("--- {} (original)", file.display()).dimmed()
    );
    println!("{}", format!("+++ {} (patched)", file.display()).dimmed());

    let diff = TextDiff::from_lines(original, patched);

    for change in diff.iter_all_changes() {
        let line = match change.tag() {
            ChangeTag::Delete => format!("-{}", change).red(),
            ChangeTag::Insert => format!("+{}", change).green(),
            ChangeTag::Equal => continue,
        };
        print!("{}", line);
        if change.missing_newline() {
            println!();
        }
    }
}

fn cmd_apply(args: &TargetArgs, dry_run: bool, show_diff: bool) -> Result<()> {
    let resolved = resolve(args)?;

    let mode = if dry_run {
        println!("{}", "[DRY RUN - nothing will be written]".cyan());
        RunMode::DryRun
    } else {
        RunMode::Write
    };

    let outcome = resolved
        .patcher
        .run_guarded(&resolved.guard, &resolved.target, mode)?;

    println!("{}", outcome);

    if show_diff {
        if let Some(report) = outcome.report() {
            display_diff(&report.file, &report.original, &report.patched);
        }
    }

    Ok(())
}

fn cmd_status(args: &TargetArgs) -> Result<()> {
    let resolved = resolve(args)?;

    // Dry run never writes, so status is read-only
    let outcome = resolved
        .patcher
        .run_guarded(&resolved.guard, &resolved.target, RunMode::DryRun)?;

    match &outcome {
        PatchOutcome::Unchanged { file } => {
            println!("up to date: {}", file.display());
        }
        PatchOutcome::WouldPatch(report) | PatchOutcome::Patched(report) => {
            println!("needs patch: {}", report.file.display());
            if report.banner_inserted {
                println!("  {} banner missing", "-".yellow());
            }
            // Call lines count the banner line when it is being inserted
            let shift = usize::from(report.banner_inserted);
            for call in &report.normalized {
                println!(
                    "  {} line {}: record call without key type",
                    "-".yellow(),
                    call.line - shift
                );
            }
        }
    }

    Ok(())
}
