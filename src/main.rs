//! train - CLI entry point.

use std::future::Future;
use std::io::Write;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use indicatif::{ProgressBar, ProgressStyle};
use tracing_subscriber::EnvFilter;

use train::github::{OctocrabApi, resolve_token};
use train::locator::list_logins;
use train::progress::ProgressSnapshot;
use train::release::{create_releases, release_repos};
use train::{
    CancelHandle, CancelToken, Config, LogProgress, ProgressSink, RateLimiter, ReleaseSession,
    SharedProgress, TrainContext,
};

/// Open, update and merge release pull requests across a GitHub org or user.
#[derive(Parser, Debug)]
#[command(name = "train")]
#[command(about = "Open, update and merge release pull requests across a GitHub org or user")]
#[command(version)]
struct Cli {
    /// Log API calls and progress to stderr instead of drawing a progress bar
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Open or refresh the release pull request of every repository
    Create {
        /// Organization or user name
        entity: String,

        /// Compute everything without opening or editing pull requests
        #[arg(long)]
        dry_run: bool,
    },

    /// Merge every release pull request that is clean
    Release {
        /// Organization or user name
        entity: String,

        /// Report what would be merged without merging
        #[arg(long)]
        dry_run: bool,
    },

    /// Print the logins the token can act for
    Logins,

    /// Set a config value (supported: release_branch)
    Config { field: String, value: String },

    /// Generate a shell completion script for train
    Completion {
        /// Shell to generate completions for
        #[arg(long, value_enum, default_value_t = Shell::Zsh)]
        shell: Shell,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Create { entity, dry_run } => create(&entity, dry_run, cli.verbose).await,
        Command::Release { entity, dry_run } => release(&entity, dry_run, cli.verbose).await,
        Command::Logins => logins().await,
        Command::Config { field, value } => set_config(&field, &value),
        Command::Completion { shell } => {
            write_completion(shell, &mut std::io::stdout());
            Ok(())
        }
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "warn,train=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Everything a pass needs that outlives the pass itself.
struct Runtime {
    config: Config,
    api: OctocrabApi,
    limiter: RateLimiter,
    cancel: CancelToken,
}

impl Runtime {
    fn new() -> Result<Self> {
        let config = Config::load().context("Failed to load train config")?;
        let token = resolve_token(config.github.token.as_deref())?;
        let api = OctocrabApi::new(&token).context("Failed to create GitHub client")?;
        let limiter = RateLimiter::new(
            config.github.limits.requests_per_second,
            config.github.limits.burst,
        );

        Ok(Self {
            config,
            api,
            limiter,
            cancel: cancel_on_ctrl_c(),
        })
    }

    fn context<'a>(&'a self, progress: &'a dyn ProgressSink) -> TrainContext<'a> {
        TrainContext::new(&self.api, &self.limiter, &self.cancel, progress)
    }
}

/// Cancel the returned token on the first Ctrl-C.
fn cancel_on_ctrl_c() -> CancelToken {
    let handle = CancelHandle::new();
    let token = handle.token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("Cancelling...");
            handle.cancel();
        }
    });
    token
}

async fn create(entity: &str, dry_run: bool, verbose: bool) -> Result<()> {
    let runtime = Runtime::new()?;
    let session = ReleaseSession::from_config(&runtime.config, dry_run);

    println!("Entity: {entity}");
    println!("Base: {}", session.release_branch);
    if dry_run {
        println!("Dry run: no pull requests will be opened or edited");
    }

    let shared = SharedProgress::new();
    let ctx = runtime.context(progress_sink(&shared, verbose));
    let report = render_progress(
        "Processing",
        (!verbose).then_some(&shared),
        create_releases(&ctx, &session, entity),
    )
    .await
    .context("Failed to create release pull requests")?;

    println!();
    println!("{}Release PRs Created:", dry_run_prefix(dry_run));
    for url in &report.urls {
        println!("  {url}");
    }

    if !report.skipped.is_empty() {
        println!();
        println!("Skipped:");
        for skipped in &report.skipped {
            println!("  {}", skipped.reason);
        }
    }

    Ok(())
}

async fn release(entity: &str, dry_run: bool, verbose: bool) -> Result<()> {
    let runtime = Runtime::new()?;
    let session = ReleaseSession::from_config(&runtime.config, dry_run);

    println!("Entity: {entity}");
    println!("Base: {}", session.release_branch);

    let shared = SharedProgress::new();
    let ctx = runtime.context(progress_sink(&shared, verbose));
    let released = render_progress(
        "Processing Releases",
        (!verbose).then_some(&shared),
        release_repos(&ctx, &session, entity),
    )
    .await
    .context("Failed to release")?;

    println!();
    println!("{}Repos Released:", dry_run_prefix(dry_run));
    for url in &released {
        println!("  {url}");
    }

    Ok(())
}

async fn logins() -> Result<()> {
    let runtime = Runtime::new()?;
    let ctx = runtime.context(&LogProgress);

    for login in list_logins(&ctx).await.context("Failed to list logins")? {
        println!("{login}");
    }

    Ok(())
}

fn set_config(field: &str, value: &str) -> Result<()> {
    let mut config = Config::load().context("Failed to load train config")?;
    config.set_field(field, value)?;
    config.save().context("Failed to save train config")?;

    println!("Set {field} = {value}");
    Ok(())
}

fn write_completion(shell: Shell, out: &mut impl Write) {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    clap_complete::generate(shell, &mut cmd, name, out);
}

fn dry_run_prefix(dry_run: bool) -> &'static str {
    if dry_run { "(Dryrun) " } else { "" }
}

/// Verbose runs log progress; otherwise it is collected for the progress bar.
fn progress_sink(shared: &SharedProgress, verbose: bool) -> &dyn ProgressSink {
    if verbose { &LogProgress } else { shared }
}

/// Drive `work` to completion, redrawing a progress bar from `shared` meanwhile.
async fn render_progress<T>(
    prefix: &'static str,
    shared: Option<&SharedProgress>,
    work: impl Future<Output = T>,
) -> T {
    let Some(shared) = shared else {
        return work.await;
    };

    let bar = ProgressBar::new(0).with_prefix(prefix);
    bar.set_style(
        ProgressStyle::with_template("{prefix} ({pos}/{len}) {elapsed} {wide_bar} {percent}%\n{msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );

    tokio::pin!(work);
    let mut ticker = tokio::time::interval(Duration::from_millis(100));

    let result = loop {
        tokio::select! {
            result = &mut work => break result,
            _ = ticker.tick() => draw(&bar, &shared.snapshot()),
        }
    };

    bar.finish_and_clear();
    result
}

fn draw(bar: &ProgressBar, snapshot: &ProgressSnapshot) {
    if snapshot.updates == 0 {
        return;
    }
    if bar.length() != Some(snapshot.total) {
        bar.set_length(snapshot.total);
    }
    bar.set_position(snapshot.current);
    bar.set_message(format!("Current Repo: {}", snapshot.label));
}
