use anyhow::Result;
use clap::Args;
use console::Term;
use indicatif::{ProgressBar, ProgressStyle};
use magpie_browser::{
    login, verify, BrowserFinder, BrowserSession, Collector, CollectorConfig, Credentials,
    Harvest, LiveTimeline, LoginStatus, ProfileManager, SessionOptions, StopReason,
};
use magpie_core::export::CsvExporter;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Args, Debug)]
pub struct CollectArgs {
    /// Keyword to search for
    #[arg(value_name = "QUERY")]
    pub query: String,

    /// Output CSV file
    #[arg(short, long, default_value = "galamsey_tweets.csv")]
    pub output: PathBuf,

    /// Minimum number of unique posts to aim for
    #[arg(long, default_value_t = 1000)]
    pub min_posts: usize,

    /// Posts per batch before the courtesy wait kicks in
    #[arg(long, default_value_t = 100)]
    pub batch_size: usize,

    /// Seconds to wait after each completed batch
    #[arg(long, default_value_t = 15)]
    pub batch_wait: u64,

    /// Hard ceiling on scroll iterations
    #[arg(long, default_value_t = 500)]
    pub max_scroll_attempts: usize,

    /// Path to the browser binary
    #[arg(long)]
    pub browser_path: Option<PathBuf>,

    /// Named persistent profile (kept under ~/.magpie/profiles); a
    /// temporary profile is used when omitted
    #[arg(long)]
    pub profile: Option<String>,

    /// Show the browser window instead of running headless
    #[arg(long)]
    pub headed: bool,

    /// Account identifier
    #[arg(long, env = "X_USERNAME", hide_env_values = true)]
    pub username: String,

    /// Account secret
    #[arg(long, env = "X_PASSWORD", hide_env_values = true)]
    pub password: String,
}

pub fn execute(args: CollectArgs) -> Result<()> {
    // Create tokio runtime for async operations
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    let result = runtime.block_on(run(args));

    // Explicitly shutdown runtime with timeout to prevent hanging on blocking tasks
    runtime.shutdown_timeout(Duration::from_millis(100));

    result
}

async fn run(args: CollectArgs) -> Result<()> {
    println!("Locating browser...");
    let finder = BrowserFinder::new(args.browser_path.clone());
    let executable = finder.find()?;
    println!("Found browser at: {}", executable.display());

    let profile = match &args.profile {
        Some(name) => {
            println!("Using profile: {name}");
            ProfileManager::named(name)?
        }
        None => {
            println!("Using temporary profile");
            ProfileManager::temporary()?
        }
    };

    println!("Launching browser...");
    let session = BrowserSession::launch(&SessionOptions {
        executable,
        profile_dir: profile.path().to_path_buf(),
        headed: args.headed,
    })
    .await?;

    // The session is released on every exit path: collection runs in its
    // own fallible step and close happens before the result is inspected.
    let outcome = collect_posts(&session, &args).await;
    if let Err(e) = session.close().await {
        tracing::debug!("browser close failed: {e}");
    }
    let harvest = outcome?;

    match &harvest.stop {
        StopReason::SessionError(e) => {
            println!(
                "Session failed ({e}); keeping the {} posts collected so far",
                harvest.posts.len()
            );
        }
        stop => println!("Stopped: {stop}"),
    }

    if harvest.posts.is_empty() {
        println!("No posts were collected.");
        return Ok(());
    }

    CsvExporter::to_file(&harvest.posts, &args.output)?;
    println!(
        "Saved {} posts to {}",
        harvest.posts.len(),
        args.output.display()
    );

    Ok(())
}

async fn collect_posts(session: &BrowserSession, args: &CollectArgs) -> Result<Harvest> {
    let credentials = Credentials {
        username: args.username.clone(),
        password: args.password.clone(),
    };

    println!("Logging in...");
    let mut status = login(session, &credentials).await?;
    while let LoginStatus::OperatorNeeded(stage) = status {
        println!();
        println!("Automated {stage} did not complete.");
        if !args.headed {
            println!("Hint: rerun with --headed to interact with the browser window.");
        }
        println!("Finish logging in manually in the browser, then press Enter here...");
        wait_for_operator().await?;
        tokio::time::sleep(Duration::from_secs(5)).await;
        status = verify(session).await?;
    }

    let mut timeline = LiveTimeline::open_search(session, &args.query).await?;

    let config = CollectorConfig {
        min_posts: args.min_posts,
        batch_size: args.batch_size,
        batch_wait: Duration::from_secs(args.batch_wait),
        max_scroll_attempts: args.max_scroll_attempts,
        ..CollectorConfig::default()
    };

    let bar = ProgressBar::new(args.min_posts as u64);
    bar.set_style(ProgressStyle::with_template(
        "Collected {pos}/{len} posts",
    )?);

    let harvest = Collector::new(config)
        .collect_with_progress(&mut timeline, |n| bar.set_position(n as u64))
        .await;
    bar.finish_and_clear();

    Ok(harvest)
}

async fn wait_for_operator() -> Result<()> {
    tokio::task::spawn_blocking(|| Term::stdout().read_line()).await??;
    Ok(())
}
