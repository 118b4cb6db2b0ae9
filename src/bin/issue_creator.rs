use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use ghissues::creator::{read_items, BatchSummary, ItemOutcome, ItemReport};
use ghissues::{BatchCreator, Config, CreatorConfig, GitHubClient};

/// Exit status when the batch ran but some items could not be created.
const EXIT_ITEM_FAILURES: u8 = 2;

#[derive(Parser, Debug)]
#[command(name = "issue-creator")]
#[command(version)]
#[command(about = "Create GitHub issues from a config file and an item list")]
struct Args {
    /// Path to the JSON config file
    #[arg(long)]
    config: PathBuf,

    /// Item list, one per line (overrides input_file in the config)
    #[arg(long)]
    file: Option<PathBuf>,

    /// Only report what would be created (default)
    #[arg(long, overrides_with = "no_dry_run")]
    dry_run: bool,

    /// Actually create issues
    #[arg(long, overrides_with = "dry_run")]
    no_dry_run: bool,

    /// GitHub token (defaults to GITHUB_TOKEN)
    #[arg(long)]
    token: Option<String>,
}

impl Args {
    fn is_dry_run(&self) -> bool {
        !self.no_dry_run
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    if let Err(e) = init_logging() {
        eprintln!("error: {}", e);
        return ExitCode::FAILURE;
    }

    match run(Args::parse()).await {
        Ok(summary) if summary.has_failures() => ExitCode::from(EXIT_ITEM_FAILURES),
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn init_logging() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("ghissues=info".parse()?)
                .add_directive("issue_creator=info".parse()?)
                .add_directive("reqwest=warn".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}

async fn run(args: Args) -> anyhow::Result<BatchSummary> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let creator_config = CreatorConfig::load(&args.config)?;
    let input_file = creator_config.resolve_input_file(args.file.as_deref())?;
    let items = read_items(&input_file)?;
    let dry_run = args.is_dry_run();
    let repo = &creator_config.repository;

    println!("Dry run: {} (pass --no-dry-run to actually create issues)\n", dry_run);
    println!("Summary of inputs:");
    println!("  Config: {}", args.config.display());
    println!("  Repository: {}", repo);
    println!("  Input file: {} ({} items)", input_file.display(), items.len());
    println!("  Target: https://github.com/{}/issues", repo);
    println!("  Labels: {}", creator_config.labels.join(", "));
    if !creator_config.assignees.is_empty() {
        println!("  Assignees: {}", creator_config.assignees.join(", "));
    }
    if let Some(milestone) = creator_config.milestone {
        println!("  Milestone: {}", milestone);
    }
    println!();

    let config = Config::from_env().with_token_override(args.token.clone());
    let github = GitHubClient::with_base_url(config.require_token()?, &config.api_url)?;

    let creator = BatchCreator::new(&github, &creator_config, dry_run);
    let summary = creator.run(&items, print_item).await?;
    if let Some(quota) = github.rate_limit_status() {
        tracing::info!("GitHub API requests remaining: {}", quota.remaining);
    }

    println!(
        "\nDone: {} created, {} would be created, {} skipped as duplicates, {} failed",
        summary.created, summary.would_create, summary.skipped, summary.failed
    );

    Ok(summary)
}

fn print_item(report: &ItemReport) {
    let title = &report.issue.title;
    match &report.outcome {
        ItemOutcome::Created { number, url } => println!("Created #{}: {} ({})", number, title, url),
        ItemOutcome::WouldCreate => println!("[DRY RUN] Would create: {}", title),
        ItemOutcome::SkippedDuplicate => println!("Skipped (already exists): {}", title),
        ItemOutcome::Failed(reason) => println!("Failed to create: {} ({})", title, reason),
    }
}
