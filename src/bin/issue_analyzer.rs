use std::path::PathBuf;
use std::process::ExitCode;

use chrono::{NaiveDate, Utc};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use ghissues::models::{parse_label_list, DateWindow, FilterCriteria, IssueState, RepoRef, TrendGranularity};
use ghissues::report::{ReportContext, DEFAULT_TOP};
use ghissues::{aggregate, Config, GitHubClient, OutputFormat, Reporter};

#[derive(Parser, Debug)]
#[command(name = "issue-analyzer")]
#[command(version)]
#[command(about = "Analyze and report on GitHub issues")]
#[command(after_help = "Examples:
  issue-analyzer --owner myorg --repo myrepo
  issue-analyzer --owner myorg --repo myrepo --labels bug,enhancement
  issue-analyzer --owner myorg --repo myrepo --days 60 --format csv
  issue-analyzer --owner myorg --repo myrepo --since 2024-01-01 --until 2024-01-31 --format json")]
struct Args {
    /// Repository owner or organization
    #[arg(long)]
    owner: String,

    /// Repository name
    #[arg(long)]
    repo: String,

    /// Comma-separated labels; issues with any of them match
    #[arg(long)]
    labels: Option<String>,

    /// Number of days to look back from --until, or from now
    #[arg(long, default_value_t = 30)]
    days: u32,

    /// Start date (YYYY-MM-DD), overrides --days
    #[arg(long)]
    since: Option<NaiveDate>,

    /// End date (YYYY-MM-DD), inclusive
    #[arg(long)]
    until: Option<NaiveDate>,

    /// Issue state to fetch
    #[arg(long, value_enum, default_value_t = IssueState::Closed)]
    state: IssueState,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Console)]
    format: OutputFormat,

    /// Trend bucket size
    #[arg(long, value_enum, default_value_t = TrendGranularity::Month)]
    trend: TrendGranularity,

    /// Entries shown in ranked console sections
    #[arg(long, default_value_t = DEFAULT_TOP)]
    top: usize,

    /// Output file; "-" for stdout. CSV and JSON default to a timestamped file
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// GitHub token (defaults to GITHUB_TOKEN)
    #[arg(long)]
    token: Option<String>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    if let Err(e) = init_logging() {
        eprintln!("error: {}", e);
        return ExitCode::FAILURE;
    }

    match run(Args::parse()).await {
        Ok(()) => ExitCode::SUCCESS,
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
                .add_directive("issue_analyzer=info".parse()?)
                .add_directive("reqwest=warn".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}

async fn run(args: Args) -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let config = Config::from_env().with_token_override(args.token.clone());
    let token = config.require_token()?;

    let now = Utc::now();
    let window = DateWindow::resolve(args.days, args.since, args.until, now)?;
    let labels = args.labels.as_deref().map(parse_label_list).unwrap_or_default();
    let repo = RepoRef::new(&args.owner, &args.repo);

    tracing::info!("Analyzing {} issues for {}", args.state, repo);
    tracing::info!("Date range: {}", window.describe());
    if !labels.is_empty() {
        tracing::info!("Filtering by labels: {}", labels.join(", "));
    }

    let criteria = FilterCriteria::new(repo.clone(), window)
        .with_labels(labels)
        .with_state(args.state);

    let github = GitHubClient::with_base_url(token, &config.api_url)?;
    let issues = github.fetch_issues(&criteria).await?;
    tracing::info!("Found {} matching issues", issues.len());
    if let Some(quota) = github.rate_limit_status() {
        tracing::info!("GitHub API requests remaining: {}", quota.remaining);
    }

    let report = aggregate(&issues, args.trend);
    let ctx = ReportContext {
        repo,
        window,
        generated_at: now,
    };

    let reporter = Reporter::new(args.format).with_top(args.top);
    let destination = reporter.emit(&ctx, &issues, &report, args.output.as_deref())?;
    tracing::debug!("Report written to {}", destination);

    Ok(())
}
