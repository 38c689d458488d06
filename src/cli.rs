use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use log::{info, warn};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use url::Url;

use crate::auth::Token;
use crate::config::{Config, OutputFormat, TravisConfig};
use crate::credentials::{with_repository_param, Credentials};
use crate::dashboard::{self, Dashboard, FetchStatus, Input};
use crate::insights::BuildTimes;
use crate::output::{self, FetchProgress};
use crate::providers::{BuildQuery, TravisClient};

#[derive(Parser)]
#[command(name = "travis-build-times")]
#[command(author, version, about = "Travis CI build duration dashboard", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file (defaults to ./travis-build-times.toml and friends)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Write the `show` report to this file instead of stdout
    #[arg(short, long, global = true)]
    output: Option<PathBuf>,

    /// Pretty-print JSON written by `show`
    #[arg(short, long, global = true, default_value_t = false)]
    pretty: bool,
}

#[derive(Args)]
struct SourceArgs {
    /// Repository slug, e.g. owner/name
    #[arg(short, long)]
    repository: Option<String>,

    /// Travis API token
    #[arg(short, long)]
    token: Option<String>,

    /// Token from the environment, used when neither the config file nor the
    /// location provides one
    #[arg(long, env = "TRAVIS_TOKEN", hide = true, hide_env_values = true)]
    env_token: Option<String>,

    /// Dashboard URL; its `repository` and `travis-token` query parameters
    /// seed the fields
    #[arg(short = 'L', long)]
    location: Option<String>,

    #[arg(long)]
    api_url: Option<String>,

    #[arg(short, long)]
    branch: Option<String>,

    #[arg(short, long)]
    limit: Option<usize>,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch once and render the build history
    Show {
        #[command(flatten)]
        source: SourceArgs,

        #[arg(short, long, value_enum)]
        format: Option<OutputFormat>,
    },
    /// Interactive dashboard: stdin lines edit the repository
    /// (`repo <slug>` or a bare slug) and the token (`token <value>`)
    Watch {
        #[command(flatten)]
        source: SourceArgs,

        #[arg(long)]
        debounce_ms: Option<u64>,
    },
}

impl Cli {
    pub async fn execute(&self) -> Result<()> {
        let config = Config::load(self.config.as_deref())?;

        match &self.command {
            Commands::Show { source, format } => {
                let format = format.unwrap_or(config.output.format);
                self.execute_show(&config, source, format).await
            }
            Commands::Watch {
                source,
                debounce_ms,
            } => {
                if self.output.is_some() || self.pretty {
                    bail!("--output and --pretty only apply to `show`");
                }
                let delay =
                    Duration::from_millis(debounce_ms.unwrap_or(config.dashboard.debounce_ms));
                execute_watch(&config, source, delay).await
            }
        }
    }

    async fn execute_show(
        &self,
        config: &Config,
        source: &SourceArgs,
        format: OutputFormat,
    ) -> Result<()> {
        let dashboard = build_dashboard(config, source)?;
        let client = build_client(config, source)?;

        // Nothing is ever sent, so the dashboard runs a single fetch cycle.
        let (_, inputs) = mpsc::channel(1);
        let mut progress = FetchProgress::default();
        let delay = Duration::from_millis(config.dashboard.debounce_ms);

        let dashboard = dashboard::run(dashboard, Arc::new(client), inputs, delay, |d| {
            progress.update(d.status(), d.builds().len());
        })
        .await;

        match dashboard.status() {
            FetchStatus::Loaded => {
                let report = BuildTimes::new(dashboard.repository_slug(), dashboard.builds().to_vec());
                self.write_report(&report, format, config.output.pretty)
            }
            FetchStatus::Idle => {
                warn!("Repository slug and token are both required; nothing was fetched");
                eprintln!(
                    "{}",
                    output::dim("Set a repository and a Travis token to fetch build times.")
                );
                Ok(())
            }
            FetchStatus::Loading | FetchStatus::Failed => Ok(()),
        }
    }

    fn write_report(&self, report: &BuildTimes, format: OutputFormat, pretty: bool) -> Result<()> {
        let pretty = self.pretty || pretty;

        match (&self.output, format) {
            (None, OutputFormat::Summary) => output::print_summary(report),
            (Some(path), OutputFormat::Summary) => {
                std::fs::write(path, output::summary_text(report))
                    .with_context(|| format!("Failed to write {}", path.display()))?;
                info!("Summary written to: {}", path.display());
            }
            (None, format) => {
                output::export_build_times(report, format, pretty, &mut std::io::stdout().lock())?;
            }
            (Some(path), format) => {
                let mut file = std::fs::File::create(path)
                    .with_context(|| format!("Failed to create {}", path.display()))?;
                output::export_build_times(report, format, pretty, &mut file)?;
                info!("Build times written to: {}", path.display());
            }
        }

        Ok(())
    }
}

async fn execute_watch(config: &Config, source: &SourceArgs, delay: Duration) -> Result<()> {
    let dashboard = build_dashboard(config, source)?;
    let client = build_client(config, source)?;
    info!(
        "Watching {} with token {:?}",
        dashboard.repository_slug(),
        dashboard.travis_token()
    );

    eprintln!(
        "{}",
        output::dim("Type a repository slug, `repo <slug>` or `token <value>`; Ctrl-D to quit.")
    );

    let (tx, inputs) = mpsc::channel(16);
    tokio::spawn(read_edits(tx));

    let mut view = DashboardView::default();
    let dashboard = dashboard::run(dashboard, Arc::new(client), inputs, delay, |d| view.render(d)).await;

    info!("Dashboard closed with status {:?}", dashboard.status());
    Ok(())
}

fn build_dashboard(config: &Config, source: &SourceArgs) -> Result<Dashboard> {
    let location = source
        .location
        .as_deref()
        .unwrap_or(&config.dashboard.location);
    let mut location =
        Url::parse(location).with_context(|| format!("Invalid dashboard location: {location}"))?;

    if let Some(repository) = &source.repository {
        location = with_repository_param(&location, repository);
    }

    let defaults = Credentials::new(
        config.travis.repository.clone(),
        default_token(&config.travis, source.env_token.clone()),
    );

    let dashboard = Dashboard::new(defaults, location);
    Ok(match &source.token {
        Some(token) => dashboard.with_token(Token::from(token.as_str())),
        None => dashboard,
    })
}

fn build_client(config: &Config, source: &SourceArgs) -> Result<TravisClient> {
    let query = BuildQuery {
        branch: source
            .branch
            .clone()
            .unwrap_or_else(|| config.travis.branch.clone()),
        limit: source.limit.unwrap_or(config.travis.limit),
    };
    let api_url = source.api_url.as_deref().unwrap_or(&config.travis.base_url);
    Ok(TravisClient::new(api_url, query)?)
}

/// Token used when no query parameter or flag provides one: config file,
/// then `TRAVIS_TOKEN`, then the value baked in at build time.
fn default_token(config: &TravisConfig, env_token: Option<String>) -> Token {
    config
        .token
        .clone()
        .or(env_token)
        .or_else(|| option_env!("TRAVIS_BUILD_TIMES_TOKEN").map(str::to_owned))
        .map(Token::from)
        .unwrap_or_default()
}

/// Turns one stdin line into an edit. Blank lines are ignored.
fn parse_edit(line: &str) -> Option<Input> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    let (command, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
    let rest = rest.trim().to_string();
    match command {
        "token" => Some(Input::Token(rest)),
        "repo" => Some(Input::Repository(rest)),
        _ => Some(Input::Repository(line.to_string())),
    }
}

async fn read_edits(tx: mpsc::Sender<Input>) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => {
                if let Some(input) = parse_edit(&line) {
                    if tx.send(input).await.is_err() {
                        break;
                    }
                }
            }
            Ok(None) => break,
            Err(e) => {
                warn!("Failed to read input: {e}");
                break;
            }
        }
    }
}

/// Re-renders the dashboard whenever what it shows changes.
#[derive(Default)]
struct DashboardView {
    status: Option<FetchStatus>,
    builds: usize,
    location: Option<Url>,
}

impl DashboardView {
    fn render(&mut self, dashboard: &Dashboard) {
        if self.location.as_ref() != Some(dashboard.location()) {
            if self.location.is_some() {
                eprintln!("{} {}", output::dim("Share:"), dashboard.location());
            }
            self.location = Some(dashboard.location().clone());
        }

        let status = dashboard.status();
        if self.status == Some(status) && self.builds == dashboard.builds().len() {
            return;
        }
        self.status = Some(status);
        self.builds = dashboard.builds().len();

        let rendered = output::render_dashboard(dashboard);
        if !rendered.is_empty() {
            print!("{rendered}");
        }
    }
}
