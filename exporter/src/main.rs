//! kbexport command line.
//!
//! Usage:
//!   kbexport export --target-url https://kibana:5601 --credential <key> --output-dir out
//!   kbexport retag --input out/default/ndjson/default.ndjson --output-dir retagged --env all

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use kbexport::{retag_feed, ExportConfig, Exporter};
use kbexport_client::{AuthScheme, KibanaClient};
use kbexport_shape::{Environment, MalformedPolicy};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser, Debug)]
#[command(name = "kbexport")]
#[command(about = "Export Kibana spaces to spreadsheets and NDJSON feeds")]
struct Cli {
    /// Enable verbose debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Export every space of a deployment
    Export(ExportArgs),
    /// Rewrite index patterns of an exported feed for target environments
    Retag(RetagArgs),
}

#[derive(Args, Debug)]
struct ExportArgs {
    /// TOML file with export settings; flags override its values
    #[arg(long)]
    config: Option<PathBuf>,

    /// Base URL of the Kibana instance
    #[arg(long)]
    target_url: Option<String>,

    /// API key or token sent in the Authorization header
    #[arg(long)]
    credential: Option<String>,

    /// Directory receiving the export
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Only export these spaces
    #[arg(long, num_args = 1..)]
    spaces: Vec<String>,

    /// Only export saved objects of these types (default: every type)
    #[arg(long, num_args = 1..)]
    types: Vec<String>,

    #[arg(long, value_enum)]
    auth_scheme: Option<AuthArg>,

    /// Records requested per page for saved objects and rules
    #[arg(long)]
    page_size: Option<u32>,

    /// Fetch a single page per collection
    #[arg(long)]
    no_paginate: bool,

    /// Per-request timeout in seconds
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Accept invalid TLS certificates
    #[arg(long)]
    insecure: bool,

    /// What to do with saved objects missing their type
    #[arg(long, value_enum)]
    on_malformed: Option<MalformedArg>,
}

#[derive(Args, Debug)]
struct RetagArgs {
    /// Feed to retag
    #[arg(short, long)]
    input: PathBuf,

    /// Directory receiving one sub-directory per environment
    #[arg(short, long)]
    output_dir: PathBuf,

    #[arg(long, value_enum, default_value = "all")]
    env: EnvArg,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum AuthArg {
    ApiKey,
    Bearer,
}

impl From<AuthArg> for AuthScheme {
    fn from(arg: AuthArg) -> Self {
        match arg {
            AuthArg::ApiKey => AuthScheme::ApiKey,
            AuthArg::Bearer => AuthScheme::Bearer,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum MalformedArg {
    Skip,
    Fail,
}

impl From<MalformedArg> for MalformedPolicy {
    fn from(arg: MalformedArg) -> Self {
        match arg {
            MalformedArg::Skip => MalformedPolicy::Skip,
            MalformedArg::Fail => MalformedPolicy::Fail,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum EnvArg {
    Dev,
    Test,
    Sim,
    Live,
    All,
}

impl EnvArg {
    fn environments(self) -> Vec<Environment> {
        match self {
            EnvArg::Dev => vec![Environment::Dev],
            EnvArg::Test => vec![Environment::Test],
            EnvArg::Sim => vec![Environment::Sim],
            EnvArg::Live => vec![Environment::Live],
            EnvArg::All => Environment::ALL.to_vec(),
        }
    }
}

impl ExportArgs {
    /// Layers the flags on top of the config file, if any.
    fn into_config(self) -> Result<ExportConfig> {
        let mut config = match &self.config {
            Some(path) => ExportConfig::load(path)?,
            None => ExportConfig::default(),
        };

        if let Some(url) = self.target_url {
            config.target_url = Some(url);
        }
        if let Some(credential) = self.credential {
            config.credential = Some(credential);
        }
        if let Some(dir) = self.output_dir {
            config.output_dir = Some(dir);
        }
        if !self.spaces.is_empty() {
            config.spaces = self.spaces;
        }
        if !self.types.is_empty() {
            config.types = self.types;
        }
        if let Some(scheme) = self.auth_scheme {
            config.auth_scheme = scheme.into();
        }
        if let Some(size) = self.page_size {
            config.page_size = size;
        }
        if self.no_paginate {
            config.paginate = false;
        }
        if let Some(secs) = self.timeout_secs {
            config.timeout_secs = Some(secs);
        }
        if self.insecure {
            config.insecure = true;
        }
        if let Some(policy) = self.on_malformed {
            config.on_malformed = policy.into();
        }
        Ok(config)
    }
}

fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("{level},hyper=warn,hyper_util=warn,reqwest=warn"))
    });
    FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();
}

async fn export(args: ExportArgs) -> Result<()> {
    let (client_config, options) = args.into_config()?.resolve()?;
    let client = KibanaClient::new(client_config).context("failed to build HTTP client")?;
    info!(target_url = client.base_url(), "kbexport starting");

    let report = Exporter::new(&client, &options)
        .run()
        .await
        .context("export failed")?;

    for row in &report.summary {
        info!(
            space = %row.space_id,
            saved_objects = row.saved_objects,
            rules = row.rules,
            data_views = row.data_views,
            dashboards = row.dashboards,
            "summary"
        );
    }
    Ok(())
}

fn retag(args: RetagArgs) -> Result<()> {
    let written = retag_feed(&args.input, &args.output_dir, &args.env.environments())
        .with_context(|| format!("failed to retag {}", args.input.display()))?;
    info!(files = written.len(), "retag complete");
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::Export(args) => export(args).await,
        Command::Retag(args) => retag(args),
    }
}
