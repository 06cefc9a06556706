//! CLI binary for cloud-hostinfo crate.

use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use cloud_hostinfo::{
    detect_provider, CloudMetadata, CloudProvider, Field, HostInfo, HostReport, HostResolver,
    MetadataConfig, MetadataError, SystemResolver, AWS_BASE_URL, AZURE_BASE_URL, GCP_BASE_URL,
};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "cloud-hostinfo")]
#[command(
    author,
    version,
    about = "Detect the cloud provider and describe this host"
)]
struct Cli {
    #[command(flatten)]
    endpoints: Endpoints,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct Endpoints {
    /// AWS metadata service base URL
    #[arg(long, global = true, env = "CLOUD_HOSTINFO_AWS_URL", default_value = AWS_BASE_URL)]
    aws_url: String,

    /// GCP metadata server base URL
    #[arg(long, global = true, env = "CLOUD_HOSTINFO_GCP_URL", default_value = GCP_BASE_URL)]
    gcp_url: String,

    /// Azure metadata service base URL
    #[arg(long, global = true, env = "CLOUD_HOSTINFO_AZURE_URL", default_value = AZURE_BASE_URL)]
    azure_url: String,

    /// Per-request timeout in milliseconds
    #[arg(long, global = true, env = "CLOUD_HOSTINFO_TIMEOUT_MS", default_value_t = 5000)]
    timeout_ms: u64,
}

impl Endpoints {
    fn config(&self) -> MetadataConfig {
        MetadataConfig::default()
            .aws_base_url(&self.aws_url)
            .gcp_base_url(&self.gcp_url)
            .azure_base_url(&self.azure_url)
            .with_timeout(Duration::from_millis(self.timeout_ms))
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Detect the current cloud provider
    Detect,

    /// Print every field for the detected provider plus local host info
    Report {
        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// Fetch a single field
    Get {
        /// Field name, e.g. instance-id, zone, tags
        #[arg(value_parser = parse_field)]
        field: Field,

        /// Explicitly specify the cloud provider instead of auto-detecting
        #[arg(short, long, value_parser = parse_provider)]
        provider: Option<CloudProvider>,
    },

    /// Print the provider's full JSON instance document
    Document {
        /// Explicitly specify the cloud provider instead of auto-detecting
        #[arg(short, long, value_parser = parse_provider)]
        provider: Option<CloudProvider>,
    },

    /// Print hostname, addresses, and outbound IPv4 from the OS
    Host,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("unknown format: {}", s)),
        }
    }
}

fn parse_provider(s: &str) -> Result<CloudProvider, String> {
    s.parse()
}

fn parse_field(s: &str) -> Result<Field, String> {
    s.parse()
}

fn init_logging(verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("cloud_hostinfo=debug")
        } else {
            EnvFilter::new("cloud_hostinfo=warn")
        }
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn metadata_for(
    provider: Option<CloudProvider>,
    config: &MetadataConfig,
) -> Result<CloudMetadata, MetadataError> {
    match provider {
        Some(provider) => CloudMetadata::new(provider, config),
        None => CloudMetadata::detect_with_config(config).await,
    }
}

async fn run(cli: Cli) -> Result<(), MetadataError> {
    let config = cli.endpoints.config();

    match cli.command {
        Commands::Detect => {
            match detect_provider(&config).await? {
                CloudProvider::Unknown => println!("{}", MetadataError::NotDetected),
                provider => println!("{}", provider),
            }
            Ok(())
        }

        Commands::Report { format } => {
            let report = HostReport::collect(&config).await?;
            match format {
                OutputFormat::Text => println!("{}", report),
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report.to_json())?),
            }
            Ok(())
        }

        Commands::Get { field, provider } => {
            let metadata = metadata_for(provider, &config).await?;
            println!("{}", metadata.field(field).await?);
            Ok(())
        }

        Commands::Document { provider } => {
            let metadata = metadata_for(provider, &config).await?;
            let document = metadata.instance_document().await?;
            println!("{}", serde_json::to_string_pretty(&document)?);
            Ok(())
        }

        Commands::Host => {
            let resolver: Arc<dyn HostResolver> = Arc::new(SystemResolver);
            println!("{}", HostInfo::collect(&resolver).await);
            Ok(())
        }
    }
}
