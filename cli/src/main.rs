use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

mod request;

#[derive(Parser)]
#[command(
    name = "httpc",
    about = "Minimal HTTP/1.0 client printing responses as JSON",
    version,
    propagate_version = true,
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[command(flatten)]
    options: Options,
}

#[derive(Subcommand)]
enum Commands {
    /// Send a GET request
    Get {
        /// Absolute http:// URL with a path, e.g. http://host:8080/index
        url: String,
        #[command(flatten)]
        headers: HeaderArgs,
    },
    /// Send a POST request.
    ///
    /// The body comes from --data or --data-file; without either the
    /// request carries an empty body.
    Post {
        url: String,
        #[command(flatten)]
        headers: HeaderArgs,
        /// Request body as literal text
        #[arg(short, long, conflicts_with = "data_file")]
        data: Option<String>,
        /// Read the request body from a file
        #[arg(long)]
        data_file: Option<PathBuf>,
    },
}

#[derive(Args)]
struct HeaderArgs {
    /// Extra header line "Name: value"; repeatable
    #[arg(short = 'H', long = "header")]
    header: Vec<String>,
}

#[derive(Args)]
pub struct Options {
    /// TOML client configuration file
    #[arg(short, long, global = true, env = "HTTPC_CONFIG")]
    config: Option<PathBuf>,
    /// Connect timeout in milliseconds (overrides the config file)
    #[arg(long, global = true)]
    connect_timeout_ms: Option<u64>,
    /// Read timeout in milliseconds (overrides the config file)
    #[arg(long, global = true)]
    read_timeout_ms: Option<u64>,
    /// Fail when the body length disagrees with Content-Length
    #[arg(long, global = true)]
    strict_framing: bool,
    /// Pretty-print the JSON output
    #[arg(long, global = true)]
    pretty: bool,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("httpc_cli=info".parse()?),
        )
        .init();

    let cli = Cli::parse();
    let config = request::load_config(&cli.options)?;

    match cli.command {
        Commands::Get { url, headers } => {
            request::get(config, &url, &headers.header, cli.options.pretty)
        }
        Commands::Post { url, headers, data, data_file } => {
            let body = request::read_body(data, data_file.as_deref())?;
            request::post(config, &url, &headers.header, &body, cli.options.pretty)
        }
    }
}
