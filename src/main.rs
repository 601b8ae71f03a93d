use std::path::PathBuf;
use std::process;
use std::sync::Arc;

use structopt::StructOpt;
use thiserror::Error;
use tracing_subscriber::EnvFilter;

use pseudonymsys::config::Config;
use pseudonymsys::error::ConfigError;
use pseudonymsys::server::{self, Server, ServerParams, TlsError};

#[derive(StructOpt)]
#[structopt(name = "pseudonymsys", about = "Pseudonym-system credential service.")]
enum Command {
    /// Manage the credential server
    Server(ServerCommand),
}

#[derive(StructOpt)]
enum ServerCommand {
    /// Start serving the pseudonym-system protocols
    Start(StartOptions),
}

#[derive(StructOpt)]
struct StartOptions {
    /// Port to listen on
    #[structopt(short, long, default_value = "7007")]
    port: u16,

    /// Path to the PEM-encoded server certificate chain; plaintext TCP
    /// when omitted
    #[structopt(long, parse(from_os_str), requires = "key")]
    cert: Option<PathBuf>,

    /// Path to the PEM-encoded server private key
    #[structopt(long, parse(from_os_str), requires = "cert")]
    key: Option<PathBuf>,

    /// Log level filter (error, warn, info, debug, trace)
    #[structopt(long, default_value = "info")]
    loglevel: String,

    /// Path to the configuration file
    #[structopt(short, long, parse(from_os_str), default_value = "config.json")]
    config: PathBuf,

    /// Name of the organization this server acts as
    #[structopt(long, default_value = "org1")]
    org: String,
}

#[derive(Debug, Error)]
enum StartError {
    #[error("invalid log level: {0}")]
    LogLevel(String),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Tls(#[from] TlsError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

fn main() {
    let Command::Server(ServerCommand::Start(options)) = Command::from_args();
    if let Err(err) = run(options) {
        eprintln!("fatal: {}", err);
        process::exit(1);
    }
}

fn run(options: StartOptions) -> Result<(), StartError> {
    let filter = EnvFilter::try_new(&options.loglevel)
        .map_err(|_| StartError::LogLevel(options.loglevel.clone()))?;
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = Config::load(&options.config)?;
    let params = ServerParams::from_config(&config, &options.org)?;
    let server = Arc::new(Server::new(params));

    let tls = match (&options.cert, &options.key) {
        (Some(cert), Some(key)) => Some(server::tls_config(cert, key)?),
        _ => None,
    };

    server::serve(server, options.port, tls)?;
    Ok(())
}
