//! apistack - serverless API handlers
//!
//! `serve` runs the handlers behind a local gateway; `lambda` runs one of
//! them inside the Lambda runtime.

use apistack::{create_router, telemetry, AppConfig, Function, GatewayState, SecretsBackend};
use apistack_handlers::{HandlerSet, ProcessMetrics};
use clap::{Args as ClapArgs, Parser, Subcommand};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "apistack")]
#[command(about = "Serverless API handlers with a local gateway", long_about = None)]
struct Args {
    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "info", env = "APISTACK_LOG_LEVEL")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the handlers over HTTP
    Serve(ServeArgs),

    /// Run one function inside the Lambda runtime
    Lambda {
        #[arg(value_enum)]
        function: Function,
    },
}

#[derive(ClapArgs, Debug)]
struct ServeArgs {
    /// Port to listen on
    #[arg(short, long, env = "APISTACK_PORT")]
    port: Option<u16>,

    /// Host to bind to
    #[arg(long, env = "APISTACK_HOST")]
    host: Option<String>,

    /// Serve protected routes without checking the API key
    #[arg(long)]
    no_auth: bool,

    /// Where secrets are read from
    #[arg(long, value_enum, default_value_t = SecretsBackend::Memory, env = "APISTACK_SECRETS_BACKEND")]
    secrets_backend: SecretsBackend,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let config = AppConfig::load()?;

    match args.command {
        Command::Serve(serve) => {
            telemetry::init(&args.log_level, false);
            run_gateway(config, serve).await
        }
        Command::Lambda { function } => {
            telemetry::init(&args.log_level, true);
            let secrets = config.secrets_client(SecretsBackend::Aws).await?;
            let handlers = HandlerSet::new(&config.handler_settings(), secrets, Arc::new(ProcessMetrics::new()));
            apistack::lambda::run(function, handlers)
                .await
                .map_err(|e| anyhow::anyhow!(e))
        }
    }
}

async fn run_gateway(config: AppConfig, args: ServeArgs) -> anyhow::Result<()> {
    let settings = config.handler_settings();
    let require_auth = !args.no_auth;

    info!("Starting apistack gateway...");
    info!("  Environment: {}", settings.payload_environment);
    info!("  Secrets: {:?} (secret: {})", args.secrets_backend, settings.secret_name);
    info!("  Authorizer: {}", if require_auth { "enabled" } else { "disabled" });
    if require_auth && settings.api_key.is_none() {
        warn!("API_KEY is not set; protected routes will deny every request");
    }

    let secrets = config.secrets_client(args.secrets_backend).await?;
    let handlers = HandlerSet::new(&settings, secrets, Arc::new(ProcessMetrics::new()));
    let app = create_router(GatewayState::new(handlers, require_auth));

    let host = args.host.unwrap_or(config.server.host);
    let port = args.port.unwrap_or(config.server.port);
    let addr: SocketAddr = format!("{host}:{port}").parse()?;
    info!("Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
