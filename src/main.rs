use ticket_dedup::cli::Cli;
use ticket_dedup::command::cmd_dedupe;
use ticket_dedup::config::Environment;
use ticket_dedup::embedding::EmbeddingClient;

fn main() {
    let cli = Cli::parse_args();

    init_logging(cli.verbose);

    if let Ok(path) = dotenvy::dotenv() {
        tracing::debug!("Loaded environment from {:?}", path);
    }
    let env = Environment::from_process();

    let result = cmd_dedupe(
        &cli,
        &env,
        |settings, credentials| Ok(EmbeddingClient::new(settings, credentials)?),
        &mut std::io::stdout().lock(),
    );

    if let Err(e) = result {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default = if verbose {
        "ticket_dedup=debug"
    } else {
        "ticket_dedup=info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
