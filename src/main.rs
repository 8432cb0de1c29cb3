use clap::Parser;
use tracing::{error, info, info_span};

use cosmos_wallets_exporter::{
    cli::Cli,
    configuration::{get_configuration, AppState, LogConfig, State},
    error::Error,
    server,
};

#[tokio::main]
async fn main() -> Result<(), Error> {
    let result = app_main().await;

    if let Err(err) = &result {
        error!("{}", err);
    }

    result
}

async fn app_main() -> Result<(), Error> {
    let cli = Cli::parse();

    let config = match get_configuration(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            init_logging(&LogConfig::default())?;
            return Err(e);
        },
    };

    init_logging(&config.log)?;

    let span = info_span!("exporter");
    info!(
        parent: &span,
        chains = config.chains.len(),
        wallets = config.wallets_count(),
        "Loaded configuration from {}",
        cli.config.display()
    );

    let state = State::new(config, span)?;
    let app_state = AppState::new(state);

    server::server_task(&app_state).await?;

    Ok(())
}

fn init_logging(log: &LogConfig) -> Result<(), Error> {
    let builder = tracing_subscriber::fmt()
        .with_level(true)
        .with_max_level(log.max_level())
        .with_file(true)
        .with_line_number(true);

    if log.json {
        tracing::subscriber::set_global_default(builder.json().finish())?;
    } else {
        tracing::subscriber::set_global_default(builder.compact().finish())?;
    }

    Ok(())
}
