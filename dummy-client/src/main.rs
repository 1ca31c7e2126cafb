use std::process::ExitCode;

use dotenv::dotenv;
use dummy_client::{app, cli, config::Settings};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> ExitCode {
    dotenv().ok();

    let command = match cli::parse_args(std::env::args()) {
        Ok(command) => command,
        Err(err) => {
            println!("{}", err);
            return ExitCode::FAILURE;
        }
    };

    let settings = match Settings::from_env() {
        Ok(settings) => settings,
        Err(err) => {
            eprintln!("{}", err);
            return ExitCode::FAILURE;
        }
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(settings.log_level)
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    match app::run(command, &settings).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!("{} failed: {}", command, err);
            ExitCode::FAILURE
        }
    }
}
