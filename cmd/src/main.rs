use clap::{arg, command};
use tracing::{info, warn, Level};
use tracing_appender::non_blocking::WorkerGuard;

use abi::config::{Config, LogConfig, LogOutput};
use abi::errors::Error;

const DEFAULT_CONFIG: &str = "./abi/fixtures/config.yml";

#[tokio::main]
async fn main() -> Result<(), Error> {
    let matches = command!()
        .arg(arg!(-c --config <FILE> "path of the yaml config file").default_value(DEFAULT_CONFIG))
        .get_matches();
    let path = matches
        .get_one::<String>("config")
        .map(String::as_str)
        .unwrap_or(DEFAULT_CONFIG);

    let config = Config::load(path)?;

    // keep the guard alive, dropping it stops the file writer
    let _guard = init_tracing(&config.log);
    info!("load config from {}", path);

    db::migrate(&config).await?;
    api::start(&config).await
}

fn init_tracing(log: &LogConfig) -> Option<WorkerGuard> {
    let level = log.max_level();
    let builder = tracing_subscriber::fmt()
        .with_line_number(true)
        .with_max_level(level.unwrap_or(Level::DEBUG));

    let guard = match log.output {
        LogOutput::Console => {
            builder.init();
            None
        }
        LogOutput::File => {
            let appender = tracing_appender::rolling::daily(&log.path, "helper.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            builder.with_ansi(false).with_writer(writer).init();
            Some(guard)
        }
    };

    if level.is_none() {
        warn!("unknown log level {:?}, falling back to debug", log.level);
    }
    guard
}
