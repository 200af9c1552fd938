mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use miette::Result;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use trpux_core::config::{self, LoggingConfig};
use trpux_core::{CatalogDb, NewServerArgument};

#[derive(Parser)]
#[command(name = "trpux")]
#[command(about = "TRPUX card aggregation admin CLI")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(long, short = 'c', global = true)]
    config: Option<PathBuf>,

    /// Database file path (overrides config)
    #[arg(long, global = true)]
    db_path: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the catalog database and seed the default card types
    Init {
        /// Also write the effective configuration to this file
        #[arg(long)]
        write_config: Option<PathBuf>,
    },
    /// Server management
    Server {
        #[command(subcommand)]
        cmd: ServerCommands,
    },
    /// Source inspection
    Source {
        #[command(subcommand)]
        cmd: SourceCommands,
    },
    /// Card/source compatibility inspection
    Compat {
        #[command(subcommand)]
        cmd: CompatCommands,
    },
}

#[derive(Subcommand)]
enum ServerCommands {
    /// Register a server
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        url: String,
        /// Server type matched against parser declarations
        #[arg(long = "type")]
        server_type: String,
        /// Flag the server as disabled
        #[arg(long)]
        disabled: bool,
        /// Access argument as KEY=VALUE, repeatable
        #[arg(long = "arg", value_parser = parse_argument)]
        arguments: Vec<NewServerArgument>,
    },
    /// List registered servers
    List,
    /// Remove a server with its arguments and sources
    Remove { id: i64 },
}

#[derive(Subcommand)]
enum SourceCommands {
    /// List discovered sources
    List {
        /// Only sources of this server
        #[arg(long)]
        server: Option<i64>,
    },
}

#[derive(Subcommand)]
enum CompatCommands {
    /// List card types and the source types they accept
    List,
}

fn parse_argument(raw: &str) -> std::result::Result<NewServerArgument, String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok(NewServerArgument::new(key.trim(), value))
        }
        _ => Err(format!("expected KEY=VALUE, got \"{raw}\"")),
    }
}

fn init_logging(logging: &LoggingConfig, debug: bool) -> Option<WorkerGuard> {
    use tracing_appender::rolling;
    use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let level = if debug { "debug" } else { logging.level.as_str() };
    let filter = || {
        if level.contains('=') {
            EnvFilter::new(level)
        } else {
            EnvFilter::new(format!(
                "trpux={level},trpux_core={level},trpux_db={level},sqlx=warn,warn"
            ))
        }
    };

    let terminal_layer = logging.console.then(|| {
        fmt::layer()
            .with_target(false)
            .with_thread_ids(false)
            .with_thread_names(false)
            .with_writer(std::io::stderr)
            .compact()
            .with_filter(filter())
    });

    let (file_layer, guard) = match &logging.directory {
        Some(log_dir) => {
            // Ensure log directory exists
            std::fs::create_dir_all(log_dir).ok();

            // Create a rolling file appender that rotates daily
            let file_appender = rolling::daily(log_dir, "trpux.log");
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

            let layer = fmt::layer()
                .with_file(true)
                .with_line_number(true)
                .with_thread_ids(true)
                .with_ansi(false)
                .with_writer(non_blocking)
                .with_filter(filter());
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(terminal_layer)
        .with(file_layer)
        .init();

    guard
}

#[tokio::main]
async fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .with_cause_chain()
                .context_lines(3)
                .break_words(true)
                .build(),
        )
    }))?;
    miette::set_panic_hook();
    let cli = Cli::parse();

    // Load configuration
    let mut config = match &cli.config {
        Some(config_path) => config::load_config(config_path).await?,
        None => config::load_config_from_standard_locations().await?,
    };
    if let Some(db_path) = &cli.db_path {
        config.database.path = db_path.clone();
    }

    let _guard = init_logging(&config.logging, cli.debug);
    if let Some(log_dir) = &config.logging.directory {
        info!("Logs are being written to: {:?}", log_dir.join("trpux.log"));
    }

    let db = CatalogDb::open(&config.database.path).await?;

    let outcome = match cli.command {
        Commands::Init { write_config } => {
            commands::init(&db, &config, write_config.as_deref()).await
        }
        Commands::Server { cmd } => match cmd {
            ServerCommands::Add {
                name,
                url,
                server_type,
                disabled,
                arguments,
            } => commands::server::add(&db, name, url, server_type, disabled, arguments).await,
            ServerCommands::List => commands::server::list(&db).await,
            ServerCommands::Remove { id } => commands::server::remove(&db, id).await,
        },
        Commands::Source { cmd } => match cmd {
            SourceCommands::List { server } => commands::source::list(&db, server).await,
        },
        Commands::Compat { cmd } => match cmd {
            CompatCommands::List => commands::compat::list(&db).await,
        },
    };

    db.close().await;
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_argument() {
        let arg = parse_argument("token=a=b").unwrap();
        assert_eq!(arg.key, "token");
        assert_eq!(arg.value, "a=b");

        assert!(parse_argument("token").is_err());
        assert!(parse_argument("=value").is_err());
    }

    #[test]
    fn test_cli_parses_server_add() {
        let cli = Cli::parse_from([
            "trpux", "server", "add", "--name", "CI", "--url", "https://ci.test/", "--type",
            "jenkins", "--arg", "token=secret",
        ]);
        match cli.command {
            Commands::Server {
                cmd: ServerCommands::Add { arguments, server_type, .. },
            } => {
                assert_eq!(server_type, "jenkins");
                assert_eq!(arguments, vec![NewServerArgument::new("token", "secret")]);
            }
            _ => panic!("unexpected command"),
        }
    }
}
