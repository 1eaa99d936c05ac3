use anyhow::Result;

use stylized_facts::app::{parse_cli_args, print_usage, run, CliCommand};
use stylized_facts::config::{Config, LogFormat};

fn init_tracing(config: &Config) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        config
            .logging
            .level
            .parse()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"))
    });
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    match config.logging.format {
        LogFormat::Json => builder.with_ansi(false).json().init(),
        LogFormat::Text => builder.init(),
    }
}

fn main() -> Result<()> {
    let raw_args: Vec<String> = std::env::args().skip(1).collect();
    let args = match parse_cli_args(&raw_args) {
        Ok(a) => a,
        Err(e) => {
            eprintln!("{:#}", e);
            print_usage();
            std::process::exit(2);
        }
    };
    if args.command == CliCommand::Help {
        print_usage();
        return Ok(());
    }

    let config = match Config::load(args.config_path.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load config: {:#}", e);
            std::process::exit(1);
        }
    };
    init_tracing(&config);

    tracing::info!(
        command = ?args.command,
        source = %config.source.path.display(),
        output = %config.output.path.display(),
        "Starting stylized-facts"
    );

    if let Err(e) = run(&args, &config) {
        tracing::error!(error = %format!("{:#}", e), "Command failed");
        eprintln!("error: {:#}", e);
        std::process::exit(1);
    }
    Ok(())
}
