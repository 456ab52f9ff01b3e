//! CLI entry point: the composition root.

use std::process::ExitCode;

use clap::{CommandFactory, Parser};
use readout_cli::handlers::read::ReadArgs;
use readout_cli::handlers::render::RenderArgs;
use readout_cli::handlers::segment::SegmentArgs;
use readout_cli::{Cli, CliConfig, Commands, bootstrap, exit_code_for, handlers};

#[tokio::main]
async fn main() -> ExitCode {
    // Working-directory .env first so it can set READOUT_DATA_DIR
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Some(dir) = &cli.data_dir {
        dotenvy::from_path(dir.join(".env")).ok();
    } else if let Ok(path) = readout_core::env_file_path() {
        dotenvy::from_path(path).ok();
    }

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::from(exit_code_for(&e))
        }
    }
}

fn init_logging(verbose: bool) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new(if verbose { "debug" } else { "warn" })
    });

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .compact()
        .try_init()
        .ok();
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let Some(command) = cli.command else {
        Cli::command().print_help()?;
        return Ok(());
    };

    let ctx = bootstrap(CliConfig::with_data_dir(cli.data_dir))?;

    match command {
        Commands::Segment {
            file,
            max_chars,
            raw,
            json,
        } => {
            let args = SegmentArgs {
                file: &file,
                max_chars,
                raw,
                json,
            };
            handlers::segment::execute(&ctx, &args)?;
        }
        Commands::Render {
            file,
            title,
            url,
            published,
            source,
            text,
        } => {
            let args = RenderArgs {
                file: &file,
                title,
                url,
                published,
                source: source.as_deref(),
                text,
            };
            handlers::render::execute(&args)?;
        }
        Commands::Read {
            file,
            from,
            rate,
            voice,
            wpm,
            flaky,
            offline,
            json,
        } => {
            let args = ReadArgs {
                file,
                from,
                rate,
                voice,
                wpm,
                flaky,
                offline,
                json,
            };
            handlers::read::execute(&ctx, args).await?;
        }
        Commands::Voices => handlers::voices::execute(&ctx)?,
        Commands::Prefs { command } => handlers::prefs::execute(&ctx, command)?,
    }

    Ok(())
}
