use std::{io::Write as _, path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use clap::Parser;
use client_core::{HttpGateway, PortalController};
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    sync::Mutex,
};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

mod config;
mod repl;
mod terminal;

use config::CliOverrides;
use repl::Input;
use terminal::{SharedInput, TerminalPresenter};

#[derive(Parser, Debug)]
#[command(name = "portal", about = "Terminal client for the campus feedback portal")]
struct Args {
    /// Base URL of the portal server.
    #[arg(long)]
    server_url: Option<String>,
    /// tracing filter, e.g. `info` or `client_core=debug`.
    #[arg(long)]
    log_filter: Option<String>,
    /// Answer yes to every confirmation prompt.
    #[arg(long)]
    yes: bool,
    #[arg(long)]
    config: Option<PathBuf>,
}

impl Args {
    fn overrides(&self) -> CliOverrides {
        CliOverrides {
            config_path: self.config.clone(),
            server_url: self.server_url.clone(),
            log_filter: self.log_filter.clone(),
            assume_yes: self.yes,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let settings = config::load_settings(&args.overrides())?;

    let filter = EnvFilter::try_new(&settings.log_filter)
        .with_context(|| format!("invalid log filter '{}'", settings.log_filter))?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let gateway = HttpGateway::new(&settings.server_url)?;
    let input: SharedInput = Arc::new(Mutex::new(BufReader::new(tokio::io::stdin()).lines()));
    let presenter = Arc::new(TerminalPresenter::new(
        settings.assume_yes,
        Arc::clone(&input),
    ));
    let controller = PortalController::new(Arc::new(gateway), presenter);

    info!(server_url = %settings.server_url, "portal: starting");
    controller.check_session().await;

    loop {
        print!("> ");
        let _ = std::io::stdout().flush();

        // Released before dispatch so confirmation prompts can read stdin.
        let line = input
            .lock()
            .await
            .next_line()
            .await
            .context("failed to read from stdin")?;
        let Some(line) = line else {
            break;
        };

        match repl::parse_command(&line) {
            Ok(Input::Empty) => {}
            Ok(Input::Quit) => break,
            Ok(Input::Help) => println!("{}", repl::HELP),
            Ok(Input::WhoAmI) => match controller.session().await {
                Some(session) => println!(
                    "{} ({}) id {}",
                    session.display_name, session.role, session.user_id
                ),
                None => println!("not signed in"),
            },
            Ok(Input::Command(command)) => {
                let name = command.name();
                if let Err(err) = controller.dispatch(command).await {
                    debug!(command = name, "portal: command failed: {err}");
                }
            }
            Err(err) => println!("{err}"),
        }
    }

    info!("portal: exiting");
    Ok(())
}
