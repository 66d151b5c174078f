//! `nsg`, a command line client for the NetSchool portal.

use clap::{CommandFactory, Parser};
use color_eyre::eyre::Result;
use netschool_cli::install_color_eyre;
use tracing_subscriber::{
    prelude::__tracing_subscriber_SubscriberExt as _, util::SubscriberInitExt as _, EnvFilter,
};

use crate::{command::*, render::CommandResult};

mod auth;
mod command;
mod portal;
mod render;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // the log level hierarchy is determined by:
    //    - if RUST_LOG is detected at runtime
    //    - if RUST_LOG is provided at compile time
    //    - default to INFO
    let filter = EnvFilter::builder()
        .with_default_directive(
            option_env!("RUST_LOG")
                .unwrap_or("info")
                .parse()
                .expect("should provide valid log level at compile time."),
        )
        .from_env_lossy();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let cli = Cli::parse();
    install_color_eyre(cli.color)?;
    let render_config = render::RenderConfig::new(&cli);

    let Some(command) = cli.command else {
        let mut cmd = Cli::command();
        cmd.print_help()?;
        return Ok(());
    };

    let result = process_commands(command, &cli.session_file).await;

    render_config.render_result(result)
}

async fn process_commands(command: Commands, session_file: &std::path::Path) -> CommandResult {
    match command {
        // Auth commands
        Commands::Login(args) => args.run(session_file).await,
        Commands::Logout => auth::logout(session_file).await,

        // Portal commands
        Commands::Diary { start, end } => portal::diary(session_file, start, end).await,
        Commands::Overdue { start, end } => portal::overdue(session_file, start, end).await,
        Commands::Announcements { take } => portal::announcements(session_file, take).await,
        Commands::Mail { command } => command.run(session_file).await,
        Commands::School => portal::school(session_file).await,

        // Discovery commands, no session needed
        Commands::Schools { url, query } => portal::schools(&url, query.as_deref()).await,
        Commands::Methods { url } => portal::methods(&url).await,
        Commands::Regions => Ok(portal::regions()),
    }
}
