//! CLI entry point: parses arguments, dispatches to a `command::*` module,
//! and maps the result to an exit code (§6.7).

use clap::Parser;

use pygit::cli::{Cli, Command, RemoteAction};
use pygit::command;
use pygit::errors::{Error, Result};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let result = run(cli.command);

    match result {
        Ok(()) => {}
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(exit_code(&e));
        }
    }
}

fn run(command: Command) -> Result<()> {
    match command {
        Command::Init => command::init::execute(),
        Command::Add { path } => command::add::execute(&path),
        Command::Commit { message } => command::commit::execute(&message),
        Command::Status => command::status::execute(),
        Command::Log { limit } => command::log::execute(limit),
        Command::Branch { name } => command::branch::execute(name),
        Command::Checkout { create, name } => command::checkout::execute(&name, create),
        Command::Remote { action } => match action {
            RemoteAction::Add { name, url } => command::remote::add(&name, &url),
            RemoteAction::List => command::remote::list(),
        },
        Command::Push { remote, branch } => command::push::execute(&remote, &branch),
        Command::Pull { remote, branch } => command::pull::execute(&remote, &branch),
        Command::Clone { url, dir } => command::clone::execute(&url, &dir),
        Command::Diff => command::diff::execute(),
    }
}

/// §6.7: 1 user-visible failure, 2 usage error, 3 internal/corruption error.
fn exit_code(e: &Error) -> i32 {
    match e {
        Error::Usage(_) => 2,
        Error::Corrupt(_)
        | Error::ObjectMissing(_)
        | Error::IndexMalformed(_)
        | Error::InvalidObject(_)
        | Error::ProtocolViolation(_)
        | Error::Io(_) => 3,
        _ => 1,
    }
}
