//! IdentityHub command-line client.
//!
//! Wraps the `identityhub_api` crate with persisted settings, a keyring-backed
//! session, the ticket form session and terminal output.

use clap::Parser;

pub mod bridge;
pub mod cli;
pub mod commands;
pub mod config;
pub mod secrets;
pub mod ticket_form;

pub fn run() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = cli::Cli::parse();
    let runtime = match tokio::runtime::Builder::new_multi_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(err) => {
            log::error!("Failed to start async runtime: {}", err);
            std::process::exit(1);
        }
    };

    if let Err(message) = runtime.block_on(cli::execute(cli)) {
        eprintln!("{}", message);
        std::process::exit(1);
    }
}
