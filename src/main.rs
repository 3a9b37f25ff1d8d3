//! Customer Sign-up - headless driver for the sign-up form core
//!
//! Reads one JSON command per line from stdin, feeds it to the form
//! controller and prints email message updates and snapshots to stdout.

use anyhow::Result;
use customer_signup::command::Command;
use customer_signup::config::SignupConfig;
use customer_signup::controller::FormController;
use customer_signup::sink::{JsonFileSink, LogSink, SubmissionSink};
use std::io;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "customer_signup=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let config = SignupConfig::load()?;
    let sink: Box<dyn SubmissionSink> = match &config.save_dir {
        Some(dir) => Box::new(JsonFileSink::new(dir)),
        None => Box::new(LogSink),
    };

    let controller = FormController::new(&config, sink);
    let mut messages = controller.subscribe();
    let (tx, rx) = mpsc::channel(64);
    let form_loop = tokio::spawn(controller.run(rx));

    // Ends once the controller (and its watch sender) is dropped
    let printer = tokio::spawn(async move {
        while messages.changed().await.is_ok() {
            let text = messages.borrow_and_update().text.clone();
            println!("emailMessage: {text:?}");
        }
    });

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let command = match Command::parse(line) {
            Ok(command) => command,
            Err(err) => {
                tracing::warn!("Ignoring malformed command: {err}");
                continue;
            }
        };
        let (event, reply) = match command.into_event() {
            Ok(converted) => converted,
            Err(err) => {
                tracing::warn!(path = %err.path(), "Ignoring command: {err}");
                continue;
            }
        };

        if tx.send(event).await.is_err() {
            break;
        }
        if let Some(reply) = reply {
            if let Ok(snapshot) = reply.await {
                println!("{}", serde_json::to_string_pretty(&snapshot)?);
            }
        }
    }

    // Closing the channel stops the loop; a pending debounce is dropped
    drop(tx);
    form_loop.await?;
    printer.await?;

    Ok(())
}
