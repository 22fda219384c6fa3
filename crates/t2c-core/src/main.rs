//! topic2csv binary: subscribe to a message stream, record rows to CSV.
//!
//! Wiring: an ingest thread reads JSON Lines from stdin and publishes into
//! a bounded queue honoring the configured QoS; the main thread drains the
//! queue through the recording session. SIGINT/SIGTERM flip a shutdown
//! flag checked between messages; a second signal exits immediately.

use std::io;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use clap::Parser;
use signal_hook::consts::{SIGINT, SIGTERM};
use signal_hook::flag;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use t2c_common::{normalize_topic_type, Error, Result};
use t2c_core::cli::Cli;
use t2c_core::exit_codes::ExitCode;
use t2c_core::recorder::CsvRecorder;
use t2c_core::session::run_session;
use t2c_core::source::{channel, JsonLinesSource, MessageSource, PublishOutcome, Recv};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let code = match run(&cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("topic2csv: {e}");
            ExitCode::from(&e)
        }
    };
    std::process::exit(code.as_i32());
}

fn run(cli: &Cli) -> Result<ExitCode> {
    let topic_type = normalize_topic_type(&cli.topic_type)?;
    let mut recorder = CsvRecorder::create(&cli.output)
        .map_err(|e| Error::Setup(format!("cannot open '{}': {e}", cli.output.display())))?;

    let shutdown = Arc::new(AtomicBool::new(false));
    // First signal requests an orderly stop; a repeat exits on the spot.
    flag::register_conditional_shutdown(SIGINT, ExitCode::Clean.as_i32(), Arc::clone(&shutdown))?;
    flag::register(SIGINT, Arc::clone(&shutdown))?;
    flag::register_conditional_shutdown(SIGTERM, ExitCode::Clean.as_i32(), Arc::clone(&shutdown))?;
    flag::register(SIGTERM, Arc::clone(&shutdown))?;

    info!(
        topic = %cli.topic,
        topic_type = %topic_type,
        output = %cli.output.display(),
        "subscribed, recording"
    );

    let (mut publisher, mut source) = channel(cli.qos());
    let ingest = thread::spawn(move || {
        let mut lines = JsonLinesSource::new(io::stdin().lock());
        loop {
            match lines.next_delivery(Duration::MAX) {
                Recv::Delivery(delivery) => {
                    if publisher.publish(delivery) == PublishOutcome::Disconnected {
                        // Consumer went away (shutdown or write failure).
                        break;
                    }
                }
                Recv::Idle => continue,
                Recv::Closed => break,
            }
        }
        info!(
            skipped = lines.skipped(),
            dropped = publisher.dropped(),
            "ingest finished"
        );
    });

    let stats = run_session(&mut source, &mut recorder, &shutdown)?;
    drop(source);
    // Join only once the thread has exited on its own: dropping the queue
    // consumer fails its next publish, but a thread still parked on a
    // stdin read only unblocks at the next line or EOF, and waiting for
    // that would stall shutdown. Process exit reaps the parked thread.
    if ingest.is_finished() {
        if ingest.join().is_err() {
            warn!("ingest thread panicked");
        }
    }

    info!(written = stats.written, "done");
    Ok(ExitCode::Clean)
}
