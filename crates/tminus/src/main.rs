//! The countdown CLI

use std::io::{self, IsTerminal};

use clap::Parser;
use jiff::Timestamp;
use tminus::CliError;
use tminus::args::Args;
use tminus::render::Renderer;
use tminus_core::countdown::{self, CountdownConfig, CountdownHandle};
use tminus_core::scheduler::ThreadScheduler;
use tracing::{debug, error, info};

/// Conventional exit status for a process stopped by SIGINT
const EXIT_INTERRUPTED: i32 = 130;

fn main() {
    let args = Args::parse();

    enable_logging(&args);
    debug!("command line: {:?}", args);

    match run(&args) {
        Ok(true) => {}
        Ok(false) => std::process::exit(EXIT_INTERRUPTED),
        Err(e) => {
            error!("{e}");
            std::process::exit(1);
        }
    }
}

/// Runs the countdown to the end, or until Ctrl-C. Returns true if it completed.
fn run(args: &Args) -> Result<bool, CliError> {
    let total_millis = args.total_millis(Timestamp::now());

    let mut builder = CountdownConfig::builder(total_millis)
        .tick_unit(args.tick_unit())
        .show_days(!args.no_days);

    if let Some(template) = args.template() {
        builder = builder.template(template);
    }

    let (config, events) = builder.into_events();

    info!(
        "counting down {}ms in {}",
        total_millis.max(0),
        args.tick_unit()
    );

    let scheduler = ThreadScheduler::new();
    let handle = countdown::start(config, &scheduler)?;
    set_ctrlc_handler(handle)?;

    let stdout = io::stdout();
    let mode = args.output_mode(stdout.is_terminal());
    let mut out = stdout.lock();
    let mut renderer = Renderer::new(mode, args.message.clone());

    // Ends once the scheduler drops the countdown, after completion or cancellation
    for event in events.iter() {
        renderer.render(&event, &mut out)?;
    }
    renderer.finish(&mut out)?;

    if !renderer.completed() {
        info!("countdown cancelled");
    }

    Ok(renderer.completed())
}

fn set_ctrlc_handler(handle: CountdownHandle) -> Result<(), CliError> {
    ctrlc::set_handler(move || {
        debug!("received Ctrl-C");
        handle.cancel();
    })?;

    Ok(())
}

fn enable_logging(args: &Args) {
    // stdout carries the countdown itself
    let mut builder = tracing_subscriber::fmt().compact().with_writer(io::stderr);

    if args.quiet {
        builder = builder.with_max_level(tracing::Level::ERROR);
    } else {
        match args.verbose {
            2.. => builder = builder.with_max_level(tracing::Level::TRACE),
            1 => builder = builder.with_max_level(tracing::Level::DEBUG),
            _ => builder = builder.with_max_level(tracing::Level::WARN),
        }
    }

    builder.init();
}
