//! Panic reporting for the command line
//!
//! A panic prints where the session log lives, records the report in that log and
//! exits with a failure status. Release builds also write a human-panic crash dump.

use std::panic;
use std::path::PathBuf;
use std::process;

use color_eyre::config::HookBuilder;
use color_eyre::eyre::Result;
use tracing::error;

use super::paths::{get_data_dir, LOG_FILE};

pub fn initialize_panic_handler() -> Result<()> {
    let (panic_hook, eyre_hook) = HookBuilder::default()
        .panic_section(crash_notice())
        .capture_span_trace_by_default(false)
        .display_location_section(false)
        .display_env_section(false)
        .into_hooks();
    eyre_hook.install()?;

    panic::set_hook(Box::new(move |panic_info| {
        let report = panic_hook.panic_report(panic_info).to_string();
        error!(
            "{} panicked: {}",
            env!("CARGO_PKG_NAME"),
            strip_ansi_escapes::strip_str(&report)
        );

        #[cfg(not(debug_assertions))]
        {
            let meta = crash_metadata();
            let dump = human_panic::handle_dump(&meta, panic_info);
            if human_panic::print_msg(dump, &meta).is_err() {
                eprintln!("{}", crash_notice());
            }
            eprintln!("{report}");
        }

        #[cfg(debug_assertions)]
        better_panic::Settings::auto()
            .most_recent_first(false)
            .lineno_suffix(true)
            .verbosity(better_panic::Verbosity::Full)
            .create_panic_handler()(panic_info);

        process::exit(libc::EXIT_FAILURE);
    }));
    Ok(())
}

fn log_file() -> PathBuf {
    get_data_dir().join(LOG_FILE.as_str())
}

/// Shown under every panic report
fn crash_notice() -> String {
    format!(
        "{} crashed. The pagination log for this run is {}\nPlease attach it to a report at {}/issues",
        env!("CARGO_PKG_NAME"),
        log_file().display(),
        env!("CARGO_PKG_REPOSITORY"),
    )
}

#[cfg(not(debug_assertions))]
fn crash_metadata() -> human_panic::Metadata {
    human_panic::Metadata::new(env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))
        .authors(env!("CARGO_PKG_AUTHORS").replace(':', ", "))
        .repository(env!("CARGO_PKG_REPOSITORY"))
        .support(format!("- Attach the log at {}", log_file().display()))
}
