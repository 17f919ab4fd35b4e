//! Application orchestrator.
//! Loads/merges config, initializes logging, installs signal handlers, and
//! hands the request to the archive hook. Returns whether the file was archived.

use anyhow::{Context, Result};
use std::sync::{Arc, Mutex};
use tracing::{debug, error, info};

use basic_archive::cli::Args;
use basic_archive::config::load_config;
use basic_archive::output as out;
use basic_archive::{default_config_path, shutdown, ArchiveConfig, ArchiveHook, Archiver, CONFIG_ENV_VAR};

use crate::logging::init_tracing;

/// Run the CLI application. `Ok(false)` means the archive attempt (or check) failed
/// and the diagnostic has already been reported.
pub fn run(args: Args) -> Result<bool> {
    // Handle --print-config before logging init
    if args.print_config {
        if let Some(explicit) = std::env::var_os(CONFIG_ENV_VAR) {
            out::print_info(&format!(
                "Using {CONFIG_ENV_VAR} (explicit):\n  {}\n",
                explicit.to_string_lossy()
            ));
            return Ok(true);
        }
        match default_config_path() {
            Some(p) => {
                out::print_info(&format!("Default basic_archive config path:\n  {}\n", p.display()));
                if p.exists() {
                    out::print_info("A config file already exists at that location.");
                } else {
                    out::print_info("No config file exists there yet; archiving is disabled until archive_directory is set.");
                }
            }
            None => out::print_error("Could not determine a default config path"),
        }
        return Ok(true);
    }

    // Config file first, CLI overrides second; the archive directory is validated as each is applied.
    let mut cfg = load_config()
        .context("load basic_archive config")?
        .unwrap_or_else(ArchiveConfig::default);
    args.apply_overrides(&mut cfg)
        .context("apply command-line overrides")?;

    // Initialize logging and capture the guard so we can drop it on signal
    let guard_opt = init_tracing(&cfg.log_level, cfg.log_file.as_deref(), args.json).map_err(|e| {
        out::print_error(&format!("Failed to initialize logging: {}", e));
        e
    })?;

    // Guard needs to be dropped on SIGINT to flush logs
    let guard_slot = Arc::new(Mutex::new(guard_opt));
    {
        let guard_slot = Arc::clone(&guard_slot);
        ctrlc::set_handler(move || {
            shutdown::request();
            out::print_warn("Received interrupt; an archive already in progress will still complete.");
            if let Ok(mut g) = guard_slot.lock() {
                let _ = g.take(); // drop guard here to flush tracing_appender
            }
        })
        .context("install signal handler")?;
    }

    debug!("Starting basic_archive: {:?}", args);

    let result = if args.check {
        Ok(check(&cfg))
    } else {
        archive_once(&args, &cfg)
    };

    // Ensure logs are flushed before exit
    if let Ok(mut g) = guard_slot.lock() {
        let _ = g.take();
    }

    result
}

fn check(cfg: &ArchiveConfig) -> bool {
    match cfg.archive_directory() {
        Some(dir) => {
            let shown = dunce::canonicalize(dir).unwrap_or_else(|_| dir.to_path_buf());
            out::print_success(&format!("archive directory OK: {}", shown.display()));
            true
        }
        None => {
            out::print_warn("archive_directory not specified; archiving is disabled.");
            false
        }
    }
}

fn archive_once(args: &Args, cfg: &ArchiveConfig) -> Result<bool> {
    let source = args
        .source_path
        .as_deref()
        .context("SOURCE_PATH is required unless --check or --print-config is given")?;
    let file_name = args
        .resolved_file_name()
        .context("could not derive FILE_NAME from SOURCE_PATH; pass it explicitly")?;

    if shutdown::is_requested() {
        error!(file = %file_name, "shutdown requested before archiving started; not archiving");
        return Ok(false);
    }

    let hook: Box<dyn ArchiveHook> = Box::new(Archiver::new(cfg));
    let archived = hook.archive(source, &file_name);
    if archived {
        info!(source = %source.display(), file = %file_name, "Archive completed");
    }
    Ok(archived)
}
