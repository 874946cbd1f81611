//! Application orchestrator.
//! Loads/merges config, initializes logging, installs the signal handler, validates
//! paths, and runs the sorting pipeline.

use anyhow::Result;
use std::sync::{Arc, Mutex};
use tracing::{debug, error};

use exif_sorter::cli::Args;
use exif_sorter::output as out;
use exif_sorter::{
    CONFIG_ENV, Config, SorterError, create_template_config, default_config_path,
    load_default_config, pipeline, shutdown,
};

use crate::logging::init_tracing;

/// Run the CLI application.
pub fn run(args: Args) -> Result<()> {
    // --print-config / --init-config exit before logging init
    if args.print_config {
        print_config_location();
        return Ok(());
    }
    if args.init_config {
        let path = default_config_path()?;
        create_template_config(&path).inspect_err(|e| out::print_error(&format!("{e:#}")))?;
        out::print_success(&format!("A template config was written to: {}", path.display()));
        out::print_info("Edit `source_dir` and `dest_dir`, then run again without --init-config.");
        return Ok(());
    }

    // Defaults < config file < CLI flags
    let mut cfg = load_default_config()
        .inspect_err(|e| out::print_error(&format!("{e:#}")))?
        .unwrap_or_default();
    args.apply_overrides(&mut cfg);
    let cfg = cfg;

    let guard_opt = init_tracing(cfg.effective_log_level(), cfg.log_file.as_deref(), args.json)
        .inspect_err(|e| out::print_error(&format!("Failed to initialize logging: {e}")))?;

    // Guard needs to be dropped on SIGINT to flush logs
    let guard_slot = Arc::new(Mutex::new(guard_opt));
    {
        let guard_slot = Arc::clone(&guard_slot);
        ctrlc::set_handler(move || {
            shutdown::request();
            out::print_warn("Received interrupt; finishing the current file and stopping...");
            if let Ok(mut g) = guard_slot.lock() {
                let _ = g.take();
            }
        })
        .expect("failed to install signal handler");
    }

    debug!(?cfg, "effective configuration");

    let result = sort(&cfg);
    match &result {
        Ok(()) => {}
        Err(e) => match e.downcast_ref::<SorterError>() {
            Some(se) => error!(code = se.code(), kind = se.kind(), "{se}"),
            None => error!(error = %format!("{e:#}"), "run failed"),
        },
    }

    // Ensure logs are flushed before exit
    if let Ok(mut g) = guard_slot.lock() {
        let _ = g.take();
    }
    result
}

fn sort(cfg: &Config) -> Result<()> {
    cfg.validate()?;
    let mut source = pipeline::make_source(cfg)?;
    let report = pipeline::run(cfg, source.as_mut())?;
    out::print_summary(&report, cfg.dry_run);
    Ok(())
}

fn print_config_location() {
    if let Ok(cfg_env) = std::env::var(CONFIG_ENV) {
        out::print_info(&format!("Using {CONFIG_ENV} (explicit):\n  {cfg_env}\n"));
        out::print_info(&format!("To override, unset {CONFIG_ENV} or set it to another file."));
        return;
    }
    match default_config_path() {
        Ok(p) => {
            out::print_info(&format!("Default exif_sorter config path:\n  {}\n", p.display()));
            if p.exists() {
                out::print_info("A config file already exists at that location.");
            } else {
                out::print_info("No config file exists there yet. Run with --init-config to create a template.");
            }
        }
        Err(e) => out::print_error(&format!("Could not determine a default config path: {e}")),
    }
}
