//! CLI logic for the xstage inspection tool.
//!
//! This module contains the core CLI logic: it reads a scene document, builds
//! its model and prints a plain-text report of the selected view.

pub mod error_adapter;
pub mod report;

mod args;
mod config;

pub use args::{Args, View};

use std::{
    fs,
    io::{self, Write},
};

use log::{info, warn};

use xstage::{SceneBuilder, XstageError};

use error_adapter::warning_reportables;

/// Run the xstage CLI application
///
/// This function reads the input document, builds the configured scene and
/// writes the report to the output file, or to stdout when none is given.
/// Warnings collected while building the scene are logged and do not fail
/// the run.
///
/// # Errors
///
/// Returns `XstageError` for:
/// - File I/O errors
/// - Configuration loading errors
/// - Malformed documents
pub fn run(args: &Args) -> Result<(), XstageError> {
    info!(
        input_path = args.input,
        view:? = args.view;
        "Processing scene"
    );

    let app_config = config::load_config(args.config.as_ref())?;

    let builder = SceneBuilder::new(app_config);
    let document = builder.load(&args.input)?;
    let scene = builder.build(&document)?;

    report_warnings(scene.warnings(), document.source());

    let report = report::render(&scene, args.view);

    match &args.output {
        Some(path) => {
            fs::write(path, report)?;
            info!(output_file = path; "Report written");
        }
        None => io::stdout().write_all(report.as_bytes())?,
    }

    Ok(())
}

fn report_warnings(warnings: &[xstage::diagnostics::Diagnostic], src: &str) {
    let reporter = miette::GraphicalReportHandler::new();

    for reportable in warning_reportables(warnings, src) {
        let mut writer = String::new();
        match reporter.render_report(&mut writer, &reportable) {
            Ok(()) => warn!("{writer}"),
            Err(_) => warn!("{reportable}"),
        }
    }
}
