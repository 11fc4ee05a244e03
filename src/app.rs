//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - loads `.env` and parses CLI arguments
//! - reads the tensile-test CSV
//! - runs the curve transform and the hardening-law fits
//! - prints reports/plots
//! - writes optional exports

use std::io::Write;

use clap::Parser;

use crate::cli::{Command, CurveArgs, FitArgs, PlotArgs, SynthArgs, TableArgs};
use crate::domain::{FitConfig, InitialGuesses, ModelKind};
use crate::error::AppError;
use crate::models::FittedLaw;

pub mod pipeline;
pub mod session;

/// Entry point for the `hf` binary.
pub fn run() -> Result<(), AppError> {
    // A missing `.env` is normal; values may come from the real environment.
    dotenvy::dotenv().ok();

    let cli = crate::cli::Cli::parse();

    match cli.command {
        Command::Fit(args) => handle_fit(args),
        Command::Table(args) => handle_table(args),
        Command::Synth(args) => handle_synth(args),
        Command::Plot(args) => handle_plot(args),
    }
}

fn handle_fit(args: FitArgs) -> Result<(), AppError> {
    let config = fit_config_from_args(&args);
    let run = pipeline::run_fit(&config)?;

    println!("{}", crate::report::format_run_summary(&run.ingest, &run.session));
    if let Some(outcome) = run.outcome() {
        println!("{}", crate::report::format_fit_results(outcome));
    }

    let curves = run.exports().map(|e| e.curves.clone()).unwrap_or_default();

    if config.plot {
        let plot = crate::plot::render_ascii_plot(
            &run.report.plastic,
            &curves,
            config.plot_width,
            config.plot_height,
        );
        println!("{plot}");
    }

    // Optional exports.
    if let Some(dir) = &config.export_dir {
        let paths = crate::io::export::write_curve_set(dir, &curves)?;
        for p in paths {
            println!("Wrote {}", p.display());
        }
    }
    if let Some(path) = &config.report_path {
        crate::io::report::write_fit_report(path, &run.report)?;
        println!("Wrote {}", path.display());
    }

    Ok(())
}

fn handle_table(args: TableArgs) -> Result<(), AppError> {
    let ingest = crate::io::ingest::read_table(&args.curve.csv)?;
    let config = curve_config(&args.curve);
    let session = pipeline::open_session(&ingest.table, &config)?;

    let table = session.curve().table(args.kind);
    let stdout = std::io::stdout();
    crate::io::export::write_table_csv(stdout.lock(), &table)
}

fn handle_synth(args: SynthArgs) -> Result<(), AppError> {
    let law = FittedLaw::from_params(args.law, args.yield_stress, [args.p1, args.p2]);
    let spec = crate::data::SynthSpec {
        law,
        young_modulus: args.young_modulus,
        max_plastic_strain: args.max_strain,
        elastic_points: args.elastic_points,
        plastic_points: args.points,
        noise_std: args.noise,
        seed: args.seed,
        percent_strain: args.percent,
    };
    let table = crate::data::generate(&spec)?;

    let mut buf = Vec::new();
    write_raw_table(&mut buf, &table)
        .map_err(|e| AppError::new(2, format!("Failed to format synthetic CSV: {e}")))?;

    match &args.out {
        Some(path) => {
            std::fs::write(path, &buf)
                .map_err(|e| AppError::new(2, format!("Failed to write '{}': {e}", path.display())))?;
            println!("Wrote {} rows to {}", table.n_rows(), path.display());
        }
        None => std::io::stdout()
            .write_all(&buf)
            .map_err(|e| AppError::new(2, format!("Failed to write to stdout: {e}")))?,
    }
    Ok(())
}

fn handle_plot(args: PlotArgs) -> Result<(), AppError> {
    let report = crate::io::report::read_fit_report(&args.report)?;

    println!("{}", crate::report::format_report_summary(&report));
    println!("{}", crate::plot::render_report_plot(&report, args.width, args.height));
    Ok(())
}

fn write_raw_table<W: Write>(writer: W, table: &crate::curve::RawTable) -> Result<(), csv::Error> {
    let mut w = csv::Writer::from_writer(writer);
    w.write_record(&table.columns)?;
    for i in 0..table.n_rows() {
        w.write_record(table.data.iter().map(|col| col[i].to_string()))?;
    }
    w.flush()?;
    Ok(())
}

fn curve_config(args: &CurveArgs) -> FitConfig {
    FitConfig {
        csv_path: args.csv.clone(),
        strain_column: args.strain_col.clone(),
        stress_column: args.stress_col.clone(),
        is_percent_strain: args.percent,
        young_modulus: args.young_modulus,
        yield_stress: args.yield_stress,
        fit_range: None,
        basis: Default::default(),
        max_iterations: crate::domain::FitSettings::DEFAULT_MAX_ITERATIONS,
        initial_guesses: InitialGuesses::default(),
        sampling: Default::default(),
        plot: false,
        plot_width: 100,
        plot_height: 25,
        export_dir: None,
        report_path: None,
    }
}

pub fn fit_config_from_args(args: &FitArgs) -> FitConfig {
    let mut initial_guesses = InitialGuesses::default();
    for kind in ModelKind::ALL {
        if let Some(guess) = args.guess_for(kind) {
            initial_guesses.set(kind, guess);
        }
    }

    FitConfig {
        fit_range: args.fit_min.zip(args.fit_max),
        basis: args.basis,
        max_iterations: args.max_iterations,
        initial_guesses,
        sampling: args.sampling_plan(),
        plot: args.plot,
        plot_width: args.width,
        plot_height: args.height,
        export_dir: args.export_dir.clone(),
        report_path: args.report.clone(),
        ..curve_config(&args.curve)
    }
}
