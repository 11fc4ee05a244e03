//! Command-line parsing for the hardening-law fitter.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the modeling/math code.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::domain::{ModelKind, SamplingPlan, StrainBasis, TableKind};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "hf", version, about = "Hardening-law fitter for tensile-test curves")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fit Ludwik, Swift and Voce to a curve, print results, and optionally plot/export.
    Fit(FitArgs),
    /// Print the nominal, true or plastic table of a curve as CSV.
    Table(TableArgs),
    /// Write a synthetic nominal stress-strain CSV from a known law.
    Synth(SynthArgs),
    /// Plot a previously saved fit report.
    Plot(PlotArgs),
}

/// Input file, column selection and moduli shared by `fit` and `table`.
#[derive(Debug, Args, Clone)]
pub struct CurveArgs {
    /// CSV file with a header row.
    #[arg(long, value_name = "CSV")]
    pub csv: PathBuf,

    /// Name of the strain column.
    #[arg(long, default_value = "strain")]
    pub strain_col: String,

    /// Name of the stress column.
    #[arg(long, default_value = "stress")]
    pub stress_col: String,

    /// Strain column is in percent.
    #[arg(long)]
    pub percent: bool,

    /// Young's modulus (MPa).
    #[arg(long, env = "HF_YOUNG_MODULUS")]
    pub young_modulus: f64,

    /// Yield stress (MPa).
    #[arg(long, env = "HF_YIELD_STRESS")]
    pub yield_stress: f64,
}

#[derive(Debug, Args, Clone)]
pub struct FitArgs {
    #[command(flatten)]
    pub curve: CurveArgs,

    /// Lower (exclusive) bound of the fit range.
    #[arg(long, requires = "fit_max")]
    pub fit_min: Option<f64>,

    /// Upper (inclusive) bound of the fit range.
    #[arg(long, requires = "fit_min")]
    pub fit_max: Option<f64>,

    /// Strain the fit range and the laws refer to.
    #[arg(long, value_enum, default_value_t = StrainBasis::True)]
    pub basis: StrainBasis,

    /// Solver iteration cap per law.
    #[arg(long, env = "HF_MAX_ITERATIONS", default_value_t = 1000)]
    pub max_iterations: usize,

    /// Initial guess for Ludwik as `k,n`.
    #[arg(long, value_name = "K,N", value_parser = parse_pair)]
    pub ludwik_guess: Option<(f64, f64)>,

    /// Initial guess for Swift as `alpha,n`.
    #[arg(long, value_name = "ALPHA,N", value_parser = parse_pair)]
    pub swift_guess: Option<(f64, f64)>,

    /// Initial guess for Voce as `stress_infinite,h`.
    #[arg(long, value_name = "SINF,H", value_parser = parse_pair)]
    pub voce_guess: Option<(f64, f64)>,

    /// Export sampling range as `lo,hi`.
    #[arg(long, value_name = "LO,HI", value_parser = parse_pair, default_value = "0,0.5")]
    pub range: (f64, f64),

    /// Points spread over the export range.
    #[arg(long, default_value_t = 20)]
    pub points: usize,

    /// Densely sampled sub-range as `lo,hi`.
    #[arg(long, value_name = "LO,HI", value_parser = parse_pair, default_value = "0,0.05")]
    pub detail_range: (f64, f64),

    /// Points on the detail range.
    #[arg(long, default_value_t = 50)]
    pub detail_points: usize,

    /// Render an ASCII plot in the terminal.
    #[arg(long)]
    pub plot: bool,

    /// Plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 25)]
    pub height: usize,

    /// Write one `strain,stress` CSV per fitted law into this directory.
    #[arg(long, value_name = "DIR")]
    pub export_dir: Option<PathBuf>,

    /// Write a JSON fit report.
    #[arg(long, value_name = "JSON")]
    pub report: Option<PathBuf>,
}

impl FitArgs {
    pub fn sampling_plan(&self) -> SamplingPlan {
        SamplingPlan {
            range: self.range,
            num_points: self.points,
            detail_range: self.detail_range,
            detail_points: self.detail_points,
        }
    }

    pub fn guess_for(&self, kind: ModelKind) -> Option<[f64; 2]> {
        let pair = match kind {
            ModelKind::Ludwik => self.ludwik_guess,
            ModelKind::Swift => self.swift_guess,
            ModelKind::Voce => self.voce_guess,
        };
        pair.map(|(a, b)| [a, b])
    }
}

#[derive(Debug, Args, Clone)]
pub struct TableArgs {
    #[command(flatten)]
    pub curve: CurveArgs,

    /// Which table to print.
    #[arg(long, value_enum, default_value_t = TableKind::Plastic)]
    pub kind: TableKind,
}

#[derive(Debug, Args, Clone)]
pub struct SynthArgs {
    /// Law the data follows.
    #[arg(long, value_enum, default_value_t = ModelKind::Ludwik)]
    pub law: ModelKind,

    /// First free parameter (k, alpha or stress_infinite).
    #[arg(long)]
    pub p1: f64,

    /// Second free parameter (n, n or h).
    #[arg(long)]
    pub p2: f64,

    /// Yield stress (MPa).
    #[arg(long, env = "HF_YIELD_STRESS")]
    pub yield_stress: f64,

    /// Young's modulus (MPa).
    #[arg(long, env = "HF_YOUNG_MODULUS")]
    pub young_modulus: f64,

    /// Largest plastic strain generated.
    #[arg(long, default_value_t = 0.3)]
    pub max_strain: f64,

    /// Points on the plastic branch.
    #[arg(long, default_value_t = 60)]
    pub points: usize,

    /// Points on the elastic branch.
    #[arg(long, default_value_t = 5)]
    pub elastic_points: usize,

    /// Standard deviation of stress noise (MPa).
    #[arg(long, default_value_t = 0.0)]
    pub noise: f64,

    /// Random seed for the noise.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Write strain in percent.
    #[arg(long)]
    pub percent: bool,

    /// Output CSV (stdout if omitted).
    #[arg(long, value_name = "CSV")]
    pub out: Option<PathBuf>,
}

/// Options for plotting a saved report.
#[derive(Debug, Args)]
pub struct PlotArgs {
    /// Report JSON file produced by `hf fit --report`.
    #[arg(long, value_name = "JSON")]
    pub report: PathBuf,

    /// Plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 25)]
    pub height: usize,
}

/// Parse `a,b` into a pair of finite floats.
pub fn parse_pair(s: &str) -> Result<(f64, f64), String> {
    let (a, b) = s
        .split_once(',')
        .ok_or_else(|| format!("expected `a,b`, got '{s}'"))?;
    let parse = |v: &str| -> Result<f64, String> {
        let x = v
            .trim()
            .parse::<f64>()
            .map_err(|e| format!("invalid number '{}': {e}", v.trim()))?;
        if x.is_finite() {
            Ok(x)
        } else {
            Err(format!("value must be finite, got '{}'", v.trim()))
        }
    };
    Ok((parse(a)?, parse(b)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pairs_parse_with_whitespace() {
        assert_eq!(parse_pair("0, 0.5"), Ok((0.0, 0.5)));
        assert!(parse_pair("0.5").is_err());
        assert!(parse_pair("a,1").is_err());
        assert!(parse_pair("inf,1").is_err());
    }

    #[test]
    fn fit_args_defaults() {
        let cli = Cli::try_parse_from([
            "hf",
            "fit",
            "--csv",
            "curve.csv",
            "--young-modulus",
            "200000",
            "--yield-stress",
            "250",
            "--ludwik-guess",
            "500,0.2",
        ])
        .unwrap();
        let Command::Fit(args) = cli.command else {
            panic!("expected fit");
        };
        assert_eq!(args.curve.strain_col, "strain");
        assert_eq!(args.sampling_plan(), SamplingPlan::default());
        assert_eq!(args.guess_for(ModelKind::Ludwik), Some([500.0, 0.2]));
        assert_eq!(args.guess_for(ModelKind::Voce), None);
        assert_eq!(args.basis, StrainBasis::True);
        assert!(args.fit_min.is_none());
    }

    #[test]
    fn fit_range_bounds_come_together() {
        let res = Cli::try_parse_from([
            "hf",
            "fit",
            "--csv",
            "c.csv",
            "--young-modulus",
            "1",
            "--yield-stress",
            "1",
            "--fit-min",
            "0",
        ]);
        assert!(res.is_err());
    }
}
