//! End-to-end tests: CSV text → session → fits → sampled exports → report.

use std::path::PathBuf;

use hardening_fit::app::pipeline::{build_report, run_fit_with_table};
use hardening_fit::app::session::Session;
use hardening_fit::curve::{RawSample, StressStrainCurve};
use hardening_fit::data::{SynthSpec, generate};
use hardening_fit::domain::{
    FitConfig, FitRange, FitSettings, InitialGuesses, ModelKind, SamplingPlan, StrainBasis, TableKind,
};
use hardening_fit::error::FitError;
use hardening_fit::fit::fit_curve;
use hardening_fit::io::ingest::parse_table;
use hardening_fit::io::report::{read_fit_report, write_fit_report};
use hardening_fit::models::{FittedLaw, HardeningLaw, Ludwik};

fn scenario_curve() -> StressStrainCurve {
    StressStrainCurve::from_nominal(
        vec![0.0, 0.05, 0.10, 0.15],
        vec![0.0, 250.0, 300.0, 320.0],
        200_000.0,
        240.0,
    )
    .unwrap()
}

fn config(csv_path: PathBuf) -> FitConfig {
    let mut initial_guesses = InitialGuesses::default();
    initial_guesses.set(ModelKind::Ludwik, [400.0, 0.3]);
    FitConfig {
        csv_path,
        strain_column: "strain".to_string(),
        stress_column: "stress".to_string(),
        is_percent_strain: true,
        young_modulus: 200_000.0,
        yield_stress: 250.0,
        fit_range: None,
        basis: StrainBasis::Plastic,
        max_iterations: 1000,
        initial_guesses,
        sampling: SamplingPlan::default(),
        plot: false,
        plot_width: 80,
        plot_height: 20,
        export_dir: None,
        report_path: None,
    }
}

#[test]
fn scenario_plastic_strains() {
    let c = scenario_curve();
    // True stress at index 1 is 262.5 >= 240, so it is plastic too.
    let expected_1 = 1.05_f64.ln() - 262.5 / 200_000.0;
    assert!((c.plastic_strain()[1] - expected_1).abs() < 1e-12);
    assert!((c.plastic_strain()[2] - 0.093_660_180).abs() < 1e-8);
    assert!((c.plastic_strain()[3] - 0.137_921_940).abs() < 1e-8);

    let plastic = c.table(TableKind::Plastic);
    assert_eq!(plastic.rows().next(), Some((0.0, 240.0)));
}

#[test]
fn scenario_ludwik_fit_on_plastic_strain() {
    let c = scenario_curve();
    let settings = FitSettings::new(FitRange::new(0.0, 1.0).unwrap())
        .with_basis(StrainBasis::Plastic)
        .with_initial_guess(ModelKind::Ludwik, [500.0, 0.2]);
    let outcome = fit_curve(&c, &settings).unwrap();
    assert_eq!(outcome.samples.strain.len(), 3);

    let report = outcome.get(ModelKind::Ludwik).unwrap().as_ref().unwrap();
    let [k, n] = report.law.params();
    assert!(k.is_finite() && k > 0.0, "k={k}");
    assert!(n.is_finite() && n > 0.0, "n={n}");
    assert_eq!(report.law.yield_stress(), 240.0);
}

#[test]
fn fit_returns_new_model_value() {
    let c = scenario_curve();
    let plastic = c.plastic_table();
    let seed = Ludwik::new(240.0, 500.0, 0.2);
    let fitted = seed
        .fit(&plastic.strain[1..], &plastic.stress[1..], None, 1000)
        .unwrap();

    assert_eq!(seed.params(), [500.0, 0.2]);
    let [k, n] = fitted.params();
    assert!(k.is_finite() && k > 0.0, "k={k}");
    assert!(n.is_finite() && n > 0.0, "n={n}");
    assert_ne!(fitted.params(), seed.params());
    assert_eq!(fitted.yield_stress(), 240.0);
}

#[test]
fn per_model_failures_are_isolated() {
    let sample = RawSample::new(
        vec![0.0, 0.05, 0.10, 0.15],
        vec![0.0, 250.0, 300.0, 320.0],
        false,
        200_000.0,
        240.0,
    )
    .unwrap();
    let mut session = Session::new(sample).unwrap();
    let outcome = session
        .fit(
            FitSettings::new(FitRange::new(0.0, 1.0).unwrap())
                .with_basis(StrainBasis::True)
                .with_initial_guess(ModelKind::Ludwik, [500.0, 0.2]),
        )
        .unwrap();

    assert!(outcome.failures().count() >= 1);
    assert!(outcome.successes().count() >= 1);
    for (kind, err) in outcome.failures() {
        assert!(matches!(err, FitError::FitConvergence { model, .. } if *model == kind), "{kind}: {err}");
    }
    assert!(matches!(
        outcome.get(ModelKind::Voce),
        Some(Err(FitError::FitConvergence { model: ModelKind::Voce, .. }))
    ));

    session.export(SamplingPlan::default()).unwrap();
    let report = build_report(&session, &PathBuf::from("scenario.csv")).unwrap();
    assert_eq!(report.failures.iter().map(|f| f.model).collect::<Vec<_>>(), vec![ModelKind::Voce]);
    assert_eq!(
        report.fits.iter().map(|f| f.model).collect::<Vec<_>>(),
        vec![ModelKind::Ludwik, ModelKind::Swift]
    );
}

#[test]
fn text_columns_next_to_strain_and_stress_are_ignored() {
    let law = FittedLaw::from_params(ModelKind::Ludwik, 250.0, [500.0, 0.2]);
    let mut spec = SynthSpec::new(law, 200_000.0);
    spec.percent_strain = true;
    let table = generate(&spec).unwrap();

    let mut text = String::from("specimen,strain,stress,note\n");
    let strain = table.column("strain").unwrap();
    let stress = table.column("stress").unwrap();
    for (e, s) in strain.iter().zip(stress) {
        text.push_str(&format!("A1,{e},{s},ok\n"));
    }
    text.push_str("A1,,,unloaded\n");
    let ingest = parse_table(text.as_bytes()).unwrap();
    assert_eq!(ingest.rows_skipped(), 1);

    let run = run_fit_with_table(&config(PathBuf::from("machine.csv")), ingest).unwrap();
    assert_eq!(run.session.sample().len(), 65);
    assert_eq!(run.ingest.rows_used, 65);
    assert_eq!(run.outcome().unwrap().best, Some(ModelKind::Ludwik));
}

#[test]
fn exported_report_curves_are_finite_and_reload() {
    let sample = RawSample::new(
        vec![0.0, 0.05, 0.10, 0.15],
        vec![0.0, 250.0, 300.0, 320.0],
        false,
        200_000.0,
        240.0,
    )
    .unwrap();
    let mut session = Session::new(sample).unwrap();
    session
        .fit(
            FitSettings::new(FitRange::new(0.0, 1.0).unwrap())
                .with_basis(StrainBasis::Plastic)
                .with_initial_guess(ModelKind::Ludwik, [500.0, 0.2]),
        )
        .unwrap();
    session.export(SamplingPlan::default()).unwrap();

    let report = build_report(&session, &PathBuf::from("scenario.csv")).unwrap();
    for fit in &report.fits {
        assert!(fit.curve.stress.iter().all(|v| v.is_finite()), "{:?}", fit.model);
        assert_eq!(fit.curve.is_empty(), fit.curve_error.is_some());
    }

    let path = std::env::temp_dir().join(format!("hf-scenario-{}.json", std::process::id()));
    write_fit_report(&path, &report).unwrap();
    let back = read_fit_report(&path).unwrap();
    std::fs::remove_file(&path).unwrap();
    assert_eq!(back.fits.len(), report.fits.len());
}

#[test]
fn synthetic_csv_runs_through_the_pipeline() {
    let law = FittedLaw::from_params(ModelKind::Ludwik, 250.0, [500.0, 0.2]);
    let mut spec = SynthSpec::new(law, 200_000.0);
    spec.percent_strain = true;
    let table = generate(&spec).unwrap();

    // Render the table as CSV text and ingest it back.
    let mut text = String::from("strain,stress\n");
    let strain = table.column("strain").unwrap();
    let stress = table.column("stress").unwrap();
    for (e, s) in strain.iter().zip(stress) {
        text.push_str(&format!("{e},{s}\n"));
    }
    text.push_str("oops,1\n");
    let ingest = parse_table(text.as_bytes()).unwrap();

    let run = run_fit_with_table(&config(PathBuf::from("synthetic.csv")), ingest).unwrap();
    assert_eq!(run.ingest.rows_skipped(), 1);
    assert_eq!(run.session.sample().len(), 65);
    let outcome = run.outcome().unwrap();
    assert_eq!(outcome.best, Some(ModelKind::Ludwik));

    let ludwik = outcome.get(ModelKind::Ludwik).unwrap().as_ref().unwrap();
    let [k, n] = ludwik.law.params();
    assert!((k - 500.0).abs() / 500.0 < 1e-3, "k={k}");
    assert!((n - 0.2).abs() / 0.2 < 1e-3, "n={n}");

    let exports = run.exports().unwrap();
    assert_eq!(exports.get(ModelKind::Ludwik).unwrap().len(), 67);

    assert_eq!(run.report.best, Some(ModelKind::Ludwik));
    assert_eq!(run.report.plastic.strain[0], 0.0);
    assert_eq!(
        run.report.fits.len() + run.report.failures.len(),
        ModelKind::ALL.len()
    );
}

#[test]
fn report_round_trips_through_json() {
    let law = FittedLaw::from_params(ModelKind::Voce, 250.0, [450.0, 8.0]);
    let table = generate(&SynthSpec::new(law, 200_000.0)).unwrap();
    let sample = RawSample::new(
        table.column("strain").unwrap().to_vec(),
        table.column("stress").unwrap().to_vec(),
        false,
        200_000.0,
        250.0,
    )
    .unwrap();

    let mut session = Session::new(sample).unwrap();
    let range = session.default_fit_range(StrainBasis::Plastic).unwrap();
    session
        .fit(
            FitSettings::new(range)
                .with_basis(StrainBasis::Plastic)
                .with_initial_guess(ModelKind::Voce, [400.0, 5.0]),
        )
        .unwrap();
    session.export(SamplingPlan::default()).unwrap();

    let report = build_report(&session, &PathBuf::from("voce.csv")).unwrap();
    let path = std::env::temp_dir().join(format!("hf-report-{}.json", std::process::id()));
    write_fit_report(&path, &report).unwrap();
    let back = read_fit_report(&path).unwrap();
    std::fs::remove_file(&path).unwrap();

    assert_eq!(back.source, "voce.csv");
    assert_eq!(back.best, report.best);
    assert_eq!(back.settings.basis, StrainBasis::Plastic);
    assert_eq!(back.sampling, SamplingPlan::default());
    let voce = back.fits.iter().find(|f| f.model == ModelKind::Voce).unwrap();
    assert_eq!(voce.params[0].0, "stress_infinite");
    assert!((voce.params[0].1 - 450.0).abs() < 0.5);
    assert_eq!(voce.curve.len(), 67);
}
