//! ASCII plotting for terminal output.
//!
//! This is intentionally "dumb" (fixed-size grid), optimized for:
//! - quick visual sanity checks in a terminal
//! - deterministic output (helpful for golden tests)
//!
//! Plot elements:
//! - plastic data points `(plastic_strain, true_stress)`: `o`
//! - fitted curves: `L` (Ludwik), `S` (Swift), `V` (Voce)

use crate::domain::{ExportCurve, ModelKind, ReportFile};

/// Render the plastic data with the sampled curves of each fitted law.
pub fn render_ascii_plot(
    plastic: &ExportCurve,
    curves: &[(ModelKind, ExportCurve)],
    width: usize,
    height: usize,
) -> String {
    let points: Vec<(f64, f64)> = plastic.points().collect();
    let lines: Vec<(char, Vec<(f64, f64)>)> = curves
        .iter()
        .map(|(kind, c)| (curve_char(*kind), c.points().collect()))
        .collect();
    render_plot(&points, &lines, width, height)
}

/// Render a plot from a saved report file.
pub fn render_report_plot(report: &ReportFile, width: usize, height: usize) -> String {
    let curves: Vec<(ModelKind, ExportCurve)> = report
        .fits
        .iter()
        .map(|f| (f.model, f.curve.clone()))
        .collect();
    render_ascii_plot(&report.plastic, &curves, width, height)
}

fn curve_char(kind: ModelKind) -> char {
    match kind {
        ModelKind::Ludwik => 'L',
        ModelKind::Swift => 'S',
        ModelKind::Voce => 'V',
    }
}

fn render_plot(
    points: &[(f64, f64)],
    curves: &[(char, Vec<(f64, f64)>)],
    width: usize,
    height: usize,
) -> String {
    let width = width.max(10);
    let height = height.max(5);

    let all = || points.iter().chain(curves.iter().flat_map(|(_, c)| c.iter()));
    let (x_min, x_max) = finite_range(all().map(|p| p.0)).unwrap_or((0.0, 0.5));
    let (y_min, y_max) = finite_range(all().map(|p| p.1)).unwrap_or((0.0, 1.0));
    let (y_min, y_max) = pad_range(y_min, y_max, 0.05);

    let mut grid = vec![vec![' '; width]; height];

    // Draw curves first (so points can overlay).
    for (ch, curve) in curves {
        draw_curve(&mut grid, curve, *ch, (x_min, x_max), (y_min, y_max));
    }

    for &(x, y) in points {
        if !(x.is_finite() && y.is_finite()) {
            continue;
        }
        let col = map_x(x, x_min, x_max, width);
        let row = map_y(y, y_min, y_max, height);
        grid[row][col] = 'o';
    }

    let mut out = String::new();
    out.push_str(&format!(
        "Plot: strain=[{x_min:.4}, {x_max:.4}] | stress=[{y_min:.2}, {y_max:.2}] MPa\n"
    ));

    for row in grid {
        out.push_str(&row.into_iter().collect::<String>());
        out.push('\n');
    }

    let mut legend = vec!["o data".to_string()];
    for (ch, _) in curves {
        let name = ModelKind::ALL
            .into_iter()
            .find(|k| curve_char(*k) == *ch)
            .map_or("fit", |k| k.display_name());
        legend.push(format!("{ch} {name}"));
    }
    out.push_str(&legend.join("  "));
    out.push('\n');

    out
}

fn finite_range(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    let (min, max) = values
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));
    if min.is_finite() && max.is_finite() && max > min {
        Some((min, max))
    } else {
        None
    }
}

fn pad_range(min: f64, max: f64, frac: f64) -> (f64, f64) {
    let span = (max - min).abs();
    let pad = (span * frac).max(1e-12);
    (min - pad, max + pad)
}

fn map_x(x: f64, x_min: f64, x_max: f64, width: usize) -> usize {
    let width = width.max(2);
    let u = ((x - x_min) / (x_max - x_min)).clamp(0.0, 1.0);
    (u * (width as f64 - 1.0)).round() as usize
}

fn map_y(y: f64, y_min: f64, y_max: f64, height: usize) -> usize {
    let height = height.max(2);
    let u = ((y - y_min) / (y_max - y_min)).clamp(0.0, 1.0);
    // y=top is max -> row 0
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
}

fn draw_curve(grid: &mut [Vec<char>], curve: &[(f64, f64)], ch: char, x: (f64, f64), y: (f64, f64)) {
    let height = grid.len();
    let width = grid[0].len();

    let mut prev = None;
    for &(cx, cy) in curve {
        if !(cx.is_finite() && cy.is_finite()) {
            prev = None;
            continue;
        }
        let col = map_x(cx, x.0, x.1, width);
        let row = map_y(cy, y.0, y.1, height);
        match prev {
            Some((c0, r0)) => draw_line(grid, c0, r0, col, row, ch),
            None if grid[row][col] == ' ' => grid[row][col] = ch,
            None => {}
        }
        prev = Some((col, row));
    }
}

/// Integer line drawing (Bresenham-ish).
fn draw_line(grid: &mut [Vec<char>], x0: usize, y0: usize, x1: usize, y1: usize, ch: char) {
    let mut x0 = x0 as isize;
    let mut y0 = y0 as isize;
    let x1 = x1 as isize;
    let y1 = y1 as isize;

    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        if y0 >= 0
            && (y0 as usize) < grid.len()
            && x0 >= 0
            && (x0 as usize) < grid[0].len()
            && grid[y0 as usize][x0 as usize] == ' '
        {
            grid[y0 as usize][x0 as usize] = ch;
        }

        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}
