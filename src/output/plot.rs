use crate::calibration::{CalibrationRun, RangeFlag};
use crate::config::StandardPoint;
use crate::error::{CalibrationError, CalibrationResult};
use log::info;
use plotters::coord::Shift;
use plotters::drawing::DrawingAreaErrorKind;
use plotters::prelude::*;
use std::ops::Range;
use std::path::Path;

const PLOT_SIZE: (u32, u32) = (800, 600);
const ORANGE: RGBColor = RGBColor(255, 165, 0);
/// Dash plus gap count along a domain boundary line.
const DASH_SEGMENTS: usize = 40;

/// Writes the standard curve with the patient readings overlaid as SVG.
pub fn save_calibration_plot<P: AsRef<Path>>(
    run: &CalibrationRun,
    standards: &[StandardPoint],
    path: P,
) -> CalibrationResult<()> {
    let svg = render_calibration_svg(run, standards)?;
    std::fs::write(path.as_ref(), svg)?;
    info!("Calibration plot saved to {:?}", path.as_ref());
    Ok(())
}

/// Standards as a line with markers, readings colored by range flag
/// (green within, red below, orange above), dashed lines at the domain ends.
/// Readings without a concentration are not drawn.
pub fn render_calibration_svg(run: &CalibrationRun, standards: &[StandardPoint]) -> CalibrationResult<String> {
    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, PLOT_SIZE).into_drawing_area();
        draw_calibration(&root, run, standards).map_err(plot_error)?;
        root.present().map_err(plot_error)?;
    }
    Ok(svg)
}

fn draw_calibration<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    run: &CalibrationRun,
    standards: &[StandardPoint],
) -> Result<(), DrawingAreaErrorKind<DB::ErrorType>> {
    root.fill(&WHITE)?;

    let mut curve: Vec<(f64, f64)> = standards
        .iter()
        .map(|p| (p.optical_density, p.concentration))
        .collect();
    curve.sort_by(|a, b| a.0.total_cmp(&b.0));

    let readings: Vec<(f64, f64, RangeFlag)> = run
        .results
        .iter()
        .filter_map(|r| r.concentration.map(|c| (r.optical_density, c, r.range_flag)))
        .collect();

    let x_range = padded_range(curve.iter().map(|p| p.0).chain(readings.iter().map(|r| r.0)));
    let y_range = padded_range(curve.iter().map(|p| p.1).chain(readings.iter().map(|r| r.1)));
    let y_bounds = (y_range.start, y_range.end);

    // No label areas: the chart carries no text, so no font backend is needed.
    let mut chart = ChartBuilder::on(root)
        .margin(20)
        .build_cartesian_2d(x_range, y_range)?;

    chart.configure_mesh().draw()?;

    chart.draw_series(LineSeries::new(curve.iter().copied(), &BLUE))?;
    chart.draw_series(curve.iter().map(|&point| Circle::new(point, 4, BLUE.filled())))?;

    chart.draw_series(
        readings
            .iter()
            .map(|&(od, conc, flag)| Circle::new((od, conc), 5, flag_color(flag).filled())),
    )?;

    if let Some(domain) = run.domain {
        for x in [domain.min, domain.max] {
            chart.draw_series(
                dashes(x, y_bounds)
                    .into_iter()
                    .map(|segment| PathElement::new(segment, BLACK.mix(0.6))),
            )?;
        }
    }

    Ok(())
}

fn flag_color(flag: RangeFlag) -> RGBColor {
    match flag {
        RangeFlag::WithinRange => GREEN,
        RangeFlag::BelowRange => RED,
        RangeFlag::AboveRange => ORANGE,
    }
}

/// Vertical dashes at `x` covering `y0..y1`.
fn dashes(x: f64, (y0, y1): (f64, f64)) -> Vec<Vec<(f64, f64)>> {
    let step = (y1 - y0) / DASH_SEGMENTS as f64;
    (0..DASH_SEGMENTS)
        .step_by(2)
        .map(|i| {
            let start = y0 + step * i as f64;
            vec![(x, start), (x, start + step)]
        })
        .collect()
}

/// Value range widened by 5% on each side; a single value gets a unit-scale margin.
fn padded_range(values: impl Iterator<Item = f64>) -> Range<f64> {
    let (lo, hi) = values
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));
    if lo > hi {
        return 0.0..1.0;
    }

    let pad = if hi > lo { 0.05 * (hi - lo) } else { 0.5 * lo.abs().max(1.0) };
    (lo - pad)..(hi + pad)
}

fn plot_error(err: DrawingAreaErrorKind<std::io::Error>) -> CalibrationError {
    CalibrationError::Plot(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calibration::calibrate;
    use crate::config::{CalibrationSnapshot, InterpolationMethod};
    use approx::assert_relative_eq;

    fn tsh_standards() -> Vec<StandardPoint> {
        CalibrationSnapshot::example().standards
    }

    #[test]
    fn test_readings_colored_by_flag() {
        let standards = tsh_standards();
        let run = calibrate(&standards, &[0.05, 0.3, 0.7], InterpolationMethod::Linear).unwrap();

        let svg = render_calibration_svg(&run, &standards).unwrap().to_lowercase();
        assert!(svg.contains("<svg"));
        // five standard markers plus three readings
        assert_eq!(svg.matches("<circle").count(), 8);
        for color in ["#00ff00", "#ff0000", "#ffa500", "#0000ff"] {
            assert!(svg.contains(color), "missing {}", color);
        }
    }

    #[test]
    fn test_placeholder_readings_are_not_drawn() {
        let standards = &tsh_standards()[..2];
        let run = calibrate(standards, &[0.15, 0.35], InterpolationMethod::CubicSpline).unwrap();
        assert!(run.warning.is_some());

        let svg = render_calibration_svg(&run, standards).unwrap().to_lowercase();
        assert_eq!(svg.matches("<circle").count(), 2);
        assert!(!svg.contains("#00ff00"));
    }

    #[test]
    fn test_dashes_cover_half_the_span() {
        let segments = dashes(0.3, (0.0, 8.0));
        assert_eq!(segments.len(), DASH_SEGMENTS / 2);
        assert_eq!(segments[0], vec![(0.3, 0.0), (0.3, 0.2)]);

        let drawn: f64 = segments.iter().map(|s| s[1].1 - s[0].1).sum();
        assert_relative_eq!(drawn, 4.0, epsilon = 1e-9);
    }

    #[test]
    fn test_padded_range() {
        let range = padded_range([0.1, 0.5, 0.3].into_iter());
        assert_relative_eq!(range.start, 0.08, epsilon = 1e-12);
        assert_relative_eq!(range.end, 0.52, epsilon = 1e-12);

        let single = padded_range([2.0].into_iter());
        assert_relative_eq!(single.start, 1.0);
        assert_relative_eq!(single.end, 3.0);

        assert_eq!(padded_range(std::iter::empty()), 0.0..1.0);
        assert_eq!(padded_range([f64::NAN].into_iter()), 0.0..1.0);
    }
}
