pub mod plot;
pub mod xlsx;

use crate::calibration::{CalibrationRun, PatientResult, Summary};
use crate::config::CalibrationSnapshot;
use crate::error::CalibrationResult;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use log::info;

/// Lets spreadsheet tools detect UTF-8 (unit labels are often non-ASCII).
const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

pub fn save_results<P: AsRef<Path>>(
    run: &CalibrationRun,
    snapshot: &CalibrationSnapshot,
    output_dir: P,
) -> CalibrationResult<()> {
    let output_path = output_dir.as_ref();
    let stem = file_stem(&snapshot.hormone_name);

    let file = File::create(output_path.join(format!("{}_results.csv", stem)))?;
    write_results_csv(&run.results, &snapshot.unit, file)?;

    xlsx::save_results_xlsx(run, &snapshot.unit, output_path.join(format!("{}_results.xlsx", stem)))?;

    save_summary(&run.summary, output_path.join("summary.json"))?;

    snapshot.save(output_path.join(format!("{}_config.json", stem)))?;

    generate_report(run, snapshot, output_path.join(format!("{}_report.md", stem)))?;

    plot::save_calibration_plot(run, &snapshot.standards, output_path.join(format!("{}_calibration.svg", stem)))?;

    info!("All results saved to {:?}", output_path);
    Ok(())
}

pub fn results_header(unit: &str) -> [String; 4] {
    [
        "Patient".to_string(),
        "Optical density".to_string(),
        format!("Concentration ({})", unit),
        "Status".to_string(),
    ]
}

pub fn write_results_csv<W: Write>(results: &[PatientResult], unit: &str, mut writer: W) -> CalibrationResult<()> {
    writer.write_all(UTF8_BOM)?;
    let mut writer = csv::Writer::from_writer(writer);

    writer.write_record(&results_header(unit))?;

    for result in results {
        writer.write_record(&[
            result.index.to_string(),
            result.optical_density.to_string(),
            result.concentration_text(),
            result.status_label().to_string(),
        ])?;
    }

    writer.flush()?;
    Ok(())
}

fn save_summary<P: AsRef<Path>>(summary: &Summary, path: P) -> CalibrationResult<()> {
    let file = File::create(path)?;
    serde_json::to_writer_pretty(file, summary)?;
    Ok(())
}

pub fn render_report(run: &CalibrationRun, snapshot: &CalibrationSnapshot) -> String {
    let domain = match run.domain {
        Some(domain) => format!("{:.4} – {:.4}", domain.min, domain.max),
        None => "n/a".to_string(),
    };

    let mut rows = String::new();
    for result in &run.results {
        rows.push_str(&format!(
            "| {} | {:.4} | {} | {} |\n",
            result.index,
            result.optical_density,
            result.concentration_text(),
            result.status_label()
        ));
    }

    let warning = match &run.warning {
        Some(message) => format!("\n> **Warning**: {}\n", message),
        None => String::new(),
    };

    format!(
        r#"# {hormone} Calibration Report

## Calibration
- **Interpolation method**: {method}
- **Standards**: {standards}
- **Calibrated optical density range**: {domain}
{warning}
## Summary
- **Total patients**: {total}
- **Within range**: {within}
- **Below range**: {below}
- **Above range**: {above}

## Results
| Patient | Optical density | Concentration ({unit}) | Status |
|---|---|---|---|
{rows}
Readings outside the calibrated range are extrapolated from the boundary of
the standard curve and flagged; interpret them with care.
"#,
        hormone = snapshot.hormone_name,
        method = run.method,
        standards = snapshot.standards.len(),
        domain = domain,
        warning = warning,
        total = run.summary.total,
        within = run.summary.within_range,
        below = run.summary.below_range,
        above = run.summary.above_range,
        unit = snapshot.unit,
        rows = rows,
    )
}

pub fn generate_report<P: AsRef<Path>>(
    run: &CalibrationRun,
    snapshot: &CalibrationSnapshot,
    path: P,
) -> CalibrationResult<()> {
    std::fs::write(path, render_report(run, snapshot))?;
    Ok(())
}

/// Hormone name reduced to characters safe in a file name.
pub fn file_stem(name: &str) -> String {
    let stem: String = name
        .trim()
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    if stem.is_empty() {
        "calibration".to_string()
    } else {
        stem
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calibration::calibrate;
    use crate::config::{InterpolationMethod, StandardPoint};

    fn example_run() -> (CalibrationRun, CalibrationSnapshot) {
        let snapshot = CalibrationSnapshot::example();
        let run = calibrate(&snapshot.standards, &snapshot.patients, snapshot.interpolation_method).unwrap();
        (run, snapshot)
    }

    #[test]
    fn test_csv_layout() {
        let (run, snapshot) = example_run();
        let mut buf = Vec::new();
        write_results_csv(&run.results[..2], &snapshot.unit, &mut buf).unwrap();

        assert!(buf.starts_with(UTF8_BOM));
        let text = String::from_utf8(buf[UTF8_BOM.len()..].to_vec()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Patient,Optical density,Concentration (µIU/mL),Status");
        assert_eq!(lines[1], "1,0.15,1.5000,Normal");
        assert_eq!(lines[2], "2,0.25,2.5000,Normal");
    }

    #[test]
    fn test_csv_placeholder() {
        let standards = [StandardPoint::new(0.1, 1.0), StandardPoint::new(0.2, 2.0)];
        let run = calibrate(&standards, &[0.15], InterpolationMethod::CubicSpline).unwrap();

        let mut buf = Vec::new();
        write_results_csv(&run.results, "ng/mL", &mut buf).unwrap();
        let text = String::from_utf8(buf[UTF8_BOM.len()..].to_vec()).unwrap();
        assert_eq!(text.lines().nth(1), Some("1,0.15,N/A,Normal"));
    }

    #[test]
    fn test_csv_keeps_full_optical_density() {
        let standards = [StandardPoint::new(0.1, 1.0), StandardPoint::new(0.5, 5.0)];
        let run = calibrate(&standards, &[0.12346, 0.333333333], InterpolationMethod::Linear).unwrap();

        let mut buf = Vec::new();
        write_results_csv(&run.results, "ng/mL", &mut buf).unwrap();
        let text = String::from_utf8(buf[UTF8_BOM.len()..].to_vec()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[1], "1,0.12346,1.2346,Normal");
        assert_eq!(lines[2], "2,0.333333333,3.3333,Normal");
    }

    #[test]
    fn test_report_contents() {
        let (run, snapshot) = example_run();
        let report = render_report(&run, &snapshot);

        assert!(report.starts_with("# TSH Calibration Report"));
        assert!(report.contains("- **Interpolation method**: linear"));
        assert!(report.contains("- **Within range**: 4"));
        assert!(report.contains("- **Above range**: 6"));
        assert!(report.contains("| 10 | 1.0500 | 10.5000 | Above |"));
        assert!(!report.contains("**Warning**"));
    }

    #[test]
    fn test_file_stem() {
        assert_eq!(file_stem("TSH"), "TSH");
        assert_eq!(file_stem("Free T4 / serum"), "Free_T4___serum");
        assert_eq!(file_stem("Пролактин"), "Пролактин");
        assert_eq!(file_stem("  "), "calibration");
    }
}
