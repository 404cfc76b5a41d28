use super::results_header;
use crate::calibration::{CalibrationRun, MISSING_CONCENTRATION};
use crate::error::CalibrationResult;
use rust_xlsxwriter::{Color, Format, FormatAlign, FormatBorder, Workbook};
use std::path::Path;

const HEADER_FILL: u32 = 0x2E86AB;
const WITHIN_FILL: u32 = 0xD4EDDA;
const OUTSIDE_FILL: u32 = 0xFFF3CD;

/// Workbook with a `Results` sheet (status cells highlighted by range) and a
/// `Statistics` sheet.
pub fn build_workbook(run: &CalibrationRun, unit: &str) -> CalibrationResult<Workbook> {
    let header = Format::new()
        .set_bold()
        .set_border(FormatBorder::Thin)
        .set_background_color(Color::RGB(HEADER_FILL))
        .set_font_color(Color::White)
        .set_align(FormatAlign::Center);
    let within = status_format(WITHIN_FILL);
    let outside = status_format(OUTSIDE_FILL);

    let mut workbook = Workbook::new();

    let sheet = workbook.add_worksheet();
    sheet.set_name("Results")?;
    for (col, title) in results_header(unit).iter().enumerate() {
        sheet.write_string_with_format(0, col as u16, title, &header)?;
        sheet.set_column_width(col as u16, 22.0)?;
    }
    for (i, result) in run.results.iter().enumerate() {
        let row = i as u32 + 1;
        sheet.write_number(row, 0, result.index as f64)?;
        sheet.write_number(row, 1, result.optical_density)?;
        match result.concentration {
            Some(value) => sheet.write_number(row, 2, value)?,
            None => sheet.write_string(row, 2, MISSING_CONCENTRATION)?,
        };
        let status = if result.range_flag.is_within() { &within } else { &outside };
        sheet.write_string_with_format(row, 3, result.status_label(), status)?;
    }

    let stats = workbook.add_worksheet();
    stats.set_name("Statistics")?;
    stats.write_string_with_format(0, 0, "Parameter", &header)?;
    stats.write_string_with_format(0, 1, "Value", &header)?;
    stats.set_column_width(0, 22.0)?;
    for (i, (label, value)) in run.summary.rows().into_iter().enumerate() {
        let row = i as u32 + 1;
        stats.write_string(row, 0, label)?;
        stats.write_number(row, 1, value as f64)?;
    }

    Ok(workbook)
}

pub fn save_results_xlsx<P: AsRef<Path>>(run: &CalibrationRun, unit: &str, path: P) -> CalibrationResult<()> {
    let mut workbook = build_workbook(run, unit)?;
    workbook.save(path.as_ref())?;
    Ok(())
}

fn status_format(fill: u32) -> Format {
    Format::new()
        .set_background_color(Color::RGB(fill))
        .set_border(FormatBorder::Thin)
        .set_align(FormatAlign::Center)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calibration::calibrate;
    use crate::config::CalibrationSnapshot;

    #[test]
    fn test_workbook_is_zip_container() {
        let snapshot = CalibrationSnapshot::example();
        let run = calibrate(&snapshot.standards, &snapshot.patients, snapshot.interpolation_method).unwrap();

        let mut workbook = build_workbook(&run, &snapshot.unit).unwrap();
        let bytes = workbook.save_to_buffer().unwrap();
        assert!(bytes.len() > 1000);
        assert_eq!(&bytes[..2], b"PK");
    }
}
