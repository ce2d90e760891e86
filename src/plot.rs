//! SVG charts of the calibration curves and of the regressions

use plotters::prelude::*;
use std::{error::Error, ops::Range, path::Path};

use crate::{deficit::DeficitFit, report::ChannelReport, stats::LinearRegression};

type Result<T> = std::result::Result<T, Box<dyn Error>>;

fn min_max<'a>(values: impl IntoIterator<Item = &'a f64>) -> Range<f64> {
    let (min, max) = values
        .into_iter()
        .filter(|x| x.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(a, b), &x| {
            (a.min(x), b.max(x))
        });
    if min > max {
        return 0f64..1f64;
    }
    let margin = if max > min { (max - min) * 1e-2 } else { 1f64 };
    min - margin..max + margin
}

fn tableau(i: usize) -> RGBColor {
    let color = colorous::TABLEAU10[i % colorous::TABLEAU10.len()];
    RGBColor(color.r, color.g, color.b)
}

// contiguous runs of finite samples, NaN samples break the line
fn finite_runs(xy: impl Iterator<Item = (f64, f64)>) -> Vec<Vec<(f64, f64)>> {
    let mut runs = vec![vec![]];
    for (x, y) in xy {
        if x.is_finite() && y.is_finite() {
            if let Some(run) = runs.last_mut() {
                run.push((x, y));
            }
        } else if runs.last().is_some_and(|run| !run.is_empty()) {
            runs.push(vec![]);
        }
    }
    runs.retain(|run| !run.is_empty());
    runs
}

/// Brightness temperature against pixel count with the calibration point
pub fn temperature_curve<P: AsRef<Path>>(report: &ChannelReport, path: P) -> Result<()> {
    let plot = SVGBackend::new(path.as_ref(), (768, 512)).into_drawing_area();
    plot.fill(&WHITE)?;
    let curve = &report.curve;
    let mut chart = ChartBuilder::on(&plot)
        .caption(
            format!("Brightness temperature for channel {}", report.calibration.channel),
            ("sans-serif", 20),
        )
        .set_label_area_size(LabelAreaPosition::Left, 60)
        .set_label_area_size(LabelAreaPosition::Bottom, 40)
        .margin(10)
        .build_cartesian_2d(min_max(curve.pixel().iter()), min_max(curve.temperature()))?;
    chart
        .configure_mesh()
        .x_desc("Pixel count, P")
        .y_desc("Brightness temperature, T [K]")
        .draw()?;
    let color = tableau(0);
    for (i, run) in finite_runs(curve.iter()).into_iter().enumerate() {
        let series = chart.draw_series(LineSeries::new(run, &color))?;
        if i == 0 {
            series
                .label("T(P)")
                .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], &color));
        }
    }
    if let Some(point) = report.calibration_point {
        let marker = tableau(1);
        chart
            .draw_series(std::iter::once(Cross::new(
                (point.pixel, point.temperature),
                6,
                marker.stroke_width(2),
            )))?
            .label("Calibration point")
            .legend(move |(x, y)| Cross::new((x + 10, y), 4, marker.stroke_width(2)));
    }
    chart
        .configure_series_labels()
        .border_style(&BLACK)
        .background_style(&WHITE.mix(0.8))
        .position(SeriesLabelPosition::UpperRight)
        .draw()?;
    plot.present()?;
    Ok(())
}

fn xy_chart<P: AsRef<Path>>(
    path: P,
    caption: &str,
    (x_desc, y_desc): (&str, &str),
    series: &[(String, Vec<(f64, f64)>)],
) -> Result<()> {
    let plot = SVGBackend::new(path.as_ref(), (768, 512)).into_drawing_area();
    plot.fill(&WHITE)?;
    let x_range = min_max(series.iter().flat_map(|(_, xy)| xy.iter().map(|(x, _)| x)));
    let y_range = min_max(series.iter().flat_map(|(_, xy)| xy.iter().map(|(_, y)| y)));
    let mut chart = ChartBuilder::on(&plot)
        .caption(caption, ("sans-serif", 20))
        .set_label_area_size(LabelAreaPosition::Left, 60)
        .set_label_area_size(LabelAreaPosition::Bottom, 40)
        .margin(10)
        .build_cartesian_2d(x_range, y_range)?;
    chart.configure_mesh().x_desc(x_desc).y_desc(y_desc).draw()?;
    for (i, (key, xy)) in series.iter().enumerate() {
        let color = tableau(i);
        for (j, run) in finite_runs(xy.iter().cloned()).into_iter().enumerate() {
            let drawn = chart.draw_series(LineSeries::new(run, &color))?;
            if j == 0 {
                drawn
                    .label(key.as_str())
                    .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], &color));
            }
        }
    }
    chart
        .configure_series_labels()
        .border_style(&BLACK)
        .background_style(&WHITE.mix(0.8))
        .position(SeriesLabelPosition::UpperRight)
        .draw()?;
    plot.present()?;
    Ok(())
}

/// Numerical NEDT against pixel count
pub fn nedt<P: AsRef<Path>>(report: &ChannelReport, path: P) -> Result<()> {
    xy_chart(
        path,
        &format!("Numerical NEDT in channel {}", report.calibration.channel),
        ("Pixel count", "NEDT [K]"),
        &[("NEDT".to_string(), report.nedt.iter().collect())],
    )
}

/// Brightness temperature curves of several channels on the same axis
pub fn channels<P: AsRef<Path>>(reports: &[ChannelReport], path: P) -> Result<()> {
    let series: Vec<_> = reports
        .iter()
        .map(|report| {
            (
                format!("T{}(P)", report.calibration.channel),
                report.curve.iter().collect(),
            )
        })
        .collect();
    xy_chart(
        path,
        "Brightness temperature for all channels",
        ("Pixel count, P", "Brightness temperature, T [K]"),
        &series,
    )
}

/// Residuals between the analytic and the numerical NEDT
pub fn residuals<P: AsRef<Path>>(report: &ChannelReport, path: P) -> Result<()> {
    let residuals = report.residuals()?;
    xy_chart(
        path,
        "Residuals between analytic and numerical NEDT",
        ("Pixel count", "Residuals [K]"),
        &[(
            "analytic - numerical".to_string(),
            report
                .nedt
                .pixel()
                .iter()
                .cloned()
                .zip(residuals)
                .collect(),
        )],
    )
}

/// Brightness temperature with the `T ± NEDT` shaded band
pub fn band<P: AsRef<Path>>(report: &ChannelReport, path: P) -> Result<()> {
    let band = report.band()?;
    let plot = SVGBackend::new(path.as_ref(), (768, 512)).into_drawing_area();
    plot.fill(&WHITE)?;
    let mut chart = ChartBuilder::on(&plot)
        .caption(
            format!("T ± NEDT for channel {}", report.calibration.channel),
            ("sans-serif", 20),
        )
        .set_label_area_size(LabelAreaPosition::Left, 60)
        .set_label_area_size(LabelAreaPosition::Bottom, 40)
        .margin(10)
        .build_cartesian_2d(
            min_max(report.curve.pixel().iter()),
            min_max(band.upper.iter().chain(band.lower.iter())),
        )?;
    chart
        .configure_mesh()
        .x_desc("Pixel count, P")
        .y_desc("Brightness temperature, T [K]")
        .draw()?;
    let shade = tableau(1).mix(0.5);
    let upper = band.pixel.iter().cloned().zip(band.upper.iter().cloned());
    let lower = band.pixel.iter().cloned().zip(band.lower.iter().cloned());
    for (run_upper, run_lower) in finite_runs(upper).into_iter().zip(finite_runs(lower)) {
        let polygon: Vec<_> = run_upper
            .into_iter()
            .chain(run_lower.into_iter().rev())
            .collect();
        chart.draw_series(std::iter::once(Polygon::new(polygon, shade.filled())))?;
    }
    let color = tableau(0);
    for run in finite_runs(report.curve.iter()) {
        chart.draw_series(LineSeries::new(run, &color))?;
    }
    plot.present()?;
    Ok(())
}

/// Data points with error bars and the regression line
pub fn regression<P: AsRef<Path>>(
    x: &[f64],
    y: &[f64],
    dy: Option<&[f64]>,
    fit: &LinearRegression,
    (x_desc, y_desc): (&str, &str),
    path: P,
) -> Result<()> {
    let plot = SVGBackend::new(path.as_ref(), (768, 512)).into_drawing_area();
    plot.fill(&WHITE)?;
    let x_range = min_max(x);
    let y_bounds: Vec<f64> = match dy {
        Some(dy) => y
            .iter()
            .zip(dy)
            .flat_map(|(y, dy)| [y - dy, y + dy])
            .chain(fit.line(&[x_range.start, x_range.end]))
            .collect(),
        None => y
            .iter()
            .cloned()
            .chain(fit.line(&[x_range.start, x_range.end]))
            .collect(),
    };
    let mut chart = ChartBuilder::on(&plot)
        .caption(format!("Plot of {y_desc} against {x_desc}"), ("sans-serif", 20))
        .set_label_area_size(LabelAreaPosition::Left, 60)
        .set_label_area_size(LabelAreaPosition::Bottom, 40)
        .margin(10)
        .build_cartesian_2d(x_range.clone(), min_max(&y_bounds))?;
    chart.configure_mesh().x_desc(x_desc).y_desc(y_desc).draw()?;
    let data = tableau(0);
    match dy {
        Some(dy) => {
            chart
                .draw_series(x.iter().zip(y).zip(dy).map(|((&x, &y), &dy)| {
                    ErrorBar::new_vertical(x, y - dy, y, y + dy, data.filled(), 10)
                }))?
                .label("Data")
                .legend(move |(x, y)| Circle::new((x + 10, y), 3, data.filled()));
        }
        None => {
            chart
                .draw_series(
                    x.iter()
                        .zip(y)
                        .map(|(&x, &y)| Circle::new((x, y), 3, data.filled())),
                )?
                .label("Data")
                .legend(move |(x, y)| Circle::new((x + 10, y), 3, data.filled()));
        }
    }
    let line = tableau(1);
    let xs = [x_range.start, x_range.end];
    chart
        .draw_series(LineSeries::new(
            xs.iter().cloned().zip(fit.line(&xs)),
            &line,
        ))?
        .label("Regression")
        .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], &line));
    chart
        .configure_series_labels()
        .border_style(&BLACK)
        .background_style(&WHITE.mix(0.8))
        .position(SeriesLabelPosition::UpperLeft)
        .draw()?;
    plot.present()?;
    Ok(())
}

/// Temperature deficits against the water vapour column with the regression lines
pub fn deficit<P: AsRef<Path>>(
    x: &[f64],
    deficits: [(&str, &[f64]); 3],
    fit: &DeficitFit,
    path: P,
) -> Result<()> {
    let plot = SVGBackend::new(path.as_ref(), (1024, 768)).into_drawing_area();
    plot.fill(&WHITE)?;
    let x_range = min_max(x.iter().chain(std::iter::once(&0f64)));
    let fits = [&fit.k9, &fit.k10, &fit.delta];
    let y_values: Vec<f64> = deficits
        .iter()
        .flat_map(|(_, dt)| dt.iter().cloned())
        .chain(
            fits.iter()
                .flat_map(|fit| fit.line(&[x_range.start, x_range.end])),
        )
        .collect();
    let mut chart = ChartBuilder::on(&plot)
        .caption("Temperature deficit as a function of WVC", ("sans-serif", 24))
        .set_label_area_size(LabelAreaPosition::Left, 60)
        .set_label_area_size(LabelAreaPosition::Bottom, 40)
        .margin(10)
        .build_cartesian_2d(x_range.clone(), min_max(&y_values))?;
    chart
        .configure_mesh()
        .x_desc("Water vapour column, x")
        .y_desc("ΔT [K]")
        .draw()?;
    let xs = [x_range.start, x_range.end];
    for (i, ((key, dt), fit)) in deficits.iter().zip(fits).enumerate() {
        let color = tableau(i);
        chart
            .draw_series(
                x.iter()
                    .zip(dt.iter())
                    .map(|(&x, &y)| Circle::new((x, y), 4, color.filled())),
            )?
            .label(*key)
            .legend(move |(x, y)| Circle::new((x + 10, y), 4, color.filled()));
        chart
            .draw_series(LineSeries::new(xs.iter().cloned().zip(fit.line(&xs)), &color))?
            .label(format!("k={:.4}", fit.slope))
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], &color));
    }
    chart
        .configure_series_labels()
        .border_style(&BLACK)
        .background_style(&WHITE.mix(0.8))
        .position(SeriesLabelPosition::UpperLeft)
        .draw()?;
    plot.present()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nan_splits_runs() {
        let xy = [(0., 1.), (1., f64::NAN), (2., 3.), (3., 4.), (4., f64::NAN)];
        let runs = finite_runs(xy.into_iter());
        assert_eq!(runs, vec![vec![(0., 1.)], vec![(2., 3.), (3., 4.)]]);
    }

    #[test]
    fn range_ignores_nan() {
        let range = min_max(&[1., f64::NAN, 3.]);
        assert!(range.start < 1. && range.end > 3.);
        assert_eq!(min_max(&[f64::NAN]), 0f64..1f64);
    }
}
