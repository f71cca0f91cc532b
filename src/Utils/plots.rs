//! # Charts
//!
//! Line charts (linear or logarithmic y axis, optional axis limits, markers and a legend)
//! and categorical bar charts. The output backend follows the file extension:
//! `.png` goes through the bitmap backend, `.svg` through the SVG backend.
//!
//! Rendering text needs a system font; on machines without one plotters reports an
//! error which is passed on as [`PlotError::Draw`].
use log::{info, warn};
use plotters::coord::Shift;
use plotters::drawing::DrawingAreaErrorKind;
use plotters::prelude::*;
use std::path::Path;
use thiserror::Error;

const WIDTH: u32 = 1024;
const HEIGHT: u32 = 768;

#[derive(Debug, Error)]
pub enum PlotError {
    #[error("unsupported figure format {0:?}: use .png or .svg")]
    UnsupportedFormat(String),
    #[error("nothing to plot: {0}")]
    Empty(String),
    #[error("invalid axis limits ({0}, {1})")]
    InvalidLimits(f64, f64),
    #[error("drawing failed: {0}")]
    Draw(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

fn draw_err<E: std::error::Error + Send + Sync>(e: DrawingAreaErrorKind<E>) -> PlotError {
    PlotError::Draw(e.to_string())
}

/// Matplotlib-style color names used by the studies; anything unknown is black.
pub fn named_color(name: &str) -> RGBColor {
    match name.to_lowercase().as_str() {
        "red" | "r" => RED,
        "blue" | "b" => BLUE,
        "green" | "g" => RGBColor(0, 128, 0),
        "orange" => RGBColor(255, 165, 0),
        "magenta" | "m" => MAGENTA,
        "cyan" | "c" => CYAN,
        "yellow" | "y" => YELLOW,
        _ => BLACK,
    }
}

/// Cyclic palette red, blue, green, orange.
pub fn palette(i: usize) -> RGBColor {
    const NAMES: [&str; 4] = ["red", "blue", "green", "orange"];
    named_color(NAMES[i % NAMES.len()])
}

/// One curve of a line chart
#[derive(Debug, Clone)]
pub struct Series {
    pub label: String,
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub color: RGBColor,
}

impl Series {
    pub fn new(label: &str, x: Vec<f64>, y: Vec<f64>, color: RGBColor) -> Self {
        Self {
            label: label.to_owned(),
            x,
            y,
            color,
        }
    }

    /// Points with finite coordinates (and positive y on a log axis).
    fn points(&self, log_y: bool) -> Vec<(f64, f64)> {
        self.x
            .iter()
            .zip(&self.y)
            .filter(|(x, y)| x.is_finite() && y.is_finite() && (!log_y || **y > 0.0))
            .map(|(x, y)| (*x, *y))
            .collect()
    }
}

#[derive(Debug, Clone, Default)]
pub struct LineChart {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub series: Vec<Series>,
    pub x_limits: Option<(f64, f64)>,
    pub y_limits: Option<(f64, f64)>,
    pub log_y: bool,
    pub markers: bool,
}

impl LineChart {
    pub fn new(title: &str, x_label: &str, y_label: &str) -> Self {
        Self {
            title: title.to_owned(),
            x_label: x_label.to_owned(),
            y_label: y_label.to_owned(),
            ..Default::default()
        }
    }

    pub fn with_series(mut self, series: Series) -> Self {
        self.series.push(series);
        self
    }

    pub fn x_limits(mut self, lo: f64, hi: f64) -> Self {
        self.x_limits = Some((lo, hi));
        self
    }

    pub fn y_limits(mut self, lo: f64, hi: f64) -> Self {
        self.y_limits = Some((lo, hi));
        self
    }

    pub fn log_y(mut self) -> Self {
        self.log_y = true;
        self
    }

    pub fn markers(mut self) -> Self {
        self.markers = true;
        self
    }

    /// Axis ranges: explicit limits where given, otherwise the data range of the points
    /// that fall inside the x window.
    pub fn ranges(&self) -> Result<((f64, f64), (f64, f64)), PlotError> {
        let points: Vec<(f64, f64)> = self.series.iter().flat_map(|s| s.points(self.log_y)).collect();
        if points.is_empty() {
            return Err(PlotError::Empty(self.title.clone()));
        }
        let x_range = match self.x_limits {
            Some(lim) => lim,
            None => min_max(points.iter().map(|p| p.0)),
        };
        let in_window: Vec<f64> = points
            .iter()
            .filter(|p| p.0 >= x_range.0 && p.0 <= x_range.1)
            .map(|p| p.1)
            .collect();
        let y_range = match self.y_limits {
            Some(lim) => lim,
            None if in_window.is_empty() => min_max(points.iter().map(|p| p.1)),
            None => min_max(in_window.into_iter()),
        };
        let x_range = widen(x_range, false);
        let y_range = widen(y_range, self.log_y);
        for (lo, hi) in [x_range, y_range] {
            if !(lo < hi) || !lo.is_finite() || !hi.is_finite() {
                return Err(PlotError::InvalidLimits(lo, hi));
            }
        }
        if self.log_y && y_range.0 <= 0.0 {
            return Err(PlotError::InvalidLimits(y_range.0, y_range.1));
        }
        Ok((x_range, y_range))
    }
}

fn min_max(values: impl Iterator<Item = f64>) -> (f64, f64) {
    values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)))
}

// degenerate ranges get a margin so that a flat curve is still drawable
fn widen((lo, hi): (f64, f64), log: bool) -> (f64, f64) {
    if lo < hi {
        return (lo, hi);
    }
    if log {
        (lo / 2.0, hi * 2.0)
    } else {
        let pad = if lo.abs() > 0.0 { 0.05 * lo.abs() } else { 1.0 };
        (lo - pad, hi + pad)
    }
}

/// Bars of one value per category; `None` categories are left empty.
#[derive(Debug, Clone, Default)]
pub struct BarChart {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub categories: Vec<String>,
    pub values: Vec<Option<f64>>,
    pub colors: Vec<RGBColor>,
}

enum Format {
    Png,
    Svg,
}

fn format_of(path: &Path) -> Result<Format, PlotError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "png" => Ok(Format::Png),
        "svg" => Ok(Format::Svg),
        _ => Err(PlotError::UnsupportedFormat(ext)),
    }
}

fn prepare(path: &Path) -> Result<Format, PlotError> {
    let format = format_of(path)?;
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(format)
}

pub fn render_line_chart(chart: &LineChart, path: impl AsRef<Path>) -> Result<(), PlotError> {
    let path = path.as_ref();
    let format = prepare(path)?;
    let ranges = chart.ranges()?;
    match format {
        Format::Png => draw_line_chart(BitMapBackend::new(path, (WIDTH, HEIGHT)).into_drawing_area(), chart, ranges)?,
        Format::Svg => draw_line_chart(SVGBackend::new(path, (WIDTH, HEIGHT)).into_drawing_area(), chart, ranges)?,
    }
    info!("figure saved to {}", path.display());
    Ok(())
}

pub fn render_bar_chart(chart: &BarChart, path: impl AsRef<Path>) -> Result<(), PlotError> {
    let path = path.as_ref();
    if chart.categories.is_empty() || chart.categories.len() != chart.values.len() {
        return Err(PlotError::Empty(chart.title.clone()));
    }
    let format = prepare(path)?;
    match format {
        Format::Png => draw_bar_chart(BitMapBackend::new(path, (WIDTH, HEIGHT)).into_drawing_area(), chart)?,
        Format::Svg => draw_bar_chart(SVGBackend::new(path, (WIDTH, HEIGHT)).into_drawing_area(), chart)?,
    }
    info!("figure saved to {}", path.display());
    Ok(())
}

fn draw_line_chart<DB: DrawingBackend>(
    root: DrawingArea<DB, Shift>,
    chart: &LineChart,
    ((x0, x1), (y0, y1)): ((f64, f64), (f64, f64)),
) -> Result<(), PlotError> {
    root.fill(&WHITE).map_err(draw_err)?;
    let mut builder = ChartBuilder::on(&root);
    builder
        .caption(&chart.title, ("sans-serif", 24))
        .margin(20)
        .x_label_area_size(50)
        .y_label_area_size(80);

    if chart.log_y {
        let mut ctx = builder
            .build_cartesian_2d(x0..x1, (y0..y1).log_scale())
            .map_err(draw_err)?;
        ctx.configure_mesh()
            .x_desc(chart.x_label.as_str())
            .y_desc(chart.y_label.as_str())
            .y_label_formatter(&|y| format!("{:.0e}", y))
            .draw()
            .map_err(draw_err)?;
        draw_curves(&mut ctx, chart)?;
    } else {
        let mut ctx = builder.build_cartesian_2d(x0..x1, y0..y1).map_err(draw_err)?;
        ctx.configure_mesh()
            .x_desc(chart.x_label.as_str())
            .y_desc(chart.y_label.as_str())
            .draw()
            .map_err(draw_err)?;
        draw_curves(&mut ctx, chart)?;
    }
    root.present().map_err(draw_err)?;
    Ok(())
}

fn draw_curves<'a, DB, CT>(ctx: &mut ChartContext<'a, DB, CT>, chart: &LineChart) -> Result<(), PlotError>
where
    DB: DrawingBackend + 'a,
    CT: CoordTranslate<From = (f64, f64)>,
{
    let mut labelled = false;
    for series in &chart.series {
        let points = series.points(chart.log_y);
        if points.is_empty() {
            warn!("series {} has no drawable points", series.label);
            continue;
        }
        let color = series.color;
        let anno = ctx
            .draw_series(LineSeries::new(points.clone(), color.stroke_width(2)))
            .map_err(draw_err)?;
        if !series.label.is_empty() {
            labelled = true;
            anno.label(series.label.clone())
                .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2)));
        }
        if chart.markers {
            ctx.draw_series(points.iter().map(|&p| Circle::new(p, 4, color.filled())))
                .map_err(draw_err)?;
        }
    }
    if labelled {
        ctx.configure_series_labels()
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()
            .map_err(draw_err)?;
    }
    Ok(())
}

fn draw_bar_chart<DB: DrawingBackend>(root: DrawingArea<DB, Shift>, chart: &BarChart) -> Result<(), PlotError> {
    root.fill(&WHITE).map_err(draw_err)?;
    let n = chart.categories.len();
    let top = chart.values.iter().flatten().copied().fold(0.0_f64, f64::max);
    let top = if top > 0.0 { top * 1.1 } else { 1.0 };

    let mut ctx = ChartBuilder::on(&root)
        .caption(&chart.title, ("sans-serif", 24))
        .margin(20)
        .x_label_area_size(50)
        .y_label_area_size(80)
        .build_cartesian_2d((0..n).into_segmented(), 0.0..top)
        .map_err(draw_err)?;

    ctx.configure_mesh()
        .disable_x_mesh()
        .x_labels(n)
        .x_label_formatter(&|x| match x {
            SegmentValue::CenterOf(idx) => chart.categories.get(*idx).cloned().unwrap_or_default(),
            _ => String::new(),
        })
        .x_desc(chart.x_label.as_str())
        .y_desc(chart.y_label.as_str())
        .draw()
        .map_err(draw_err)?;

    ctx.draw_series(chart.values.iter().enumerate().filter_map(|(idx, value)| {
        let value = (*value)?;
        let color = chart.colors.get(idx).copied().unwrap_or_else(|| palette(idx));
        let mut bar = Rectangle::new(
            [(SegmentValue::Exact(idx), 0.0), (SegmentValue::Exact(idx + 1), value)],
            color.filled(),
        );
        bar.set_margin(0, 0, 10, 10);
        Some(bar)
    }))
    .map_err(draw_err)?;

    root.present().map_err(draw_err)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn sample_chart() -> LineChart {
        LineChart::new("decay", "t [s]", "y")
            .with_series(Series::new("a", vec![0.0, 1.0, 2.0], vec![1.0, 0.5, 0.25], RED))
            .with_series(Series::new("b", vec![0.0, 1.0, 2.0], vec![2.0, f64::NAN, 0.0], BLUE))
    }

    #[test]
    fn colors_by_name() {
        assert_eq!(named_color("red"), RED);
        assert_eq!(named_color("Magenta"), MAGENTA);
        assert_eq!(named_color("orange"), RGBColor(255, 165, 0));
        assert_eq!(named_color("no-such-color"), BLACK);
        assert_eq!(palette(5), palette(1));
    }

    #[test]
    fn ranges_follow_data_and_limits() {
        let chart = sample_chart();
        let ((x0, x1), (y0, y1)) = chart.ranges().unwrap();
        assert_relative_eq!(x0, 0.0);
        assert_relative_eq!(x1, 2.0);
        assert_relative_eq!(y0, 0.0);
        assert_relative_eq!(y1, 2.0);

        // log axis drops the zero and non-finite points
        let ((_, _), (y0, _)) = sample_chart().log_y().ranges().unwrap();
        assert_relative_eq!(y0, 0.25);

        // y range only covers the visible window
        let ((_, _), (y0, y1)) = sample_chart().x_limits(1.5, 2.5).ranges().unwrap();
        assert_relative_eq!(y0, 0.0);
        assert_relative_eq!(y1, 0.25);

        let ((_, _), (y0, y1)) = sample_chart().y_limits(0.0, 1.0).ranges().unwrap();
        assert_relative_eq!(y0, 0.0);
        assert_relative_eq!(y1, 1.0);
    }

    #[test]
    fn degenerate_and_empty_charts() {
        let flat = LineChart::new("flat", "x", "y").with_series(Series::new("c", vec![1.0], vec![3.0], RED));
        let ((x0, x1), (y0, y1)) = flat.ranges().unwrap();
        assert!(x0 < 1.0 && x1 > 1.0);
        assert!(y0 < 3.0 && y1 > 3.0);

        let empty = LineChart::new("empty", "x", "y");
        assert!(matches!(empty.ranges(), Err(PlotError::Empty(_))));
        let bad = sample_chart().log_y().y_limits(-1.0, 1.0);
        assert!(matches!(bad.ranges(), Err(PlotError::InvalidLimits(_, _))));
    }

    #[test]
    fn unknown_extension_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let result = render_line_chart(&sample_chart(), dir.path().join("figure.jpg"));
        assert!(matches!(result, Err(PlotError::UnsupportedFormat(_))));
    }

    #[test]
    fn charts_render_to_svg_and_png() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["nested/line.svg", "line.png"] {
            let path = dir.path().join(name);
            // fonts may be missing on build machines; a successful render must leave a file
            if render_line_chart(&sample_chart().markers().log_y(), &path).is_ok() {
                assert!(path.exists());
            }
        }
        let bars = BarChart {
            title: "bars".to_owned(),
            x_label: "case".to_owned(),
            y_label: "value".to_owned(),
            categories: vec!["a".to_owned(), "b".to_owned(), "c".to_owned()],
            values: vec![Some(1.0), None, Some(0.3)],
            colors: vec![RED, BLUE, GREEN],
        };
        let path = dir.path().join("bars.svg");
        if render_bar_chart(&bars, &path).is_ok() {
            assert!(path.exists());
        }
        let mismatched = BarChart {
            values: vec![Some(1.0)],
            ..bars
        };
        assert!(matches!(
            render_bar_chart(&mismatched, dir.path().join("x.svg")),
            Err(PlotError::Empty(_))
        ));
    }
}
