//! PNG chart of the close price and its two moving averages.

mod font;

use std::path::{Path, PathBuf};

use chrono::{Days, NaiveDate};
use plotters::prelude::*;
use serde::{Deserialize, Serialize};
use snafu::{Backtrace, Snafu, ensure};
use tracing::{info, warn};

use crate::{
    processor::{ColumnKey, EnrichedSeries},
    storage::ensure_file_safe,
};

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum VisualizeError {
    /// Checked before anything is drawn; no file is created.
    #[snafu(display("Missing columns for chart: {}", missing.join(", ")))]
    MissingColumns {
        missing: Vec<String>,
        backtrace: Backtrace,
    },

    #[snafu(display("Cannot plot an empty series for {symbol:?}"))]
    EmptySeries { symbol: String, backtrace: Backtrace },

    #[snafu(display("Failed to render {}: {message}", path.display()))]
    RenderFailed {
        path: PathBuf,
        message: String,
        backtrace: Backtrace,
    },
}

/// Image size and font of the rendered chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ChartStyle {
    pub width: u32,
    pub height: u32,
    /// TrueType/OpenType file used for every piece of text. `None` uses the
    /// bundled DejaVu Sans.
    pub font_path: Option<PathBuf>,
}

impl Default for ChartStyle {
    fn default() -> Self {
        Self {
            width: 1400,
            height: 700,
            font_path: None,
        }
    }
}

/// `{symbol}_metrics_plot.png`
pub fn plot_file_name(symbol: &str) -> String {
    format!("{symbol}_metrics_plot.png")
}

const CLOSE_COLOR: RGBColor = RGBColor(31, 119, 180);
const SHORT_COLOR: RGBColor = RGBColor(255, 127, 14);
const LONG_COLOR: RGBColor = RGBColor(214, 39, 40);

#[derive(Debug, Clone)]
pub struct ChartRenderer {
    dir: PathBuf,
    style: ChartStyle,
}

impl ChartRenderer {
    pub fn new(dir: impl Into<PathBuf>, style: ChartStyle) -> Self {
        Self {
            dir: dir.into(),
            style,
        }
    }

    /// Draws `price`, `short` and `long` against the date axis and writes
    /// `{symbol}_metrics_plot.png` into the output directory.
    ///
    /// All three columns must exist in `series`. Undefined cells (the SMA
    /// warm-up) are left as gaps.
    pub fn render(
        &self,
        series: &EnrichedSeries,
        symbol: &str,
        price: &ColumnKey,
        short: &ColumnKey,
        long: &ColumnKey,
    ) -> Result<PathBuf, VisualizeError> {
        let keys = [price, short, long];
        let mut missing: Vec<String> = Vec::new();
        for key in keys {
            let name = key.to_string();
            if !series.has_column(key) && !missing.contains(&name) {
                missing.push(name);
            }
        }
        if !missing.is_empty() {
            warn!(%symbol, missing = ?missing, "chart columns missing");
            return MissingColumnsSnafu { missing }.fail();
        }
        ensure!(!series.is_empty(), EmptySeriesSnafu { symbol });

        let target = self.dir.join(plot_file_name(symbol));
        let fail = |message: String| RenderFailedSnafu {
            path: target.clone(),
            message,
        };
        ensure_file_safe(symbol).map_err(|e| fail(e.to_string()).build())?;

        let lines: Vec<Line> = keys
            .iter()
            .zip([CLOSE_COLOR, SHORT_COLOR, LONG_COLOR])
            .map(|(key, color)| Line::from_column(series, key, color))
            .collect();

        font::ensure_registered(self.style.font_path.as_deref()).map_err(|m| fail(m).build())?;
        std::fs::create_dir_all(&self.dir)
            .map_err(|e| fail(format!("cannot create output directory: {e}")).build())?;
        let tmp = tempfile::Builder::new()
            .prefix(".plot")
            .suffix(".png")
            .tempfile_in(&self.dir)
            .map_err(|e| fail(format!("cannot create temp file: {e}")).build())?;

        draw(tmp.path(), &self.style, symbol, &lines).map_err(|m| fail(m).build())?;
        tmp.persist(&target)
            .map_err(|e| fail(format!("cannot move chart into place: {}", e.error)).build())?;

        info!(%symbol, path = %target.display(), "chart written");
        Ok(target)
    }
}

/// One plotted column, split into runs of defined values.
struct Line {
    label: String,
    color: RGBColor,
    runs: Vec<Vec<(NaiveDate, f64)>>,
}

impl Line {
    fn from_column(series: &EnrichedSeries, key: &ColumnKey, color: RGBColor) -> Self {
        let mut runs: Vec<Vec<(NaiveDate, f64)>> = Vec::new();
        let mut current = Vec::new();
        let values = series.values(key).unwrap_or_default();
        for (date, value) in series.dates().zip(values) {
            match value.filter(|v| v.is_finite()) {
                Some(v) => current.push((date, v)),
                None if !current.is_empty() => runs.push(std::mem::take(&mut current)),
                None => {}
            }
        }
        if !current.is_empty() {
            runs.push(current);
        }

        let label = match key {
            ColumnKey::Close => "Close Price".to_string(),
            other => other.to_string(),
        };
        Self { label, color, runs }
    }

    fn points(&self) -> impl Iterator<Item = &(NaiveDate, f64)> {
        self.runs.iter().flatten()
    }
}

fn draw(path: &Path, style: &ChartStyle, symbol: &str, lines: &[Line]) -> Result<(), String> {
    let (first, last) = date_bounds(lines).ok_or("no defined values to plot")?;
    let (low, high) = value_bounds(lines).ok_or("no defined values to plot")?;

    let root = BitMapBackend::new(path, (style.width, style.height)).into_drawing_area();
    root.fill(&WHITE).map_err(|e| e.to_string())?;

    let mut chart = ChartBuilder::on(&root)
        .caption(
            format!("Close Price and Moving Averages for {symbol}"),
            (font::FAMILY, 28),
        )
        .margin(20)
        .x_label_area_size(50)
        .y_label_area_size(80)
        .build_cartesian_2d(first..last, low..high)
        .map_err(|e| e.to_string())?;

    chart
        .configure_mesh()
        .x_desc("Date")
        .y_desc("Price (USD)")
        .axis_desc_style((font::FAMILY, 18))
        .x_label_formatter(&|d: &NaiveDate| d.format("%Y-%m-%d").to_string())
        .y_label_formatter(&|v: &f64| format!("{v:.2}"))
        .draw()
        .map_err(|e| e.to_string())?;

    for line in lines {
        let color = line.color;
        chart
            .draw_series(
                line.runs
                    .iter()
                    .map(|run| PathElement::new(run.clone(), color.stroke_width(2))),
            )
            .map_err(|e| e.to_string())?
            .label(line.label.as_str())
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2)));
    }

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperLeft)
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()
        .map_err(|e| e.to_string())?;

    root.present().map_err(|e| e.to_string())
}

/// Date range of the plotted points; a single day is widened so the axis is not degenerate.
fn date_bounds(lines: &[Line]) -> Option<(NaiveDate, NaiveDate)> {
    let mut dates = lines.iter().flat_map(|l| l.points().map(|(d, _)| *d));
    let first = dates.next()?;
    let (min, max) = dates.fold((first, first), |(lo, hi), d| (lo.min(d), hi.max(d)));
    if min == max {
        Some((min, max.checked_add_days(Days::new(1))?))
    } else {
        Some((min, max))
    }
}

/// Value range with 5% headroom on both sides.
fn value_bounds(lines: &[Line]) -> Option<(f64, f64)> {
    let mut values = lines.iter().flat_map(|l| l.points().map(|(_, v)| *v));
    let first = values.next()?;
    let (min, max) = values.fold((first, first), |(lo, hi), v| (lo.min(v), hi.max(v)));
    let pad = if max > min { (max - min) * 0.05 } else { 1.0 };
    Some((min - pad, max + pad))
}
