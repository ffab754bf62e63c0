use plotters::prelude::*;
use std::collections::HashMap;
use std::fmt::Display;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::debug;

/// Canvases a view can bind a chart to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Canvas {
    TransactionChart,
    HourlyTransactionChart,
}

impl Canvas {
    pub fn id(&self) -> &'static str {
        match self {
            Canvas::TransactionChart => "transaction-chart",
            Canvas::HourlyTransactionChart => "hourly-transaction-chart",
        }
    }
}

#[derive(Debug, Error)]
pub enum ChartError {
    #[error("{labels} labels but {values} values")]
    SeriesMismatch { labels: usize, values: usize },
    #[error("Failed to draw {canvas}: {message}")]
    Draw { canvas: &'static str, message: String },
}

/// What `upsert` did to the canvas
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartUpdate {
    Created,
    Updated,
}

/// A line chart bound to one canvas for the lifetime of the view
pub struct VolumeChart {
    canvas: Canvas,
    labels: Vec<String>,
    values: Vec<u64>,
    output: Option<PathBuf>,
    size: (u32, u32),
    revision: u64,
}

impl VolumeChart {
    fn new(canvas: Canvas, output: Option<PathBuf>, size: (u32, u32)) -> Self {
        Self {
            canvas,
            labels: Vec::new(),
            values: Vec::new(),
            output,
            size,
            revision: 0,
        }
    }

    #[cfg(test)]
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    #[cfg(test)]
    pub fn values(&self) -> &[u64] {
        &self.values
    }

    /// Number of redraws so far
    #[cfg(test)]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Swap the series in place, keeping the existing buffers
    fn set_series(&mut self, labels: Vec<String>, values: Vec<u64>) {
        self.labels.clear();
        self.labels.extend(labels);
        self.values.clear();
        self.values.extend(values);
    }

    fn redraw(&mut self) -> Result<(), ChartError> {
        self.revision += 1;
        if let Some(path) = &self.output {
            draw_volume_chart(path, self.canvas, &self.labels, &self.values, self.size)?;
            debug!("Redrew {} (revision {})", self.canvas.id(), self.revision);
        }
        Ok(())
    }
}

/// Owns at most one chart per canvas. `upsert` is the only mutator.
pub struct ChartRegistry {
    charts: Mutex<HashMap<Canvas, VolumeChart>>,
    out_dir: Option<PathBuf>,
    size: (u32, u32),
}

impl ChartRegistry {
    const DEFAULT_SIZE: (u32, u32) = (960, 400);

    /// Charts are drawn to `<out_dir>/<canvas>.png`; without a directory they stay in memory
    pub fn new(out_dir: Option<PathBuf>) -> Self {
        Self {
            charts: Mutex::new(HashMap::new()),
            out_dir,
            size: Self::DEFAULT_SIZE,
        }
    }

    /// Create the chart on first data for `canvas`, update it in place afterwards
    pub async fn upsert(
        &self,
        canvas: Canvas,
        labels: Vec<String>,
        values: Vec<u64>,
    ) -> Result<ChartUpdate, ChartError> {
        if labels.len() != values.len() {
            return Err(ChartError::SeriesMismatch {
                labels: labels.len(),
                values: values.len(),
            });
        }

        let mut charts = self.charts.lock().await;
        let update = if charts.contains_key(&canvas) {
            ChartUpdate::Updated
        } else {
            ChartUpdate::Created
        };

        let out_dir = self.out_dir.as_ref();
        let size = self.size;
        let chart = charts.entry(canvas).or_insert_with(|| {
            debug!("Binding new chart to {}", canvas.id());
            VolumeChart::new(canvas, out_dir.map(|d| d.join(format!("{}.png", canvas.id()))), size)
        });

        chart.set_series(labels, values);
        chart.redraw()?;
        Ok(update)
    }

    #[cfg(test)]
    pub async fn len(&self) -> usize {
        self.charts.lock().await.len()
    }

    /// Labels, values and revision of the chart on `canvas`
    #[cfg(test)]
    pub async fn series(&self, canvas: Canvas) -> Option<(Vec<String>, Vec<u64>, u64)> {
        self.charts
            .lock()
            .await
            .get(&canvas)
            .map(|c| (c.labels().to_vec(), c.values().to_vec(), c.revision()))
    }
}

fn draw_error(canvas: Canvas, e: impl Display) -> ChartError {
    ChartError::Draw {
        canvas: canvas.id(),
        message: e.to_string(),
    }
}

/// Render the series as a filled line chart, staged next to the target and renamed over it
fn draw_volume_chart(
    path: &Path,
    canvas: Canvas,
    labels: &[String],
    values: &[u64],
    size: (u32, u32),
) -> Result<(), ChartError> {
    let staging = path.with_extension("tmp.png");

    {
        let root = BitMapBackend::new(&staging, size).into_drawing_area();
        root.fill(&WHITE).map_err(|e| draw_error(canvas, e))?;

        let y_max = values.iter().copied().max().unwrap_or(0).max(1) as f64 * 1.1;
        let x_max = labels.len().saturating_sub(1).max(1);

        let mut chart = ChartBuilder::on(&root)
            .caption("Transactions per Hour", ("sans-serif", 28.0).into_font())
            .margin(15)
            .x_label_area_size(40)
            .y_label_area_size(60)
            .build_cartesian_2d(0..x_max, 0f64..y_max)
            .map_err(|e| draw_error(canvas, e))?;

        let hour_label = |h: &usize| labels.get(*h).cloned().unwrap_or_default();
        let count_label = |y: &f64| format!("{:.0}", y);
        chart
            .configure_mesh()
            .x_labels(12)
            .x_label_formatter(&hour_label)
            .y_label_formatter(&count_label)
            .x_desc("Hour")
            .y_desc("Transactions")
            .draw()
            .map_err(|e| draw_error(canvas, e))?;

        let line = RGBColor(74, 111, 165);
        chart
            .draw_series(
                AreaSeries::new(
                    values.iter().enumerate().map(|(h, v)| (h, *v as f64)),
                    0.0,
                    line.mix(0.2).filled(),
                )
                .border_style(line.stroke_width(2)),
            )
            .map_err(|e| draw_error(canvas, e))?;

        root.present().map_err(|e| draw_error(canvas, e))?;
    }

    std::fs::rename(&staging, path).map_err(|e| draw_error(canvas, e))
}
