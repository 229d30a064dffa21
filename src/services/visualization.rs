//! Bar chart of the per-category product counts.
//!
//! The chart is rendered as SVG through a tera template; all geometry is
//! computed here so the template only places elements.

use std::fs;
use std::path::Path;

use chrono::NaiveDateTime;
use serde::Serialize;
use tera::{Context, Tera};

use crate::domain::summary::CategorySummary;
use crate::repository::ProductReader;
use crate::services::export::{DownloadFile, data_file_stem};
use crate::services::summary::summarize;

use super::{ServiceError, ServiceResult};

pub const CHART_TEMPLATE: &str = "visualization/category_chart.svg";
const CHART_TITLE: &str = "Product Count by Category";
const X_AXIS_LABEL: &str = "Product Count";
const Y_AXIS_LABEL: &str = "Category Path";

const WIDTH: u32 = 900;
const PLOT_X: u32 = 280;
const PLOT_WIDTH: u32 = 540;
const PLOT_Y: u32 = 50;
const BAR_HEIGHT: u32 = 22;
const BAR_GAP: u32 = 10;
const BOTTOM_MARGIN: u32 = 50;

#[derive(Debug, Clone, Serialize, PartialEq)]
struct ChartBar {
    label: String,
    count: usize,
    y: u32,
    width: u32,
    label_x: u32,
    value_x: u32,
    text_y: u32,
}

/// Builds the template set used for charts.
pub fn chart_templates() -> Result<Tera, tera::Error> {
    let mut tera = Tera::default();
    tera.autoescape_on(vec![".svg"]);
    tera.add_raw_template(
        CHART_TEMPLATE,
        include_str!("../../templates/visualization/category_chart.svg"),
    )?;
    Ok(tera)
}

fn chart_bars(summary: &CategorySummary) -> Vec<ChartBar> {
    let mut entries: Vec<(&String, &usize)> = summary.iter().collect();
    entries.sort_by(|a, b| b.1.cmp(a.1));
    let max = entries.first().map(|(_, count)| **count).unwrap_or(0).max(1);

    entries
        .into_iter()
        .enumerate()
        .map(|(idx, (label, count))| {
            let y = PLOT_Y + idx as u32 * (BAR_HEIGHT + BAR_GAP) + BAR_GAP;
            let width = ((*count as f64 / max as f64) * PLOT_WIDTH as f64).round() as u32;
            ChartBar {
                label: label.clone(),
                count: *count,
                y,
                width,
                label_x: PLOT_X - 8,
                value_x: PLOT_X + width + 6,
                text_y: y + BAR_HEIGHT / 2 + 4,
            }
        })
        .collect()
}

/// Renders `summary` as an SVG horizontal bar chart, bars by descending count.
pub fn render_category_chart(tera: &Tera, summary: &CategorySummary) -> Result<String, tera::Error> {
    let bars = chart_bars(summary);
    let axis_y = PLOT_Y + (bars.len().max(1) as u32) * (BAR_HEIGHT + BAR_GAP) + BAR_GAP;

    let mut context = Context::new();
    context.insert("title", CHART_TITLE);
    context.insert("x_axis_label", X_AXIS_LABEL);
    context.insert("y_axis_label", Y_AXIS_LABEL);
    context.insert("width", &WIDTH);
    context.insert("height", &(axis_y + BOTTOM_MARGIN));
    context.insert("title_x", &(WIDTH / 2));
    context.insert("plot_x", &PLOT_X);
    context.insert("plot_y", &PLOT_Y);
    context.insert("plot_right", &(PLOT_X + PLOT_WIDTH));
    context.insert("axis_y", &axis_y);
    context.insert("axis_label_x", &(PLOT_X + PLOT_WIDTH / 2));
    context.insert("axis_label_y", &((PLOT_Y + axis_y) / 2));
    context.insert("bar_height", &BAR_HEIGHT);
    context.insert("bars", &bars);
    tera.render(CHART_TEMPLATE, &context)
}

/// `products_per_category_<data file stem>_<YYYYmmdd_HHMMSS>.svg`
pub fn chart_file_name(data_file: &str, timestamp: NaiveDateTime) -> String {
    format!(
        "products_per_category_{}_{}.svg",
        data_file_stem(data_file),
        timestamp.format("%Y%m%d_%H%M%S")
    )
}

/// Core business logic for `GET /products/visualization`.
///
/// When `output_dir` is set the chart is also written there; a failed write
/// is logged and does not fail the request.
pub fn show_visualization<R>(
    data_file: &str,
    output_dir: Option<&str>,
    tera: &Tera,
    repo: &R,
) -> ServiceResult<DownloadFile>
where
    R: ProductReader,
{
    let summary = summarize(&repo.list_products()?);
    let svg = render_category_chart(tera, &summary).map_err(|e| {
        log::error!("Failed to render category chart: {e}");
        ServiceError::Internal
    })?;
    let file_name = chart_file_name(data_file, chrono::Local::now().naive_local());

    if let Some(dir) = output_dir {
        let path = Path::new(dir).join(&file_name);
        match fs::create_dir_all(dir).and_then(|_| fs::write(&path, &svg)) {
            Ok(()) => log::info!("Saved category chart to {}", path.display()),
            Err(e) => log::error!("Failed to save category chart to {}: {e}", path.display()),
        }
    }

    Ok(DownloadFile {
        file_name,
        content_type: "image/svg+xml",
        bytes: svg.into_bytes(),
    })
}
