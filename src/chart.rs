//! Interactive dual-axis HTML charts
//!
//! Thin binding over plotly: every chart is a set of named line series on up
//! to two Y axes sharing a date X axis, written as one self-contained HTML
//! document.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use plotly::common::color::{NamedColor, Rgba};
use plotly::common::{Anchor, AxisSide, DashType, Line, Mode, Title, Visible};
use plotly::layout::{
    Axis, AxisType, Legend, RangeSelector, RangeSlider, SelectorButton, SelectorStep, StepMode,
};
use plotly::{Layout, Plot, Scatter};
use tracing::info;

use crate::series::NamedSeries;

const PRICE_COLOR: NamedColor = NamedColor::RoyalBlue;
const FLOW_COLOR: NamedColor = NamedColor::DarkOrange;
const EMA_COLORS: [NamedColor; 3] = [NamedColor::Black, NamedColor::Green, NamedColor::Red];

/// Price on the primary axis, cumulative ETF inflow on the secondary axis,
/// EMA overlays hidden until toggled through the legend.
pub fn render_flow_chart(
    price: &NamedSeries,
    emas: &[NamedSeries],
    cumulative: &NamedSeries,
    asset_label: &str,
    path: &Path,
) -> Result<()> {
    let mut plot = Plot::new();

    plot.add_trace(line_trace(price, Line::new().color(PRICE_COLOR).width(1.5)));
    for (series, color) in emas.iter().zip(EMA_COLORS.iter().cycle()) {
        plot.add_trace(
            line_trace(
                series,
                Line::new().color(*color).width(1.0).dash(DashType::Dash),
            )
            .visible(Visible::LegendOnly),
        );
    }
    plot.add_trace(
        line_trace(cumulative, Line::new().color(FLOW_COLOR).width(2.0)).y_axis("y2"),
    );

    let layout = Layout::new()
        .title(Title::with_text(format!(
            "{asset_label} Price vs Cumulative Spot ETF Net Inflow"
        )))
        .x_axis(date_axis())
        .y_axis(
            Axis::new()
                .title(Title::with_text(format!("{asset_label} Price (USD)")))
                .color(PRICE_COLOR),
        )
        .y_axis2(
            Axis::new()
                .title(Title::with_text("ETF Cumulative Net Inflow (US$M)"))
                .color(FLOW_COLOR)
                .overlaying("y")
                .side(AxisSide::Right),
        )
        .legend(pinned_legend());
    plot.set_layout(layout);

    write_chart(&plot, path)
}

/// Price on the primary axis, total on-chain supply on the secondary axis.
pub fn render_supply_chart(
    price: &NamedSeries,
    supply: &NamedSeries,
    asset_label: &str,
    start: NaiveDate,
    path: &Path,
) -> Result<()> {
    let mut plot = Plot::new();

    plot.add_trace(line_trace(price, Line::new().color(FLOW_COLOR).width(2.0)));
    plot.add_trace(
        line_trace(supply, Line::new().color(PRICE_COLOR).width(2.0)).y_axis("y2"),
    );

    let layout = Layout::new()
        .title(Title::with_text(format!(
            "{asset_label}: Price vs. Total Supply (Since {})",
            start.format("%Y-%m-%d")
        )))
        .x_axis(date_axis())
        .y_axis(
            Axis::new()
                .title(Title::with_text("Price (USD)"))
                .color(FLOW_COLOR),
        )
        .y_axis2(
            Axis::new()
                .title(Title::with_text("Total Supply"))
                .color(PRICE_COLOR)
                .overlaying("y")
                .side(AxisSide::Right),
        )
        .legend(pinned_legend());
    plot.set_layout(layout);

    write_chart(&plot, path)
}

fn line_trace(series: &NamedSeries, line: Line) -> Box<Scatter<String, f64>> {
    let dates: Vec<String> = series
        .points()
        .iter()
        .map(|p| p.date.format("%Y-%m-%d").to_string())
        .collect();
    let values: Vec<f64> = series.points().iter().map(|p| p.value).collect();
    Scatter::new(dates, values)
        .name(series.name())
        .mode(Mode::Lines)
        .line(line)
}

fn date_axis() -> Axis {
    Axis::new()
        .type_(AxisType::Date)
        .range_slider(RangeSlider::new().visible(true))
        .range_selector(RangeSelector::new().buttons(vec![
            SelectorButton::new()
                .count(1)
                .label("1m")
                .step(SelectorStep::Month)
                .step_mode(StepMode::Backward),
            SelectorButton::new()
                .count(3)
                .label("3m")
                .step(SelectorStep::Month)
                .step_mode(StepMode::Backward),
            SelectorButton::new()
                .count(6)
                .label("6m")
                .step(SelectorStep::Month)
                .step_mode(StepMode::Backward),
            SelectorButton::new().label("all").step(SelectorStep::All),
        ]))
}

fn pinned_legend() -> Legend {
    Legend::new()
        .x(0.02)
        .x_anchor(Anchor::Left)
        .y(0.98)
        .y_anchor(Anchor::Top)
        .background_color(Rgba::new(255, 255, 255, 0.6))
        .border_color(NamedColor::Black)
        .border_width(1)
}

fn write_chart(plot: &Plot, path: &Path) -> Result<()> {
    let html = plot.to_html();
    std::fs::write(path, html).with_context(|| format!("Failed to write {}", path.display()))?;
    info!("Wrote chart to {}", path.display());
    Ok(())
}
