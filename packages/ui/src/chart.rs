//! Plain SVG bar chart.

use dioxus::prelude::*;

const CHART_WIDTH: f64 = 600.0;
const CHART_HEIGHT: f64 = 180.0;
const LABEL_SPACE: f64 = 20.0;
const BAR_GAP: f64 = 8.0;

#[derive(Clone, Debug, PartialEq)]
pub struct Bar {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Lay `values` out as bars filling `width` x `height`, scaled to the largest
/// value. Negative values draw as empty bars.
pub fn bar_layout(values: &[f64], width: f64, height: f64, gap: f64) -> Vec<Bar> {
    if values.is_empty() {
        return Vec::new();
    }
    let slot = width / values.len() as f64;
    let bar_width = (slot - gap).max(1.0);
    let max = values.iter().copied().fold(0.0_f64, f64::max);
    let scale = if max > 0.0 { height / max } else { 0.0 };

    values
        .iter()
        .enumerate()
        .map(|(idx, value)| {
            let bar_height = value.max(0.0) * scale;
            Bar {
                x: idx as f64 * slot + (slot - bar_width) / 2.0,
                y: height - bar_height,
                width: bar_width,
                height: bar_height,
            }
        })
        .collect()
}

#[component]
pub fn BarChart(
    values: Vec<f64>,
    labels: Vec<String>,
    #[props(default = "".to_string())] title: String,
    /// Prefix for the hover text, e.g. "Rp".
    #[props(default = "".to_string())]
    prefix: String,
) -> Element {
    let bars = bar_layout(&values, CHART_WIDTH, CHART_HEIGHT, BAR_GAP);
    let view_box = format!("0 0 {CHART_WIDTH} {}", CHART_HEIGHT + LABEL_SPACE);

    rsx! {
        figure {
            class: "chart",
            if !title.is_empty() {
                figcaption { "{title}" }
            }
            svg {
                view_box: "{view_box}",
                preserve_aspect_ratio: "none",
                role: "img",
                for (idx, bar) in bars.into_iter().enumerate() {
                    g {
                        key: "{idx}",
                        rect {
                            class: "chart-bar",
                            x: "{bar.x}",
                            y: "{bar.y}",
                            width: "{bar.width}",
                            height: "{bar.height}",
                            rx: "3",
                            title {
                                {portal::format::currency(values.get(idx).copied().unwrap_or_default(), &prefix)}
                            }
                        }
                        text {
                            class: "chart-label",
                            x: "{bar.x + bar.width / 2.0}",
                            y: "{CHART_HEIGHT + LABEL_SPACE - 4.0}",
                            text_anchor: "middle",
                            {labels.get(idx).cloned().unwrap_or_default()}
                        }
                    }
                }
            }
        }
    }
}
