//! SVG price-history chart rendering.

use std::path::Path;

use crate::domain::error::BacktestError;
use crate::domain::price_bar::PriceBar;

const WIDTH: f64 = 800.0;
const HEIGHT: f64 = 300.0;
const PADDING: f64 = 40.0;

/// Render close prices as a single polyline. Returns a complete SVG
/// document; an empty series yields a placeholder message instead.
pub fn format_price_chart(symbol: &str, bars: &[PriceBar]) -> String {
    if bars.is_empty() {
        return format!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{WIDTH}" height="{HEIGHT}"><text x="{x}" y="{y}" text-anchor="middle">No price data for {symbol}</text></svg>"#,
            x = WIDTH / 2.0,
            y = HEIGHT / 2.0,
        );
    }

    let min_close = bars.iter().map(|b| b.close).fold(f64::INFINITY, f64::min);
    let max_close = bars
        .iter()
        .map(|b| b.close)
        .fold(f64::NEG_INFINITY, f64::max);

    let plot_width = WIDTH - 2.0 * PADDING;
    let plot_height = HEIGHT - 2.0 * PADDING;

    let range = max_close - min_close;
    let scale_y = if range > 0.0 { plot_height / range } else { 1.0 };
    let scale_x = if bars.len() > 1 {
        plot_width / (bars.len() - 1) as f64
    } else {
        0.0
    };

    let points: Vec<String> = bars
        .iter()
        .enumerate()
        .map(|(i, bar)| {
            let x = PADDING + i as f64 * scale_x;
            let y = HEIGHT - PADDING - (bar.close - min_close) * scale_y;
            format!("{:.1},{:.1}", x, y)
        })
        .collect();

    format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{WIDTH}" height="{HEIGHT}">
  <rect width="{WIDTH}" height="{HEIGHT}" fill="white"/>
  <line x1="{PADDING}" y1="{PADDING}" x2="{PADDING}" y2="{axis_bottom}" stroke="black"/>
  <line x1="{PADDING}" y1="{axis_bottom}" x2="{axis_right}" y2="{axis_bottom}" stroke="black"/>
  <text x="{PADDING}" y="20" font-size="14">{symbol}</text>
  <text x="5" y="{top_label_y}" font-size="10">{max_close:.2}</text>
  <text x="5" y="{axis_bottom}" font-size="10">{min_close:.2}</text>
  <polyline fill="none" stroke="blue" stroke-width="1" points="{points}"/>
</svg>
"#,
        axis_bottom = HEIGHT - PADDING,
        axis_right = WIDTH - PADDING,
        top_label_y = PADDING,
        points = points.join(" "),
    )
}

pub fn write_price_chart<P: AsRef<Path>>(
    symbol: &str,
    bars: &[PriceBar],
    path: P,
) -> Result<(), BacktestError> {
    std::fs::write(path, format_price_chart(symbol, bars))?;
    Ok(())
}
