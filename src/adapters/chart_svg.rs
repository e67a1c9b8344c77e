//! Inline SVG charts for the dashboard pages.
//!
//! Charts share the dark page palette and a fixed 500x200 (or square, for
//! the heatmap) viewport so they lay out side by side.

use crate::domain::stats::{BoxStats, CorrelationMatrix, ReturnSplit};

const BACKGROUND: &str = "#222";
const FOREGROUND: &str = "#fff";
const GRID: &str = "#555";
const POSITIVE: &str = "#636efa";
const NEGATIVE: &str = "#ef553b";
const MISSING: &str = "#666";

pub fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

fn open_svg(width: f64, height: f64, title: &str) -> String {
    format!(
        concat!(
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{w:.0}\" height=\"{h:.0}\" ",
            "viewBox=\"0 0 {w:.0} {h:.0}\" font-family=\"sans-serif\" font-size=\"9\">",
            "<rect width=\"100%\" height=\"100%\" fill=\"{bg}\"/>",
            "<text x=\"{cx:.1}\" y=\"16\" text-anchor=\"middle\" fill=\"{fg}\" font-size=\"11\">{title}</text>"
        ),
        w = width,
        h = height,
        bg = BACKGROUND,
        fg = FOREGROUND,
        cx = width / 2.0,
        title = escape_xml(title),
    )
}

fn empty_chart(width: f64, height: f64, title: &str, message: &str) -> String {
    let mut svg = open_svg(width, height, title);
    svg.push_str(&format!(
        "<text x=\"{:.1}\" y=\"{:.1}\" text-anchor=\"middle\" fill=\"{}\">{}</text></svg>",
        width / 2.0,
        height / 2.0,
        GRID,
        escape_xml(message)
    ));
    svg
}

/// Horizontal box-and-whisker plot with outliers as points.
pub fn boxplot_svg(title: &str, stats: Option<&BoxStats>) -> String {
    let width = 500.0;
    let height = 200.0;
    let padding = 40.0;

    let Some(stats) = stats else {
        return empty_chart(width, height, title, "No returns data available.");
    };

    let (lo, hi) = stats.extent();
    let range = hi - lo;
    let plot_width = width - 2.0 * padding;
    let scale_x = if range > 0.0 { plot_width / range } else { 0.0 };
    let x = |v: f64| {
        if range > 0.0 {
            padding + (v - lo) * scale_x
        } else {
            width / 2.0
        }
    };

    let mid_y = height / 2.0;
    let box_half = 25.0;

    let mut svg = open_svg(width, height, title);

    // axis
    let axis_y = height - padding + 10.0;
    svg.push_str(&format!(
        "<line x1=\"{:.1}\" y1=\"{:.1}\" x2=\"{:.1}\" y2=\"{:.1}\" stroke=\"{}\"/>",
        padding,
        axis_y,
        width - padding,
        axis_y,
        GRID
    ));
    svg.push_str(&format!(
        "<text x=\"{:.1}\" y=\"{:.1}\" text-anchor=\"start\" fill=\"{}\">{:.2}</text>",
        padding,
        axis_y + 12.0,
        FOREGROUND,
        lo
    ));
    svg.push_str(&format!(
        "<text x=\"{:.1}\" y=\"{:.1}\" text-anchor=\"end\" fill=\"{}\">{:.2}</text>",
        width - padding,
        axis_y + 12.0,
        FOREGROUND,
        hi
    ));

    // whiskers
    for (from, to) in [(stats.whisker_low, stats.q1), (stats.q3, stats.whisker_high)] {
        svg.push_str(&format!(
            "<line class=\"whisker\" x1=\"{:.1}\" y1=\"{:.1}\" x2=\"{:.1}\" y2=\"{:.1}\" stroke=\"{}\"/>",
            x(from),
            mid_y,
            x(to),
            mid_y,
            POSITIVE
        ));
    }
    for cap in [stats.whisker_low, stats.whisker_high] {
        svg.push_str(&format!(
            "<line x1=\"{:.1}\" y1=\"{:.1}\" x2=\"{:.1}\" y2=\"{:.1}\" stroke=\"{}\"/>",
            x(cap),
            mid_y - box_half / 2.0,
            x(cap),
            mid_y + box_half / 2.0,
            POSITIVE
        ));
    }

    // box and median
    svg.push_str(&format!(
        "<rect class=\"box\" x=\"{:.1}\" y=\"{:.1}\" width=\"{:.1}\" height=\"{:.1}\" fill=\"{}\" fill-opacity=\"0.5\" stroke=\"{}\"/>",
        x(stats.q1),
        mid_y - box_half,
        (x(stats.q3) - x(stats.q1)).max(1.0),
        box_half * 2.0,
        POSITIVE,
        POSITIVE
    ));
    svg.push_str(&format!(
        "<line class=\"median\" x1=\"{:.1}\" y1=\"{:.1}\" x2=\"{:.1}\" y2=\"{:.1}\" stroke=\"{}\" stroke-width=\"2\"/>",
        x(stats.median),
        mid_y - box_half,
        x(stats.median),
        mid_y + box_half,
        FOREGROUND
    ));

    for &o in &stats.outliers {
        svg.push_str(&format!(
            "<circle class=\"outlier\" cx=\"{:.1}\" cy=\"{:.1}\" r=\"2.5\" fill=\"{}\"/>",
            x(o),
            mid_y,
            POSITIVE
        ));
    }

    svg.push_str("</svg>");
    svg
}

fn point_on_circle(cx: f64, cy: f64, r: f64, angle: f64) -> (f64, f64) {
    (cx + r * angle.cos(), cy + r * angle.sin())
}

/// Two-slice pie of positive vs. negative return days, starting at twelve
/// o'clock and running clockwise.
pub fn pie_svg(title: &str, split: &ReturnSplit) -> String {
    let width = 500.0;
    let height = 260.0;

    if split.total() == 0 {
        return empty_chart(width, height, title, "No returns data available.");
    }

    let cx = width / 2.0 - 60.0;
    let cy = height / 2.0 + 10.0;
    let r = 90.0;

    let slices = [
        ("Positive Returns", split.positive, split.positive_pct(), POSITIVE),
        ("Negative Returns", split.negative, split.negative_pct(), NEGATIVE),
    ];

    let mut svg = open_svg(width, height, title);
    let mut angle = -std::f64::consts::FRAC_PI_2;

    for (label, count, pct, color) in slices {
        if count == 0 {
            continue;
        }
        if count == split.total() {
            svg.push_str(&format!(
                "<circle class=\"slice\" cx=\"{:.1}\" cy=\"{:.1}\" r=\"{:.1}\" fill=\"{}\"><title>{}: {}</title></circle>",
                cx, cy, r, color, label, count
            ));
        } else {
            let sweep = pct / 100.0 * std::f64::consts::TAU;
            let (x0, y0) = point_on_circle(cx, cy, r, angle);
            let (x1, y1) = point_on_circle(cx, cy, r, angle + sweep);
            let large_arc = if sweep > std::f64::consts::PI { 1 } else { 0 };
            svg.push_str(&format!(
                "<path class=\"slice\" d=\"M {:.1} {:.1} L {:.1} {:.1} A {:.1} {:.1} 0 {} 1 {:.1} {:.1} Z\" fill=\"{}\" stroke=\"{}\"><title>{}: {}</title></path>",
                cx, cy, x0, y0, r, r, large_arc, x1, y1, color, BACKGROUND, label, count
            ));

            let (lx, ly) = point_on_circle(cx, cy, r * 0.6, angle + sweep / 2.0);
            svg.push_str(&format!(
                "<text x=\"{:.1}\" y=\"{:.1}\" text-anchor=\"middle\" fill=\"{}\">{:.1}%</text>",
                lx, ly, FOREGROUND, pct
            ));
            angle += sweep;
        }
    }

    // legend
    for (i, (label, _, pct, color)) in slices.iter().enumerate() {
        let ly = 60.0 + i as f64 * 18.0;
        svg.push_str(&format!(
            "<rect x=\"360\" y=\"{:.1}\" width=\"10\" height=\"10\" fill=\"{}\"/>",
            ly - 9.0,
            color
        ));
        svg.push_str(&format!(
            "<text x=\"376\" y=\"{:.1}\" fill=\"{}\">{} ({:.1}%)</text>",
            ly,
            FOREGROUND,
            label,
            pct
        ));
    }

    svg.push_str("</svg>");
    svg
}

/// Fill for a correlation coefficient: strong positive blue, strong
/// negative red, near zero muted.
pub fn correlation_color(value: f64) -> &'static str {
    if value.is_nan() {
        MISSING
    } else if value >= 0.7 {
        "#3b4cc0"
    } else if value >= 0.3 {
        "#7b9ff9"
    } else if value >= -0.3 {
        "#dddddd"
    } else if value >= -0.7 {
        "#f49a7b"
    } else {
        "#b40426"
    }
}

fn text_color_on(fill: &str) -> &'static str {
    if fill == "#dddddd" || fill == "#7b9ff9" || fill == "#f49a7b" {
        "#000"
    } else {
        FOREGROUND
    }
}

pub fn format_correlation(value: f64) -> String {
    if value.is_nan() {
        "nan".to_string()
    } else {
        format!("{:.2}", value)
    }
}

/// Square heatmap with the coefficient printed in each cell.
pub fn heatmap_svg(matrix: &CorrelationMatrix) -> String {
    let n = matrix.labels.len();
    let title = "Correlation Matrix";
    if n == 0 {
        return empty_chart(500.0, 200.0, title, "No indices selected.");
    }

    let label_space = 140.0;
    let cell = (360.0 / n as f64).clamp(30.0, 90.0);
    let top = 30.0;
    let width = label_space + cell * n as f64 + 20.0;
    let height = top + cell * n as f64 + label_space;

    let mut svg = open_svg(width, height, title);

    for (i, row) in matrix.values.iter().enumerate() {
        for (j, &value) in row.iter().enumerate() {
            let x = label_space + j as f64 * cell;
            let y = top + i as f64 * cell;
            let fill = correlation_color(value);
            svg.push_str(&format!(
                "<rect class=\"cell\" x=\"{:.1}\" y=\"{:.1}\" width=\"{:.1}\" height=\"{:.1}\" fill=\"{}\" stroke=\"{}\"/>",
                x, y, cell, cell, fill, BACKGROUND
            ));
            svg.push_str(&format!(
                "<text x=\"{:.1}\" y=\"{:.1}\" text-anchor=\"middle\" dominant-baseline=\"middle\" fill=\"{}\">{}</text>",
                x + cell / 2.0,
                y + cell / 2.0,
                text_color_on(fill),
                format_correlation(value)
            ));
        }
    }

    for (i, label) in matrix.labels.iter().enumerate() {
        let label = escape_xml(label);
        // row labels
        svg.push_str(&format!(
            "<text x=\"{:.1}\" y=\"{:.1}\" text-anchor=\"end\" dominant-baseline=\"middle\" fill=\"{}\">{}</text>",
            label_space - 6.0,
            top + i as f64 * cell + cell / 2.0,
            FOREGROUND,
            label
        ));
        // column labels, rotated
        let cx = label_space + i as f64 * cell + cell / 2.0;
        let cy = top + n as f64 * cell + 8.0;
        svg.push_str(&format!(
            "<text x=\"{:.1}\" y=\"{:.1}\" text-anchor=\"end\" transform=\"rotate(-45 {:.1} {:.1})\" fill=\"{}\">{}</text>",
            cx, cy, cx, cy, FOREGROUND, label
        ));
    }

    svg.push_str("</svg>");
    svg
}
