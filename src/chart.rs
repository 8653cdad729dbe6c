// Inline SVG charts for the dashboard. Every function is pure: the same input
// always yields the same markup.
use crate::constants::GFI_AXIS_MAX;
use crate::reports::{Slice, StackedBars};
use crate::types::Year;
use crate::util::{escape_markup, format_volume};
use std::collections::BTreeMap;
use std::f64::consts::PI;
use std::fmt::Write as _;

/// Reference GFI curve: (year, base threshold, direct-compliance threshold,
/// credit threshold), gCO2eq/MJ.
pub const GFI_REFERENCE: [(u16, f64, f64, f64); 23] = [
    (2028, 89.568, 77.439, 19.0),
    (2029, 87.702, 75.573, 19.0),
    (2030, 85.836, 73.707, 19.0),
    (2031, 81.7308, 69.6018, 19.0),
    (2032, 77.6256, 65.4966, 19.0),
    (2033, 73.5204, 61.3914, 19.0),
    (2034, 69.4152, 57.2862, 19.0),
    (2035, 65.31, 53.181, 19.0),
    (2036, 58.779, 46.65, 19.0),
    (2037, 52.248, 40.119, 19.0),
    (2038, 45.717, 32.655, 19.0),
    (2039, 39.186, 27.057, 19.0),
    (2040, 32.655, 20.526, 14.0),
    (2041, 31.0689, 18.9399, 14.0),
    (2042, 29.4828, 17.3538, 14.0),
    (2043, 27.8967, 15.7677, 14.0),
    (2044, 26.3106, 14.1816, 3.0),
    (2045, 24.7245, 12.5955, 3.0),
    (2046, 23.1384, 11.0094, 3.0),
    (2047, 21.5523, 9.4233, 3.0),
    (2048, 19.9662, 7.8372, 3.0),
    (2049, 18.3801, 6.2511, 3.0),
    (2050, 16.794, 4.665, 3.0),
];

const PALETTE: [&str; 10] = [
    "#636efa", "#ef553b", "#00cc96", "#ab63fa", "#ffa15a", "#19d3f3", "#ff6692", "#b6e880",
    "#ff97ff", "#fecb52",
];

const FONT: &str = "font-family='system-ui,sans-serif'";

pub fn colour(i: usize) -> &'static str {
    PALETTE[i % PALETTE.len()]
}

/// Round up to 1, 2 or 5 times a power of ten.
fn nice_max(v: f64) -> f64 {
    if v <= 0.0 || !v.is_finite() {
        return 1.0;
    }
    let mag = 10f64.powi(v.log10().floor() as i32);
    for step in [1.0, 2.0, 5.0, 10.0] {
        if step * mag >= v {
            return step * mag;
        }
    }
    10.0 * mag
}

fn open_svg(buf: &mut String, width: i32, height: i32) {
    let _ = writeln!(
        buf,
        "<svg xmlns='http://www.w3.org/2000/svg' width='100%' viewBox='0 0 {width} {height}' preserveAspectRatio='xMidYMid meet'>"
    );
    let _ = writeln!(buf, "<rect x='0' y='0' width='{width}' height='{height}' fill='#ffffff'/>");
}

fn title(buf: &mut String, x: f64, text: &str) {
    let _ = writeln!(
        buf,
        "<text x='{x:.1}' y='24' text-anchor='middle' {FONT} font-size='16' fill='#111827'>{}</text>",
        escape_markup(text)
    );
}

fn no_data(buf: &mut String, width: i32, height: i32) {
    let _ = writeln!(
        buf,
        "<text x='{}' y='{}' text-anchor='middle' {FONT} font-size='14' fill='#6b7280'>No data to plot</text>",
        width / 2,
        height / 2
    );
}

/// Band edges, bottom to top: axis floor, credit, direct compliance, base, axis top.
fn band_edge(r: &(u16, f64, f64, f64), edge: usize) -> f64 {
    match edge {
        0 => 0.0,
        1 => r.3,
        2 => r.2,
        3 => r.1,
        _ => GFI_AXIS_MAX,
    }
}

fn star_points(cx: f64, cy: f64, outer: f64) -> String {
    let inner = outer * 0.45;
    (0..10)
        .map(|i| {
            let r = if i % 2 == 0 { outer } else { inner };
            let a = -PI / 2.0 + i as f64 * PI / 5.0;
            format!("{:.2},{:.2}", cx + r * a.cos(), cy + r * a.sin())
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Stacked compliance bands from the reference curve plus one star per
/// scenario point. Points outside the 0..95 axis keep their true position
/// and are cut off by the plot clip.
pub fn compliance_chart_svg(points: &BTreeMap<Year, f64>) -> String {
    let (width, height) = (1000, 560);
    let (left, right, top, bottom) = (70.0, 250.0, 40.0, 70.0);
    let plot_w = width as f64 - left - right;
    let plot_h = height as f64 - top - bottom;
    let (x0, x1) = (GFI_REFERENCE[0].0 as f64, GFI_REFERENCE[GFI_REFERENCE.len() - 1].0 as f64);
    let x_of = |year: f64| left + (year - x0) / (x1 - x0) * plot_w;
    let y_of = |v: f64| top + (1.0 - v / GFI_AXIS_MAX) * plot_h;

    let mut buf = String::with_capacity(16 * 1024);
    open_svg(&mut buf, width, height);
    let _ = writeln!(
        buf,
        "<defs><clipPath id='gfi-plot'><rect x='{left}' y='{top}' width='{plot_w}' height='{plot_h}'/></clipPath></defs>"
    );
    title(&mut buf, left + plot_w / 2.0, "GFI Compliance Zones");

    // (lower edge, upper edge, colour, opacity, label); see `band_edge`
    let bands: [(usize, usize, &str, f64, &str); 4] = [
        (3, 4, "#ff0000", 0.3, "Zone 1: High Penalty"),
        (2, 3, "#ffa500", 0.4, "Zone 2: Low Penalty"),
        (1, 2, "#90ee90", 0.5, "Zone 3: Compliant"),
        (0, 1, "#006400", 0.6, "Zone 4: Credit Earning"),
    ];

    let _ = writeln!(buf, "<g clip-path='url(#gfi-plot)'>");
    for (lower, upper, fill, opacity, _) in &bands {
        let mut pts: Vec<String> = GFI_REFERENCE
            .iter()
            .map(|r| format!("{:.2},{:.2}", x_of(r.0 as f64), y_of(band_edge(r, *upper))))
            .collect();
        pts.extend(
            GFI_REFERENCE
                .iter()
                .rev()
                .map(|r| format!("{:.2},{:.2}", x_of(r.0 as f64), y_of(band_edge(r, *lower)))),
        );
        let _ = writeln!(
            buf,
            "<polygon points='{}' fill='{fill}' fill-opacity='{opacity}' stroke='none'/>",
            pts.join(" ")
        );
    }

    // dotted grid
    for &(year, ..) in GFI_REFERENCE.iter() {
        let x = x_of(year as f64);
        let _ = writeln!(
            buf,
            "<line x1='{x:.2}' y1='{top}' x2='{x:.2}' y2='{:.2}' stroke='#9ca3af' stroke-dasharray='2,3' stroke-opacity='0.6'/>",
            top + plot_h
        );
    }
    for v in (0..=90).step_by(10) {
        let y = y_of(v as f64);
        let _ = writeln!(
            buf,
            "<line x1='{left}' y1='{y:.2}' x2='{:.2}' y2='{y:.2}' stroke='#9ca3af' stroke-dasharray='2,3' stroke-opacity='0.6'/>",
            left + plot_w
        );
    }

    for (year, gfi) in points {
        let _ = writeln!(
            buf,
            "<polygon class='gfi-marker' points='{}' fill='#ffd700' stroke='#000000' stroke-width='1'/>",
            star_points(x_of(year.as_u16() as f64), y_of(*gfi), 11.0)
        );
    }
    let _ = writeln!(buf, "</g>");

    // axes
    let _ = writeln!(
        buf,
        "<rect x='{left}' y='{top}' width='{plot_w}' height='{plot_h}' fill='none' stroke='#374151'/>"
    );
    for &(year, ..) in GFI_REFERENCE.iter() {
        let x = x_of(year as f64);
        let y = top + plot_h + 14.0;
        let _ = writeln!(
            buf,
            "<text x='{x:.2}' y='{y:.2}' transform='rotate(-45 {x:.2} {y:.2})' text-anchor='end' {FONT} font-size='10' fill='#374151'>{year}</text>"
        );
    }
    for v in (0..=90).step_by(10) {
        let _ = writeln!(
            buf,
            "<text x='{:.2}' y='{:.2}' text-anchor='end' {FONT} font-size='11' fill='#374151'>{v}</text>",
            left - 6.0,
            y_of(v as f64) + 4.0
        );
    }
    let _ = writeln!(
        buf,
        "<text x='{:.2}' y='{}' text-anchor='middle' {FONT} font-size='13' fill='#111827'>Year</text>",
        left + plot_w / 2.0,
        height - 12
    );
    let _ = writeln!(
        buf,
        "<text x='18' y='{:.2}' transform='rotate(-90 18 {:.2})' text-anchor='middle' {FONT} font-size='13' fill='#111827'>GFI Value (gCO2eq/MJ)</text>",
        top + plot_h / 2.0,
        top + plot_h / 2.0
    );

    // legend
    let lx = left + plot_w + 16.0;
    let mut ly = top + 10.0;
    for (.., fill, opacity, label) in &bands {
        let _ = writeln!(
            buf,
            "<rect x='{lx:.2}' y='{:.2}' width='14' height='14' fill='{fill}' fill-opacity='{opacity}'/>",
            ly - 11.0
        );
        let _ = writeln!(
            buf,
            "<text x='{:.2}' y='{ly:.2}' {FONT} font-size='12' fill='#111827'>{label}</text>",
            lx + 22.0
        );
        ly += 22.0;
    }
    for (year, gfi) in points {
        let _ = writeln!(
            buf,
            "<polygon points='{}' fill='#ffd700' stroke='#000000' stroke-width='1'/>",
            star_points(lx + 7.0, ly - 4.0, 7.0)
        );
        let _ = writeln!(
            buf,
            "<text x='{:.2}' y='{ly:.2}' {FONT} font-size='12' fill='#111827'>Fleet GFI ({year}): {gfi:.2}</text>",
            lx + 22.0
        );
        ly += 22.0;
    }

    buf.push_str("</svg>\n");
    buf
}

/// Donut chart with `label pct%` written inside each slice.
pub fn donut_svg(heading: &str, slices: &[Slice]) -> String {
    let (width, height) = (420, 320);
    let (cx, cy, outer, inner) = (210.0, 175.0, 125.0, 50.0);
    let mut buf = String::new();
    open_svg(&mut buf, width, height);
    title(&mut buf, cx, heading);

    let total: f64 = slices.iter().map(|s| s.value).sum();
    if slices.is_empty() || total <= 0.0 {
        no_data(&mut buf, width, height);
        buf.push_str("</svg>\n");
        return buf;
    }

    let mut start = -PI / 2.0;
    for (i, s) in slices.iter().enumerate() {
        let share = s.value / total;
        let sweep = share * 2.0 * PI;
        let end = start + sweep;
        let fill = colour(i);
        if share >= 0.999_999 {
            let _ = writeln!(
                buf,
                "<circle cx='{cx}' cy='{cy}' r='{:.2}' fill='none' stroke='{fill}' stroke-width='{:.2}'/>",
                (outer + inner) / 2.0,
                outer - inner
            );
        } else {
            let large = if sweep > PI { 1 } else { 0 };
            let p = |r: f64, a: f64| (cx + r * a.cos(), cy + r * a.sin());
            let (ox0, oy0) = p(outer, start);
            let (ox1, oy1) = p(outer, end);
            let (ix1, iy1) = p(inner, end);
            let (ix0, iy0) = p(inner, start);
            let _ = writeln!(
                buf,
                "<path d='M {ox0:.2} {oy0:.2} A {outer} {outer} 0 {large} 1 {ox1:.2} {oy1:.2} L {ix1:.2} {iy1:.2} A {inner} {inner} 0 {large} 0 {ix0:.2} {iy0:.2} Z' fill='{fill}' stroke='#ffffff'/>"
            );
        }
        if share >= 0.04 {
            let mid = start + sweep / 2.0;
            let r = (outer + inner) / 2.0;
            let _ = writeln!(
                buf,
                "<text x='{:.2}' y='{:.2}' text-anchor='middle' {FONT} font-size='10' fill='#ffffff'><tspan x='{:.2}'>{}</tspan><tspan x='{:.2}' dy='12'>{:.1}%</tspan></text>",
                cx + r * mid.cos(),
                cy + r * mid.sin() - 4.0,
                cx + r * mid.cos(),
                escape_markup(&s.label),
                cx + r * mid.cos(),
                share * 100.0
            );
        }
        let _ = writeln!(buf, "<title>{}: {:.2}%</title>", escape_markup(&s.label), share * 100.0);
        start = end;
    }
    buf.push_str("</svg>\n");
    buf
}

struct Frame {
    left: f64,
    top: f64,
    plot_w: f64,
    plot_h: f64,
    y_max: f64,
}

impl Frame {
    fn y_of(&self, v: f64) -> f64 {
        self.top + (1.0 - v / self.y_max) * self.plot_h
    }

    fn axes(&self, buf: &mut String, y_label: &str) {
        for i in 0..=5 {
            let v = self.y_max * i as f64 / 5.0;
            let y = self.y_of(v);
            let _ = writeln!(
                buf,
                "<line x1='{:.2}' y1='{y:.2}' x2='{:.2}' y2='{y:.2}' stroke='#e5e7eb'/>",
                self.left,
                self.left + self.plot_w
            );
            let _ = writeln!(
                buf,
                "<text x='{:.2}' y='{:.2}' text-anchor='end' {FONT} font-size='10' fill='#374151'>{}</text>",
                self.left - 6.0,
                y + 3.0,
                format_volume(v)
            );
        }
        let mid = self.top + self.plot_h / 2.0;
        let _ = writeln!(
            buf,
            "<text x='14' y='{mid:.2}' transform='rotate(-90 14 {mid:.2})' text-anchor='middle' {FONT} font-size='12' fill='#111827'>{}</text>",
            escape_markup(y_label)
        );
    }

    fn category_label(&self, buf: &mut String, x: f64, label: &str) {
        let y = self.top + self.plot_h + 14.0;
        let _ = writeln!(
            buf,
            "<text x='{x:.2}' y='{y:.2}' transform='rotate(-30 {x:.2} {y:.2})' text-anchor='end' {FONT} font-size='11' fill='#374151'>{}</text>",
            escape_markup(label)
        );
    }
}

/// One stacked bar per category, coloured by series, legend on the right.
pub fn stacked_bar_svg(heading: &str, bars: &StackedBars, y_label: &str) -> String {
    let (width, height) = (520, 400);
    let mut buf = String::new();
    open_svg(&mut buf, width, height);

    let totals: Vec<f64> = (0..bars.categories.len())
        .map(|c| bars.series.iter().map(|s| s.values[c]).sum())
        .collect();
    let frame = Frame {
        left: 80.0,
        top: 40.0,
        plot_w: width as f64 - 80.0 - 130.0,
        plot_h: height as f64 - 40.0 - 70.0,
        y_max: nice_max(totals.iter().copied().fold(0.0, f64::max)),
    };
    title(&mut buf, frame.left + frame.plot_w / 2.0, heading);
    if bars.categories.is_empty() {
        no_data(&mut buf, width, height);
        buf.push_str("</svg>\n");
        return buf;
    }
    frame.axes(&mut buf, y_label);

    let slot = frame.plot_w / bars.categories.len() as f64;
    let bar_w = slot * 0.7;
    for (c, category) in bars.categories.iter().enumerate() {
        let x = frame.left + slot * c as f64 + (slot - bar_w) / 2.0;
        let mut base = 0.0;
        for (i, s) in bars.series.iter().enumerate() {
            let v = s.values[c];
            if v <= 0.0 {
                continue;
            }
            let y_top = frame.y_of(base + v);
            let h = frame.y_of(base) - y_top;
            let _ = writeln!(
                buf,
                "<rect x='{x:.2}' y='{y_top:.2}' width='{bar_w:.2}' height='{h:.2}' fill='{}'><title>{} / {}: {} GJ</title></rect>",
                colour(i),
                escape_markup(category),
                escape_markup(&s.name),
                format_volume(v)
            );
            base += v;
        }
        frame.category_label(&mut buf, x + bar_w / 2.0, category);
    }

    let lx = frame.left + frame.plot_w + 14.0;
    for (i, s) in bars.series.iter().enumerate() {
        let ly = frame.top + 14.0 + i as f64 * 18.0;
        let _ = writeln!(
            buf,
            "<rect x='{lx:.2}' y='{:.2}' width='12' height='12' fill='{}'/><text x='{:.2}' y='{ly:.2}' {FONT} font-size='11' fill='#111827'>{}</text>",
            ly - 10.0,
            colour(i),
            lx + 18.0,
            escape_markup(&s.name)
        );
    }
    buf.push_str("</svg>\n");
    buf
}

/// Plain bar chart with the value printed above each bar. With
/// `colour_each` every bar takes its own palette colour.
pub fn bar_svg(heading: &str, bars: &[Slice], y_label: &str, colour_each: bool) -> String {
    let (width, height) = (520, 350);
    let mut buf = String::new();
    open_svg(&mut buf, width, height);
    let frame = Frame {
        left: 80.0,
        top: 40.0,
        plot_w: width as f64 - 80.0 - 20.0,
        plot_h: height as f64 - 40.0 - 70.0,
        y_max: nice_max(bars.iter().map(|b| b.value).fold(0.0, f64::max)),
    };
    title(&mut buf, frame.left + frame.plot_w / 2.0, heading);
    if bars.is_empty() {
        no_data(&mut buf, width, height);
        buf.push_str("</svg>\n");
        return buf;
    }
    frame.axes(&mut buf, y_label);

    let slot = frame.plot_w / bars.len() as f64;
    let bar_w = slot * 0.7;
    for (i, b) in bars.iter().enumerate() {
        let x = frame.left + slot * i as f64 + (slot - bar_w) / 2.0;
        let v = b.value.max(0.0);
        let y_top = frame.y_of(v);
        let h = frame.y_of(0.0) - y_top;
        let fill = if colour_each { colour(i) } else { colour(0) };
        let _ = writeln!(
            buf,
            "<rect x='{x:.2}' y='{y_top:.2}' width='{bar_w:.2}' height='{h:.2}' fill='{fill}'/>"
        );
        let _ = writeln!(
            buf,
            "<text x='{:.2}' y='{:.2}' text-anchor='middle' {FONT} font-size='10' fill='#111827'>{}</text>",
            x + bar_w / 2.0,
            y_top - 4.0,
            format_volume(b.value)
        );
        frame.category_label(&mut buf, x + bar_w / 2.0, &b.label);
    }
    buf.push_str("</svg>\n");
    buf
}
