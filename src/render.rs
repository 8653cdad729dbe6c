// Offline HTML dashboard: compliance chart on top, one column per year below.
// No external assets; charts are inline SVG, raw tables sit in <details>.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use crate::chart;
use crate::constants::NO_PROCUREMENT_NOTICE;
use crate::error::RenderError;
use crate::reports::{self, Panel};
use crate::types::{DisplayGrid, ScenarioResult, Year};
use crate::util::escape_markup as esc;

pub struct HtmlBuilder {
    buf: String,
}

impl HtmlBuilder {
    pub fn new() -> Self {
        Self {
            buf: String::with_capacity(64 * 1024),
        }
    }

    pub fn start(&mut self, title: &str) {
        let _ = write!(
            self.buf,
            "<!doctype html><html lang=\"en\"><head><meta charset=\"utf-8\">\
             <meta name=\"viewport\" content=\"width=device-width,initial-scale=1\">\
             <title>{}</title>\
             <style>\
             body{{font-family:system-ui,-apple-system,Segoe UI,Roboto,Ubuntu,Arial,sans-serif;margin:24px;}}\
             h1,h2,h3{{margin:0.3em 0;}}\
             .years{{display:flex;gap:16px;align-items:flex-start}}\
             .year{{flex:1 1 0;min-width:0}}\
             .kpi{{margin:6px 0}}\
             .kpi .label{{font-size:0.85em;opacity:0.75}}\
             .kpi .value{{font-size:1.6em;font-weight:600}}\
             .info{{background:#e8f1fb;padding:8px 12px;border-radius:6px}}\
             .error{{background:#fdecea;padding:8px 12px;border-radius:6px}}\
             .muted{{opacity:0.75}}\
             hr{{border:none;border-top:1px solid #ddd;margin:16px 0}}\
             table{{border-collapse:collapse;font-size:0.85em}}\
             td,th{{padding:3px 8px;border-bottom:1px solid #ddd;text-align:right}}\
             td:first-child,th:first-child{{text-align:left}}\
             </style></head><body>",
            esc(title)
        );
        let _ = write!(self.buf, "<h1>{}</h1>", esc(title));
    }

    pub fn finish(mut self) -> String {
        self.buf.push_str("</body></html>");
        self.buf
    }

    fn raw(&mut self, s: &str) {
        self.buf.push_str(s);
    }

    fn rule(&mut self) {
        self.buf.push_str("<hr>");
    }

    fn info(&mut self, text: &str) {
        let _ = write!(self.buf, "<p class=\"info\">{}</p>", esc(text));
    }

    fn kpi(&mut self, label: &str, value: &str) {
        let _ = write!(
            self.buf,
            "<div class=\"kpi\"><div class=\"label\">{}</div><div class=\"value\">{}</div></div>",
            esc(label),
            esc(value)
        );
    }

    /// Collapsible table of pre-formatted cells.
    fn table<H, R, C>(&mut self, summary: &str, header: H, rows: R)
    where
        H: IntoIterator,
        H::Item: AsRef<str>,
        R: IntoIterator<Item = C>,
        C: IntoIterator,
        C::Item: AsRef<str>,
    {
        let _ = write!(self.buf, "<details><summary>{}</summary><table><thead><tr>", esc(summary));
        for h in header {
            let _ = write!(self.buf, "<th>{}</th>", esc(h.as_ref()));
        }
        self.buf.push_str("</tr></thead><tbody>");
        for row in rows {
            self.buf.push_str("<tr>");
            for c in row {
                let _ = write!(self.buf, "<td>{}</td>", esc(c.as_ref()));
            }
            self.buf.push_str("</tr>");
        }
        self.buf.push_str("</tbody></table></details>");
    }

    fn grid(&mut self, summary: &str, grid: &DisplayGrid) {
        self.table(summary, &grid.header, &grid.rows);
    }

    pub fn section_compliance(&mut self, points: &BTreeMap<Year, f64>) {
        self.raw("<h2>Comparative Results Dashboard</h2>");
        self.raw(&chart::compliance_chart_svg(points));
        self.rule();
    }

    pub fn section_panel(&mut self, panel: &Panel) {
        let _ = write!(
            self.buf,
            "<h3>Results for {}</h3><p class=\"muted\">{}</p>",
            panel.year,
            esc(&panel.source_file)
        );

        self.kpi("TOTAL ANNUAL COST", &panel.kpis.total_cost_label());
        self.kpi("Resulting Fleet WtW GFI", &panel.kpis.fleet_gfi_label());
        self.kpi("Carbon Levy Cost", &panel.kpis.levy_cost_label());
        self.table(
            "View Overall Summary Data",
            ["Metric", "Value"],
            panel.summary.iter().map(|r| [r.metric.as_str(), r.value.as_str()]),
        );
        self.rule();

        self.raw(&chart::donut_svg("Fuel Mix (%)", &panel.mix));
        self.table(
            "View Fuel Mix Data Table",
            ["FuelType", "Total_GJ", "Percentage_Mix"],
            panel
                .mix_table
                .iter()
                .map(|r| [r.fuel_type.as_str(), r.total_gj.as_str(), r.percentage_mix.as_str()]),
        );
        self.rule();

        self.raw(&chart::stacked_bar_svg("Production Plan (GJ)", &panel.production, "GJ"));
        self.grid("View Production Plan Data Table", &panel.production_table);
        self.rule();

        match &panel.procurement {
            Some(p) => {
                self.raw("<h3>Procurement Plan (GJ)</h3>");
                self.raw(&chart::bar_svg("External Fuel Procurement", &p.bars, "Procurement (GJ)", false));
                self.grid("View Procurement Plan Data Table", &p.table);
            }
            None => self.info(NO_PROCUREMENT_NOTICE),
        }
        self.rule();

        self.raw("<h3>Refinery Utilization</h3>");
        self.raw(&chart::bar_svg("Refinery Usage (GJ)", &panel.refinery, "Production (GJ)", true));
        self.table(
            "View Refinery Utilization Data Table",
            ["Refinery", "Usage_GJ", "Utilization_Percent"],
            panel
                .refinery_table
                .iter()
                .map(|r| [r.refinery.as_str(), r.usage_gj.as_str(), r.utilization_percent.as_str()]),
        );
    }

    pub fn section_panel_error(&mut self, year: Year, err: &RenderError) {
        let _ = write!(
            self.buf,
            "<h3>Results for {}</h3><p class=\"error\">{}</p>",
            year,
            esc(&err.to_string())
        );
    }
}

impl Default for HtmlBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Whole dashboard page for the parsed results, years side by side in
/// ascending order.
pub fn render_dashboard(results: &BTreeMap<Year, ScenarioResult>) -> String {
    let mut html = HtmlBuilder::new();
    html.start("Fuel Supplier Optimization Results Visualizer");

    if results.is_empty() {
        html.info("Please upload the corresponding Excel file(s) to see the results dashboard.");
        return html.finish();
    }

    html.section_compliance(&reports::gfi_points(results));
    html.raw("<div class=\"years\">");
    for (year, panel) in reports::build_panels(results) {
        let _ = write!(html.buf, "<section class=\"year\" id=\"year-{}\">", year);
        match panel {
            Ok(p) => html.section_panel(&p),
            Err(e) => html.section_panel_error(year, &e),
        }
        html.raw("</section>");
    }
    html.raw("</div>");
    html.finish()
}
