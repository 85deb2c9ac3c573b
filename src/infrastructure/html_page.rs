// HTML rendering of the dashboard page
use crate::application::refresh_controller::RenderedDashboard;
use crate::domain::dashboard::{format_last_update, DashboardView, DASHBOARD_TITLE};
use crate::domain::format::{format_count, format_decimal, format_optional};
use crate::domain::listing::PopularityEntry;
use crate::domain::metrics::MetricDisplay;
use crate::domain::refresh_state::DashboardRefreshState;
use crate::domain::series::SeriesView;
use std::fmt::Write;

const CHART_WIDTH: f64 = 600.0;
const CHART_HEIGHT: f64 = 240.0;
const IMAGE_WIDTH: u32 = 60;

const STYLE: &str = "body{font-family:sans-serif;margin:1.5rem}\
.row{display:flex;gap:2rem;flex-wrap:wrap}\
.tile{min-width:12rem}.tile .value{font-size:2rem}\
.up{color:green}.down{color:crimson}\
.notice{background:#fff3cd;border:1px solid #e0c36a;padding:.5rem 1rem}\
table{border-collapse:collapse}td,th{border:1px solid #ddd;padding:4px 8px}";

// Reloads the page whenever a new cycle is published
const LIVE_RELOAD: &str = "<script>new EventSource('/api/events')\
.addEventListener('refresh',()=>location.reload());</script>";

/// Escape text for use inside HTML element content or quoted attributes.
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// The image column is a trusted fragment and is emitted unescaped.
pub fn image_html(image_ref: &str) -> String {
    if image_ref.is_empty() {
        return String::new();
    }
    format!("<img src=\"{}\" width=\"{}\" >", image_ref, IMAGE_WIDTH)
}

pub fn render_page(rendered: &RenderedDashboard, settings: &DashboardRefreshState) -> String {
    let mut html = String::new();
    let _ = write!(
        html,
        "<!DOCTYPE html><html><head><meta charset=\"utf-8\"><title>{title}</title>\
         <style>{style}</style></head><body><h1>{title}</h1>",
        title = DASHBOARD_TITLE,
        style = STYLE
    );

    let last_update = rendered
        .view
        .as_ref()
        .map(DashboardView::last_update_label)
        .or_else(|| rendered.last_attempt_at.as_ref().map(format_last_update))
        .unwrap_or_else(|| "never".to_string());
    let _ = write!(html, "<p>Last update: {}</p>", escape_html(&last_update));

    if let Some(notice) = &rendered.notice {
        let _ = write!(
            html,
            "<p class=\"notice\">Refresh failed, showing the last good data: {}</p>",
            escape_html(notice)
        );
    }

    html.push_str(&render_settings_form(settings));

    match &rendered.view {
        Some(view) => html.push_str(&render_view(view)),
        None => html.push_str("<p>Waiting for the first refresh.</p>"),
    }

    html.push_str(LIVE_RELOAD);
    html.push_str("</body></html>");
    html
}

fn render_settings_form(settings: &DashboardRefreshState) -> String {
    format!(
        "<form method=\"post\" action=\"/settings\">\
         <label><input type=\"checkbox\" name=\"auto_refresh\" value=\"true\"{checked}> Auto Refresh?</label> \
         <label>Refresh rate in seconds <input type=\"number\" name=\"interval_seconds\" min=\"1\" value=\"{interval}\"></label> \
         <button type=\"submit\">Apply</button></form>\
         <form method=\"post\" action=\"/refresh\"><button type=\"submit\">Refresh now</button></form>",
        checked = if settings.auto_refresh_enabled { " checked" } else { "" },
        interval = settings.interval_seconds
    )
}

fn render_view(view: &DashboardView) -> String {
    let mut html = String::new();
    let _ = write!(
        html,
        "<p>Total orders: {}</p><div class=\"row\">",
        format_count(view.total_orders as f64)
    );
    for display in &view.metric_displays {
        html.push_str(&render_tile(display));
    }
    html.push_str("</div><div class=\"row\">");
    for chart in &view.charts {
        html.push_str(&render_chart(chart));
    }
    html.push_str("</div><div class=\"row\">");
    html.push_str(&render_listing("Most popular items", &view.popular_items));
    html.push_str(&render_listing("Most popular categories", &view.popular_categories));
    html.push_str("</div>");
    html
}

fn render_tile(display: &MetricDisplay) -> String {
    let class = if display.delta.starts_with('-') {
        "down"
    } else {
        "up"
    };
    format!(
        "<div class=\"tile\"><div>{}</div><div class=\"value\">{}</div><div class=\"{}\">{}</div></div>",
        escape_html(&display.label),
        escape_html(&display.value),
        class,
        escape_html(&display.delta)
    )
}

/// Line chart with the y axis spanning `[0, display_max]`.
fn render_chart(chart: &SeriesView) -> String {
    let mut html = String::new();
    let _ = write!(
        html,
        "<figure><figcaption>{} (max {})</figcaption>\
         <svg width=\"{w}\" height=\"{h}\" viewBox=\"0 0 {w} {h}\">\
         <rect width=\"{w}\" height=\"{h}\" fill=\"none\" stroke=\"#ddd\"/>",
        escape_html(chart.title),
        format_decimal(chart.display_max, 1),
        w = CHART_WIDTH,
        h = CHART_HEIGHT
    );

    let coordinates = chart_coordinates(chart);
    if !coordinates.is_empty() {
        let points: Vec<String> = coordinates
            .iter()
            .map(|(x, y)| format!("{:.1},{:.1}", x, y))
            .collect();
        let _ = write!(
            html,
            "<polyline fill=\"none\" stroke=\"{}\" stroke-width=\"2\" points=\"{}\"/>",
            chart.color,
            points.join(" ")
        );
    }

    html.push_str("</svg></figure>");
    html
}

/// Map points to SVG coordinates: x by timestamp, y scaled to `display_max`.
fn chart_coordinates(chart: &SeriesView) -> Vec<(f64, f64)> {
    let times: Vec<i64> = chart
        .points
        .iter()
        .map(|p| p.timestamp.and_utc().timestamp())
        .collect();
    let (Some(&first), Some(&last)) = (times.iter().min(), times.iter().max()) else {
        return Vec::new();
    };
    let span = (last - first) as f64;

    chart
        .points
        .iter()
        .zip(&times)
        .map(|(point, &t)| {
            let x = if span > 0.0 {
                (t - first) as f64 / span * CHART_WIDTH
            } else {
                CHART_WIDTH / 2.0
            };
            let y = if chart.display_max > 0.0 {
                CHART_HEIGHT - point.value / chart.display_max * CHART_HEIGHT
            } else {
                CHART_HEIGHT
            };
            (x, y)
        })
        .collect()
}

fn render_listing(title: &str, entries: &[PopularityEntry]) -> String {
    let mut html = String::new();
    let _ = write!(
        html,
        "<section><h3>{}</h3><table><thead><tr><th></th><th>name</th><th>image</th>\
         <th>quantity</th><th>orders</th><th>quantityPerOrder</th></tr></thead><tbody>",
        escape_html(title)
    );
    for (rank, entry) in entries.iter().enumerate() {
        let _ = write!(
            html,
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
            rank,
            escape_html(&entry.name),
            image_html(&entry.image_ref),
            format_decimal(entry.quantity, 1),
            format_count(entry.orders as f64),
            format_optional(entry.quantity_per_order, 2)
        );
    }
    html.push_str("</tbody></table></section>");
    html
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::refresh_controller::RefreshPhase;
    use crate::domain::series::{reshape, SeriesMetric};
    use crate::domain::snapshot::{parse_timestamp, TimeSeriesRow};

    fn entry(name: &str, image_ref: &str, orders: u64) -> PopularityEntry {
        PopularityEntry {
            name: name.to_string(),
            image_ref: image_ref.to_string(),
            quantity: 7.0,
            orders,
            quantity_per_order: (orders > 0).then(|| 7.0 / orders as f64),
        }
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("<b>\"Tom\" & 'Jerry'</b>"), "&lt;b&gt;&quot;Tom&quot; &amp; &#39;Jerry&#39;&lt;/b&gt;");
    }

    #[test]
    fn test_listing_keeps_image_fragment_and_escapes_names() {
        let html = render_listing(
            "Most popular items",
            &[entry("<Pepperoni>", "https://img/pep.png", 2), entry("veg", "", 0)],
        );

        assert!(html.contains("<img src=\"https://img/pep.png\" width=\"60\" >"));
        assert!(html.contains("&lt;Pepperoni&gt;"));
        assert!(html.contains("<td>3.50</td>"));
        assert!(html.contains("<td>N/A</td>"));
    }

    #[test]
    fn test_chart_coordinates_scale_to_display_max() {
        let rows = vec![
            TimeSeriesRow::new(parse_timestamp("2022-11-21 15:26:00").unwrap(), 598, 0.0),
            TimeSeriesRow::new(parse_timestamp("2022-11-21 15:25:00").unwrap(), 996, 0.0),
        ];
        let views = reshape(&rows, &SeriesMetric::ALL);

        let orders = chart_coordinates(&views[0]);
        assert_eq!(orders[0].0, CHART_WIDTH);
        assert_eq!(orders[1].0, 0.0);
        assert!(orders.iter().all(|&(_, y)| (0.0..=CHART_HEIGHT).contains(&y)));

        let revenue = chart_coordinates(&views[1]);
        assert!(revenue.iter().all(|&(_, y)| y == CHART_HEIGHT));
    }

    #[test]
    fn test_page_before_first_cycle() {
        let rendered = RenderedDashboard::default();
        let html = render_page(&rendered, &DashboardRefreshState::default());

        assert!(html.contains("Waiting for the first refresh."));
        assert!(html.contains("Last update: never"));
        assert!(html.contains(" checked"));
        assert!(html.contains("value=\"30\""));
    }

    #[test]
    fn test_page_shows_notice() {
        let rendered = RenderedDashboard {
            notice: Some("failed to fetch /orders/overview: <timeout>".to_string()),
            phase: RefreshPhase::Idle,
            cycle: 1,
            ..RenderedDashboard::default()
        };
        let settings = DashboardRefreshState {
            auto_refresh_enabled: false,
            interval_seconds: 12,
        };
        let html = render_page(&rendered, &settings);

        assert!(html.contains("class=\"notice\""));
        assert!(html.contains("&lt;timeout&gt;"));
        assert!(!html.contains(" checked"));
        assert!(html.contains("value=\"12\""));
    }
}
