use std::fmt::Write as _;

use crate::catalog::projection::{Pagination, PropertySummary};

use super::view_state::ViewMode;

pub const NO_RESULTS_MESSAGE: &str = "No properties match your criteria.";
pub const TRANSPORT_ERROR_MESSAGE: &str = "Error: could not load results.";

/// Renders a result page in the selected layout.
pub fn render_results(results: &[PropertySummary], view: ViewMode) -> String {
    if results.is_empty() {
        return render_message(NO_RESULTS_MESSAGE);
    }

    match view {
        ViewMode::Grid => render_grid(results),
        ViewMode::List => render_list(results),
    }
}

pub fn render_message(message: &str) -> String {
    format!("<div class=\"no-results\">{}</div>", escape_html(message))
}

pub fn render_error(message: &str) -> String {
    render_message(&format!("Error: {message}"))
}

fn meta_lines(item: &PropertySummary) -> Vec<(&'static str, String)> {
    let mut lines = Vec::new();
    if !item.building_name.is_empty() {
        lines.push(("Building:", item.building_name.clone()));
    }
    lines.push(("Floors:", item.floors.to_string()));
    lines.push(("Type:", item.building_type.label().to_string()));
    lines.push(("Eco-rating:", format!("{} / 5", item.eco_rating)));
    if item.price > 0.0 {
        lines.push(("Price:", format!("{} UAH", item.price)));
    }
    lines
}

fn render_grid(results: &[PropertySummary]) -> String {
    let mut html = String::from("<div class=\"row results-grid\">");

    for item in results {
        let link = escape_html(&item.link);
        let title = escape_html(&item.title);

        html.push_str("<div class=\"col-md-6 col-lg-4 mb-4\"><div class=\"card h-100\">");
        if !item.image_url.is_empty() {
            let _ = write!(
                html,
                "<a href=\"{link}\"><img src=\"{}\" class=\"card-img-top\" alt=\"{title}\"></a>",
                escape_html(&item.image_url)
            );
        }

        let _ = write!(
            html,
            "<div class=\"card-body\"><h5 class=\"card-title\"><a href=\"{link}\">{title}</a></h5><div class=\"card-meta\">"
        );
        for (label, value) in meta_lines(item) {
            let _ = write!(html, "<p><strong>{label}</strong> {}</p>", escape_html(&value));
        }
        let _ = write!(
            html,
            "</div><div class=\"card-text\">{}</div></div>",
            escape_html(&item.excerpt)
        );

        let _ = write!(
            html,
            "<div class=\"card-footer\"><a href=\"{link}\" class=\"btn btn-primary\">Details</a></div>"
        );
        html.push_str("</div></div>");
    }

    html.push_str("</div>");
    html
}

fn render_list(results: &[PropertySummary]) -> String {
    let mut html = String::from("<div class=\"results-list\">");

    for item in results {
        let link = escape_html(&item.link);
        let title = escape_html(&item.title);

        html.push_str("<div class=\"result-item\"><div class=\"result-image\">");
        if item.image_url.is_empty() {
            html.push_str("<div class=\"no-image\">No image</div>");
        } else {
            let _ = write!(
                html,
                "<img src=\"{}\" alt=\"{title}\">",
                escape_html(&item.image_url)
            );
        }
        html.push_str("</div>");

        let _ = write!(
            html,
            "<div class=\"result-content\"><h3><a href=\"{link}\">{title}</a></h3><div class=\"result-meta\">"
        );
        for (label, value) in meta_lines(item) {
            let _ = write!(
                html,
                "<span class=\"meta-item\"><strong>{label}</strong> {}</span>",
                escape_html(&value)
            );
        }
        let _ = write!(
            html,
            "</div><div class=\"result-excerpt\">{}</div><a href=\"{link}\" class=\"view-details\">Details</a></div>",
            escape_html(&item.excerpt)
        );
        html.push_str("</div>");
    }

    html.push_str("</div>");
    html
}

/// Renders page links; empty when there is at most one page.
pub fn render_pagination(pagination: &Pagination) -> String {
    if !pagination.has_controls() {
        return String::new();
    }

    let current = pagination.current;
    let mut html = String::from("<div class=\"pagination\">");

    if current > 1 {
        let _ = write!(
            html,
            "<a href=\"#\" class=\"page-numbers prev\" data-page=\"{}\">&laquo; Previous</a>",
            current - 1
        );
    }

    for page in 1..=pagination.total {
        if page == current {
            let _ = write!(html, "<span class=\"page-numbers current\">{page}</span>");
        } else {
            let _ = write!(
                html,
                "<a href=\"#\" class=\"page-numbers\" data-page=\"{page}\">{page}</a>"
            );
        }
    }

    if current < pagination.total {
        let _ = write!(
            html,
            "<a href=\"#\" class=\"page-numbers next\" data-page=\"{}\">Next &raquo;</a>",
            current + 1
        );
    }

    html.push_str("</div>");
    html
}

fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}
