use crate::infra::{in_memory_catalog, InMemoryCatalogService};
use crate::seed::seed_catalog;
use chrono::Utc;
use clap::Args;
use estate_catalog::catalog::presentation::{
    FetchOutcome, FetchRequest, RenderedView, ViewAction, ViewEffect, ViewMode, ViewState,
};
use estate_catalog::catalog::{FilterOutcome, SortKey};
use estate_catalog::config::CatalogConfig;
use estate_catalog::error::AppError;
use std::collections::BTreeMap;

#[derive(Args, Debug)]
pub(crate) struct DemoArgs {
    /// Number of generated properties in the demo catalog.
    #[arg(long, default_value_t = 8)]
    pub(crate) count: usize,
    /// Building type filter (panel, brick, foam_block).
    #[arg(long)]
    pub(crate) building_type: Option<String>,
    /// Minimum eco-rating (1-5).
    #[arg(long)]
    pub(crate) min_eco_rating: Option<u8>,
    /// Result ordering (eco_desc, eco_asc, price_asc, price_desc).
    #[arg(long)]
    pub(crate) sort: Option<String>,
    /// Result page to display.
    #[arg(long, default_value_t = 1)]
    pub(crate) page: u32,
    /// Result layout (grid or list).
    #[arg(long, default_value = "grid", value_parser = parse_view)]
    pub(crate) view: ViewMode,
    /// Print the rendered HTML fragments instead of a text summary.
    #[arg(long)]
    pub(crate) html: bool,
}

fn parse_view(raw: &str) -> Result<ViewMode, String> {
    ViewMode::parse(raw).ok_or_else(|| format!("unknown view '{raw}', expected grid or list"))
}

pub(crate) struct DemoPage {
    pub(crate) outcome: Option<FilterOutcome>,
    pub(crate) rendered: RenderedView,
}

/// Answers a storefront fetch the way the form endpoint does.
fn fetch(service: &InMemoryCatalogService, request: &FetchRequest) -> FetchOutcome {
    let params = request.to_raw_params();
    if !service.verify_filter_nonce(params.get("nonce").map(String::as_str), Utc::now()) {
        return FetchOutcome::Rejected("Invalid nonce".to_string());
    }
    match service.filter(&params) {
        Ok(outcome) => FetchOutcome::Success(outcome),
        Err(err) => FetchOutcome::Rejected(err.to_string()),
    }
}

pub(crate) fn build_demo_page(args: &DemoArgs) -> Result<DemoPage, AppError> {
    let service = in_memory_catalog(&CatalogConfig::default());
    seed_catalog(&service, args.count)?;

    let mut state = ViewState::new(service.issue_filter_nonce(Utc::now()));
    state.apply(ViewAction::SwitchView(args.view));
    state.apply(ViewAction::ChangeSort(SortKey::parse_lenient(
        args.sort.as_deref(),
    )));

    let mut form = BTreeMap::new();
    if let Some(building_type) = &args.building_type {
        form.insert("building_type".to_string(), building_type.clone());
    }
    if let Some(rating) = args.min_eco_rating {
        form.insert("min_eco_rating".to_string(), rating.to_string());
    }
    let mut effect = state.apply(ViewAction::Submit(form));
    if args.page > 1 {
        effect = state.apply(ViewAction::GoToPage(args.page));
    }

    let request = match effect {
        ViewEffect::Fetch(request) => request,
        ViewEffect::Render(_) | ViewEffect::Nothing => state.initial_fetch(),
    };
    let rendered = state.receive(fetch(&service, &request));

    Ok(DemoPage {
        outcome: state.last_page().cloned(),
        rendered,
    })
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let page = build_demo_page(&args)?;

    if args.html {
        println!("{}", page.rendered.results_html);
        if !page.rendered.pagination_html.is_empty() {
            println!("{}", page.rendered.pagination_html);
        }
        return Ok(());
    }

    println!("Real estate catalog demo");
    println!("- {} generated properties", args.count);
    let Some(outcome) = page.outcome else {
        println!("Request failed: {}", page.rendered.results_html);
        return Ok(());
    };

    let pagination = outcome.pagination;
    println!(
        "- page {} of {} | {} matching properties | {} per page",
        pagination.current, pagination.total, pagination.total_items, pagination.per_page
    );
    if outcome.results.is_empty() {
        println!("No properties match your criteria.");
    }
    for item in &outcome.results {
        println!(
            "  #{} {} | {} | {} floors | eco {}/5 | {} UAH",
            item.id,
            item.title,
            item.building_type.label(),
            item.floors,
            item.eco_rating,
            item.price
        );
        println!("    {}", item.link);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use estate_catalog::catalog::BuildingType;

    fn args() -> DemoArgs {
        DemoArgs {
            count: 30,
            building_type: None,
            min_eco_rating: None,
            sort: None,
            page: 1,
            view: ViewMode::Grid,
            html: false,
        }
    }

    #[test]
    fn demo_page_applies_filters_and_sort() {
        let page = build_demo_page(&DemoArgs {
            building_type: Some("brick".to_string()),
            sort: Some("price-low".to_string()),
            ..args()
        })
        .expect("demo builds");

        let outcome = page.outcome.expect("successful fetch");
        assert!(outcome.results.len() <= 5);
        assert!(outcome
            .results
            .iter()
            .all(|item| item.building_type == BuildingType::Brick));
        let prices: Vec<f64> = outcome.results.iter().map(|item| item.price).collect();
        assert!(prices.windows(2).all(|pair| pair[0] <= pair[1]));
        assert!(page.rendered.results_html.contains("results-grid"));
    }

    #[test]
    fn demo_page_renders_list_view_and_requested_page() {
        let page = build_demo_page(&DemoArgs {
            view: ViewMode::List,
            page: 2,
            ..args()
        })
        .expect("demo builds");

        let outcome = page.outcome.expect("successful fetch");
        assert_eq!(outcome.pagination.current, 2);
        assert_eq!(outcome.pagination.total_items, 30);
        assert!(page.rendered.results_html.contains("results-list"));
        assert!(page.rendered.pagination_html.contains("page-numbers current\">2<"));
    }

    #[test]
    fn demo_page_past_the_end_shows_no_results() {
        let page = build_demo_page(&DemoArgs {
            count: 3,
            page: 4,
            ..args()
        })
        .expect("demo builds");

        assert!(page.rendered.results_html.contains("No properties match"));
        assert!(page.rendered.pagination_html.is_empty());
    }
}
