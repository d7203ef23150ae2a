// Entry point and high-level CLI flow.
//
// The binary drives the same steps as the dashboard:
// - Option [1] loads the risk index and shows the first ranked page.
// - Option [2] pages through the ranking for a chosen indicator.
// - Option [3] shows one region's details.
// - Option [4] writes the print report for one region.
// - Option [5] reads back an uploaded shapefile's feature collection.
use riskboard::config::Config;
use riskboard::rank::{build_page, start_item_for_page, total_pages};
use riskboard::service::{fetch_region_detail, FeatureService, MemoryFeatureService};
use riskboard::state::{reduce, Action, DashboardState};
use riskboard::types::{Dimension, RegionDetailView};
use riskboard::{loader, output, report, upload, util, RiskError};
use std::io::{self, Write};
use tracing_subscriber::EnvFilter;

// Everything the handlers share, passed explicitly instead of living in a
// global so each step can be followed through `reduce`.
struct App {
    config: Config,
    service: Option<MemoryFeatureService>,
    dashboard: DashboardState,
}

impl App {
    fn dispatch(&mut self, action: Action) -> Result<(), RiskError> {
        // on error the current state is kept as it was
        self.dashboard = reduce(self.dashboard.clone(), action)?;
        Ok(())
    }
}

/// Print `prompt` and read a single trimmed line of input.
fn read_input(prompt: &str) -> String {
    print!("{}", prompt);
    let _ = io::stdout().flush();
    let mut buf = String::new();
    io::stdin().read_line(&mut buf).ok();
    buf.trim().to_string()
}

fn read_choice() -> String {
    read_input("Enter choice: ")
}

/// Ask the user whether to go back to the menu after a step.
///
/// Returns `true` if the user chose `Y`, `false` if they chose `N`.
fn prompt_back_to_menu() -> bool {
    loop {
        let resp = read_input("Back to Menu (Y/N): ").to_uppercase();
        match resp.as_str() {
            "Y" => return true,
            "N" => return false,
            _ => println!("Invalid choice. Please enter Y or N."),
        }
    }
}

/// Run the pending page request, if any, and feed the response back.
fn run_pending_page(app: &mut App) {
    let (Some(service), Some(req)) = (app.service.as_ref(), app.dashboard.pending_page.clone()) else {
        return;
    };
    let action = match service
        .query_features(&req.params)
        .and_then(|set| build_page(&req.params, &set))
    {
        Ok(page) => Action::PageLoaded { generation: req.generation, page },
        Err(e) => Action::PageFailed { generation: req.generation, message: e.to_string() },
    };
    if let Err(e) = app.dispatch(action) {
        eprintln!("Error: {}\n", e);
    }
}

fn print_current_page(app: &App) {
    if let Some(message) = &app.dashboard.page_error {
        eprintln!("Error: {}\n", message);
        return;
    }
    let Some(page) = &app.dashboard.page else {
        println!("(no rows)\n");
        return;
    };
    println!(
        "Regions ranked by {} (page {} of {}, {} regions)\n",
        page.field.label(),
        page.page / riskboard::PAGE_SIZE + 1,
        total_pages(page.total_count).max(1),
        util::format_int(page.total_count)
    );
    output::preview_table_rows(&page.table_rows(), app.config.preview_rows);
}

/// Handle option [1]: load and clean the CSV file, then show the first page.
fn handle_load(app: &mut App) {
    let path = app.config.data_path.clone();
    match loader::load_and_clean(&path) {
        Ok((records, load_report)) => {
            println!(
                "Processing dataset... ({} rows read, {} regions loaded)",
                util::format_int(load_report.total_rows),
                util::format_int(load_report.loaded_rows)
            );
            println!(
                "Note: {} rows skipped due to parse/validation errors, {} duplicate ids.",
                util::format_int(load_report.parse_errors),
                util::format_int(load_report.duplicate_ids)
            );
            if load_report.missing_indicators > 0 {
                println!(
                    "Info: {} indicator values have no data.",
                    util::format_int(load_report.missing_indicators)
                );
            }
            println!();
            app.service = Some(MemoryFeatureService::new(records));
            let field = app.config.rank_dimension().unwrap_or(Dimension::Risk);
            match app.dispatch(Action::SelectRankField(field)) {
                Ok(()) => {
                    run_pending_page(app);
                    print_current_page(app);
                }
                Err(e) => eprintln!("Error: {}\n", e),
            }
        }
        Err(e) => {
            eprintln!("Failed to load file: {}\n", e);
        }
    }
}

/// Handle option [2]: choose an indicator and a page of the ranking.
fn handle_rank(app: &mut App) {
    if app.service.is_none() {
        println!("Error: No data loaded. Please load the risk index first (option 1).\n");
        return;
    }
    let field = read_input(&format!(
        "Rank by (Risk/Hazard/Vulnerability/Exposure) [{}]: ",
        app.dashboard.rank_field.label()
    ));
    if !field.is_empty() {
        match Dimension::from_field(&field) {
            Ok(dim) if dim != app.dashboard.rank_field => {
                if let Err(e) = app.dispatch(Action::SelectRankField(dim)) {
                    eprintln!("Error: {}\n", e);
                    return;
                }
            }
            Ok(_) => {}
            Err(e) => {
                eprintln!("Error: {}\n", e);
                return;
            }
        }
    }
    let last_page = match app.service.as_ref().map(|s| s.query_feature_count()) {
        Some(Ok(count)) => total_pages(count).max(1),
        Some(Err(e)) => {
            eprintln!("Error: {}\n", e);
            return;
        }
        None => 1,
    };
    let page_no = read_input(&format!("Page number (1-{}) [1]: ", last_page));
    let page_no = if page_no.is_empty() {
        1
    } else {
        match page_no.parse::<usize>() {
            Ok(n) if n > 0 && n <= last_page => n,
            _ => {
                println!("Invalid page number. Please enter 1 to {}.\n", last_page);
                return;
            }
        }
    };
    let action = start_item_for_page(page_no).map(|start_index| Action::RequestPage { start_index });
    if let Err(e) = action.and_then(|action| app.dispatch(action)) {
        eprintln!("Error: {}\n", e);
        return;
    }
    run_pending_page(app);
    print_current_page(app);

    if let Some(page) = &app.dashboard.page {
        let file = app.config.output_path("rank_page.csv");
        if let Err(e) = output::write_csv(&file, &page.table_rows()) {
            eprintln!("Write error: {}", e);
        } else {
            println!("(Page exported to {})\n", file.display());
        }
    }
}

fn print_detail(view: &RegionDetailView, report_base: &str) {
    println!("{}", view.region_label);
    println!("{}\n", view.description);
    output::preview_table_rows(&view.score_rows(), 4);
    println!(
        "Population: {}  Male: {}  Female: {}  Households: {}\n",
        view.population, view.male, view.female, view.households
    );
    for group in &view.indicators {
        let line: Vec<String> = group
            .lines
            .iter()
            .map(|l| format!("{}: {}", l.label, l.value))
            .collect();
        println!("{}: {}", group.title, line.join(", "));
    }
    println!("\nReport: {}\n", view.report_link(report_base));
}

/// Handle option [3]: look up one region and show its details.
fn handle_detail(app: &mut App) {
    if app.service.is_none() {
        println!("Error: No data loaded. Please load the risk index first (option 1).\n");
        return;
    }
    let region_id = read_input("Region id (empty to clear): ");
    if region_id.is_empty() {
        match app.dispatch(Action::ClearSelection) {
            Ok(()) => println!("Selection cleared.\n"),
            Err(e) => eprintln!("Error: {}\n", e),
        }
        return;
    }
    if let Err(e) = app.dispatch(Action::RequestDetail { region_id }) {
        eprintln!("Error: {}\n", e);
        return;
    }
    let (Some(service), Some(req)) = (app.service.as_ref(), app.dashboard.pending_detail.clone()) else {
        return;
    };
    let action = match fetch_region_detail(service, &req.region_id) {
        Ok(view) => Action::DetailLoaded { generation: req.generation, view },
        Err(e) => Action::DetailFailed { generation: req.generation, message: e.to_string() },
    };
    if let Err(e) = app.dispatch(action) {
        eprintln!("Error: {}\n", e);
        return;
    }
    match (&app.dashboard.detail, &app.dashboard.detail_error) {
        (Some(view), _) => print_detail(view, &app.config.report_base_url),
        (None, Some(message)) => eprintln!("Error: {}\n", message),
        _ => {}
    }
}

/// Handle option [4]: write the print report for one region.
///
/// Writes a Markdown report and its JSON data next to each other.
fn handle_report(app: &mut App) {
    let Some(service) = app.service.as_ref() else {
        println!("Error: No data loaded. Please load the risk index first (option 1).\n");
        return;
    };
    let region_id = match &app.dashboard.selected_region {
        Some(id) => {
            let input = read_input(&format!("Region id [{}]: ", id));
            if input.is_empty() { id.clone() } else { input }
        }
        None => read_input("Region id: "),
    };
    if region_id.is_empty() {
        println!("No region id provided.\n");
        return;
    }
    let today = chrono::Local::now().date_naive();
    match report::fetch_report(service, &region_id, today) {
        Ok(r) => {
            let md = report::render_markdown(&r);
            let md_file = app.config.output_path(&format!("report_{}.md", region_id));
            let json_file = app.config.output_path(&format!("report_{}.json", region_id));
            if let Err(e) = std::fs::write(&md_file, &md) {
                eprintln!("Write error: {}", e);
            }
            if let Err(e) = output::write_json(&json_file, &r) {
                eprintln!("Write error: {}", e);
            }
            println!("{}", md);
            println!("(Report saved to {} and {})\n", md_file.display(), json_file.display());
        }
        Err(e) => eprintln!("Error generating report: {}\n", e),
    }
}

/// Handle option [5]: accept an uploaded shapefile and read back its layers.
fn handle_upload(app: &mut App) {
    let file_name = read_input("Shapefile (.zip): ");
    let layer_name = match upload::layer_name_for_upload(&file_name) {
        Ok(name) => name,
        Err(e) => {
            eprintln!("Unsupported File Type: {}\n", e);
            return;
        }
    };
    println!("Loading: '{}'", layer_name);
    let json_path = read_input("Generated feature collection (JSON): ");
    let layers = std::fs::read_to_string(&json_path)
        .map_err(RiskError::from)
        .and_then(|text| upload::parse_feature_collection(&text));
    match layers {
        Ok(layers) => {
            for layer in layers {
                println!(
                    "The '{}' layer has been successfully added ({} features, {} skipped, {} duplicate ids)",
                    layer.name,
                    util::format_int(layer.records.len()),
                    util::format_int(layer.skipped),
                    util::format_int(layer.duplicate_ids)
                );
                if let Err(e) = app.dispatch(Action::LayerUploaded { name: layer.name }) {
                    eprintln!("Error: {}\n", e);
                }
            }
            println!("Layers: {}\n", app.dashboard.uploaded_layers.join(", "));
        }
        Err(e) => eprintln!("Error: {}\n", e),
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();

    let config = match Config::discover() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to read configuration: {}", e);
            std::process::exit(1);
        }
    };
    let field = config.rank_dimension().unwrap_or(Dimension::Risk);
    let mut app = App {
        config,
        service: None,
        dashboard: DashboardState::new(field),
    };

    loop {
        println!("Hazard Risk Dashboard:");
        println!("[1] Load the risk index");
        println!("[2] Rank regions");
        println!("[3] Region details");
        println!("[4] Print report");
        println!("[5] Upload data\n");
        match read_choice().as_str() {
            "1" => handle_load(&mut app),
            "2" => handle_rank(&mut app),
            "3" => handle_detail(&mut app),
            "4" => {
                println!();
                handle_report(&mut app);
                if !prompt_back_to_menu() {
                    println!("Exiting the program.");
                    break;
                }
            }
            "5" => handle_upload(&mut app),
            _ => {
                println!("Invalid choice. Please enter 1 to 5.\n");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn app() -> App {
        App {
            config: Config::default(),
            service: None,
            dashboard: DashboardState::default(),
        }
    }

    #[test]
    fn rejected_action_keeps_the_dashboard() {
        let mut app = app();
        app.dispatch(Action::RequestPage { start_index: 11 }).unwrap();
        let before = app.dashboard.clone();
        let err = app.dispatch(Action::RequestPage { start_index: 0 }).unwrap_err();
        assert!(matches!(err, RiskError::InvalidCursor(0)));
        assert_eq!(app.dashboard, before);
    }

    #[test]
    fn accepted_action_replaces_the_dashboard() {
        let mut app = app();
        app.dispatch(Action::RequestDetail { region_id: "7".into() }).unwrap();
        assert_eq!(app.dashboard.selected_region.as_deref(), Some("7"));
        app.dispatch(Action::ClearSelection).unwrap();
        assert!(app.dashboard.selected_region.is_none());
    }
}
