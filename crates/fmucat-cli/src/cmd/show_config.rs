//! Config subcommand - print the effective configuration

use comfy_table::{Cell, Color, Table, modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL};

use crate::config::Config;

pub fn format_table(config: &Config) -> String {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_header(vec![
            Cell::new("Setting").fg(Color::Cyan),
            Cell::new("Value").fg(Color::Cyan),
        ]);

    let store = &config.store;
    let path = |p: std::path::PathBuf| p.display().to_string();
    table.add_row(vec!["Data directory".to_string(), path(store.data_dir.clone())]);
    table.add_row(vec!["Link catalog".to_string(), path(store.links_path())]);
    table.add_row(vec!["Download table".to_string(), path(store.downloads_path())]);
    table.add_row(vec!["Download directory".to_string(), path(store.download_dir())]);
    table.add_row(vec!["Model catalog".to_string(), path(store.models_path())]);
    table.add_row(vec!["License table".to_string(), path(store.licenses_path())]);

    let run = &config.run;
    table.add_row(vec![
        "Checkpoint".to_string(),
        format!(
            "every {} items ({} in test mode)",
            run.checkpoint_interval, run.test_checkpoint_interval
        ),
    ]);
    table.add_row(vec!["Test-mode cap".to_string(), run.test_cap.to_string()]);
    table.add_row(vec![
        "Progress".to_string(),
        format!("every {} items", run.progress_every),
    ]);

    let gh = &config.github;
    table.add_row(vec!["GitHub API".to_string(), gh.api_base.clone()]);
    table.add_row(vec!["Raw file host".to_string(), gh.raw_base.clone()]);
    let token = if gh.token.is_some() {
        "configured"
    } else if std::env::var(fmucat_github::client::TOKEN_ENV).is_ok() {
        "from GITHUB_TOKEN"
    } else {
        "not set"
    };
    table.add_row(vec!["Token".to_string(), token.to_string()]);
    table.add_row(vec!["Search query".to_string(), gh.search_query.clone()]);
    table.add_row(vec![
        "Search pages".to_string(),
        format!("{} ({} in test mode)", gh.max_pages, gh.test_max_pages),
    ]);
    table.add_row(vec!["Page delay".to_string(), format!("{}ms", gh.page_delay_ms)]);
    table.add_row(vec![
        "Download delay".to_string(),
        format!("{}ms", gh.download_delay_ms),
    ]);
    table.add_row(vec![
        "License delay".to_string(),
        format!("{}ms", gh.license_delay_ms),
    ]);

    table.to_string()
}

pub fn run(config: &Config) {
    eprintln!("\n{}", format_table(config));
}
