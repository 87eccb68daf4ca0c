//! Search subcommand - record code-search hits in the link catalog

use anyhow::Result;
use clap::Args;
use fmucat_core::ProgressContext;
use fmucat_github::{SearchConfig, run_search};

use crate::config::Config;

#[derive(Args, Debug)]
pub struct SearchArgs {
    /// Code-search query (default from config: "extension:fmu")
    #[arg(short, long)]
    pub query: Option<String>,

    /// Maximum result pages to fetch
    #[arg(long)]
    pub max_pages: Option<u32>,
}

pub fn run(args: SearchArgs, config: &Config, test_mode: bool, progress: &ProgressContext) -> Result<()> {
    let client = super::github_client(config)?;
    let gh = &config.github;

    let mut search = SearchConfig::new(config.store.links_path(), config.run.options(test_mode));
    search.query = args.query.unwrap_or_else(|| gh.search_query.clone());
    search.max_pages = args
        .max_pages
        .unwrap_or(if test_mode { gh.test_max_pages } else { gh.max_pages });
    search.page_delay = gh.page_delay();

    let stage = run_search(&search, &client, progress)?;
    super::report("search", &stage, progress);
    Ok(())
}
