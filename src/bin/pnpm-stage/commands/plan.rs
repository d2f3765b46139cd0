//! `--dry-run`: print the staging plan

use anyhow::Result;

use pnpm_stage::ops::plan;
use pnpm_stage::util::GlobalContext;

use super::{pnpm_query, require_filter, stage_options};
use crate::cli::Cli;

pub fn execute(cli: &Cli) -> Result<()> {
    let filter = require_filter(cli)?;
    let ctx = GlobalContext::new(cli.dir.as_deref())?;
    let opts = stage_options(cli, &ctx, filter);
    let query = pnpm_query(cli, &ctx);

    let plan = plan(&query, &opts)?;
    let root = &plan.resolution.root;

    println!("{} ({})", root.name, root.path.display());
    println!("staging directory: {}", plan.staging.path().display());

    if plan.copies.is_empty() {
        println!("no internal dependencies");
        return Ok(());
    }

    for copy in &plan.copies {
        println!();
        println!("{}", copy.name);
        println!("  from: {}", copy.source.display());
        println!("  to:   {}", copy.destination.display());
        if let Some(chain) = plan.resolution.graph.path(&root.name, &copy.name) {
            println!("  via:  {}", chain.join(" -> "));
        }
        let dependents = plan.resolution.graph.dependents_of(&copy.name);
        println!("  required by: {}", dependents.join(", "));
        let links = plan.resolution.graph.dependencies_of(&copy.name);
        if !links.is_empty() {
            println!("  links: {}", links.join(", "));
        }
    }

    Ok(())
}
