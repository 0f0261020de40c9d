use std::path::Path;

use anyhow::Result;
use owo_colors::OwoColorize;
use planner_core::PlannerConfig;

pub fn run(data_dir_override: Option<&Path>) -> Result<()> {
    let config_path = PlannerConfig::config_path()?;
    let config = PlannerConfig::load()?;

    let data_dir = match data_dir_override {
        Some(dir) => dir.to_path_buf(),
        None => config.data_path(),
    };

    println!("{}", "Paths".bold());
    println!("  Config:  {}", config_path.display());
    println!("  Data:    {}", data_dir.display());
    println!();
    println!("{}", "Server".bold());
    println!("  Listen:  {}", config.listen_addr());

    Ok(())
}
