use std::fs;

use anyhow::{Context, Result};
use log::info;

use page_grader::config::Config;
use page_grader::report::Locale;
use page_grader::runner;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let config = Config::from_args_and_env()?;
    let locale = Locale::new(&config.language)?;

    let report = runner::run(&config).await?;

    if report.is_empty() {
        info!("no violations found");
        return Ok(());
    }

    println!("\x1b[1;31m{}\x1b[0m", locale.header());
    let text = report.render(&locale);
    for line in text.lines() {
        println!("{line}");
    }
    fs::write(&config.result_path, &text)
        .with_context(|| format!("writing {}", config.result_path.display()))?;
    info!("report written to {}", config.result_path.display());

    Ok(())
}
