use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use frontier_document::js::execute_inline_scripts;
use frontier_document::{BridgeConfig, JsDocumentEnvironment};
use tracing_subscriber::EnvFilter;

const USAGE: &str = "usage: frontier-document <page.html> [extra-script.js]";

fn main() -> ExitCode {
    let mut args = std::env::args().skip(1);
    let Some(page) = args.next().map(PathBuf::from) else {
        eprintln!("{USAGE}");
        return ExitCode::from(2);
    };
    let extra_script = args.next().map(PathBuf::from);

    let config = BridgeConfig::from_env().unwrap_or_else(|err| {
        eprintln!("Failed to load document configuration: {err}. Using defaults.");
        BridgeConfig::default()
    });

    let subscriber_result = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.log_filter)),
        )
        .with_target(false)
        .try_init();
    if subscriber_result.is_err() {
        // tracing was already initialised; continue silently
    }

    match run(&page, extra_script.as_deref(), &config) {
        Ok(html) => {
            println!("{html}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(page: &Path, extra_script: Option<&Path>, config: &BridgeConfig) -> Result<String> {
    let html = fs::read_to_string(page)
        .with_context(|| format!("failed to read {}", page.display()))?;
    let environment = JsDocumentEnvironment::with_config(&html, config)?;

    let summary = execute_inline_scripts(&environment, &html)?;
    tracing::info!(
        executed = summary.executed_scripts,
        failed = summary.failed_scripts,
        skipped = summary.skipped_scripts,
        "page scripts finished"
    );

    if let Some(path) = extra_script {
        let source = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        environment.eval(&source, &path.display().to_string())?;
    }

    Ok(environment.document_html())
}
