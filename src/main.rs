use clap::Parser;
use simplelog::{ConfigBuilder, WriteLogger};
use std::fs::File;

use wk_insight::core::config::{self, CliOverrides};
use wk_insight::core::locale::Locale;
use wk_insight::core::types::AnalysisMode;

#[derive(Parser)]
#[command(name = "wk-insight", about = "Measurement assistant chat prototype")]
struct Args {
    /// Interface language
    #[arg(short, long, value_enum)]
    locale: Option<Locale>,

    /// Workflow for new chats
    #[arg(short, long, value_enum)]
    mode: Option<AnalysisMode>,
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    let args = Args::parse();
    dotenv::dotenv().ok();

    // Config errors fall back to defaults; the logger isn't up yet, so
    // keep the error and report it once it is.
    let (file_config, config_error) = match config::load_config() {
        Ok(c) => (c, None),
        Err(e) => (config::InsightConfig::default(), Some(e)),
    };
    let resolved = config::resolve(
        &file_config,
        &CliOverrides {
            locale: args.locale,
            mode: args.mode,
        },
    );

    // Initialize file logger - writes to wk-insight.log in current directory
    let log_config = ConfigBuilder::new().set_time_format_rfc3339().build();

    if let Ok(log_file) = File::create("wk-insight.log") {
        let _ = WriteLogger::init(resolved.log_level, log_config, log_file);
    }

    if let Some(e) = config_error {
        log::warn!("{e}; using defaults");
    }
    log::info!(
        "WK Insight starting up (locale: {:?}, mode: {:?})",
        resolved.locale,
        resolved.default_mode
    );

    wk_insight::tui::run(resolved)
}
