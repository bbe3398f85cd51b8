//! Dashly Analyzer Server - sales analytics over uploaded exports
//!
//! # Architecture overview
//!
//! A single stateless HTTP service: one request handler parses the upload,
//! one analysis call computes everything synchronously, and the response is
//! JSON with an embedded chart image.
//!
//! # Module structure
//!
//! ```text
//! dashly-server/src/
//! ├── core/          # configuration, state, server lifecycle
//! ├── api/           # HTTP routes and handlers
//! ├── analysis/      # the analysis pipeline (ingest → window → metrics
//! │                  # → ranking → chart → tips)
//! └── utils/         # errors, logging
//! ```

pub mod analysis;
pub mod api;
pub mod core;
pub mod utils;

// Re-export public types
pub use analysis::{AnalyzeError, AnalyzeOptions, ChartRenderer, PlottersRenderer};
pub use core::{Config, Server, ServerState};
pub use utils::{AppError, AppResult};

// Re-export logger functions
pub use utils::logger::{init_logger, init_logger_with_file};

/// Prepare the process environment: .env file, logging
pub fn setup_environment() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    let config = Config::from_env();
    init_logger_with_file(Some(&config.log_level), config.log_dir.as_deref());

    Ok(())
}

pub fn print_banner() {
    println!(
        r#"
 ____            _     _
|  _ \  __ _ ___| |__ | |_   _
| | | |/ _` / __| '_ \| | | | |
| |_| | (_| \__ \ | | | | |_| |
|____/ \__,_|___/_| |_|_|\__, |
                         |___/
Sales Window Analyzer
"#
    );
}
