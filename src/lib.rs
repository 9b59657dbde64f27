pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod menu;
pub mod models;
pub mod page;
pub mod run;
pub mod schedule;
pub mod util;

shadow_rs::shadow!(build);

/// Version and build info, for logging at startup
pub fn build_info() -> String {
    format!(
        "{} {} ({} {})",
        build::PROJECT_NAME,
        build::PKG_VERSION,
        build::SHORT_COMMIT,
        build::BUILD_TIME
    )
}
