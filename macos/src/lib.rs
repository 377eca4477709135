// DefaultOpener: macOS integration
//
// Implements the shared crate's handler gateway on top of LaunchServices and
// hosts the launch sequence (logging, config, session, startup update check).
// Everything here links against Apple frameworks, so the crate is empty on
// other targets.

#![cfg(target_os = "macos")]

mod app;
mod bundle;
mod cf;
mod launch_services;
pub mod updater;

pub use app::App;
pub use bundle::short_version;
pub use launch_services::LaunchServicesGateway;
