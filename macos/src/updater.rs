// macOS-specific update glue, delegates to shared crate for the check itself

pub use defaultopener_shared::updater::{ReleaseInfo, UpdateChecker, UpdateStatus};

/// Open a release page in the default browser.
pub fn open_url(url: &str) {
    if let Err(e) = std::process::Command::new("open").arg(url).spawn() {
        tracing::error!(url, "Failed to open URL: {}", e);
    }
}

/// Open the page of a release found by the checker.
pub fn open_release(release: &ReleaseInfo) {
    open_url(&release.html_url);
}
