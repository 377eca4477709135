// Version metadata of the running application bundle.

use crate::cf;

/// `CFBundleShortVersionString` of the main bundle. `None` when running
/// outside a bundle (e.g. `cargo run`) or when the key is missing.
pub fn short_version() -> Option<String> {
    unsafe { cf::info_string(cf::CFBundleGetMainBundle(), "CFBundleShortVersionString") }
        .filter(|v| !v.trim().is_empty())
}
