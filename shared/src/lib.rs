// DefaultOpener shared logic (platform-agnostic)
//
// Everything here is pure or talks to the outside world through a trait:
// the OS handler registry (`handler::DefaultHandlerGateway`), the release
// feed (`updater::ReleaseSource`) and persisted preferences
// (`store::KeyValueStore`). Platform crates provide the real implementations.

pub mod activity;
pub mod config;
pub mod error;
pub mod extensions;
pub mod handler;
pub mod logging;
pub mod session;
pub mod store;
pub mod updater;
pub mod version;

pub use activity::{ActivityLog, LogEntry, LogLevel};
pub use config::{AppConfig, UpdateConfig};
pub use error::{HandlerError, PlatformError, StoreError, UpdateError};
pub use extensions::{parse_extensions, ExtensionLibrary, ExtensionToken, PRESET_EXTENSIONS};
pub use handler::{
    apply_handler, lookup, ApplicationDescriptor, ApplyOutcome, ApplyReport,
    DefaultHandlerGateway, HandlerLookup,
};
pub use session::{AppliedHandler, Session};
pub use store::{JsonFileStore, KeyValueStore, MemoryStore};
pub use updater::{
    GitHubReleaseSource, ReleaseInfo, ReleaseSource, UpdateChecker, UpdateStatus,
};
pub use version::{is_newer, Version};
