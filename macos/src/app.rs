// Application lifecycle: the state a UI layer binds to.
//
// `App::launch` is the hosting hook:
//   • Installs logging
//   • Loads config.json and the custom extension list
//   • Resolves the running version from the bundle
//   • Starts the automatic update check (if enabled)
//
// The UI owns the `App` and drives it from its main thread. Update checks run
// on a background thread and never block it.

use std::thread::JoinHandle;

use defaultopener_shared::config::{self, AppConfig};
use defaultopener_shared::{logging, JsonFileStore, ReleaseInfo, Session, UpdateChecker};

use crate::bundle;
use crate::launch_services::LaunchServicesGateway;
use crate::updater;

pub struct App {
    pub config: AppConfig,
    pub session: Session<LaunchServicesGateway, JsonFileStore>,
    pub updates: UpdateChecker,
}

impl App {
    pub fn launch() -> Self {
        logging::init();

        let config = config::load_config();
        let version = config::resolve_current_version(bundle::short_version());
        tracing::info!(version = %version, "DefaultOpener starting");

        let app = Self {
            session: Session::new(LaunchServicesGateway::new(), JsonFileStore::default_location()),
            updates: UpdateChecker::github(&config.update, version),
            config,
        };

        if app.config.check_on_launch {
            // Detached; the result lands in `updates.status()`.
            drop(app.updates.check_for_updates(app.config.announce_updates));
        }
        app
    }

    /// User-initiated "check now": always announces a new version.
    pub fn check_for_updates(&self) -> JoinHandle<()> {
        self.updates.check_for_updates(true)
    }

    /// Release to announce, at most once per check that found one.
    pub fn take_update_prompt(&self) -> Option<ReleaseInfo> {
        self.updates.take_update_prompt()
    }

    pub fn open_release_page(&self, release: &ReleaseInfo) {
        updater::open_release(release);
    }

    pub fn save_config(&self) {
        config::save_config(&self.config);
    }
}
