// Single owner of the handler-editing state: the extension library, the
// activity log, and the registry gateway. All mutation goes through `&mut self`.

use std::path::Path;

use crate::activity::{ActivityLog, LogLevel};
use crate::error::HandlerError;
use crate::extensions::{dotted_list, ExtensionLibrary, ExtensionToken};
use crate::handler::{self, ApplicationDescriptor, ApplyOutcome, DefaultHandlerGateway, HandlerLookup};
use crate::store::KeyValueStore;

/// Result of a successful `Session::apply`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliedHandler {
    pub outcome: ApplyOutcome,
    /// The registry as read after the write, for the UI to redraw from.
    pub refreshed: HandlerLookup,
}

pub struct Session<G: DefaultHandlerGateway, S: KeyValueStore> {
    gateway: G,
    extensions: ExtensionLibrary<S>,
    log: ActivityLog,
}

impl<G: DefaultHandlerGateway, S: KeyValueStore> Session<G, S> {
    pub fn new(gateway: G, store: S) -> Self {
        Self {
            gateway,
            extensions: ExtensionLibrary::load(store),
            log: ActivityLog::new(),
        }
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    pub fn extensions(&self) -> &ExtensionLibrary<S> {
        &self.extensions
    }

    pub fn log(&self) -> &ActivityLog {
        &self.log
    }

    pub fn log_mut(&mut self) -> &mut ActivityLog {
        &mut self.log
    }

    pub fn add_custom_extensions(&mut self, input: &str) -> Vec<ExtensionToken> {
        let added = self.extensions.add_from_input(input);
        if !added.is_empty() {
            self.log.push(
                LogLevel::Info,
                format!("Added custom extensions: {}", dotted_list(&added)),
            );
        }
        added
    }

    pub fn remove_custom_extension(&mut self, ext: &ExtensionToken) -> bool {
        let removed = self.extensions.remove(ext);
        if removed {
            self.log
                .push(LogLevel::Info, format!("Removed custom extension: .{}", ext));
        }
        removed
    }

    pub fn remove_custom_extensions_at(&mut self, indices: &[usize]) -> Vec<ExtensionToken> {
        let removed = self.extensions.remove_at(indices);
        if !removed.is_empty() {
            self.log.push(
                LogLevel::Info,
                format!("Removed custom extensions: {}", dotted_list(&removed)),
            );
        }
        removed
    }

    /// Read the current handler for `ext`.
    pub fn inspect(&mut self, ext: &ExtensionToken) -> HandlerLookup {
        let found = handler::lookup(&self.gateway, ext);
        match &found {
            HandlerLookup::UnknownContentType => self.log.push(
                LogLevel::Warning,
                format!(".{} cannot be mapped to a content type.", ext),
            ),
            HandlerLookup::NoHandler { content_type } => self.log.push(
                LogLevel::Info,
                format!("Default for .{} ({}): not set or unavailable.", ext, content_type),
            ),
            HandlerLookup::Handler { content_type, app } => self.log.push(
                LogLevel::Info,
                format!("Default for .{} ({}): {}", ext, content_type, app.bundle_id),
            ),
        }
        found
    }

    /// Resolve the application the user picked as the new handler.
    pub fn select_application_at(
        &mut self,
        path: &Path,
    ) -> Result<ApplicationDescriptor, HandlerError> {
        match self.gateway.describe_application_at(path) {
            Ok(app) => {
                self.log.push(
                    LogLevel::Info,
                    format!("Selected target application: {}", app.bundle_id),
                );
                Ok(app)
            }
            Err(e) => {
                self.log.push(LogLevel::Error, e.to_string());
                Err(e)
            }
        }
    }

    /// Make `bundle_id` the handler for `ext`, then read it back.
    pub fn apply(
        &mut self,
        ext: &ExtensionToken,
        bundle_id: &str,
    ) -> Result<AppliedHandler, HandlerError> {
        match handler::apply_handler(&self.gateway, ext, bundle_id) {
            Ok(report) => {
                let ct = &report.content_type;
                match &report.outcome {
                    ApplyOutcome::Applied => {
                        let app = self.gateway.describe_application(bundle_id);
                        self.log.push(
                            LogLevel::Success,
                            format!("Set default for .{} ({}) to {}.", ext, ct, app.display_name),
                        );
                    }
                    ApplyOutcome::Mismatch { current } => self.log.push(
                        LogLevel::Warning,
                        format!(
                            "Wrote .{} ({}), but the current default is {}. The system cache may need a refresh.",
                            ext, ct, current
                        ),
                    ),
                    ApplyOutcome::Unreadable => self.log.push(
                        LogLevel::Warning,
                        format!("Wrote .{} ({}), but the current default could not be read.", ext, ct),
                    ),
                }
                let refreshed = self.inspect(ext);
                Ok(AppliedHandler {
                    outcome: report.outcome,
                    refreshed,
                })
            }
            Err(e) => {
                let line = match &e {
                    HandlerError::UnknownContentType { .. } => {
                        format!(".{} has no known content type, cannot set a default.", ext)
                    }
                    HandlerError::Platform(_) | HandlerError::MissingBundleIdentifier { .. } => {
                        format!("Setting default for .{} failed: {}", ext, e)
                    }
                };
                self.log.push(LogLevel::Error, line);
                Err(e)
            }
        }
    }
}
