// Default-handler lookups and writes against the OS registry.
//
// The registry itself sits behind `DefaultHandlerGateway`; this module owns
// the workflow around it. Writes are verified by reading the value back; the
// platform may cache and report something else for a while.

use std::path::{Path, PathBuf};

use crate::error::{HandlerError, PlatformError};
use crate::extensions::ExtensionToken;

/// An application that can be registered as a handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplicationDescriptor {
    /// Bundle identifier, e.g. `com.apple.Preview`.
    pub bundle_id: String,
    pub display_name: String,
    /// Where the application lives, if it could be resolved. A UI derives the
    /// icon from this.
    pub location: Option<PathBuf>,
}

impl ApplicationDescriptor {
    /// Descriptor with nothing resolved beyond the identifier.
    pub fn bare(bundle_id: &str) -> Self {
        Self {
            bundle_id: bundle_id.to_string(),
            display_name: bundle_id.to_string(),
            location: None,
        }
    }
}

/// Read/write access to the extension -> application registry.
pub trait DefaultHandlerGateway {
    /// Content type for a filename extension. Platforms that make up an
    /// identifier for unregistered extensions (`dyn.*` on macOS) return it;
    /// `None` only when no identifier could be produced at all.
    fn content_type_identifier(&self, ext: &ExtensionToken) -> Option<String>;

    /// Bundle identifier of the current handler, `None` if none is registered.
    fn current_handler(&self, content_type: &str) -> Option<String>;

    fn set_handler(&self, content_type: &str, bundle_id: &str) -> Result<(), PlatformError>;

    /// Resolve display details for an application.
    fn describe_application(&self, bundle_id: &str) -> ApplicationDescriptor {
        ApplicationDescriptor::bare(bundle_id)
    }

    /// Resolve an application picked by path (e.g. from a file chooser).
    /// Fails when the path has no readable bundle identifier.
    fn describe_application_at(&self, path: &Path) -> Result<ApplicationDescriptor, HandlerError>;
}

/// What the registry says about an extension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandlerLookup {
    UnknownContentType,
    NoHandler {
        content_type: String,
    },
    Handler {
        content_type: String,
        app: ApplicationDescriptor,
    },
}

impl HandlerLookup {
    pub fn content_type(&self) -> Option<&str> {
        match self {
            HandlerLookup::UnknownContentType => None,
            HandlerLookup::NoHandler { content_type }
            | HandlerLookup::Handler { content_type, .. } => Some(content_type),
        }
    }

    pub fn app(&self) -> Option<&ApplicationDescriptor> {
        match self {
            HandlerLookup::Handler { app, .. } => Some(app),
            _ => None,
        }
    }

    /// Text to show where the current handler would be.
    pub fn placeholder_text(&self) -> Option<&'static str> {
        match self {
            HandlerLookup::UnknownContentType => {
                Some("This extension does not map to a known content type.")
            }
            HandlerLookup::NoHandler { .. } => Some("No default application is set."),
            HandlerLookup::Handler { .. } => None,
        }
    }
}

pub fn lookup<G: DefaultHandlerGateway + ?Sized>(gateway: &G, ext: &ExtensionToken) -> HandlerLookup {
    let Some(content_type) = gateway.content_type_identifier(ext) else {
        return HandlerLookup::UnknownContentType;
    };
    match gateway.current_handler(&content_type) {
        Some(bundle_id) if !bundle_id.is_empty() => HandlerLookup::Handler {
            app: gateway.describe_application(&bundle_id),
            content_type,
        },
        _ => HandlerLookup::NoHandler { content_type },
    }
}

/// Result of reading the handler back after a successful write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// The registry now reports the requested application.
    Applied,
    /// Written, but the registry still reports another application.
    Mismatch { current: String },
    /// Written, but nothing could be read back.
    Unreadable,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplyReport {
    pub content_type: String,
    pub outcome: ApplyOutcome,
}

/// Register `bundle_id` as the handler for `ext` and verify the write.
pub fn apply_handler<G: DefaultHandlerGateway + ?Sized>(
    gateway: &G,
    ext: &ExtensionToken,
    bundle_id: &str,
) -> Result<ApplyReport, HandlerError> {
    let content_type = gateway
        .content_type_identifier(ext)
        .ok_or_else(|| HandlerError::UnknownContentType {
            extension: ext.to_string(),
        })?;

    gateway.set_handler(&content_type, bundle_id)?;

    let outcome = match gateway.current_handler(&content_type) {
        Some(current) if current == bundle_id => ApplyOutcome::Applied,
        Some(current) if !current.is_empty() => ApplyOutcome::Mismatch { current },
        _ => ApplyOutcome::Unreadable,
    };
    Ok(ApplyReport {
        content_type,
        outcome,
    })
}


#[cfg(test)]
mod tests {
    use super::fake::FakeRegistry;
    use super::*;

    fn ext(s: &str) -> ExtensionToken {
        ExtensionToken::new(s).unwrap()
    }

    #[test]
    fn lookup_distinguishes_unknown_type_from_no_handler() {
        let reg = FakeRegistry::new();

        let unknown = lookup(&reg, &ext("zzz"));
        assert_eq!(unknown, HandlerLookup::UnknownContentType);

        let none = lookup(&reg, &ext("md"));
        assert_eq!(none.content_type(), Some("net.daringfireball.markdown"));
        assert!(none.app().is_none());
        assert_ne!(unknown.placeholder_text(), none.placeholder_text());

        let found = lookup(&reg, &ext("pdf"));
        assert_eq!(found.app().map(|a| a.display_name.as_str()), Some("Preview"));
        assert_eq!(found.placeholder_text(), None);
    }

    #[test]
    fn application_picked_by_path_resolves_its_identifier() {
        let reg = FakeRegistry::new();
        let app = reg
            .describe_application_at(Path::new("/Applications/Typora.app"))
            .unwrap();
        assert_eq!(app.bundle_id, "abnerworks.Typora");
        assert_eq!(app.display_name, "Typora");
        assert_eq!(app.location.as_deref(), Some(Path::new("/Applications/Typora.app")));

        assert_eq!(
            reg.describe_application_at(Path::new("/tmp/notes.txt")),
            Err(HandlerError::MissingBundleIdentifier {
                path: "/tmp/notes.txt".into()
            })
        );
    }

    #[test]
    fn apply_verifies_write() {
        let reg = FakeRegistry::new();
        let report = apply_handler(&reg, &ext("md"), "com.example.Editor").unwrap();
        assert_eq!(report.content_type, "net.daringfireball.markdown");
        assert_eq!(report.outcome, ApplyOutcome::Applied);
    }

    #[test]
    fn apply_twice_is_idempotent() {
        let reg = FakeRegistry::new();
        let first = apply_handler(&reg, &ext("pdf"), "com.example.Reader").unwrap();
        let second = apply_handler(&reg, &ext("pdf"), "com.example.Reader").unwrap();
        assert_eq!(first, second);
        assert_eq!(reg.handlers.borrow().len(), 1);
    }

    #[test]
    fn apply_reports_mismatch_and_unreadable() {
        let reg = FakeRegistry {
            stuck_on: Some("com.apple.Preview".into()),
            ..FakeRegistry::new()
        };
        let report = apply_handler(&reg, &ext("pdf"), "com.example.Reader").unwrap();
        assert_eq!(
            report.outcome,
            ApplyOutcome::Mismatch {
                current: "com.apple.Preview".into()
            }
        );

        let reg = FakeRegistry {
            unreadable: true,
            ..FakeRegistry::new()
        };
        let report = apply_handler(&reg, &ext("pdf"), "com.example.Reader").unwrap();
        assert_eq!(report.outcome, ApplyOutcome::Unreadable);
    }

    #[test]
    fn apply_surfaces_errors_without_writing() {
        let reg = FakeRegistry::new();
        assert_eq!(
            apply_handler(&reg, &ext("zzz"), "com.example.Reader"),
            Err(HandlerError::UnknownContentType {
                extension: "zzz".into()
            })
        );
        assert_eq!(*reg.writes.borrow(), 0);

        let err = PlatformError::new(-10814, None);
        let reg = FakeRegistry {
            fail_with: Some(err.clone()),
            ..FakeRegistry::new()
        };
        assert_eq!(
            apply_handler(&reg, &ext("pdf"), "com.example.Reader"),
            Err(HandlerError::Platform(err))
        );
    }
}
