// LaunchServices-backed handler registry.
//
// Extension -> UTI via UTTypeCreatePreferredIdentifierForTag, then
// LSCopy/LSSetDefaultRoleHandlerForContentType with kLSRolesAll, the same
// calls `duti` and friends use.

use std::ffi::c_void;
use std::path::{Path, PathBuf};

use defaultopener_shared::{
    ApplicationDescriptor, DefaultHandlerGateway, ExtensionToken, HandlerError, PlatformError,
};

use crate::cf::{self, CFArrayRef, CFStringRef, Owned};

const K_LS_ROLES_ALL: u32 = 0xFFFF_FFFF;
const NO_ERR: i32 = 0;

#[link(name = "CoreServices", kind = "framework")]
extern "C" {
    static kUTTagClassFilenameExtension: CFStringRef;

    fn UTTypeCreatePreferredIdentifierForTag(
        tag_class: CFStringRef,
        tag: CFStringRef,
        conforming_to: CFStringRef,
    ) -> CFStringRef;
    fn LSCopyDefaultRoleHandlerForContentType(content_type: CFStringRef, role: u32) -> CFStringRef;
    fn LSSetDefaultRoleHandlerForContentType(
        content_type: CFStringRef,
        role: u32,
        handler_bundle_id: CFStringRef,
    ) -> i32;
    fn LSCopyApplicationURLsForBundleIdentifier(
        bundle_id: CFStringRef,
        out_error: *mut *const c_void,
    ) -> CFArrayRef;
}

#[link(name = "Security", kind = "framework")]
extern "C" {
    fn SecCopyErrorMessageString(status: i32, reserved: *mut c_void) -> CFStringRef;
}

/// The system handler registry.
#[derive(Debug, Default, Clone, Copy)]
pub struct LaunchServicesGateway;

impl LaunchServicesGateway {
    pub fn new() -> Self {
        Self
    }
}

fn status_message(status: i32) -> Option<String> {
    unsafe {
        let msg = Owned::from_create(SecCopyErrorMessageString(status, std::ptr::null_mut()))?;
        cf::into_string(msg)
    }
}

impl DefaultHandlerGateway for LaunchServicesGateway {
    fn content_type_identifier(&self, ext: &ExtensionToken) -> Option<String> {
        let tag = cf::string(ext.as_str())?;
        let uti = unsafe {
            Owned::from_create(UTTypeCreatePreferredIdentifierForTag(
                kUTTagClassFilenameExtension,
                tag.as_ptr(),
                std::ptr::null(),
            ))
        }?;
        // Unregistered extensions come back as `dyn.*`; those are still
        // valid targets for LSSetDefaultRoleHandlerForContentType.
        cf::into_string(uti)
    }

    fn current_handler(&self, content_type: &str) -> Option<String> {
        let ct = cf::string(content_type)?;
        let handler = unsafe {
            Owned::from_create(LSCopyDefaultRoleHandlerForContentType(
                ct.as_ptr(),
                K_LS_ROLES_ALL,
            ))
        }?;
        cf::into_string(handler).filter(|id| !id.is_empty())
    }

    fn set_handler(&self, content_type: &str, bundle_id: &str) -> Result<(), PlatformError> {
        let (Some(ct), Some(app)) = (cf::string(content_type), cf::string(bundle_id)) else {
            return Err(PlatformError::new(-50, Some("Invalid argument".into())));
        };
        let status = unsafe {
            LSSetDefaultRoleHandlerForContentType(ct.as_ptr(), K_LS_ROLES_ALL, app.as_ptr())
        };
        if status == NO_ERR {
            Ok(())
        } else {
            let err = PlatformError::new(status, status_message(status));
            tracing::error!(content_type, bundle_id, status, "LSSetDefaultRoleHandlerForContentType failed: {}", err);
            Err(err)
        }
    }

    fn describe_application(&self, bundle_id: &str) -> ApplicationDescriptor {
        let Some(id) = cf::string(bundle_id) else {
            return ApplicationDescriptor::bare(bundle_id);
        };
        let urls = unsafe {
            Owned::from_create(LSCopyApplicationURLsForBundleIdentifier(
                id.as_ptr(),
                std::ptr::null_mut(),
            ))
        };
        let Some(urls) = urls else {
            return ApplicationDescriptor::bare(bundle_id);
        };

        let location = unsafe { cf::first_url_path(urls.as_ptr()) }.map(PathBuf::from);
        let display_name = unsafe {
            cf::first_bundle_info_string(urls.as_ptr(), &["CFBundleDisplayName", "CFBundleName"])
        }
        .or_else(|| {
            location
                .as_ref()
                .and_then(|p| p.file_stem())
                .map(|s| s.to_string_lossy().into_owned())
        })
        .unwrap_or_else(|| bundle_id.to_string());

        ApplicationDescriptor {
            bundle_id: bundle_id.to_string(),
            display_name,
            location,
        }
    }

    fn describe_application_at(&self, path: &Path) -> Result<ApplicationDescriptor, HandlerError> {
        let bundle_id = cf::bundle_identifier_at(path).ok_or_else(|| {
            tracing::error!(path = %path.display(), "No CFBundleIdentifier");
            HandlerError::MissingBundleIdentifier {
                path: path.to_path_buf(),
            }
        })?;
        let app = self.describe_application(&bundle_id);
        if app.location.is_some() {
            return Ok(app);
        }
        // LaunchServices has not registered the app (yet); go by the path.
        Ok(ApplicationDescriptor {
            display_name: path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or(app.display_name),
            location: Some(path.to_path_buf()),
            bundle_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_extension_maps_to_public_type() {
        let gw = LaunchServicesGateway::new();
        let pdf = ExtensionToken::new("pdf").unwrap();
        assert_eq!(gw.content_type_identifier(&pdf).as_deref(), Some("com.adobe.pdf"));
    }

    #[test]
    fn made_up_extension_gets_dynamic_type() {
        let gw = LaunchServicesGateway::new();
        let odd = ExtensionToken::new("zq9xw7").unwrap();
        let uti = gw.content_type_identifier(&odd).unwrap();
        assert!(uti.starts_with("dyn."), "{}", uti);
    }

    #[test]
    fn system_app_bundle_identifier_is_read_from_path() {
        let gw = LaunchServicesGateway::new();
        let app = gw
            .describe_application_at(Path::new("/System/Applications/TextEdit.app"))
            .unwrap();
        assert_eq!(app.bundle_id, "com.apple.TextEdit");
        assert!(app.location.is_some());
    }

    #[test]
    fn non_bundle_path_has_no_identifier() {
        let gw = LaunchServicesGateway::new();
        let path = Path::new("/usr/bin/true");
        assert_eq!(
            gw.describe_application_at(path),
            Err(HandlerError::MissingBundleIdentifier {
                path: path.to_path_buf()
            })
        );
    }
}
