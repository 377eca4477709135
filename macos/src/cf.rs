// Minimal CoreFoundation plumbing shared by the LaunchServices and bundle code.
//
// Only the handful of calls we need, declared by hand like the rest of the
// framework bindings in this crate.

use std::ffi::{c_char, c_void};
use std::os::unix::ffi::OsStrExt;
use std::path::Path;

pub type CFTypeRef = *const c_void;
pub type CFStringRef = *const c_void;
pub type CFArrayRef = *const c_void;
pub type CFURLRef = *const c_void;
pub type CFBundleRef = *const c_void;

const K_CF_STRING_ENCODING_UTF8: u32 = 0x0800_0100;
const K_CF_URL_POSIX_PATH_STYLE: isize = 0;

#[link(name = "CoreFoundation", kind = "framework")]
extern "C" {
    fn CFRelease(cf: CFTypeRef);
    fn CFGetTypeID(cf: CFTypeRef) -> usize;
    fn CFStringGetTypeID() -> usize;
    fn CFStringCreateWithBytes(
        allocator: *const c_void,
        bytes: *const u8,
        num_bytes: isize,
        encoding: u32,
        is_external_representation: bool,
    ) -> CFStringRef;
    fn CFStringGetLength(s: CFStringRef) -> isize;
    fn CFStringGetMaximumSizeForEncoding(length: isize, encoding: u32) -> isize;
    fn CFStringGetCString(
        s: CFStringRef,
        buffer: *mut c_char,
        buffer_size: isize,
        encoding: u32,
    ) -> bool;
    fn CFArrayGetCount(array: CFArrayRef) -> isize;
    fn CFArrayGetValueAtIndex(array: CFArrayRef, idx: isize) -> *const c_void;
    fn CFURLCopyFileSystemPath(url: CFURLRef, path_style: isize) -> CFStringRef;
    fn CFURLCreateFromFileSystemRepresentation(
        allocator: *const c_void,
        buffer: *const u8,
        buf_len: isize,
        is_directory: bool,
    ) -> CFURLRef;
    pub fn CFBundleGetMainBundle() -> CFBundleRef;
    fn CFBundleCreate(allocator: *const c_void, bundle_url: CFURLRef) -> CFBundleRef;
    fn CFBundleGetValueForInfoDictionaryKey(bundle: CFBundleRef, key: CFStringRef) -> CFTypeRef;
    fn CFBundleGetIdentifier(bundle: CFBundleRef) -> CFStringRef;
}

/// A CF object we own (Create/Copy rule); released on drop.
pub struct Owned(CFTypeRef);

impl Owned {
    /// Take ownership of a +1 reference. `None` for NULL.
    ///
    /// # Safety
    /// `ptr` must be NULL or a CF object the caller owns.
    pub unsafe fn from_create(ptr: CFTypeRef) -> Option<Self> {
        if ptr.is_null() {
            None
        } else {
            Some(Self(ptr))
        }
    }

    pub fn as_ptr(&self) -> CFTypeRef {
        self.0
    }
}

impl Drop for Owned {
    fn drop(&mut self) {
        unsafe { CFRelease(self.0) }
    }
}

/// New CFString from a Rust string.
pub fn string(s: &str) -> Option<Owned> {
    unsafe {
        Owned::from_create(CFStringCreateWithBytes(
            std::ptr::null(),
            s.as_ptr(),
            s.len() as isize,
            K_CF_STRING_ENCODING_UTF8,
            false,
        ))
    }
}

/// Copy a CFString (not consumed) into a Rust string. Non-strings yield `None`.
///
/// # Safety
/// `s` must be NULL or a valid CF object.
pub unsafe fn to_string(s: CFTypeRef) -> Option<String> {
    if s.is_null() || CFGetTypeID(s) != CFStringGetTypeID() {
        return None;
    }
    let len = CFStringGetLength(s);
    let cap = CFStringGetMaximumSizeForEncoding(len, K_CF_STRING_ENCODING_UTF8) + 1;
    let mut buf = vec![0u8; cap.max(1) as usize];
    if !CFStringGetCString(s, buf.as_mut_ptr() as *mut c_char, cap, K_CF_STRING_ENCODING_UTF8) {
        return None;
    }
    let end = buf.iter().position(|&b| b == 0).unwrap_or(buf.len());
    buf.truncate(end);
    String::from_utf8(buf).ok()
}

/// Consume an owned CFString into a Rust string.
pub fn into_string(s: Owned) -> Option<String> {
    unsafe { to_string(s.as_ptr()) }
}

/// Filesystem path of the first URL in a CFArray of CFURLs.
///
/// # Safety
/// `array` must be a valid CFArray of CFURLs.
pub unsafe fn first_url_path(array: CFArrayRef) -> Option<String> {
    if CFArrayGetCount(array) < 1 {
        return None;
    }
    let url = CFArrayGetValueAtIndex(array, 0);
    let path = Owned::from_create(CFURLCopyFileSystemPath(url, K_CF_URL_POSIX_PATH_STYLE))?;
    into_string(path)
}

/// String value of an Info.plist key.
///
/// # Safety
/// `bundle` must be a valid CFBundle.
pub unsafe fn info_string(bundle: CFBundleRef, key: &str) -> Option<String> {
    if bundle.is_null() {
        return None;
    }
    let key = string(key)?;
    // Get rule: the value belongs to the bundle.
    to_string(CFBundleGetValueForInfoDictionaryKey(bundle, key.as_ptr()))
}

/// Open the bundle at the first URL of `urls` and read an Info.plist string.
///
/// # Safety
/// `urls` must be a valid CFArray of CFURLs.
pub unsafe fn first_bundle_info_string(urls: CFArrayRef, keys: &[&str]) -> Option<String> {
    if CFArrayGetCount(urls) < 1 {
        return None;
    }
    let url = CFArrayGetValueAtIndex(urls, 0);
    let bundle = Owned::from_create(CFBundleCreate(std::ptr::null(), url))?;
    keys.iter()
        .find_map(|key| info_string(bundle.as_ptr(), key))
        .filter(|v| !v.is_empty())
}

/// `CFBundleIdentifier` of the bundle at `path`, `None` if the path is not a
/// bundle or declares no identifier.
pub fn bundle_identifier_at(path: &Path) -> Option<String> {
    let bytes = path.as_os_str().as_bytes();
    unsafe {
        let url = Owned::from_create(CFURLCreateFromFileSystemRepresentation(
            std::ptr::null(),
            bytes.as_ptr(),
            bytes.len() as isize,
            true,
        ))?;
        let bundle = Owned::from_create(CFBundleCreate(std::ptr::null(), url.as_ptr()))?;
        // Get rule: the identifier belongs to the bundle.
        to_string(CFBundleGetIdentifier(bundle.as_ptr())).filter(|id| !id.is_empty())
    }
}
