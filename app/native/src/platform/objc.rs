//! Objective-C helper utilities for macOS integration.

use std::ffi::c_void;

use objc::runtime::Object;
use objc::{class, msg_send, sel, sel_impl};

/// Creates an `NSString` from a Rust string slice.
///
/// # Safety
///
/// The Objective-C runtime must be initialized. The returned object is
/// autoreleased.
#[must_use]
pub unsafe fn nsstring(s: &str) -> *mut Object {
    let nsstring_class = class!(NSString);
    let bytes = s.as_ptr().cast::<c_void>();
    let len = s.len();
    let encoding: usize = 4; // NSUTF8StringEncoding

    unsafe {
        msg_send![
            nsstring_class,
            stringWithBytes: bytes
            length: len
            encoding: encoding
        ]
    }
}
