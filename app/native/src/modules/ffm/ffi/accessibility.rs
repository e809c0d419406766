//! Safe wrappers for the macOS Accessibility API (`AXUIElement`).
//!
//! The main type is [`AXElement`], which owns one `AXUIElementRef` and
//! releases it on drop. [`SystemAccessibility`] implements the pipeline's
//! [`Accessibility`] trait on top of it.
//!
//! # Thread Safety
//!
//! The Accessibility API is thread-safe for operations on different
//! elements. `AXElement` implements `Send` so elements can live inside the
//! actor.

use std::cell::OnceCell;
use std::ffi::c_void;
use std::ptr;

use core_foundation::base::TCFType;
use core_foundation::boolean::CFBoolean;
use core_foundation::string::CFString;
use objc::runtime::{BOOL, Class, Object, YES};
use objc::{msg_send, sel, sel_impl};

use crate::modules::ffm::backend::{Accessibility, Pid, WindowId};
use crate::modules::ffm::motion::ScreenPoint;

// ============================================================================
// FFI Declarations
// ============================================================================

type AXUIElementRef = *mut c_void;
type AXError = i32;

const K_AX_ERROR_SUCCESS: AXError = 0;

#[link(name = "ApplicationServices", kind = "framework")]
unsafe extern "C" {
    fn AXIsProcessTrusted() -> bool;
    fn AXUIElementCreateSystemWide() -> AXUIElementRef;
    fn AXUIElementCreateApplication(pid: i32) -> AXUIElementRef;
    fn AXUIElementCopyElementAtPosition(
        application: AXUIElementRef,
        x: f32,
        y: f32,
        element: *mut AXUIElementRef,
    ) -> AXError;
    fn AXUIElementCopyAttributeValue(
        element: AXUIElementRef,
        attribute: *const c_void,
        value: *mut *mut c_void,
    ) -> AXError;
    fn AXUIElementSetAttributeValue(
        element: AXUIElementRef,
        attribute: *const c_void,
        value: *const c_void,
    ) -> AXError;
    /// Private API to get CGWindowID from an AXUIElement.
    fn _AXUIElementGetWindow(element: AXUIElementRef, window_id: *mut u32) -> AXError;
}

#[link(name = "CoreFoundation", kind = "framework")]
unsafe extern "C" {
    fn CFRelease(cf: *const c_void);
}

/// `NSApplicationActivateIgnoringOtherApps`.
const NS_APPLICATION_ACTIVATE_IGNORING_OTHER_APPS: u64 = 1 << 1;

// ============================================================================
// Cached CFStrings
// ============================================================================

thread_local! {
    static CF_ROLE: OnceCell<CFString> = const { OnceCell::new() };
    static CF_WINDOW: OnceCell<CFString> = const { OnceCell::new() };
    static CF_FOCUSED_WINDOW: OnceCell<CFString> = const { OnceCell::new() };
    static CF_MAIN: OnceCell<CFString> = const { OnceCell::new() };
    static CF_FOCUSED: OnceCell<CFString> = const { OnceCell::new() };
}

/// Gets or creates a cached `CFString`.
macro_rules! cached_cfstring {
    ($cell:expr, $value:expr) => {
        $cell.with(|cell| cell.get_or_init(|| CFString::new($value)).as_concrete_TypeRef().cast())
    };
}

#[inline]
fn cf_role() -> *const c_void { cached_cfstring!(CF_ROLE, "AXRole") }

#[inline]
fn cf_window() -> *const c_void { cached_cfstring!(CF_WINDOW, "AXWindow") }

#[inline]
fn cf_focused_window() -> *const c_void { cached_cfstring!(CF_FOCUSED_WINDOW, "AXFocusedWindow") }

#[inline]
fn cf_main() -> *const c_void { cached_cfstring!(CF_MAIN, "AXMain") }

#[inline]
fn cf_focused() -> *const c_void { cached_cfstring!(CF_FOCUSED, "AXFocused") }

/// Returns whether the process is trusted to use the Accessibility API.
#[must_use]
pub fn is_trusted() -> bool { unsafe { AXIsProcessTrusted() } }

/// Gets the window server id of a borrowed window element, such as the one
/// passed to an observer callback.
///
/// # Safety
///
/// `element` must be null or a valid `AXUIElementRef` for the whole call.
#[must_use]
pub unsafe fn window_id_of(element: *mut c_void) -> Option<WindowId> {
    if element.is_null() {
        return None;
    }

    let mut window_id: u32 = 0;
    let result = unsafe { _AXUIElementGetWindow(element, &raw mut window_id) };
    (result == K_AX_ERROR_SUCCESS && window_id != 0).then_some(window_id)
}

// ============================================================================
// AXElement
// ============================================================================

/// An owned `AXUIElementRef`.
///
/// Not `Clone`: every element is released exactly once, when it is dropped.
pub struct AXElement {
    /// The underlying `AXUIElementRef`. Never null.
    raw: AXUIElementRef,
}

impl AXElement {
    /// Creates the system-wide element used for hit-testing.
    #[must_use]
    pub fn system_wide() -> Option<Self> { unsafe { Self::from_raw(AXUIElementCreateSystemWide()) } }

    /// Creates an `AXElement` for an application by its process ID.
    #[must_use]
    pub fn application(pid: Pid) -> Option<Self> {
        unsafe { Self::from_raw(AXUIElementCreateApplication(pid)) }
    }

    /// Creates an `AXElement` from a raw pointer, taking ownership.
    ///
    /// # Safety
    ///
    /// The pointer must be null or a valid `AXUIElementRef` owned by the caller.
    #[must_use]
    pub const unsafe fn from_raw(raw: AXUIElementRef) -> Option<Self> {
        if raw.is_null() { None } else { Some(Self { raw }) }
    }

    /// Returns the raw `AXUIElementRef` without transferring ownership.
    #[must_use]
    pub const fn as_raw(&self) -> AXUIElementRef { self.raw }

    /// Accessibility hit test. Only meaningful on the system-wide element.
    #[must_use]
    pub fn element_at_position(&self, x: f64, y: f64) -> Option<Self> {
        let mut element: AXUIElementRef = ptr::null_mut();
        #[allow(clippy::cast_possible_truncation)]
        let result =
            unsafe { AXUIElementCopyElementAtPosition(self.raw, x as f32, y as f32, &raw mut element) };

        if result != K_AX_ERROR_SUCCESS {
            return None;
        }
        unsafe { Self::from_raw(element) }
    }

    /// Gets the element's role (e.g., "`AXWindow`", "`AXButton`").
    #[must_use]
    pub fn role(&self) -> Option<String> {
        let value = self.copy_attribute(cf_role())?;
        let role = unsafe { CFString::wrap_under_create_rule(value.cast_const().cast()) };
        Some(role.to_string())
    }

    /// Gets the window containing this element.
    #[must_use]
    pub fn window(&self) -> Option<Self> { self.copy_element_attribute(cf_window()) }

    /// Gets the focused window of this application.
    #[must_use]
    pub fn focused_window(&self) -> Option<Self> { self.copy_element_attribute(cf_focused_window()) }

    /// Gets the window server id of this window.
    #[must_use]
    pub fn window_id(&self) -> Option<WindowId> { unsafe { window_id_of(self.raw) } }

    /// Makes this window the main and focused window of its application.
    pub fn focus(&self) {
        self.set_bool_attribute(cf_main(), true);
        self.set_bool_attribute(cf_focused(), true);
    }

    fn copy_attribute(&self, attribute: *const c_void) -> Option<*mut c_void> {
        let mut value: *mut c_void = ptr::null_mut();
        let result = unsafe { AXUIElementCopyAttributeValue(self.raw, attribute, &raw mut value) };
        (result == K_AX_ERROR_SUCCESS && !value.is_null()).then_some(value)
    }

    fn copy_element_attribute(&self, attribute: *const c_void) -> Option<Self> {
        let value = self.copy_attribute(attribute)?;
        unsafe { Self::from_raw(value.cast()) }
    }

    fn set_bool_attribute(&self, attribute: *const c_void, value: bool) {
        let value = if value { CFBoolean::true_value() } else { CFBoolean::false_value() };
        let result = unsafe {
            AXUIElementSetAttributeValue(self.raw, attribute, value.as_concrete_TypeRef().cast())
        };
        if result != K_AX_ERROR_SUCCESS {
            tracing::trace!(result, "ffm: failed to set accessibility attribute");
        }
    }
}

impl Drop for AXElement {
    fn drop(&mut self) {
        // SAFETY: self.raw is guaranteed to be valid and non-null
        unsafe { CFRelease(self.raw.cast()) };
    }
}

// SAFETY: The Accessibility API is thread-safe for operations on different elements.
unsafe impl Send for AXElement {}

impl std::fmt::Debug for AXElement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AXElement").field("raw", &self.raw).finish()
    }
}

// ============================================================================
// Application activation
// ============================================================================

/// Brings the application with `pid` to front.
fn activate_application(pid: Pid) -> bool {
    unsafe {
        let Some(app_class) = Class::get("NSRunningApplication") else {
            return false;
        };

        let app: *mut Object = msg_send![app_class, runningApplicationWithProcessIdentifier: pid];
        if app.is_null() {
            return false;
        }

        let result: BOOL =
            msg_send![app, activateWithOptions: NS_APPLICATION_ACTIVATE_IGNORING_OTHER_APPS];
        result == YES
    }
}

// ============================================================================
// Accessibility backend
// ============================================================================

/// [`Accessibility`] backed by the system-wide accessibility element.
#[derive(Debug)]
pub struct SystemAccessibility {
    system_wide: AXElement,
}

impl SystemAccessibility {
    /// Creates the backend.
    ///
    /// Returns `None` if the system-wide element cannot be created.
    #[must_use]
    pub fn new() -> Option<Self> { AXElement::system_wide().map(|system_wide| Self { system_wide }) }
}

impl Accessibility for SystemAccessibility {
    type Element = AXElement;

    fn element_at_position(&self, point: ScreenPoint) -> Option<AXElement> {
        self.system_wide.element_at_position(point.x, point.y)
    }

    fn role(&self, element: &AXElement) -> Option<String> { element.role() }

    fn window_of(&self, element: &AXElement) -> Option<AXElement> { element.window() }

    fn focused_window_of(&self, pid: Pid) -> Option<WindowId> {
        AXElement::application(pid)?.focused_window()?.window_id()
    }

    fn set_focused_window(&self, window: &AXElement) { window.focus(); }

    fn set_focused_application(&self, pid: Pid) {
        if !activate_application(pid) {
            tracing::debug!(pid, "ffm: failed to activate application");
        }
    }
}
