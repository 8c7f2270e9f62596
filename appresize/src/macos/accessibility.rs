use core_foundation::{
    base::{CFType, CFTypeID, TCFType},
    boolean::CFBoolean,
    declare_TCFType, impl_TCFType,
    string::{CFString, CFStringRef},
};
use core_graphics::geometry::{CGPoint, CGSize};
use std::ffi::c_void;
use std::ptr;

pub type AXError = i32;
pub const AX_ERROR_SUCCESS: AXError = 0;
pub const AX_ERROR_FAILURE: AXError = -25200;

#[repr(C)]
pub struct __AXUIElement(c_void);
pub type AXUIElementRef = *mut __AXUIElement;

declare_TCFType!(AXUIElement, AXUIElementRef);
impl_TCFType!(AXUIElement, AXUIElementRef, AXUIElementGetTypeID);

#[link(name = "ApplicationServices", kind = "framework")]
extern "C" {
    fn AXUIElementGetTypeID() -> CFTypeID;
    fn AXIsProcessTrusted() -> bool;
    fn AXIsProcessTrustedWithOptions(options: *const c_void) -> bool;
    fn AXUIElementCreateSystemWide() -> AXUIElementRef;
    fn AXUIElementCopyElementAtPosition(
        application: AXUIElementRef,
        x: f32,
        y: f32,
        element: *mut AXUIElementRef,
    ) -> AXError;
    fn AXUIElementCopyAttributeValue(
        element: AXUIElementRef,
        attribute: CFStringRef,
        value: *mut *mut c_void,
    ) -> AXError;
    fn AXUIElementSetAttributeValue(
        element: AXUIElementRef,
        attribute: CFStringRef,
        value: *const c_void,
    ) -> AXError;
    fn AXValueCreate(value_type: u32, value: *const c_void) -> *mut c_void;
    fn AXValueGetValue(value: *const c_void, value_type: u32, value_ptr: *mut c_void) -> bool;
}

const AX_VALUE_TYPE_CGPOINT: u32 = 1;
const AX_VALUE_TYPE_CGSIZE: u32 = 2;

mod attr {
    pub const ROLE: &str = "AXRole";
    pub const WINDOW: &str = "AXWindow";
    pub const POSITION: &str = "AXPosition";
    pub const SIZE: &str = "AXSize";
}

const WINDOW_ROLE: &str = "AXWindow";

pub fn is_trusted() -> bool {
    unsafe { AXIsProcessTrusted() }
}

pub fn is_trusted_with_prompt() -> bool {
    use core_foundation::dictionary::CFDictionary;

    let key = CFString::new("AXTrustedCheckOptionPrompt");
    let dict = CFDictionary::from_CFType_pairs(&[(key, CFBoolean::true_value())]);

    unsafe { AXIsProcessTrustedWithOptions(dict.as_concrete_TypeRef() as *const c_void) }
}

/// The top-level window under `point` (global display coordinates, origin
/// at the top-left of the primary display).
pub fn window_at(point: CGPoint) -> Option<AXUIElement> {
    let element = match AXUIElement::system_wide().element_at(point) {
        Ok(element) => element,
        Err(e) => {
            tracing::debug!("No element at ({}, {}): {}", point.x, point.y, e);
            return None;
        }
    };

    if element.role().ok().as_deref() == Some(WINDOW_ROLE) {
        return Some(element);
    }
    element.window().ok()
}

impl AXUIElement {
    pub fn system_wide() -> Self {
        unsafe {
            let raw = AXUIElementCreateSystemWide();
            Self::wrap_under_create_rule(raw)
        }
    }

    pub fn element_at(&self, point: CGPoint) -> Result<AXUIElement, AXError> {
        let mut raw: AXUIElementRef = ptr::null_mut();
        let err = unsafe {
            AXUIElementCopyElementAtPosition(
                self.as_concrete_TypeRef(),
                point.x as f32,
                point.y as f32,
                &mut raw,
            )
        };
        if err == AX_ERROR_SUCCESS && !raw.is_null() {
            Ok(unsafe { AXUIElement::wrap_under_create_rule(raw) })
        } else {
            Err(err)
        }
    }

    fn get_attribute(&self, name: &str) -> Result<CFType, AXError> {
        let attr = CFString::new(name);
        let mut value: *mut c_void = ptr::null_mut();
        let err = unsafe {
            AXUIElementCopyAttributeValue(
                self.as_concrete_TypeRef(),
                attr.as_concrete_TypeRef(),
                &mut value,
            )
        };
        if err == AX_ERROR_SUCCESS && !value.is_null() {
            Ok(unsafe { CFType::wrap_under_create_rule(value as *const _) })
        } else {
            Err(err)
        }
    }

    fn set_attribute(&self, name: &str, value: &CFType) -> Result<(), AXError> {
        let attr = CFString::new(name);
        let err = unsafe {
            AXUIElementSetAttributeValue(
                self.as_concrete_TypeRef(),
                attr.as_concrete_TypeRef(),
                value.as_CFTypeRef(),
            )
        };
        if err == AX_ERROR_SUCCESS {
            Ok(())
        } else {
            Err(err)
        }
    }

    pub fn role(&self) -> Result<String, AXError> {
        let value = self.get_attribute(attr::ROLE)?;
        value
            .downcast_into::<CFString>()
            .map(|s| s.to_string())
            .ok_or(AX_ERROR_FAILURE)
    }

    /// The window containing this element.
    pub fn window(&self) -> Result<AXUIElement, AXError> {
        let value = self.get_attribute(attr::WINDOW)?;
        let raw = value.as_CFTypeRef() as AXUIElementRef;
        Ok(unsafe { AXUIElement::wrap_under_get_rule(raw) })
    }

    pub fn position(&self) -> Result<CGPoint, AXError> {
        let value = self.get_attribute(attr::POSITION)?;
        let mut point = CGPoint::new(0.0, 0.0);
        let ok = unsafe {
            AXValueGetValue(
                value.as_CFTypeRef(),
                AX_VALUE_TYPE_CGPOINT,
                &mut point as *mut CGPoint as *mut c_void,
            )
        };
        if ok {
            Ok(point)
        } else {
            Err(AX_ERROR_FAILURE)
        }
    }

    pub fn size(&self) -> Result<CGSize, AXError> {
        let value = self.get_attribute(attr::SIZE)?;
        let mut size = CGSize::new(0.0, 0.0);
        let ok = unsafe {
            AXValueGetValue(
                value.as_CFTypeRef(),
                AX_VALUE_TYPE_CGSIZE,
                &mut size as *mut CGSize as *mut c_void,
            )
        };
        if ok {
            Ok(size)
        } else {
            Err(AX_ERROR_FAILURE)
        }
    }

    pub fn set_position(&self, point: CGPoint) -> Result<(), AXError> {
        let value = ax_value(AX_VALUE_TYPE_CGPOINT, &point as *const CGPoint as *const c_void)?;
        self.set_attribute(attr::POSITION, &value)
    }

    pub fn set_size(&self, size: CGSize) -> Result<(), AXError> {
        let value = ax_value(AX_VALUE_TYPE_CGSIZE, &size as *const CGSize as *const c_void)?;
        self.set_attribute(attr::SIZE, &value)
    }
}

fn ax_value(value_type: u32, value: *const c_void) -> Result<CFType, AXError> {
    let raw = unsafe { AXValueCreate(value_type, value) };
    if raw.is_null() {
        return Err(AX_ERROR_FAILURE);
    }
    Ok(unsafe { CFType::wrap_under_create_rule(raw as *const _) })
}
