use std::ffi::c_void;
use std::ptr;
use std::sync::atomic::{AtomicPtr, Ordering};
use std::sync::Arc;
use std::time::Instant;

use appresize_config::{Modifier, ModifierFlags};
use core_foundation::base::TCFType;
use core_foundation::runloop::{kCFRunLoopCommonModes, CFRunLoop, CFRunLoopSource};
use core_foundation_sys::mach_port::CFMachPortRef;
use core_graphics::event::{
    CGEvent, CGEventFlags, CGEventTap, CGEventTapLocation, CGEventTapOptions,
    CGEventTapPlacement, CGEventType, CallbackResult, EventField,
};

use crate::core::{Delta, EventKind, Point, PointerEvent, Verdict};
use crate::error::Error;

extern "C" {
    fn CGEventTapEnable(tap: CFMachPortRef, enable: bool);
}

const EVENT_TYPES: [CGEventType; 10] = [
    CGEventType::MouseMoved,
    CGEventType::LeftMouseDragged,
    CGEventType::RightMouseDragged,
    CGEventType::OtherMouseDragged,
    CGEventType::LeftMouseDown,
    CGEventType::LeftMouseUp,
    CGEventType::RightMouseDown,
    CGEventType::RightMouseUp,
    CGEventType::OtherMouseDown,
    CGEventType::OtherMouseUp,
];

const MODIFIER_FLAGS: [(CGEventFlags, Modifier); 5] = [
    (CGEventFlags::CGEventFlagAlternate, Modifier::Alt),
    (CGEventFlags::CGEventFlagCommand, Modifier::Command),
    (CGEventFlags::CGEventFlagControl, Modifier::Control),
    (CGEventFlags::CGEventFlagSecondaryFn, Modifier::Fn),
    (CGEventFlags::CGEventFlagShift, Modifier::Shift),
];

fn event_kind(event_type: CGEventType) -> Option<EventKind> {
    match event_type {
        CGEventType::MouseMoved => Some(EventKind::MouseMoved),
        CGEventType::LeftMouseDragged
        | CGEventType::RightMouseDragged
        | CGEventType::OtherMouseDragged => Some(EventKind::MouseDragged),
        CGEventType::LeftMouseDown | CGEventType::RightMouseDown | CGEventType::OtherMouseDown => {
            Some(EventKind::MouseDown)
        }
        CGEventType::LeftMouseUp | CGEventType::RightMouseUp | CGEventType::OtherMouseUp => {
            Some(EventKind::MouseUp)
        }
        CGEventType::TapDisabledByTimeout => Some(EventKind::TapDisabledByTimeout),
        CGEventType::TapDisabledByUserInput => Some(EventKind::TapDisabledByUserInput),
        _ => None,
    }
}

fn modifier_flags(flags: CGEventFlags) -> ModifierFlags {
    MODIFIER_FLAGS
        .iter()
        .filter(|(flag, _)| flags.contains(*flag))
        .map(|(_, modifier)| *modifier)
        .collect()
}

fn pointer_event(kind: EventKind, event: &CGEvent) -> PointerEvent {
    let location = event.location();
    PointerEvent {
        kind,
        location: Point::new(location.x, location.y),
        delta: Delta::new(
            event.get_double_value_field(EventField::MOUSE_EVENT_DELTA_X),
            event.get_double_value_field(EventField::MOUSE_EVENT_DELTA_Y),
        ),
        flags: modifier_flags(event.get_flags()),
        time: Instant::now(),
    }
}

/// Active (filtering) tap on every mouse event at the HID level. The
/// handler's verdict decides whether each event reaches its target.
/// Dropping the tap disables it and detaches it from the run loop.
pub struct PointerTap {
    tap: CGEventTap<'static>,
    source: CFRunLoopSource,
}

impl PointerTap {
    /// Must run on the thread whose run loop will deliver events.
    pub fn install<F>(handler: F) -> Result<Self, Error>
    where
        F: Fn(&PointerEvent) -> Verdict + 'static,
    {
        let mach_port_ptr: Arc<AtomicPtr<c_void>> = Arc::new(AtomicPtr::new(ptr::null_mut()));
        let mach_port_for_callback = Arc::clone(&mach_port_ptr);

        let tap = CGEventTap::new(
            CGEventTapLocation::HID,
            CGEventTapPlacement::HeadInsertEventTap,
            CGEventTapOptions::Default,
            EVENT_TYPES.to_vec(),
            move |_proxy, event_type, event| {
                let Some(kind) = event_kind(event_type) else {
                    return CallbackResult::Keep;
                };

                match handler(&pointer_event(kind, event)) {
                    Verdict::Absorb => CallbackResult::Drop,
                    Verdict::Rearm => {
                        tracing::warn!("Pointer event tap disabled ({:?}), re-enabling", kind);
                        let ptr = mach_port_for_callback.load(Ordering::Acquire);
                        if !ptr.is_null() {
                            unsafe {
                                CGEventTapEnable(ptr as CFMachPortRef, true);
                            }
                        }
                        CallbackResult::Keep
                    }
                    Verdict::Pass | Verdict::Disable => CallbackResult::Keep,
                }
            },
        )
        .map_err(|_| Error::TapInstallFailed)?;

        mach_port_ptr.store(
            tap.mach_port().as_concrete_TypeRef() as *mut c_void,
            Ordering::Release,
        );

        tap.enable();

        let source = tap
            .mach_port()
            .create_runloop_source(0)
            .map_err(|_| Error::TapInstallFailed)?;

        CFRunLoop::get_current().add_source(&source, unsafe { kCFRunLoopCommonModes });
        tracing::info!("Pointer event tap installed");

        Ok(Self { tap, source })
    }
}

impl Drop for PointerTap {
    fn drop(&mut self) {
        unsafe {
            CGEventTapEnable(self.tap.mach_port().as_concrete_TypeRef(), false);
        }
        CFRunLoop::get_current().remove_source(&self.source, unsafe { kCFRunLoopCommonModes });
        tracing::info!("Pointer event tap removed");
    }
}
