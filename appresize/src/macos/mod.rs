mod accessibility;
mod display;
mod event_tap;
mod overlay;

pub use accessibility::*;
pub use display::*;
pub use event_tap::*;
pub use overlay::*;
