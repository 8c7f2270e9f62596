pub mod modifier;
pub mod settings;

pub use modifier::{Modifier, ModifierFlags, ModifierSet, Move, Resize, Role};
pub use settings::{SettingKey, Settings, SettingsWarning};
