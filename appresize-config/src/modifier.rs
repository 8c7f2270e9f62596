use std::fmt;
use std::marker::PhantomData;
use std::str::FromStr;

use serde::de::Deserializer;
use serde::ser::{SerializeSeq, Serializer};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Modifier {
    #[serde(alias = "option")]
    Alt,
    #[serde(rename = "cmd", alias = "command")]
    Command,
    #[serde(rename = "ctrl", alias = "control")]
    Control,
    Fn,
    Shift,
}

impl Modifier {
    pub const ALL: [Modifier; 5] = [
        Modifier::Alt,
        Modifier::Command,
        Modifier::Control,
        Modifier::Fn,
        Modifier::Shift,
    ];

    fn bit(self) -> u8 {
        match self {
            Modifier::Alt => 1 << 0,
            Modifier::Command => 1 << 1,
            Modifier::Control => 1 << 2,
            Modifier::Fn => 1 << 3,
            Modifier::Shift => 1 << 4,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Modifier::Alt => "alt",
            Modifier::Command => "cmd",
            Modifier::Control => "ctrl",
            Modifier::Fn => "fn",
            Modifier::Shift => "shift",
        }
    }
}

impl FromStr for Modifier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "alt" | "opt" | "option" => Ok(Modifier::Alt),
            "cmd" | "command" | "super" => Ok(Modifier::Command),
            "ctrl" | "control" => Ok(Modifier::Control),
            "fn" | "function" => Ok(Modifier::Fn),
            "shift" => Ok(Modifier::Shift),
            _ => Err(format!("Unknown modifier: {}", s)),
        }
    }
}

impl fmt::Display for Modifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Modifier keys held down at the time of an event, restricted to the keys
/// a `ModifierSet` can name. Other flag bits (caps lock, numeric pad, ...)
/// are dropped when this is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ModifierFlags(u8);

impl ModifierFlags {
    pub fn empty() -> Self {
        Self(0)
    }

    pub fn with(self, modifier: Modifier) -> Self {
        Self(self.0 | modifier.bit())
    }

    pub fn contains(self, modifier: Modifier) -> bool {
        self.0 & modifier.bit() != 0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl FromIterator<Modifier> for ModifierFlags {
    fn from_iter<I: IntoIterator<Item = Modifier>>(iter: I) -> Self {
        iter.into_iter().fold(Self::empty(), Self::with)
    }
}

/// Marks which gesture a `ModifierSet` activates.
pub trait Role {
    const NAME: &'static str;
}

#[derive(Debug)]
pub enum Move {}

#[derive(Debug)]
pub enum Resize {}

impl Role for Move {
    const NAME: &'static str = "move";
}

impl Role for Resize {
    const NAME: &'static str = "resize";
}

pub struct ModifierSet<R> {
    mask: u8,
    _role: PhantomData<R>,
}

impl<R: Role> ModifierSet<R> {
    pub fn empty() -> Self {
        Self {
            mask: 0,
            _role: PhantomData,
        }
    }

    pub fn contains(self, modifier: Modifier) -> bool {
        self.mask & modifier.bit() != 0
    }

    pub fn is_empty(self) -> bool {
        self.mask == 0
    }

    pub fn iter(self) -> impl Iterator<Item = Modifier> {
        Modifier::ALL.into_iter().filter(move |m| self.contains(*m))
    }

    pub fn insert(self, modifier: Modifier) -> Self {
        Self {
            mask: self.mask | modifier.bit(),
            _role: PhantomData,
        }
    }

    pub fn toggle(self, modifier: Modifier) -> Self {
        Self {
            mask: self.mask ^ modifier.bit(),
            _role: PhantomData,
        }
    }

    /// True when exactly the keys of this set are held: every member is down
    /// and no other recognized modifier is. An empty set never matches.
    pub fn exclusively_set(self, flags: ModifierFlags) -> bool {
        !self.is_empty() && flags.0 == self.mask
    }

    /// True when both sets name the same keys, whatever their roles.
    pub fn same_keys<S: Role>(self, other: ModifierSet<S>) -> bool {
        self.mask == other.mask
    }
}

impl<R> Clone for ModifierSet<R> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<R> Copy for ModifierSet<R> {}

impl<R> PartialEq for ModifierSet<R> {
    fn eq(&self, other: &Self) -> bool {
        self.mask == other.mask
    }
}

impl<R> Eq for ModifierSet<R> {}

impl<R: Role> Default for ModifierSet<R> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<R: Role> FromIterator<Modifier> for ModifierSet<R> {
    fn from_iter<I: IntoIterator<Item = Modifier>>(iter: I) -> Self {
        iter.into_iter().fold(Self::empty(), Self::insert)
    }
}

impl<R: Role> fmt::Display for ModifierSet<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("none");
        }
        let names: Vec<&str> = self.iter().map(Modifier::name).collect();
        f.write_str(&names.join("-"))
    }
}

impl<R: Role> fmt::Debug for ModifierSet<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ModifierSet<{}>({})", R::NAME, self)
    }
}

impl<R: Role> FromStr for ModifierSet<R> {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() || s.eq_ignore_ascii_case("none") {
            return Ok(Self::empty());
        }
        s.split(['-', ',', '+'])
            .map(|part| part.trim().parse::<Modifier>())
            .collect()
    }
}

impl<R: Role> Serialize for ModifierSet<R> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(None)?;
        for modifier in self.iter() {
            seq.serialize_element(&modifier)?;
        }
        seq.end()
    }
}

impl<'de, R: Role> Deserialize<'de> for ModifierSet<R> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let modifiers = Vec::<Modifier>::deserialize(deserializer)?;
        Ok(modifiers.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flags(modifiers: &[Modifier]) -> ModifierFlags {
        modifiers.iter().copied().collect()
    }

    #[test]
    fn test_exclusively_set_requires_exact_match() {
        let set: ModifierSet<Move> = [Modifier::Command].into_iter().collect();

        assert!(set.exclusively_set(flags(&[Modifier::Command])));
        assert!(!set.exclusively_set(flags(&[Modifier::Command, Modifier::Shift])));
        assert!(!set.exclusively_set(flags(&[])));
    }

    #[test]
    fn test_exclusively_set_with_multiple_members() {
        let set: ModifierSet<Resize> = [Modifier::Fn, Modifier::Control, Modifier::Alt]
            .into_iter()
            .collect();

        assert!(set.exclusively_set(flags(&[Modifier::Alt, Modifier::Control, Modifier::Fn])));
        assert!(!set.exclusively_set(flags(&[Modifier::Control, Modifier::Fn])));
        assert!(!set.exclusively_set(flags(&[
            Modifier::Alt,
            Modifier::Control,
            Modifier::Fn,
            Modifier::Command
        ])));
    }

    #[test]
    fn test_empty_set_never_matches() {
        let set = ModifierSet::<Move>::empty();
        assert!(!set.exclusively_set(flags(&[])));
        assert!(!set.exclusively_set(flags(&[Modifier::Shift])));
        assert!(!set.exclusively_set(flags(&Modifier::ALL)));
    }

    #[test]
    fn test_toggle() {
        let set = ModifierSet::<Move>::empty();

        let set = set.toggle(Modifier::Fn);
        assert!(set.contains(Modifier::Fn));

        let set = set.toggle(Modifier::Control);
        assert!(set.contains(Modifier::Fn));
        assert!(set.contains(Modifier::Control));

        let set = set.toggle(Modifier::Fn);
        assert!(!set.contains(Modifier::Fn));
        assert!(set.contains(Modifier::Control));
    }

    #[test]
    fn test_same_keys_ignores_role() {
        let a: ModifierSet<Move> = [Modifier::Fn, Modifier::Control].into_iter().collect();
        let b: ModifierSet<Resize> = [Modifier::Control, Modifier::Fn].into_iter().collect();
        let c: ModifierSet<Resize> = [Modifier::Control].into_iter().collect();

        assert!(a.same_keys(b));
        assert!(!a.same_keys(c));
    }

    #[test]
    fn test_parse_modifier_aliases() {
        assert_eq!("opt".parse::<Modifier>().unwrap(), Modifier::Alt);
        assert_eq!("Option".parse::<Modifier>().unwrap(), Modifier::Alt);
        assert_eq!("super".parse::<Modifier>().unwrap(), Modifier::Command);
        assert_eq!("control".parse::<Modifier>().unwrap(), Modifier::Control);
        assert_eq!("FN".parse::<Modifier>().unwrap(), Modifier::Fn);
        assert!("meta".parse::<Modifier>().is_err());
    }

    #[test]
    fn test_parse_and_display_set() {
        let set: ModifierSet<Move> = "ctrl-fn".parse().unwrap();
        assert!(set.contains(Modifier::Control));
        assert!(set.contains(Modifier::Fn));
        assert_eq!(set.to_string(), "ctrl-fn");

        let set: ModifierSet<Move> = "shift, cmd".parse().unwrap();
        assert_eq!(set.to_string(), "cmd-shift");

        let set: ModifierSet<Move> = "none".parse().unwrap();
        assert!(set.is_empty());
        assert_eq!(set.to_string(), "none");

        assert!("ctrl-hyper".parse::<ModifierSet<Move>>().is_err());
    }

    #[test]
    fn test_serialization_as_list() {
        let set: ModifierSet<Resize> = [Modifier::Alt, Modifier::Fn].into_iter().collect();
        let json = serde_json::to_string(&set).unwrap();
        assert_eq!(json, r#"["alt","fn"]"#);

        let parsed: ModifierSet<Resize> = serde_json::from_str(r#"["fn","alt","fn"]"#).unwrap();
        assert_eq!(parsed, set);
    }

    #[test]
    fn test_debug_includes_role() {
        let set: ModifierSet<Resize> = [Modifier::Shift].into_iter().collect();
        assert_eq!(format!("{:?}", set), "ModifierSet<resize>(shift)");
    }
}
