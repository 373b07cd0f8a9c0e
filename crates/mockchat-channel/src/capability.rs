use std::fmt;

/// Something a channel may or may not let callers do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    Send,
    Edit,
    Act,
    Typing,
    Complete,
    Nickname,
}

impl Capability {
    pub const ALL: [Capability; 6] = [
        Capability::Send,
        Capability::Edit,
        Capability::Act,
        Capability::Typing,
        Capability::Complete,
        Capability::Nickname,
    ];

    fn bit(self) -> u8 {
        1 << self as u8
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Capability::Send => "sending",
            Capability::Edit => "editing",
            Capability::Act => "message actions",
            Capability::Typing => "typing indicators",
            Capability::Complete => "completion",
            Capability::Nickname => "nicknames",
        };
        f.write_str(name)
    }
}

/// The fixed set of capabilities a channel declares when it is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    bits: u8,
}

impl Capabilities {
    pub const NONE: Capabilities = Capabilities { bits: 0 };

    pub fn all() -> Self {
        Capability::ALL.into_iter().collect()
    }

    /// Read-only channels: no sending, editing, actions or completion.
    pub fn read_only() -> Self {
        [Capability::Typing, Capability::Nickname].into_iter().collect()
    }

    pub fn with(mut self, cap: Capability) -> Self {
        self.bits |= cap.bit();
        self
    }

    pub fn without(mut self, cap: Capability) -> Self {
        self.bits &= !cap.bit();
        self
    }

    pub fn has(self, cap: Capability) -> bool {
        self.bits & cap.bit() != 0
    }

    pub fn iter(self) -> impl Iterator<Item = Capability> {
        Capability::ALL.into_iter().filter(move |c| self.has(*c))
    }
}

impl Default for Capabilities {
    fn default() -> Self {
        Self::all()
    }
}

impl FromIterator<Capability> for Capabilities {
    fn from_iter<I: IntoIterator<Item = Capability>>(iter: I) -> Self {
        iter.into_iter().fold(Capabilities::NONE, Capabilities::with)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn with_and_without() {
        let caps = Capabilities::all().without(Capability::Edit);
        assert!(caps.has(Capability::Send));
        assert!(!caps.has(Capability::Edit));
        assert_eq!(caps.iter().count(), 5);
    }

    #[test]
    fn read_only_set() {
        let caps = Capabilities::read_only();
        let listed: Vec<Capability> = caps.iter().collect();
        assert_eq!(listed, vec![Capability::Typing, Capability::Nickname]);
    }
}
