//! Storage slot holding the encoded session between requests.
//!
//! The host web framework owns cookie transport. This port exposes only the
//! three primitives the session lifecycle needs.

/// One client's session storage slot.
pub trait SessionJar {
    /// Current stored value, if any.
    fn get(&self) -> Option<String>;

    /// Replace the stored value.
    fn set(&mut self, value: String);

    /// Remove the stored value.
    fn delete(&mut self);
}

/// In-memory jar used by tests and tools.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FixtureSessionJar {
    value: Option<String>,
}

impl FixtureSessionJar {
    /// Jar pre-filled with `value`.
    pub fn with_value(value: impl Into<String>) -> Self {
        Self {
            value: Some(value.into()),
        }
    }
}

impl SessionJar for FixtureSessionJar {
    fn get(&self) -> Option<String> {
        self.value.clone()
    }

    fn set(&mut self, value: String) {
        self.value = Some(value);
    }

    fn delete(&mut self) {
        self.value = None;
    }
}
