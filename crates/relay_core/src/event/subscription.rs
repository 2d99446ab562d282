use std::fmt;

/// Token returned when connecting to an [`Event`](crate::Event) or
/// [`Pipeline`](crate::Pipeline). Pass it back to disconnect.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Subscription(u64);

impl Subscription {
    pub(crate) fn new(raw: u64) -> Self {
        Self(raw)
    }
}

impl fmt::Display for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}
