//! Optional per-hook logging callback.

use serde::Serialize;

use crate::core::StateId;

/// Which of the six hooks a log record describes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum Method {
    Substitute,
    Enter,
    Update,
    Transition,
    React,
    Leave,
}

impl Method {
    /// The hook's name as it appears in the `State` trait.
    pub fn name(self) -> &'static str {
        match self {
            Method::Substitute => "substitute",
            Method::Enter => "enter",
            Method::Update => "update",
            Method::Transition => "transition",
            Method::React => "react",
            Method::Leave => "leave",
        }
    }
}

/// Host-supplied callback invoked once per hook dispatch.
///
/// Attached via [`crate::MachineBuilder::logger`] or
/// [`crate::Machine::attach_logger`]. The machine reports the state's
/// identity and registered name alongside the hook being invoked.
pub trait Logger {
    fn record(&mut self, state: StateId, state_name: &str, method: Method, method_name: &str);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn method_names_match_hooks() {
        assert_eq!(Method::Substitute.name(), "substitute");
        assert_eq!(Method::Enter.name(), "enter");
        assert_eq!(Method::Update.name(), "update");
        assert_eq!(Method::Transition.name(), "transition");
        assert_eq!(Method::React.name(), "react");
        assert_eq!(Method::Leave.name(), "leave");
    }
}
