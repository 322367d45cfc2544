//! What the screen shows for a given request state.

use crate::request::RequestState;

/// The main area. Exactly one is shown at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Body<'a> {
    Diagram(&'a str),
    Loading,
    Empty,
}

/// State of the submit call-to-action under the input box.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitControl {
    Ready,
    /// Input is blank.
    Disabled,
    /// Replaced by the loading indicator.
    Loading,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewModel<'a> {
    pub banner: Option<&'a str>,
    pub body: Body<'a>,
    pub submit: SubmitControl,
}

/// Derive the view. First match wins: failed, succeeded, pending, idle.
pub fn compose<'a>(state: &'a RequestState, input: &str) -> ViewModel<'a> {
    let (banner, body) = match state {
        RequestState::Failed(message) => (Some(message.as_str()), Body::Empty),
        RequestState::Succeeded(markup) => (None, Body::Diagram(markup.as_str())),
        RequestState::Pending => (None, Body::Loading),
        RequestState::Idle => (None, Body::Empty),
    };

    let submit = if matches!(state, RequestState::Pending) {
        SubmitControl::Loading
    } else if input.trim().is_empty() {
        SubmitControl::Disabled
    } else {
        SubmitControl::Ready
    };

    ViewModel {
        banner,
        body,
        submit,
    }
}
