//! Input and window event types.
//!
//! The host feeds raw `GuiInput` into `Gui::handle_input`. The dispatcher turns
//! it into `WndEvent`s (clicks, drags, enter/leave, focus changes) and delivers
//! them to windows through `Wnd::handle_event` with an `EventContext`.

use crate::primitives::Pt;
use crate::wnd::{WndId, WndTree};

/// Mouse button types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
    Other(u16),
}

/// Keyboard modifier keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Self = Self {
        shift: false,
        ctrl: false,
        alt: false,
        meta: false,
    };

    pub const SHIFT: Self = Self {
        shift: true,
        ..Self::NONE
    };

    pub const CTRL: Self = Self {
        ctrl: true,
        ..Self::NONE
    };

    pub const ALT: Self = Self {
        alt: true,
        ..Self::NONE
    };

    pub fn any(&self) -> bool {
        self.shift || self.ctrl || self.alt || self.meta
    }
}

/// Named keys (non-character keys).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NamedKey {
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    Home,
    End,
    PageUp,
    PageDown,
    Backspace,
    Delete,
    Insert,
    Enter,
    Tab,
    Escape,
    Space,
    F1,
    F2,
    F3,
    F4,
    F5,
    F6,
    F7,
    F8,
    F9,
    F10,
    F11,
    F12,
    Unknown,
}

/// A keyboard key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Key {
    Named(NamedKey),
    Character(String),
}

impl Key {
    pub fn named(key: NamedKey) -> Self {
        Self::Named(key)
    }

    pub fn character(c: impl Into<String>) -> Self {
        Self::Character(c.into())
    }
}

/// Raw input from the host platform.
#[derive(Debug, Clone)]
pub enum GuiInput {
    MouseMoved {
        pt: Pt,
        mods: Modifiers,
    },
    ButtonPressed {
        button: MouseButton,
        pt: Pt,
        mods: Modifiers,
    },
    ButtonReleased {
        button: MouseButton,
        pt: Pt,
        mods: Modifiers,
    },
    /// Wheel motion in notches; positive is away from the user.
    Wheel {
        pt: Pt,
        delta: i32,
        mods: Modifiers,
    },
    KeyPressed {
        key: Key,
        mods: Modifiers,
        text: Option<String>,
    },
    KeyReleased {
        key: Key,
        mods: Modifiers,
    },
    Text(String),
}

/// An event delivered to a single window.
#[derive(Debug, Clone, PartialEq)]
pub enum WndEvent {
    LButtonDown { pt: Pt, mods: Modifiers },
    LDrag { pt: Pt, delta: Pt, mods: Modifiers },
    LButtonUp { pt: Pt, mods: Modifiers },
    LClick { pt: Pt, mods: Modifiers },
    LDoubleClick { pt: Pt, mods: Modifiers },
    RButtonDown { pt: Pt, mods: Modifiers },
    RButtonUp { pt: Pt, mods: Modifiers },
    RClick { pt: Pt, mods: Modifiers },
    MouseEnter { pt: Pt, mods: Modifiers },
    MouseHere { pt: Pt, mods: Modifiers },
    MouseLeave,
    MouseWheel { pt: Pt, delta: i32, mods: Modifiers },
    KeyPress { key: Key, mods: Modifiers, text: Option<String> },
    KeyRelease { key: Key, mods: Modifiers },
    TextInput(String),
    GainingFocus,
    LosingFocus,
}

impl WndEvent {
    /// Whether an ignored event is forwarded to the parent window.
    ///
    /// Hover, drag and focus notifications concern only the window they were
    /// sent to.
    pub fn bubbles(&self) -> bool {
        !matches!(
            self,
            WndEvent::MouseEnter { .. }
                | WndEvent::MouseHere { .. }
                | WndEvent::MouseLeave
                | WndEvent::LDrag { .. }
                | WndEvent::GainingFocus
                | WndEvent::LosingFocus
        )
    }
}

/// Result of handling an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventResult {
    /// Event was ignored, propagate to parent.
    Ignored,

    /// Event was captured, don't propagate.
    Captured,
}

impl EventResult {
    pub fn is_handled(&self) -> bool {
        matches!(self, EventResult::Captured)
    }
}

/// A change to global dispatcher state requested from inside a handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuiRequest {
    SetFocus(WndId),
    ClearFocus,
    EndModal(WndId),
}

/// Context passed to `Wnd::handle_event`.
///
/// Gives the handler mutable access to the window tree and a way to ask the
/// dispatcher for focus or modal changes, applied after the event completes.
pub struct EventContext<'a> {
    /// The window tree. The handling window's own behavior is checked out
    /// while the handler runs.
    pub tree: &'a mut WndTree,

    id: WndId,
    origin: WndId,
    requests: &'a mut Vec<GuiRequest>,
}

impl<'a> EventContext<'a> {
    pub(crate) fn new(
        tree: &'a mut WndTree,
        id: WndId,
        origin: WndId,
        requests: &'a mut Vec<GuiRequest>,
    ) -> Self {
        Self {
            tree,
            id,
            origin,
            requests,
        }
    }

    /// The window currently handling the event.
    pub fn id(&self) -> WndId {
        self.id
    }

    /// The window the event was originally delivered to, before bubbling.
    pub fn origin(&self) -> WndId {
        self.origin
    }

    /// True while the event is being handled by an ancestor of its origin.
    pub fn is_bubbled(&self) -> bool {
        self.id != self.origin
    }

    pub fn request_focus(&mut self, id: WndId) {
        self.requests.push(GuiRequest::SetFocus(id));
    }

    pub fn clear_focus(&mut self) {
        self.requests.push(GuiRequest::ClearFocus);
    }

    pub fn end_modal(&mut self, id: WndId) {
        self.requests.push(GuiRequest::EndModal(id));
    }
}
