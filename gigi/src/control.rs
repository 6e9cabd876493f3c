//! Controls
//!
//! A control is a window that can take keyboard focus and that, by default,
//! passes input it doesn't use on to its parent. Concrete controls implement
//! `Wnd` directly, return `true` from `accepts_focus`, and route unhandled
//! input through `forward_to_parent()`.
//!
//! `Button` and `Label` are the stock controls.

use crate::event::{EventContext, EventResult, Key, NamedKey, WndEvent};
use crate::primitives::{Clr, Pt, Rect};
use crate::render::Renderer;
use crate::wnd::{Wnd, WndData};

/// Default control behavior for input: let the parent see it.
#[inline]
pub fn forward_to_parent() -> EventResult {
    EventResult::Ignored
}

/// Colors shared by the stock controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlStyle {
    pub background: Clr,
    pub pressed: Clr,
    pub border: Clr,
    pub focus_border: Clr,
    pub text: Clr,
    pub disabled_text: Clr,
}

impl Default for ControlStyle {
    fn default() -> Self {
        Self {
            background: Clr::rgb(220, 220, 220),
            pressed: Clr::rgb(180, 180, 180),
            border: Clr::GRAY,
            focus_border: Clr::rgb(40, 90, 200),
            text: Clr::BLACK,
            disabled_text: Clr::GRAY,
        }
    }
}

type ClickHandler = Box<dyn FnMut(&mut EventContext<'_>)>;

/// Push button. Clicks (mouse, or Enter/Space while focused) run the click
/// handler and are consumed.
pub struct Button {
    text: String,
    pub style: ControlStyle,
    pressed: bool,
    focused: bool,
    clicks: u32,
    on_click: Option<ClickHandler>,
}

impl Button {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            style: ControlStyle::default(),
            pressed: false,
            focused: false,
            clicks: 0,
            on_click: None,
        }
    }

    pub fn on_click(mut self, f: impl FnMut(&mut EventContext<'_>) + 'static) -> Self {
        self.on_click = Some(Box::new(f));
        self
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    pub fn clicks(&self) -> u32 {
        self.clicks
    }

    pub fn is_pressed(&self) -> bool {
        self.pressed
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    fn click(&mut self, cx: &mut EventContext<'_>) -> EventResult {
        self.clicks += 1;
        if let Some(handler) = self.on_click.as_mut() {
            handler(cx);
        }
        EventResult::Captured
    }
}

impl Wnd for Button {
    fn render(&self, renderer: &mut dyn Renderer, data: &WndData, rect: Rect) {
        let fill = if self.pressed {
            self.style.pressed
        } else {
            self.style.background
        };
        let border = if self.focused {
            self.style.focus_border
        } else {
            self.style.border
        };
        let text = if data.is_enabled() {
            self.style.text
        } else {
            self.style.disabled_text
        };
        renderer.fill_rect(rect, fill);
        renderer.stroke_rect(rect, border);
        renderer.text(rect.ul + Pt::xy(4, 2), &self.text, text);
    }

    fn handle_event(&mut self, cx: &mut EventContext<'_>, event: &WndEvent) -> EventResult {
        match event {
            WndEvent::LButtonDown { .. } => {
                self.pressed = true;
                cx.request_focus(cx.id());
                EventResult::Captured
            }
            WndEvent::LButtonUp { .. } => {
                self.pressed = false;
                EventResult::Captured
            }
            WndEvent::MouseLeave => {
                self.pressed = false;
                EventResult::Captured
            }
            WndEvent::LClick { .. } => self.click(cx),
            WndEvent::KeyPress { key, .. }
                if matches!(key, Key::Named(NamedKey::Enter | NamedKey::Space)) =>
            {
                self.click(cx)
            }
            WndEvent::GainingFocus => {
                self.focused = true;
                EventResult::Captured
            }
            WndEvent::LosingFocus => {
                self.focused = false;
                EventResult::Captured
            }
            _ => forward_to_parent(),
        }
    }

    fn accepts_focus(&self) -> bool {
        true
    }
}

/// Static text. Not focusable; ignores input.
#[derive(Debug, Clone)]
pub struct Label {
    text: String,
    pub color: Clr,
}

impl Label {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            color: Clr::BLACK,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }
}

impl Wnd for Label {
    fn render(&self, renderer: &mut dyn Renderer, _data: &WndData, rect: Rect) {
        renderer.text(rect.ul, &self.text, self.color);
    }
}
