//! The GUI dispatcher.
//!
//! `Gui` owns the window tree and everything global to it: keyboard focus,
//! the modal stack, hover and press tracking, and the browse-info state. The
//! host drives it with two calls:
//!
//! ```text
//! handle_input(GuiInput, now)  ->  hit-test -> WndEvent -> handle_event, bubbling up
//! frame(now, renderer)         ->  pre-render pass -> render pass -> browse-info overlay
//! ```
//!
//! Windows ask for focus or modal changes through `EventContext`; those
//! requests are applied once the current event has finished dispatching.

use std::time::Instant;

use tracing::{debug, trace, warn};

use crate::browse_info::{BrowseInfoMode, BrowseInfoState};
use crate::config::GuiConfig;
use crate::error::{GuiError, Result};
use crate::event::{
    EventContext, EventResult, GuiInput, GuiRequest, Modifiers, MouseButton, WndEvent,
};
use crate::flags::WndFlags;
use crate::frame_timing;
use crate::primitives::{Pt, X, Y};
use crate::render::Renderer;
use crate::wnd::{WndId, WndTree};

/// Upper bound on request rounds per input, in case focus handlers keep
/// requesting focus changes from each other.
const MAX_REQUEST_ROUNDS: usize = 16;

/// What a left-button press turns into when the pointer moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PressMode {
    /// Deliver `LDrag` only.
    Plain,
    /// Move the window with the pointer.
    Move,
    /// Grow or shrink the window from its lower-right corner.
    Resize,
}

#[derive(Debug, Clone, Copy)]
struct Press {
    wnd: WndId,
    start: Pt,
    last: Pt,
    mode: PressMode,
    dragging: bool,
}

pub struct Gui {
    tree: WndTree,
    config: GuiConfig,
    default_browse_modes: Vec<BrowseInfoMode>,
    focus: Option<WndId>,
    modal_stack: Vec<WndId>,
    cursor: Pt,
    mouse_over: Option<WndId>,
    browse: BrowseInfoState,
    left_press: Option<Press>,
    right_press: Option<WndId>,
    last_click: Option<(WndId, Instant)>,
    requests: Vec<GuiRequest>,
    frame: u64,
}

impl Default for Gui {
    fn default() -> Self {
        Self::new(GuiConfig::default())
    }
}

impl Gui {
    pub fn new(config: GuiConfig) -> Self {
        if config.frame_timing {
            frame_timing::enable();
        }
        Self {
            tree: WndTree::new(),
            default_browse_modes: config.default_browse_modes(),
            config,
            focus: None,
            modal_stack: Vec::new(),
            cursor: Pt::ORIGIN,
            mouse_over: None,
            browse: BrowseInfoState::new(),
            left_press: None,
            right_press: None,
            last_click: None,
            requests: Vec::new(),
            frame: 0,
        }
    }

    pub fn tree(&self) -> &WndTree {
        &self.tree
    }

    pub fn tree_mut(&mut self) -> &mut WndTree {
        &mut self.tree
    }

    pub fn config(&self) -> &GuiConfig {
        &self.config
    }

    pub fn focus(&self) -> Option<WndId> {
        self.focus
    }

    /// Windows running modally, bottom to top.
    pub fn modal_windows(&self) -> &[WndId] {
        &self.modal_stack
    }

    pub fn cursor(&self) -> Pt {
        self.cursor
    }

    /// The window the pointer is currently over.
    pub fn mouse_over(&self) -> Option<WndId> {
        self.mouse_over
    }

    pub fn browse_info(&self) -> &BrowseInfoState {
        &self.browse
    }

    /// Number of frames run so far.
    pub fn frame_count(&self) -> u64 {
        self.frame
    }

    pub fn set_default_browse_modes(&mut self, modes: Vec<BrowseInfoMode>) {
        self.default_browse_modes = modes;
    }

    // =========================================================================
    // Top-level windows
    // =========================================================================

    /// Register a top-level window. Windows flagged `MODAL` start running
    /// modally.
    pub fn register(&mut self, id: WndId) -> Result<()> {
        if self.tree.data(id)?.flags().contains(WndFlags::MODAL) {
            self.run_modal(id)
        } else {
            self.tree.register(id)
        }
    }

    pub fn unregister(&mut self, id: WndId) -> Result<()> {
        self.tree.unregister(id)?;
        self.modal_stack.retain(|m| *m != id);
        Ok(())
    }

    /// Destroy `id` and its subtree, dropping any dispatcher state that
    /// refers to them.
    pub fn destroy(&mut self, id: WndId) -> Result<usize> {
        let count = self.tree.destroy(id)?;
        self.forget_destroyed(false);
        Ok(count)
    }

    // =========================================================================
    // Focus and modality
    // =========================================================================

    /// Give keyboard focus to `id`, or clear it with `None`.
    ///
    /// The old focus window gets `LosingFocus`, the new one `GainingFocus`.
    pub fn set_focus(&mut self, id: Option<WndId>) -> Result<()> {
        if let Some(id) = id {
            self.tree.data(id)?;
            if !self.tree.accepts_focus(id) {
                return Err(GuiError::NotFocusable(id));
            }
        }
        if id == self.focus {
            return Ok(());
        }

        debug!(from = ?self.focus, to = ?id, "focus change");
        if let Some(old) = self.focus.take() {
            self.deliver(old, &WndEvent::LosingFocus);
        }
        self.focus = id;
        if let Some(new) = id {
            self.deliver(new, &WndEvent::GainingFocus);
        }
        Ok(())
    }

    /// Run `id` modally: it becomes the front-most top-level window and, until
    /// `end_modal`, only it and its subtree receive pointer input.
    pub fn run_modal(&mut self, id: WndId) -> Result<()> {
        let flags = self.tree.data(id)?.flags();
        self.tree.set_flags(id, flags | WndFlags::MODAL)?;
        self.tree.register(id)?;
        self.modal_stack.retain(|m| *m != id);
        self.modal_stack.push(id);
        self.left_press = None;
        self.right_press = None;
        debug!(?id, depth = self.modal_stack.len(), "modal started");

        if self.focus.is_some_and(|f| !self.tree.is_ancestor_or_self(id, f)) {
            self.set_focus(None)?;
        }
        self.update_hover(self.cursor, Instant::now(), Modifiers::NONE);
        Ok(())
    }

    /// Stop running `id` modally. The window stays registered.
    pub fn end_modal(&mut self, id: WndId) -> Result<()> {
        let index = self
            .modal_stack
            .iter()
            .position(|m| *m == id)
            .ok_or(GuiError::NotModal(id))?;
        self.modal_stack.remove(index);
        if let Ok(data) = self.tree.data(id) {
            let flags = data.flags() - WndFlags::MODAL;
            self.tree.set_flags(id, flags)?;
        }
        debug!(?id, depth = self.modal_stack.len(), "modal ended");
        Ok(())
    }

    // =========================================================================
    // Input
    // =========================================================================

    /// Front-most interactive window under `pt`, restricted to the top modal
    /// window's subtree while one is running.
    pub fn hit_test(&self, pt: Pt) -> Option<WndId> {
        match self.modal_stack.last() {
            Some(modal) => self.tree.wnd_at_within(*modal, pt),
            None => self.tree.wnd_at(pt),
        }
    }

    pub fn handle_input(&mut self, input: GuiInput, now: Instant) {
        self.forget_destroyed(true);
        trace!(?input, "input");
        match input {
            GuiInput::MouseMoved { pt, mods } => self.mouse_moved(pt, mods, now),
            GuiInput::ButtonPressed { button, pt, mods } => {
                self.cursor = pt;
                self.browse.reset(self.mouse_over, now);
                match button {
                    MouseButton::Left => self.left_down(pt, mods),
                    MouseButton::Right => {
                        self.right_press = self.hit_test(pt);
                        if let Some(target) = self.right_press {
                            self.dispatch(target, WndEvent::RButtonDown { pt, mods });
                        }
                    }
                    other => trace!(?other, "unhandled button"),
                }
            }
            GuiInput::ButtonReleased { button, pt, mods } => {
                self.cursor = pt;
                match button {
                    MouseButton::Left => self.left_up(pt, mods, now),
                    MouseButton::Right => {
                        if let Some(pressed) = self.right_press.take() {
                            self.dispatch(pressed, WndEvent::RButtonUp { pt, mods });
                            if self.hit_test(pt) == Some(pressed) {
                                self.dispatch(pressed, WndEvent::RClick { pt, mods });
                            }
                        }
                    }
                    other => trace!(?other, "unhandled button"),
                }
                self.update_hover(pt, now, mods);
            }
            GuiInput::Wheel { pt, delta, mods } => {
                if let Some(target) = self.hit_test(pt) {
                    self.dispatch(target, WndEvent::MouseWheel { pt, delta, mods });
                }
            }
            GuiInput::KeyPressed { key, mods, text } => {
                self.keyboard(WndEvent::KeyPress { key, mods, text });
            }
            GuiInput::KeyReleased { key, mods } => {
                self.keyboard(WndEvent::KeyRelease { key, mods });
            }
            GuiInput::Text(text) => self.keyboard(WndEvent::TextInput(text)),
        }
        self.apply_requests();
    }

    fn mouse_moved(&mut self, pt: Pt, mods: Modifiers, now: Instant) {
        self.cursor = pt;
        let Some(mut press) = self.left_press else {
            self.update_hover(pt, now, mods);
            return;
        };

        if !press.dragging {
            let travel = pt - press.start;
            let threshold = self.config.drag_threshold;
            if travel.x.abs() <= X(threshold) && travel.y.abs() <= Y(threshold) {
                return;
            }
            press.dragging = true;
            trace!(wnd = ?press.wnd, mode = ?press.mode, "drag started");
        }

        let delta = pt - press.last;
        press.last = pt;
        self.left_press = Some(press);

        let moved = match press.mode {
            PressMode::Plain => Ok(()),
            PressMode::Move => self.tree.offset_move(press.wnd, delta),
            PressMode::Resize => self.tree.relative_rect(press.wnd).and_then(|rect| {
                self.tree.size_move(press.wnd, rect.ul, rect.lr + delta)
            }),
        };
        if let Err(e) = moved {
            warn!(wnd = ?press.wnd, error = %e, "drag target vanished");
            self.left_press = None;
            return;
        }
        self.deliver(press.wnd, &WndEvent::LDrag { pt, delta, mods });
    }

    fn left_down(&mut self, pt: Pt, mods: Modifiers) {
        let Some(target) = self.hit_test(pt) else {
            self.left_press = None;
            return;
        };
        if let Some(root) = self.tree.root_of(target) {
            if self.modal_stack.last() != Some(&root) {
                if let Err(e) = self.tree.move_to_front(root) {
                    warn!(wnd = ?root, error = %e, "could not raise pressed window");
                }
            }
        }

        let mode = self.press_mode(target, pt);
        self.left_press = Some(Press {
            wnd: target,
            start: pt,
            last: pt,
            mode,
            dragging: false,
        });
        self.dispatch(target, WndEvent::LButtonDown { pt, mods });
    }

    fn press_mode(&self, id: WndId, pt: Pt) -> PressMode {
        let Some(data) = self.tree.get(id) else {
            return PressMode::Plain;
        };
        if !data.is_enabled() {
            return PressMode::Plain;
        }
        let flags = data.flags();
        if flags.contains(WndFlags::RESIZABLE) {
            if let Ok(rect) = self.tree.screen_rect(id) {
                let handle = self.config.resize_handle;
                if pt.x >= rect.right() - X(handle) && pt.y >= rect.bottom() - Y(handle) {
                    return PressMode::Resize;
                }
            }
        }
        if flags.contains(WndFlags::DRAGABLE) {
            PressMode::Move
        } else {
            PressMode::Plain
        }
    }

    fn left_up(&mut self, pt: Pt, mods: Modifiers, now: Instant) {
        let Some(press) = self.left_press.take() else {
            return;
        };
        if !self.tree.contains(press.wnd) {
            return;
        }

        // The pressed window gets the release wherever the pointer is now.
        self.dispatch(press.wnd, WndEvent::LButtonUp { pt, mods });

        if press.dragging || self.hit_test(pt) != Some(press.wnd) {
            return;
        }
        let interval = self.config.double_click_interval();
        let double = self.last_click.is_some_and(|(wnd, at)| {
            wnd == press.wnd && now.saturating_duration_since(at) <= interval
        });
        if double {
            self.last_click = None;
            self.dispatch(press.wnd, WndEvent::LDoubleClick { pt, mods });
        } else {
            self.last_click = Some((press.wnd, now));
            self.dispatch(press.wnd, WndEvent::LClick { pt, mods });
        }
    }

    /// Track which window the pointer is over, sending enter/here/leave.
    fn update_hover(&mut self, pt: Pt, now: Instant, mods: Modifiers) {
        if self.left_press.is_some() {
            return;
        }
        let over = self.hit_test(pt);
        if over == self.mouse_over {
            if let Some(id) = over {
                self.deliver(id, &WndEvent::MouseHere { pt, mods });
            }
            return;
        }

        if let Some(old) = self.mouse_over.take() {
            self.deliver(old, &WndEvent::MouseLeave);
        }
        self.mouse_over = over;
        self.browse.reset(over, now);
        if let Some(new) = over {
            self.deliver(new, &WndEvent::MouseEnter { pt, mods });
        }
    }

    /// Keyboard input goes to the focus window, or to the top modal window
    /// when nothing inside it has focus.
    fn keyboard(&mut self, event: WndEvent) {
        let modal = self.modal_stack.last().copied();
        let target = match (self.focus, modal) {
            (Some(focus), Some(modal)) if !self.tree.is_ancestor_or_self(modal, focus) => {
                Some(modal)
            }
            (Some(focus), _) => Some(focus),
            (None, modal) => modal,
        };
        match target {
            Some(target) => {
                self.dispatch(target, event);
            }
            None => trace!(?event, "keyboard input with no target"),
        }
    }

    // =========================================================================
    // Delivery
    // =========================================================================

    /// Deliver `event` to `target`, then to its ancestors while it goes
    /// unhandled and bubbles. Disabled windows are passed over. Bubbling
    /// stops at the top modal window.
    pub fn dispatch(&mut self, target: WndId, event: WndEvent) -> EventResult {
        let modal = self.modal_stack.last().copied();
        let mut current = Some(target);
        while let Some(id) = current {
            let Some(data) = self.tree.get(id) else {
                warn!(?id, ?event, "event for destroyed window dropped");
                return EventResult::Ignored;
            };
            let parent = data.parent();
            if data.is_enabled() {
                trace!(?id, origin = ?target, ?event, "deliver");
                let requests = &mut self.requests;
                let result = self.tree.with_behavior(id, |behavior, tree| {
                    let mut cx = EventContext::new(tree, id, target, requests);
                    behavior.handle_event(&mut cx, &event)
                });
                if result.is_some_and(|r| r.is_handled()) {
                    return EventResult::Captured;
                }
            }
            if !event.bubbles() || Some(id) == modal {
                break;
            }
            current = parent;
        }
        EventResult::Ignored
    }

    /// Deliver to `id` only, if it still exists and is enabled.
    fn deliver(&mut self, id: WndId, event: &WndEvent) {
        if !self.tree.get(id).is_some_and(|d| d.is_enabled()) {
            return;
        }
        let requests = &mut self.requests;
        self.tree.with_behavior(id, |behavior, tree| {
            let mut cx = EventContext::new(tree, id, id, requests);
            behavior.handle_event(&mut cx, event)
        });
    }

    fn apply_requests(&mut self) {
        for _ in 0..MAX_REQUEST_ROUNDS {
            if self.requests.is_empty() {
                return;
            }
            for request in std::mem::take(&mut self.requests) {
                let applied = match request {
                    GuiRequest::SetFocus(id) => self.set_focus(Some(id)),
                    GuiRequest::ClearFocus => self.set_focus(None),
                    GuiRequest::EndModal(id) => self.end_modal(id),
                };
                if let Err(e) = applied {
                    warn!(?request, error = %e, "request rejected");
                }
            }
        }
        if !self.requests.is_empty() {
            warn!(pending = self.requests.len(), "dropping requests after too many rounds");
            self.requests.clear();
        }
    }

    /// Drop dispatcher references to windows no longer in the tree.
    fn forget_destroyed(&mut self, report: bool) {
        let tree = &self.tree;
        let mut stale = Vec::new();
        if let Some(id) = self.focus.filter(|id| !tree.contains(*id)) {
            stale.push(id);
            self.focus = None;
        }
        if let Some(id) = self.mouse_over.filter(|id| !tree.contains(*id)) {
            stale.push(id);
            self.mouse_over = None;
        }
        if let Some(press) = self.left_press.filter(|p| !tree.contains(p.wnd)) {
            stale.push(press.wnd);
            self.left_press = None;
        }
        if let Some(id) = self.right_press.filter(|id| !tree.contains(*id)) {
            stale.push(id);
            self.right_press = None;
        }
        if self.last_click.is_some_and(|(id, _)| !tree.contains(id)) {
            self.last_click = None;
        }
        self.modal_stack.retain(|id| {
            let alive = tree.contains(*id);
            if !alive {
                stale.push(*id);
            }
            alive
        });
        if report && !stale.is_empty() {
            warn!(?stale, "destroyed windows still referenced by the dispatcher");
        }
    }

    // =========================================================================
    // Frame
    // =========================================================================

    /// Run one frame: pre-render dirty windows, render everything back to
    /// front, then draw the browse-info overlay on top.
    pub fn frame(&mut self, now: Instant, renderer: &mut dyn Renderer) {
        self.frame += 1;
        let frame = self.frame;
        self.forget_destroyed(true);

        let tree = &mut self.tree;
        let pre_rendered = frame_timing::measure("pre_render", frame, || tree.pre_render_pass());
        frame_timing::stat("pre_rendered", frame, pre_rendered);

        frame_timing::measure("render", frame, || self.tree.render(renderer));

        frame_timing::measure("browse_info", frame, || {
            self.browse.update(
                &self.tree,
                now,
                self.cursor,
                self.config.browse_info_offset,
                &self.default_browse_modes,
            );
            self.browse.render(renderer);
        });
        debug!(frame, pre_rendered, "frame done");
    }
}
