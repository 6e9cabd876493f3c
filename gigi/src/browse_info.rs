//! Browse info (tooltip) protocol.
//!
//! When the pointer rests over a window, the GUI waits for each browse-info
//! mode's dwell time and asks that mode's `BrowseInfoWnd` whether it has
//! something to show for the hovered window. The longest-dwell mode that has
//! elapsed and answers yes is rendered as an overlay near the cursor.
//!
//! Windows without their own modes use the GUI defaults, a single text-box
//! mode showing the window's browse text.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use std::time::{Duration, Instant};

use crate::primitives::{Clr, Pt, Rect, X, Y};
use crate::render::Renderer;
use crate::wnd::{WndData, WndId, WndTree};

/// Approximate glyph metrics used to size text boxes.
pub const CHAR_WIDTH: i32 = 8;
pub const LINE_HEIGHT: i32 = 18;

/// Something that can render hover content for windows.
pub trait BrowseInfoWnd {
    /// Whether there is anything to show for `target` in `mode`.
    fn wnd_has_browse_info(&self, target: &WndData, mode: usize) -> bool;

    /// Refresh content for `target`. Called when this window becomes the
    /// active overlay.
    fn update(&mut self, _target: &WndData, _mode: usize) {}

    /// Draw the overlay with its upper-left corner at `ul`.
    fn render(&self, renderer: &mut dyn Renderer, ul: Pt);
}

/// A browse-info window shared between any number of windows and modes.
pub type SharedBrowseInfoWnd = Rc<RefCell<dyn BrowseInfoWnd>>;

/// One browse-info mode: a dwell time and the window that renders it.
#[derive(Clone)]
pub struct BrowseInfoMode {
    pub time: Duration,
    pub wnd: Option<SharedBrowseInfoWnd>,
}

impl BrowseInfoMode {
    pub fn new(time: Duration, wnd: SharedBrowseInfoWnd) -> Self {
        Self {
            time,
            wnd: Some(wnd),
        }
    }
}

impl fmt::Debug for BrowseInfoMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BrowseInfoMode")
            .field("time", &self.time)
            .field("wnd", &self.wnd.is_some())
            .finish()
    }
}

/// Default browse-info window: a bordered box with the target's browse text.
#[derive(Debug, Clone)]
pub struct TextBoxBrowseInfoWnd {
    text: String,
    pub text_color: Clr,
    pub background: Clr,
    pub border: Clr,
    pub padding: i32,
}

impl Default for TextBoxBrowseInfoWnd {
    fn default() -> Self {
        Self {
            text: String::new(),
            text_color: Clr::BLACK,
            background: Clr::rgb(255, 255, 224),
            border: Clr::GRAY,
            padding: 2,
        }
    }
}

impl TextBoxBrowseInfoWnd {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared() -> SharedBrowseInfoWnd {
        Rc::new(RefCell::new(Self::new()))
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Box size for the current text.
    pub fn extent(&self) -> Pt {
        let lines = self.text.lines().count().max(1) as i32;
        let widest = self
            .text
            .lines()
            .map(|l| l.chars().count())
            .max()
            .unwrap_or(0) as i32;
        Pt::new(
            X(widest * CHAR_WIDTH + 2 * self.padding),
            Y(lines * LINE_HEIGHT + 2 * self.padding),
        )
    }
}

impl BrowseInfoWnd for TextBoxBrowseInfoWnd {
    fn wnd_has_browse_info(&self, target: &WndData, _mode: usize) -> bool {
        !target.browse_text().is_empty()
    }

    fn update(&mut self, target: &WndData, _mode: usize) {
        self.text = target.browse_text().to_string();
    }

    fn render(&self, renderer: &mut dyn Renderer, ul: Pt) {
        let rect = Rect::from_origin_size(ul, self.extent());
        renderer.fill_rect(rect, self.background);
        renderer.stroke_rect(rect, self.border);
        let mut origin = ul + Pt::xy(self.padding, self.padding);
        for line in self.text.lines() {
            renderer.text(origin, line, self.text_color);
            origin.y += Y(LINE_HEIGHT);
        }
    }
}

/// The overlay currently shown.
#[derive(Clone)]
pub struct ActiveBrowseInfo {
    pub target: WndId,
    pub mode: usize,
    pub ul: Pt,
    wnd: SharedBrowseInfoWnd,
}

impl fmt::Debug for ActiveBrowseInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActiveBrowseInfo")
            .field("target", &self.target)
            .field("mode", &self.mode)
            .field("ul", &self.ul)
            .finish()
    }
}

/// Hover tracking that drives browse-info display.
#[derive(Debug, Default)]
pub struct BrowseInfoState {
    hovered: Option<(WndId, Instant)>,
    active: Option<ActiveBrowseInfo>,
}

impl BrowseInfoState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn hovered(&self) -> Option<WndId> {
        self.hovered.map(|(id, _)| id)
    }

    pub fn active(&self) -> Option<&ActiveBrowseInfo> {
        self.active.as_ref()
    }

    /// Restart the dwell timer, e.g. when the pointer enters another window
    /// or a button is pressed.
    pub fn reset(&mut self, hovered: Option<WndId>, now: Instant) {
        self.hovered = hovered.map(|id| (id, now));
        self.active = None;
    }

    /// Re-evaluate which overlay, if any, should be shown at time `now`.
    pub fn update(
        &mut self,
        tree: &WndTree,
        now: Instant,
        cursor: Pt,
        offset: Pt,
        defaults: &[BrowseInfoMode],
    ) {
        let Some((id, since)) = self.hovered else {
            self.active = None;
            return;
        };
        let Some(data) = tree.get(id) else {
            self.hovered = None;
            self.active = None;
            return;
        };

        let elapsed = now.saturating_duration_since(since);
        let modes = data.browse_modes().unwrap_or(defaults);

        let mut order: Vec<usize> = (0..modes.len()).collect();
        order.sort_by(|a, b| modes[*b].time.cmp(&modes[*a].time));

        let chosen = order.into_iter().find_map(|index| {
            let mode = &modes[index];
            if elapsed < mode.time {
                return None;
            }
            let wnd = mode.wnd.as_ref()?;
            wnd.borrow()
                .wnd_has_browse_info(data, index)
                .then(|| (index, wnd.clone()))
        });

        let Some((mode, wnd)) = chosen else {
            self.active = None;
            return;
        };

        let unchanged = self
            .active
            .as_ref()
            .is_some_and(|a| a.target == id && a.mode == mode);
        if !unchanged {
            wnd.borrow_mut().update(data, mode);
            tracing::debug!(?id, mode, "browse info shown");
            self.active = Some(ActiveBrowseInfo {
                target: id,
                mode,
                ul: cursor + offset,
                wnd,
            });
        }
    }

    pub fn render(&self, renderer: &mut dyn Renderer) {
        if let Some(active) = &self.active {
            active.wnd.borrow().render(renderer, active.ul);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flags::WndFlags;
    use crate::render::RecordingRenderer;
    use crate::wnd::Wnd;

    struct Plain;
    impl Wnd for Plain {}

    /// Answers yes for one mode only.
    struct OnlyMode(usize);

    impl BrowseInfoWnd for OnlyMode {
        fn wnd_has_browse_info(&self, _target: &WndData, mode: usize) -> bool {
            mode == self.0
        }

        fn render(&self, renderer: &mut dyn Renderer, ul: Pt) {
            renderer.text(ul, "detail", Clr::WHITE);
        }
    }

    fn tree_with_tip(text: &str) -> (WndTree, WndId) {
        let mut tree = WndTree::new();
        let w = tree.create(Rect::ltrb(0, 0, 50, 50), WndFlags::INTERACTIVE, Plain);
        tree.register(w).unwrap();
        tree.set_browse_text(w, text).unwrap();
        (tree, w)
    }

    fn defaults() -> Vec<BrowseInfoMode> {
        vec![BrowseInfoMode::new(
            Duration::from_millis(500),
            TextBoxBrowseInfoWnd::shared(),
        )]
    }

    #[test]
    fn shows_after_dwell_time() {
        let (tree, w) = tree_with_tip("Close the window");
        let defaults = defaults();
        let t0 = Instant::now();
        let mut state = BrowseInfoState::new();
        state.reset(Some(w), t0);

        state.update(
            &tree,
            t0 + Duration::from_millis(100),
            Pt::xy(5, 5),
            Pt::xy(10, 10),
            &defaults,
        );
        assert!(state.active().is_none());

        state.update(
            &tree,
            t0 + Duration::from_millis(600),
            Pt::xy(5, 5),
            Pt::xy(10, 10),
            &defaults,
        );
        let active = state.active().unwrap();
        assert_eq!(active.target, w);
        assert_eq!(active.ul, Pt::xy(15, 15));

        let mut renderer = RecordingRenderer::new();
        state.render(&mut renderer);
        assert_eq!(renderer.texts(), vec!["Close the window"]);
    }

    #[test]
    fn windows_without_text_show_nothing() {
        let (tree, w) = tree_with_tip("");
        let defaults = defaults();
        let t0 = Instant::now();
        let mut state = BrowseInfoState::new();
        state.reset(Some(w), t0);
        state.update(&tree, t0 + Duration::from_secs(5), Pt::ORIGIN, Pt::ORIGIN, &defaults);
        assert!(state.active().is_none());
    }

    #[test]
    fn longer_mode_takes_over_when_it_elapses() {
        let (mut tree, w) = tree_with_tip("quick");
        let quick = BrowseInfoMode::new(Duration::from_millis(100), TextBoxBrowseInfoWnd::shared());
        let detailed: SharedBrowseInfoWnd = Rc::new(RefCell::new(OnlyMode(1)));
        let slow = BrowseInfoMode::new(Duration::from_millis(1000), detailed);
        tree.set_browse_modes(w, Some(vec![quick, slow])).unwrap();

        let t0 = Instant::now();
        let mut state = BrowseInfoState::new();
        state.reset(Some(w), t0);

        state.update(&tree, t0 + Duration::from_millis(200), Pt::ORIGIN, Pt::ORIGIN, &[]);
        assert_eq!(state.active().unwrap().mode, 0);

        state.update(&tree, t0 + Duration::from_millis(1200), Pt::ORIGIN, Pt::ORIGIN, &[]);
        assert_eq!(state.active().unwrap().mode, 1);
    }

    #[test]
    fn mode_declining_falls_back_to_shorter_mode() {
        let (mut tree, w) = tree_with_tip("quick");
        let quick = BrowseInfoMode::new(Duration::from_millis(100), TextBoxBrowseInfoWnd::shared());
        let declines: SharedBrowseInfoWnd = Rc::new(RefCell::new(OnlyMode(7)));
        let slow = BrowseInfoMode::new(Duration::from_millis(1000), declines);
        tree.set_browse_modes(w, Some(vec![quick, slow])).unwrap();

        let t0 = Instant::now();
        let mut state = BrowseInfoState::new();
        state.reset(Some(w), t0);
        state.update(&tree, t0 + Duration::from_millis(1500), Pt::ORIGIN, Pt::ORIGIN, &[]);
        assert_eq!(state.active().unwrap().mode, 0);
    }

    #[test]
    fn destroyed_target_clears_state() {
        let (mut tree, w) = tree_with_tip("gone soon");
        let defaults = defaults();
        let t0 = Instant::now();
        let mut state = BrowseInfoState::new();
        state.reset(Some(w), t0);
        tree.destroy(w).unwrap();
        state.update(&tree, t0 + Duration::from_secs(2), Pt::ORIGIN, Pt::ORIGIN, &defaults);
        assert!(state.active().is_none());
        assert!(state.hovered().is_none());
    }

    #[test]
    fn text_box_extent() {
        let mut text_box = TextBoxBrowseInfoWnd::new();
        text_box.text = "ab\nabcd".to_string();
        assert_eq!(text_box.extent(), Pt::xy(4 * CHAR_WIDTH + 4, 2 * LINE_HEIGHT + 4));
    }
}
