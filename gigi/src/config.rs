//! GUI configuration.
//!
//! Loaded from JSON. Every field is optional in the file; missing fields take
//! their defaults.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::browse_info::{BrowseInfoMode, TextBoxBrowseInfoWnd};
use crate::error::Result;
use crate::primitives::Pt;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GuiConfig {
    /// Dwell time in milliseconds for each default browse-info mode.
    pub browse_modes: Vec<u64>,

    /// Offset of the browse-info overlay from the cursor.
    pub browse_info_offset: Pt,

    pub double_click_interval_ms: u64,

    /// Pointer travel, in pixels along either axis, before a press on a
    /// draggable window starts a drag.
    pub drag_threshold: i32,

    /// Size of the lower-right grab zone on resizable windows.
    pub resize_handle: i32,

    /// Log sampled frame phase timings.
    pub frame_timing: bool,
}

impl Default for GuiConfig {
    fn default() -> Self {
        Self {
            browse_modes: vec![1000],
            browse_info_offset: Pt::xy(12, 16),
            double_click_interval_ms: 500,
            drag_threshold: 2,
            resize_handle: 8,
            frame_timing: false,
        }
    }
}

impl GuiConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_json_str(&text)?;
        tracing::debug!(path = %path.display(), "loaded gui config");
        Ok(config)
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn double_click_interval(&self) -> Duration {
        Duration::from_millis(self.double_click_interval_ms)
    }

    /// Default browse-info modes, all rendered by one shared text box.
    pub fn default_browse_modes(&self) -> Vec<BrowseInfoMode> {
        let text_box = TextBoxBrowseInfoWnd::shared();
        self.browse_modes
            .iter()
            .map(|ms| BrowseInfoMode::new(Duration::from_millis(*ms), text_box.clone()))
            .collect()
    }
}
