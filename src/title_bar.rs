//! Title-bar collaborator interface
//!
//! The core never renders the title bar. It drives an implementation of
//! [`TitleBar`] with state (title, icon, active, maximized, theme) and
//! receives [`TitleBarCommand`]s back when the user clicks a caption button.

use serde::{Deserialize, Serialize};

use crate::config;

/// Caption button type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CaptionButtonKind {
    Minimize,
    Restore,
    Maximize,
    Close,
}

/// Application/system color theme
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn is_dark(&self) -> bool {
        matches!(self, Theme::Dark)
    }
}

impl std::str::FromStr for Theme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            _ => Err(format!("Invalid theme: {}", s)),
        }
    }
}

/// Visual state of one caption button
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptionButton {
    pub kind: CaptionButtonKind,
    pub active: bool,
    pub hover: bool,
    pub pressed: bool,
    pub dark_icon: bool,
}

impl CaptionButton {
    pub fn new(kind: CaptionButtonKind) -> Self {
        Self {
            kind,
            active: false,
            hover: false,
            pressed: false,
            dark_icon: false,
        }
    }

    /// Pointer entered or left the button
    pub fn set_hover(&mut self, hover: bool) {
        self.hover = hover;
        if !hover {
            self.pressed = false;
        }
    }

    /// Pointer pressed on the button
    pub fn press(&mut self) {
        if self.hover {
            self.pressed = true;
        }
    }

    /// Pointer released. Returns true when the release completes a click.
    pub fn release(&mut self) -> bool {
        let clicked = self.pressed && self.hover;
        self.pressed = false;
        clicked
    }

    /// Command this button issues when clicked
    pub fn command(&self) -> TitleBarCommand {
        match self.kind {
            CaptionButtonKind::Minimize => TitleBarCommand::Minimize,
            CaptionButtonKind::Restore | CaptionButtonKind::Maximize => {
                TitleBarCommand::ToggleMaximize
            }
            CaptionButtonKind::Close => TitleBarCommand::Close,
        }
    }
}

/// Caption button row as the title bar lays it out
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptionLayout {
    /// Buttons from the right edge inwards
    pub buttons: Vec<CaptionButtonKind>,
    /// Width of one button in logical pixels
    pub button_width: i32,
}

impl Default for CaptionLayout {
    fn default() -> Self {
        Self {
            buttons: vec![
                CaptionButtonKind::Close,
                CaptionButtonKind::Maximize,
                CaptionButtonKind::Minimize,
            ],
            button_width: config::title_bar::CAPTION_BUTTON_WIDTH,
        }
    }
}

impl CaptionLayout {
    pub fn new(buttons: Vec<CaptionButtonKind>, button_width: i32) -> Self {
        Self {
            buttons,
            button_width,
        }
    }

    /// Button in slot `slot` counted from the right edge. Maximize and
    /// Restore share a slot and follow the window state.
    pub fn button_at_slot(&self, slot: usize, is_maximized: bool) -> Option<CaptionButtonKind> {
        match self.buttons.get(slot)? {
            CaptionButtonKind::Maximize | CaptionButtonKind::Restore if is_maximized => {
                Some(CaptionButtonKind::Restore)
            }
            CaptionButtonKind::Maximize | CaptionButtonKind::Restore => {
                Some(CaptionButtonKind::Maximize)
            }
            other => Some(*other),
        }
    }
}

/// Requests the title bar sends back to the window controller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TitleBarCommand {
    Minimize,
    ToggleMaximize,
    Close,
}

/// Title bar owned by the application; the controller only drives it.
pub trait TitleBar {
    fn set_title(&mut self, title: &str);

    /// Icon as an opaque resource path or identifier
    fn set_icon(&mut self, icon: &str);

    fn set_active(&mut self, active: bool);

    /// Swaps the maximize glyph for restore
    fn set_maximized(&mut self, maximized: bool);

    fn set_theme(&mut self, theme: Theme);

    /// Button order and size used to map caption-strip points to buttons
    fn caption_layout(&self) -> CaptionLayout {
        CaptionLayout::default()
    }
}

/// Title bar that ignores every update (windows without visible chrome)
#[derive(Debug, Default)]
pub struct NullTitleBar;

impl TitleBar for NullTitleBar {
    fn set_title(&mut self, _title: &str) {}
    fn set_icon(&mut self, _icon: &str) {}
    fn set_active(&mut self, _active: bool) {}
    fn set_maximized(&mut self, _maximized: bool) {}
    fn set_theme(&mut self, _theme: Theme) {}
}
