//! Sidebar and theme state.
//!
//! The store is a plain value owned by whoever renders the layout; components
//! receive it by reference and change it only through [`SidebarAction`].

use serde::{Deserialize, Serialize};

use crate::DESKTOP_BREAKPOINT;

/// Sidebar visibility for both layouts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SidebarState {
    /// Mobile drawer is open
    pub mobile_open: bool,
    /// Desktop rail is collapsed to icons
    pub desktop_collapsed: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SidebarAction {
    /// Menu button pressed at the given viewport width (px)
    Toggle { viewport_width: u32 },
    SetMobileOpen(bool),
    SetCollapsed(bool),
}

impl SidebarState {
    pub fn apply(&mut self, action: SidebarAction) {
        match action {
            SidebarAction::Toggle { viewport_width } => {
                if viewport_width >= DESKTOP_BREAKPOINT {
                    self.desktop_collapsed = false;
                } else {
                    self.mobile_open = !self.mobile_open;
                }
            }
            SidebarAction::SetMobileOpen(open) => self.mobile_open = open,
            SidebarAction::SetCollapsed(collapsed) => self.desktop_collapsed = collapsed,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
    #[default]
    System,
}

impl Theme {
    /// Explicit toggle; `System` resolves against the host preference first
    pub fn toggle(self, system_prefers_dark: bool) -> Theme {
        let dark = match self {
            Theme::Light => false,
            Theme::Dark => true,
            Theme::System => system_prefers_dark,
        };
        if dark {
            Theme::Light
        } else {
            Theme::Dark
        }
    }
}
