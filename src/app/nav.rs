//! Tab navigation: nav ids map to panels by the `<nav-id>-tab` convention and
//! exactly one panel is visible at a time.
//!

/// Suffix joining a navigation id to its panel id.
pub const PANEL_SUFFIX: &str = "-tab";

/// Top-level content panels.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Tab {
    /// Counters and preview tables.
    Dashboard,
    /// Directory user accounts.
    Users,
    /// Groups and their members.
    Groups,
    /// Computer objects.
    Computers,
}

impl Tab {
    /// Nav order.
    pub const ALL: [Tab; 4] = [Tab::Dashboard, Tab::Users, Tab::Groups, Tab::Computers];

    /// Identifier of the nav item that shows this panel.
    pub fn nav_id(self) -> &'static str {
        match self {
            Tab::Dashboard => "dashboard",
            Tab::Users => "users",
            Tab::Groups => "groups",
            Tab::Computers => "computers",
        }
    }

    /// Panel identifier: the nav id plus [`PANEL_SUFFIX`].
    pub fn panel_id(self) -> String {
        format!("{}{}", self.nav_id(), PANEL_SUFFIX)
    }

    /// Label shown in the header.
    pub fn title(self) -> &'static str {
        match self {
            Tab::Dashboard => "Dashboard",
            Tab::Users => "Users",
            Tab::Groups => "Groups",
            Tab::Computers => "Computers",
        }
    }
}

/// A sidebar entry. Entries without a registered panel are inert.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NavItem {
    pub nav_id: String,
    pub label: String,
}

/// Result of a successful activation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Activation {
    pub tab: Tab,
    /// False when the panel was already the visible one.
    pub changed: bool,
}

/// Nav items, their panels, and which panel is visible.
#[derive(Clone, Debug)]
pub struct Navigator {
    items: Vec<NavItem>,
    panels: Vec<(String, Tab)>,
    active: Tab,
}

impl Navigator {
    /// Build from explicit items and panels, showing `initial`.
    pub fn new(items: Vec<NavItem>, panels: Vec<(String, Tab)>, initial: Tab) -> Self {
        Self { items, panels, active: initial }
    }

    /// The four dashboard panels, dashboard first.
    pub fn standard() -> Self {
        let items = Tab::ALL
            .iter()
            .map(|t| NavItem { nav_id: t.nav_id().to_string(), label: t.title().to_string() })
            .collect();
        let panels = Tab::ALL.iter().map(|t| (t.panel_id(), *t)).collect();
        Self::new(items, panels, Tab::Dashboard)
    }

    /// Items in header order.
    pub fn items(&self) -> &[NavItem] {
        &self.items
    }

    /// The visible panel.
    pub fn active(&self) -> Tab {
        self.active
    }

    /// Whether `nav_id` names the visible panel's item.
    pub fn is_active_item(&self, nav_id: &str) -> bool {
        self.active.nav_id() == nav_id
    }

    /// Make the panel associated with `nav_id` the visible one. Unknown ids
    /// leave the current panel in place.
    pub fn activate(&mut self, nav_id: &str) -> Option<Activation> {
        let target = format!("{nav_id}{PANEL_SUFFIX}");
        let Some(tab) = self.panels.iter().find(|(id, _)| *id == target).map(|(_, t)| *t) else {
            tracing::warn!(nav_id, panel = %target, "tab content not found");
            return None;
        };
        tracing::debug!(panel = %target, "activating tab");
        let changed = tab != self.active;
        self.active = tab;
        Some(Activation { tab, changed })
    }

    /// Nav id of the item after (or before) the active one.
    pub fn neighbour(&self, forward: bool) -> Option<&str> {
        let pos = self.items.iter().position(|i| self.is_active_item(&i.nav_id))?;
        let len = self.items.len();
        let next = if forward { (pos + 1) % len } else { (pos + len - 1) % len };
        self.items.get(next).map(|i| i.nav_id.as_str())
    }
}

/// Sub-tabs of the dashboard's preview area.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum PreviewTab {
    #[default]
    Users,
    Groups,
    Computers,
}

impl PreviewTab {
    pub const ALL: [PreviewTab; 3] = [PreviewTab::Users, PreviewTab::Groups, PreviewTab::Computers];

    /// Label shown on the preview tab line.
    pub fn title(self) -> &'static str {
        match self {
            PreviewTab::Users => "Users",
            PreviewTab::Groups => "Groups",
            PreviewTab::Computers => "Computers",
        }
    }

    /// Following preview table, wrapping to the first.
    pub fn next(self) -> Self {
        match self {
            PreviewTab::Users => PreviewTab::Groups,
            PreviewTab::Groups => PreviewTab::Computers,
            PreviewTab::Computers => PreviewTab::Users,
        }
    }
}
