//! Screen selection and role-filtered navigation

use crate::{
    error::{AppError, AppResult},
    models::{user::can, Capability, Session},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum View {
    /// Welcome screen
    Dashboard,
    Equipment,
    Inventory,
    Maintenance,
    /// User administration, admin only
    Users,
}

impl View {
    /// Navigation order
    pub const ALL: [View; 5] = [
        View::Dashboard,
        View::Equipment,
        View::Inventory,
        View::Maintenance,
        View::Users,
    ];

    /// View shown right after sign-in
    pub const INITIAL: View = View::Equipment;

    pub fn label(&self) -> &'static str {
        match self {
            View::Dashboard => "Dashboard",
            View::Equipment => "Equipment",
            View::Inventory => "Inventory",
            View::Maintenance => "Maintenance reports",
            View::Users => "User management",
        }
    }

    /// Capability a session needs to open this view
    pub fn capability(&self) -> Capability {
        match self {
            View::Users => Capability::ManageUsers,
            _ => Capability::ViewEquipment,
        }
    }

    pub fn admin_only(&self) -> bool {
        self.capability().admin_only()
    }

    pub fn is_accessible(&self, session: Option<&Session>) -> bool {
        can(session, self.capability())
    }
}

impl std::fmt::Display for View {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavEntry {
    pub view: View,
    pub label: &'static str,
    pub admin_only: bool,
    pub active: bool,
}

/// Holds the active view. Switching is synchronous and never cancels
/// requests started by the previous view.
#[derive(Debug, Clone)]
pub struct ViewRouter {
    active: View,
}

impl Default for ViewRouter {
    fn default() -> Self {
        Self::new()
    }
}

impl ViewRouter {
    pub fn new() -> Self {
        Self {
            active: View::INITIAL,
        }
    }

    pub fn active(&self) -> View {
        self.active
    }

    /// Navigation entries visible to `session`
    pub fn nav_entries(&self, session: Option<&Session>) -> Vec<NavEntry> {
        View::ALL
            .into_iter()
            .filter(|view| view.is_accessible(session))
            .map(|view| NavEntry {
                view,
                label: view.label(),
                admin_only: view.admin_only(),
                active: view == self.active,
            })
            .collect()
    }

    /// Switch to `view`, returning the view that was active before
    pub fn navigate(&mut self, view: View, session: Option<&Session>) -> AppResult<View> {
        if !view.is_accessible(session) {
            tracing::warn!("Blocked navigation to admin-only view {}", view);
            return Err(AppError::Authorization(format!(
                "{} is only available to administrators.",
                view.label()
            )));
        }

        let previous = std::mem::replace(&mut self.active, view);
        if previous != view {
            tracing::debug!("View {} -> {}", previous, view);
        }
        Ok(previous)
    }

    /// Leave a view the current role may no longer see; returns whether it moved
    pub fn reconcile(&mut self, session: Option<&Session>) -> bool {
        if self.active.is_accessible(session) {
            return false;
        }
        tracing::debug!("Leaving {} after role change", self.active);
        self.active = View::INITIAL;
        true
    }

    pub fn reset(&mut self) {
        self.active = View::INITIAL;
    }
}
