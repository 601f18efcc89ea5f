//! Navigation bar context

use serde::Serialize;

use crate::services::SessionData;

/// Top-level sections of the admin tool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    Dashboard,
    Manufacturers,
    Models,
    Videos,
    VideoSeries,
    Devices,
    Users,
}

impl Section {
    const PUBLIC: [Section; 5] = [
        Section::Dashboard,
        Section::Manufacturers,
        Section::Models,
        Section::Videos,
        Section::VideoSeries,
    ];
    const ADMIN: [Section; 2] = [Section::Devices, Section::Users];

    pub fn title(self) -> &'static str {
        match self {
            Section::Dashboard => "Dashboard",
            Section::Manufacturers => "Manufacturers",
            Section::Models => "Models",
            Section::Videos => "Videos",
            Section::VideoSeries => "Video Series",
            Section::Devices => "Devices",
            Section::Users => "Users",
        }
    }

    pub fn href(self) -> &'static str {
        match self {
            Section::Dashboard => "/dashboard",
            Section::Manufacturers => "/manufacturers",
            Section::Models => "/models",
            Section::Videos => "/videos",
            Section::VideoSeries => "/videoSeries",
            Section::Devices => "/devices",
            Section::Users => "/users",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NavItem {
    pub title: &'static str,
    pub href: &'static str,
    pub active: bool,
}

/// Navigation shown on every signed-in page
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Navigation {
    pub items: Vec<NavItem>,
    pub username: Option<String>,
    pub is_admin: bool,
}

impl Navigation {
    pub fn new(active: Section, session: Option<&SessionData>) -> Self {
        Self::build(Some(active), session)
    }

    /// Navigation without an active section, for error pages
    pub fn for_session(session: Option<&SessionData>) -> Self {
        Self::build(None, session)
    }

    fn build(active: Option<Section>, session: Option<&SessionData>) -> Self {
        let Some(session) = session else {
            return Self {
                items: Vec::new(),
                username: None,
                is_admin: false,
            };
        };
        let admin_sections: &[Section] = if session.is_admin { &Section::ADMIN } else { &[] };
        let items = Section::PUBLIC
            .iter()
            .chain(admin_sections)
            .map(|section| NavItem {
                title: section.title(),
                href: section.href(),
                active: Some(*section) == active,
            })
            .collect();
        Self {
            items,
            username: Some(session.username.clone()),
            is_admin: session.is_admin,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(is_admin: bool) -> SessionData {
        SessionData {
            auth_token: "t".into(),
            is_admin,
            username: "Chris".into(),
        }
    }

    #[test]
    fn test_admin_sections_only_for_admins() {
        let editor = Navigation::new(Section::Models, Some(&session(false)));
        assert_eq!(editor.items.len(), 5);
        assert!(!editor.items.iter().any(|i| i.href == "/users"));

        let admin = Navigation::new(Section::Users, Some(&session(true)));
        assert_eq!(admin.items.len(), 7);
        assert!(admin.items.iter().any(|i| i.href == "/users" && i.active));
    }

    #[test]
    fn test_active_section() {
        let nav = Navigation::new(Section::VideoSeries, Some(&session(false)));
        let active: Vec<_> = nav.items.iter().filter(|i| i.active).map(|i| i.href).collect();
        assert_eq!(active, vec!["/videoSeries"]);
        assert_eq!(nav.username.as_deref(), Some("Chris"));
    }

    #[test]
    fn test_signed_out_has_no_items() {
        let nav = Navigation::for_session(None);
        assert!(nav.items.is_empty());
        assert!(!nav.is_admin);

        let nav = Navigation::for_session(Some(&session(true)));
        assert!(nav.items.iter().all(|i| !i.active));
    }
}
