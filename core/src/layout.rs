//! Dashboard gating and sidebar state.
//!
//! The identity provider reports whether it has finished loading and who is
//! signed in. The dashboard shows a loading state until then, a sign-in
//! prompt when nobody is signed in, and otherwise the dashboard itself,
//! with the course route extracted when the path is a course page.

use serde::{Deserialize, Serialize};

use crate::route::CourseRoute;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Signals from the identity provider.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub is_loaded: bool,
    pub user: Option<User>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DashboardView {
    Loading,
    SignInRequired,
    Ready { course: Option<CourseRoute> },
}

impl DashboardView {
    pub fn resolve(session: &Session, path: &str) -> Self {
        if !session.is_loaded {
            return DashboardView::Loading;
        }
        if session.user.is_none() {
            return DashboardView::SignInRequired;
        }
        DashboardView::Ready {
            course: CourseRoute::parse(path),
        }
    }

    pub fn course_id(&self) -> Option<&str> {
        match self {
            DashboardView::Ready { course: Some(route) } => Some(&route.course_id),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sidebar {
    open: bool,
}

impl Default for Sidebar {
    fn default() -> Self {
        Self { open: true }
    }
}

impl Sidebar {
    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn toggle(&mut self) -> bool {
        self.open = !self.open;
        self.open
    }
}
