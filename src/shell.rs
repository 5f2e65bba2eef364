//! Route table and session gate for the console.

use crate::sections::SectionId;
use crate::session::SessionState;

pub const LOGIN_PATH: &str = "/login";
pub const ADMIN_PATH: &str = "/admin";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Login,
    Admin(Option<SectionId>),
    Unknown,
}

impl Route {
    pub fn parse(path: &str) -> Self {
        let path = match path.trim_end_matches('/') {
            "" => "/",
            trimmed => trimmed,
        };
        if path == LOGIN_PATH {
            return Route::Login;
        }
        if path == ADMIN_PATH {
            return Route::Admin(None);
        }
        path.strip_prefix(ADMIN_PATH)
            .and_then(|rest| rest.strip_prefix('/'))
            .and_then(|section| section.parse::<SectionId>().ok())
            .map_or(Route::Unknown, |section| Route::Admin(Some(section)))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Login,
    Admin(Option<SectionId>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    /// Session status not yet known.
    Loading,
    Render(View),
    Redirect(&'static str),
}

pub fn navigate(path: &str, session: &SessionState) -> Navigation {
    if session.loading {
        return Navigation::Loading;
    }
    let authenticated = session.user.is_some();
    match (Route::parse(path), authenticated) {
        (Route::Login, false) => Navigation::Render(View::Login),
        (Route::Login, true) => Navigation::Redirect(ADMIN_PATH),
        (Route::Admin(section), true) => Navigation::Render(View::Admin(section)),
        (Route::Admin(_), false) => Navigation::Redirect(LOGIN_PATH),
        (Route::Unknown, true) => Navigation::Redirect(ADMIN_PATH),
        (Route::Unknown, false) => Navigation::Redirect(LOGIN_PATH),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuItem {
    pub path: String,
    pub label: &'static str,
    pub section: Option<SectionId>,
}

/// Sidebar entries: the dashboard, then one per section.
pub fn menu() -> Vec<MenuItem> {
    std::iter::once(MenuItem {
        path: ADMIN_PATH.to_owned(),
        label: "Dashboard",
        section: None,
    })
    .chain(SectionId::ALL.into_iter().map(|section| MenuItem {
        path: format!("{ADMIN_PATH}/{section}"),
        label: section.label(),
        section: Some(section),
    }))
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::Identity;

    fn signed_in() -> SessionState {
        SessionState {
            loading: false,
            user: Some(Identity {
                uid: "u1".to_owned(),
                email: "ada@example.com".to_owned(),
                credentials: None,
            }),
        }
    }

    fn signed_out() -> SessionState {
        SessionState {
            loading: false,
            user: None,
        }
    }

    #[test]
    fn loading_shows_placeholder_everywhere() {
        let loading = SessionState {
            loading: true,
            user: None,
        };
        for path in ["/login", "/admin", "/nowhere"] {
            assert_eq!(navigate(path, &loading), Navigation::Loading);
        }
    }

    #[test]
    fn login_is_public_only() {
        assert_eq!(
            navigate("/login", &signed_out()),
            Navigation::Render(View::Login)
        );
        assert_eq!(
            navigate("/login", &signed_in()),
            Navigation::Redirect(ADMIN_PATH)
        );
    }

    #[test]
    fn admin_area_requires_session() {
        assert_eq!(
            navigate("/admin/projects", &signed_in()),
            Navigation::Render(View::Admin(Some(SectionId::Projects)))
        );
        assert_eq!(
            navigate("/admin/", &signed_in()),
            Navigation::Render(View::Admin(None))
        );
        assert_eq!(
            navigate("/admin/projects", &signed_out()),
            Navigation::Redirect(LOGIN_PATH)
        );
    }

    #[test]
    fn unknown_paths_redirect_by_session() {
        assert_eq!(navigate("/", &signed_in()), Navigation::Redirect(ADMIN_PATH));
        assert_eq!(
            navigate("/admin/footer", &signed_in()),
            Navigation::Redirect(ADMIN_PATH)
        );
        assert_eq!(
            navigate("/dashboard", &signed_out()),
            Navigation::Redirect(LOGIN_PATH)
        );
    }

    #[test]
    fn menu_lists_dashboard_then_sections() {
        let items = menu();
        assert_eq!(items.len(), SectionId::ALL.len() + 1);
        assert_eq!(items[0].path, "/admin");
        assert_eq!(items[7].path, "/admin/social");
        assert_eq!(items[7].label, "Social Links");
    }
}
