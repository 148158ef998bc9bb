//! # Navigation Commands
//!
//! Page visibility is derived from the signed-in user on every call. The
//! stored page is only a hint: if the user may no longer see it the shell
//! lands on the dashboard.

use idcashier_core::permissions::{can_view_page, visible_pages};
use idcashier_core::Page;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info};

use crate::error::{ApiError, ApiResult};
use crate::i18n::Language;
use crate::state::{Preferences, SessionState, Theme};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NavigationState {
    pub page: Page,
    pub params: Value,
    pub pages: Vec<Page>,
}

pub fn get_navigation(
    session: &SessionState,
    prefs: &Preferences,
    developer_emails: &[String],
) -> ApiResult<NavigationState> {
    let user = session.user();
    let pages = visible_pages(user.as_ref(), developer_emails);
    let stored = prefs.current_page()?;

    if pages.contains(&stored) {
        Ok(NavigationState {
            page: stored,
            params: prefs.nav_params()?,
            pages,
        })
    } else {
        debug!(page = stored.as_str(), "Stored page not visible, using dashboard");
        Ok(NavigationState {
            page: Page::Dashboard,
            params: Value::Object(Default::default()),
            pages,
        })
    }
}

/// Moves to `page` and persists it with its params.
pub fn navigate(
    session: &SessionState,
    prefs: &Preferences,
    developer_emails: &[String],
    page: Page,
    params: Option<Value>,
) -> ApiResult<NavigationState> {
    let current = session.require()?;
    if !can_view_page(Some(&current.user), page, developer_emails) {
        return Err(ApiError::permission_denied(page.as_str()));
    }

    let params = params.unwrap_or_else(|| Value::Object(Default::default()));
    prefs.set_current_page(page)?;
    prefs.set_nav_params(params.clone())?;
    debug!(page = page.as_str(), "Navigated");

    Ok(NavigationState {
        page,
        params,
        pages: visible_pages(Some(&current.user), developer_emails),
    })
}

pub fn set_language(prefs: &Preferences, code: &str) -> ApiResult<Language> {
    let language =
        Language::parse(code).ok_or_else(|| ApiError::validation(format!("Bahasa tidak dikenal: {code}")))?;
    prefs.set_language(language)?;
    info!(language = language.code(), "Language changed");
    Ok(language)
}

pub fn set_theme(prefs: &Preferences, raw: &str) -> ApiResult<Theme> {
    let theme = Theme::parse(raw).ok_or_else(|| ApiError::validation(format!("Tema tidak dikenal: {raw}")))?;
    prefs.set_theme(theme)?;
    Ok(theme)
}
