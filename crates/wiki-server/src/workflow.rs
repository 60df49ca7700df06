//! View/edit/save/stash orchestration over a page store.
//!
//! Each operation validates the title before anything touches the store
//! or the lock table, and reports its result as an [`Action`] for the
//! HTTP layer to translate. A locked page is deliberately reported as
//! not-found, so callers cannot distinguish "locked" from "missing".

use wiki_store::{Page, PageStore, StoreError, validate_title};

use crate::editlock::EditLocks;

/// Which template a rendered action should use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Template {
    View,
    Edit,
}

/// What the HTTP layer should do with a completed action.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Render(Template, Page),
    Redirect(String),
    NotFound,
}

/// Display a page; a missing page redirects to its edit form.
pub async fn view<S: PageStore>(store: &S, title: &str) -> Result<Action, StoreError> {
    if validate_title(title).is_err() {
        return Ok(Action::NotFound);
    }
    match store.load(title).await {
        Ok(page) => Ok(Action::Render(Template::View, page)),
        Err(StoreError::NotFound(_)) => Ok(Action::Redirect(format!("/edit/{title}"))),
        Err(e) => Err(e),
    }
}

/// Stage an existing page for exactly one edit, then bounce back to view.
pub async fn stash<S: PageStore>(
    store: &S,
    locks: &EditLocks,
    title: &str,
) -> Result<Action, StoreError> {
    if validate_title(title).is_err() {
        return Ok(Action::NotFound);
    }
    match store.load(title).await {
        Ok(_) => {
            locks.stage(title);
            tracing::debug!(title, "page staged for editing");
            Ok(Action::Redirect(format!("/view/{title}")))
        }
        Err(StoreError::NotFound(_)) => Ok(Action::NotFound),
        Err(e) => Err(e),
    }
}

/// Open the edit form for a staged page, consuming its token.
pub async fn edit<S: PageStore>(
    store: &S,
    locks: &EditLocks,
    title: &str,
) -> Result<Action, StoreError> {
    if validate_title(title).is_err() {
        return Ok(Action::NotFound);
    }
    if !locks.try_acquire(title) {
        tracing::debug!(title, "edit denied, no staged token");
        return Ok(Action::NotFound);
    }
    let page = match store.load(title).await {
        Ok(page) => page,
        Err(StoreError::NotFound(_)) => Page::empty(title),
        Err(e) => return Err(e),
    };
    Ok(Action::Render(Template::Edit, page))
}

/// Persist a submitted body (sanitized by the store), re-arm one edit,
/// and bounce back to view.
pub async fn save<S: PageStore>(
    store: &S,
    locks: &EditLocks,
    title: &str,
    body: &str,
) -> Result<Action, StoreError> {
    if validate_title(title).is_err() {
        return Ok(Action::NotFound);
    }
    store.save(title, body).await?;
    locks.stage(title);
    tracing::debug!(title, "page saved");
    Ok(Action::Redirect(format!("/view/{title}")))
}
