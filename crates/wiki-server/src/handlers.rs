//! HTTP handlers mapping workflow actions onto responses.

use std::sync::Arc;

use axum::{
    Form, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
};
use serde::Deserialize;
use tower_http::trace::TraceLayer;
use wiki_store::{FileStore, PageStore, StoreError};

use crate::editlock::EditLocks;
use crate::html;
use crate::workflow::{self, Action, Template};

/// Shared application state
pub struct AppState {
    pub store: FileStore,
    pub locks: EditLocks,
}

/// Build the application router.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/home", get(home))
        .route("/view/{title}", get(view))
        .route("/edit/{title}", get(edit))
        .route("/save/{title}", post(save))
        .route("/stash/{title}", get(stash))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(Debug, Deserialize)]
pub struct SaveForm {
    #[serde(default)]
    body: String,
}

async fn root() -> Redirect {
    Redirect::to("/home")
}

async fn home(State(state): State<Arc<AppState>>) -> Response {
    match state.store.list().await {
        Ok(mut titles) => {
            titles.sort();
            Html(html::home_page(&titles)).into_response()
        }
        Err(e) => internal_error(e),
    }
}

async fn view(State(state): State<Arc<AppState>>, Path(title): Path<String>) -> Response {
    respond(workflow::view(&state.store, &title).await)
}

async fn edit(State(state): State<Arc<AppState>>, Path(title): Path<String>) -> Response {
    respond(workflow::edit(&state.store, &state.locks, &title).await)
}

async fn stash(State(state): State<Arc<AppState>>, Path(title): Path<String>) -> Response {
    respond(workflow::stash(&state.store, &state.locks, &title).await)
}

async fn save(
    State(state): State<Arc<AppState>>,
    Path(title): Path<String>,
    Form(form): Form<SaveForm>,
) -> Response {
    respond(workflow::save(&state.store, &state.locks, &title, &form.body).await)
}

fn respond(result: Result<Action, StoreError>) -> Response {
    match result {
        Ok(Action::Render(Template::View, page)) => Html(html::view_page(&page)).into_response(),
        Ok(Action::Render(Template::Edit, page)) => Html(html::edit_page(&page)).into_response(),
        Ok(Action::Redirect(location)) => Redirect::to(&location).into_response(),
        Ok(Action::NotFound) => (StatusCode::NOT_FOUND, "page not found").into_response(),
        Err(e) => internal_error(e),
    }
}

fn internal_error(e: StoreError) -> Response {
    tracing::error!("storage failure: {e}");
    (StatusCode::INTERNAL_SERVER_ERROR, "internal error").into_response()
}
