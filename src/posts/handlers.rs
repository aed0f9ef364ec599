use axum::{
    extract::{Path, State},
    response::{Redirect, Response},
    routing::{get, post},
    Form, Router,
};
use serde_json::json;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::accounts::session::AuthUser;
use crate::error::AppError;
use crate::posts::dto::{PostForm, PostView};
use crate::posts::repo::Post;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(index))
        .route("/create", get(create_form).post(create))
        .route("/edit/:id", get(edit_form).post(edit))
        .route("/delete/:id", post(delete))
}

#[instrument(skip(state))]
async fn index(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Response, AppError> {
    let posts: Vec<PostView> = Post::list_by_owner(&state.db, user_id)
        .await?
        .into_iter()
        .map(PostView::from)
        .collect();
    Ok(state.renderer.render("index", json!({ "posts": posts })))
}

#[instrument(skip(state))]
async fn create_form(State(state): State<AppState>, AuthUser(_): AuthUser) -> Response {
    state.renderer.render("create", json!({}))
}

#[instrument(skip(state, form))]
async fn create(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Form(form): Form<PostForm>,
) -> Result<Redirect, AppError> {
    validate(&form, "/create")?;
    let post = Post::create(&state.db, user_id, &form.title, &form.content).await?;
    info!(post_id = %post.id, owner_id = %user_id, "post created");
    Ok(Redirect::to("/"))
}

#[instrument(skip(state))]
async fn edit_form(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    // Fetch first, then authorize; the form is pre-filled only for the owner.
    let post = Post::get(&state.db, id).await?;
    if post.owner_id != user_id {
        return Err(AppError::NotAuthorized);
    }
    Ok(state
        .renderer
        .render("edit", json!({ "post": PostView::from(post) })))
}

#[instrument(skip(state, form))]
async fn edit(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
    Form(form): Form<PostForm>,
) -> Result<Redirect, AppError> {
    validate(&form, &format!("/edit/{id}"))?;
    Post::update(&state.db, id, user_id, &form.title, &form.content).await?;
    info!(post_id = %id, owner_id = %user_id, "post updated");
    Ok(Redirect::to("/"))
}

#[instrument(skip(state))]
async fn delete(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Redirect, AppError> {
    Post::delete(&state.db, id, user_id).await?;
    info!(post_id = %id, owner_id = %user_id, "post deleted");
    Ok(Redirect::to("/"))
}

fn validate(form: &PostForm, back: &str) -> Result<(), AppError> {
    if form.title.is_empty() {
        return Err(AppError::EmptyField {
            field: "title",
            form: back.to_owned(),
        });
    }
    if form.content.is_empty() {
        return Err(AppError::EmptyField {
            field: "content",
            form: back.to_owned(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accounts::repo::register;

    #[tokio::test]
    async fn create_rejects_empty_title() {
        let state = AppState::for_tests().await;
        let alice = register(&state.db, "alice", "pw1").await.expect("register");

        let form = PostForm {
            title: "".into(),
            content: "body".into(),
        };
        let err = create(State(state), AuthUser(alice.id), Form(form))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::EmptyField { field: "title", .. }));
    }

    #[tokio::test]
    async fn edit_form_is_owner_only() {
        let state = AppState::for_tests().await;
        let alice = register(&state.db, "alice", "pw1").await.expect("register");
        let bob = register(&state.db, "bob", "pw2").await.expect("register");
        let post = Post::create(&state.db, alice.id, "Hello", "World")
            .await
            .expect("create");

        let err = edit_form(State(state), AuthUser(bob.id), Path(post.id))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotAuthorized));
    }

    #[tokio::test]
    async fn edit_form_on_missing_post_is_not_found() {
        let state = AppState::for_tests().await;
        let alice = register(&state.db, "alice", "pw1").await.expect("register");

        let err = edit_form(State(state), AuthUser(alice.id), Path(Uuid::new_v4()))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound));
    }
}
