use axum::{
    extract::{FromRef, State},
    response::{Redirect, Response},
    routing::get,
    Form, Router,
};
use axum_extra::extract::cookie::CookieJar;
use serde_json::json;
use tracing::{info, instrument, warn};

use crate::accounts::{
    dto::{LoginForm, RegisterForm},
    repo,
    session::{removal_cookie, SessionKeys},
};
use crate::error::AppError;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", get(register_form).post(register))
        .route("/login", get(login_form).post(login))
        .route("/logout", get(logout).post(logout))
}

#[instrument(skip(state))]
async fn register_form(State(state): State<AppState>) -> Response {
    state.renderer.render("register", json!({}))
}

#[instrument(skip(state, jar, form))]
async fn register(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(mut form): Form<RegisterForm>,
) -> Result<(CookieJar, Redirect), AppError> {
    form.username = form.username.trim().to_string();
    if form.username.is_empty() {
        return Err(AppError::EmptyField {
            field: "username",
            form: "/register".into(),
        });
    }
    if form.password.is_empty() {
        return Err(AppError::EmptyField {
            field: "password",
            form: "/register".into(),
        });
    }

    let user = repo::register(&state.db, &form.username, &form.password).await?;

    // Registration implies login.
    let keys = SessionKeys::from_ref(&state);
    let cookie = keys.cookie(user.id)?;

    info!(user_id = %user.id, username = %user.username, "user registered");
    Ok((jar.add(cookie), Redirect::to("/")))
}

#[instrument(skip(state))]
async fn login_form(State(state): State<AppState>) -> Response {
    state.renderer.render("login", json!({}))
}

#[instrument(skip(state, jar, form))]
async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(mut form): Form<LoginForm>,
) -> Result<(CookieJar, Redirect), AppError> {
    form.username = form.username.trim().to_string();

    let user = match repo::authenticate(&state.db, &form.username, &form.password).await {
        Ok(u) => u,
        Err(e) => {
            warn!(username = %form.username, "login rejected");
            return Err(e);
        }
    };

    let keys = SessionKeys::from_ref(&state);
    let cookie = keys.cookie(user.id)?;

    info!(user_id = %user.id, username = %user.username, "user logged in");
    Ok((jar.add(cookie), Redirect::to("/")))
}

/// Idempotent: logging out without a session is not an error.
#[instrument(skip(jar))]
async fn logout(jar: CookieJar) -> (CookieJar, Redirect) {
    (jar.remove(removal_cookie()), Redirect::to("/login"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accounts::session::SESSION_COOKIE;

    #[tokio::test]
    async fn register_establishes_a_session() {
        let state = AppState::for_tests().await;
        let form = RegisterForm {
            username: "alice".into(),
            password: "pw1".into(),
        };
        let (jar, redirect) = register(State(state.clone()), CookieJar::new(), Form(form))
            .await
            .expect("register");

        let cookie = jar.get(SESSION_COOKIE).expect("session cookie set");
        let keys = SessionKeys::from_ref(&state);
        let claims = keys.verify(cookie.value()).expect("valid session token");

        let user = repo::User::find_by_username(&state.db, "alice")
            .await
            .expect("lookup")
            .expect("user exists");
        assert_eq!(claims.sub, user.id);
        let _ = redirect;
    }

    #[tokio::test]
    async fn register_trims_and_rejects_empty_username() {
        let state = AppState::for_tests().await;
        let form = RegisterForm {
            username: "   ".into(),
            password: "pw1".into(),
        };
        let err = register(State(state), CookieJar::new(), Form(form))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::EmptyField { field: "username", .. }));
    }

    #[tokio::test]
    async fn login_with_bad_password_sets_no_session() {
        let state = AppState::for_tests().await;
        repo::register(&state.db, "alice", "pw1").await.expect("register");

        let form = LoginForm {
            username: "alice".into(),
            password: "wrong".into(),
        };
        let err = login(State(state), CookieJar::new(), Form(form))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidCredentials));
    }

    #[tokio::test]
    async fn logout_without_session_is_a_no_op() {
        let (jar, redirect) = logout(CookieJar::new()).await;
        assert!(jar.get(SESSION_COOKIE).is_none());
        let _ = redirect;
    }
}
