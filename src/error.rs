use axum::{
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use thiserror::Error;
use tracing::{error, warn};

/// Cookie the boundary layer uses to carry a one-shot user-visible message
/// across a redirect. The rendering layer reads and clears it.
pub const FLASH_COOKIE: &str = "flash";

#[derive(Debug, Error)]
pub enum AppError {
    #[error("username already exists")]
    DuplicateUsername,
    #[error("invalid username or password")]
    InvalidCredentials,
    #[error("post not found")]
    NotFound,
    #[error("not authorized")]
    NotAuthorized,
    #[error("authentication required")]
    Unauthenticated,
    #[error("{field} is required")]
    EmptyField {
        field: &'static str,
        /// Form the caller is sent back to.
        form: String,
    },
    #[error("persistence layer unavailable: {0}")]
    Persistence(#[from] sqlx::Error),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

/// Attach a flash message to the jar, to be shown after the next redirect.
pub fn flash(jar: CookieJar, message: &str) -> CookieJar {
    jar.add(Cookie::build((FLASH_COOKIE, message.to_owned())).path("/"))
}

fn redirect_with_flash(target: &str, message: &str) -> Response {
    (flash(CookieJar::new(), message), Redirect::to(target)).into_response()
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::DuplicateUsername => {
                redirect_with_flash("/register", "Username already exists!")
            }
            AppError::InvalidCredentials => {
                redirect_with_flash("/login", "Invalid username or password!")
            }
            // Same response class as NotAuthorized (a blocked action), but
            // logged separately for diagnostics.
            AppError::NotFound => {
                warn!("post not found");
                redirect_with_flash("/", "Post not found.")
            }
            AppError::NotAuthorized => {
                warn!("ownership check failed");
                redirect_with_flash("/", "Not authorized!")
            }
            AppError::Unauthenticated => Redirect::to("/login").into_response(),
            AppError::EmptyField { field, form } => {
                redirect_with_flash(&form, &format!("{field} is required"))
            }
            AppError::Persistence(e) => {
                error!(error = %e, "persistence layer failure");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal server error").into_response()
            }
            AppError::Internal(e) => {
                error!(error = %e, "internal error");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal server error").into_response()
            }
        }
    }
}
