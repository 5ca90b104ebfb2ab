//! Sign-in handlers: login page, login, and logout.

use askama::Template;
use axum::{
    response::{Html, IntoResponse, Redirect},
    Form,
};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use serde::Deserialize;

use super::middleware::{user_id_from_name, SESSION_COOKIE_NAME, USER_COOKIE_NAME};
use crate::config;
use crate::session::generate_session_id;

/// Display names longer than this are rejected rather than truncated
const MAX_NAME_LENGTH: usize = 64;

#[derive(Template)]
#[template(path = "login.html")]
pub struct LoginTemplate {
    pub error: Option<String>,
}

#[derive(Deserialize)]
pub struct LoginForm {
    pub name: String,
}

/// GET /login - Show sign-in page
pub async fn login_page() -> Html<String> {
    let template = LoginTemplate { error: None };
    Html(template.render().unwrap_or_default())
}

/// POST /login - Set identity cookies and enter the app
pub async fn login(jar: CookieJar, Form(form): Form<LoginForm>) -> impl IntoResponse {
    let name = form.name.trim();

    if user_id_from_name(name).is_empty() || name.chars().count() > MAX_NAME_LENGTH {
        let template = LoginTemplate {
            error: Some("Please enter a name (up to 64 characters).".to_string()),
        };
        return Html(template.render().unwrap_or_default()).into_response();
    }

    tracing::info!("Student signed in: {}", user_id_from_name(name));

    let user_cookie = Cookie::build((USER_COOKIE_NAME, urlencoding::encode(name).into_owned()))
        .path("/")
        .max_age(time::Duration::days(config::SIGN_IN_COOKIE_DAYS))
        .build();
    let session_cookie = Cookie::build((SESSION_COOKIE_NAME, generate_session_id()))
        .path("/")
        .http_only(true)
        .build();

    (jar.add(user_cookie).add(session_cookie), Redirect::to("/")).into_response()
}

/// POST /logout - Clear identity cookies
pub async fn logout(jar: CookieJar) -> impl IntoResponse {
    let jar = jar
        .remove(Cookie::build((USER_COOKIE_NAME, "")).path("/").build())
        .remove(Cookie::build((SESSION_COOKIE_NAME, "")).path("/").build());
    (jar, Redirect::to("/login"))
}
