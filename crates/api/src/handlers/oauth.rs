//! Handlers for the OAuth login flows (Google, GitHub).
//!
//! Every failure on the callback path -- missing parameters, state
//! mismatch, exchange rejection, unusable profile -- produces the same
//! flash-and-redirect outcome. The cause is logged server-side only.

use axum::extract::{Query, State};
use axum::response::{IntoResponse, Redirect, Response};
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;
use snaplink_core::types::DbId;
use snaplink_db::models::oauth_account::OAuthProvider;
use snaplink_db::repositories::OAuthAccountRepo;

use crate::auth::oauth::{
    GithubOAuth, GoogleOAuth, ProviderProfile, GITHUB_STATE_COOKIE, GOOGLE_STATE_COOKIE,
    GOOGLE_VERIFIER_COOKIE, OAUTH_EXCHANGE_EXPIRY_SECS,
};
use crate::auth::session::establish_session;
use crate::cookies::{auth_cookie, removal_cookie};
use crate::error::AppResult;
use crate::flash::flash_redirect;
use crate::middleware::auth::OptionalUser;
use crate::middleware::client::ClientInfo;
use crate::state::AppState;

const GOOGLE_LOGIN_FAILED: &str = "Couldn't log in with Google. Please try again.";
const GITHUB_LOGIN_FAILED: &str = "Couldn't log in with GitHub. Please try again.";
const PROVIDER_UNAVAILABLE: &str = "Social login is not available right now.";

/// Query parameters of a provider callback. Optional at the type level so
/// missing parameters fall into the uniform failure path instead of a 400.
#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    pub code: Option<String>,
    pub state: Option<String>,
}

// ---------------------------------------------------------------------------
// Account linkage
// ---------------------------------------------------------------------------

/// Local identity a provider profile resolved to.
struct ResolvedUser {
    id: DbId,
    name: String,
    email: String,
}

/// Map a provider profile onto a local user.
///
/// Three cases, keyed by email:
/// - user exists with a link for this provider: log them in;
/// - user exists without one: link the identity, backfilling the avatar
///   only if none is set;
/// - no user: create user + link in one transaction, email pre-verified.
async fn resolve_provider_user(
    state: &AppState,
    provider: OAuthProvider,
    profile: &ProviderProfile,
) -> AppResult<ResolvedUser> {
    match OAuthAccountRepo::find_user_with_link(&state.pool, &profile.email, provider).await? {
        Some(user) => {
            if user.provider_account_id.is_none() {
                OAuthAccountRepo::link(
                    &state.pool,
                    user.id,
                    provider,
                    &profile.account_id,
                    profile.avatar_url.as_deref(),
                )
                .await?;
                tracing::info!(user_id = user.id, %provider, "Linked provider to existing account");
            }
            Ok(ResolvedUser {
                id: user.id,
                name: user.name,
                email: user.email,
            })
        }
        None => {
            let user = OAuthAccountRepo::create_user_with_link(
                &state.pool,
                &profile.name,
                &profile.email,
                profile.avatar_url.as_deref(),
                provider,
                &profile.account_id,
            )
            .await?;
            tracing::info!(user_id = user.id, %provider, "Created account from provider identity");
            Ok(ResolvedUser {
                id: user.id,
                name: user.name,
                email: user.email,
            })
        }
    }
}

// ---------------------------------------------------------------------------
// Google
// ---------------------------------------------------------------------------

/// GET /google
///
/// Start the Google flow: stash state + PKCE verifier in exchange-scoped
/// cookies and bounce to the provider.
pub async fn google_login(
    State(state): State<AppState>,
    OptionalUser(current): OptionalUser,
    jar: CookieJar,
) -> AppResult<Response> {
    if current.is_some() {
        return Ok(Redirect::to("/").into_response());
    }

    let Some(creds) = state.config.google.clone() else {
        return Ok(flash_redirect(jar, PROVIDER_UNAVAILABLE, "/login").into_response());
    };

    let (url, csrf_state, verifier) = GoogleOAuth::new(creds).authorize_url();

    let secure = state.config.secure_cookies;
    let jar = jar
        .add(auth_cookie(
            GOOGLE_STATE_COOKIE,
            csrf_state,
            OAUTH_EXCHANGE_EXPIRY_SECS,
            secure,
        ))
        .add(auth_cookie(
            GOOGLE_VERIFIER_COOKIE,
            verifier,
            OAUTH_EXCHANGE_EXPIRY_SECS,
            secure,
        ));

    Ok((jar, Redirect::to(&url)).into_response())
}

/// GET /google/callback
pub async fn google_callback(
    State(state): State<AppState>,
    client: ClientInfo,
    jar: CookieJar,
    Query(query): Query<CallbackQuery>,
) -> AppResult<Response> {
    let stored_state = jar.get(GOOGLE_STATE_COOKIE).map(|c| c.value().to_string());
    let verifier = jar.get(GOOGLE_VERIFIER_COOKIE).map(|c| c.value().to_string());

    // The exchange cookies are single-use regardless of outcome.
    let jar = jar
        .add(removal_cookie(GOOGLE_STATE_COOKIE))
        .add(removal_cookie(GOOGLE_VERIFIER_COOKIE));

    let (Some(code), Some(cb_state), Some(stored_state), Some(verifier)) =
        (query.code, query.state, stored_state, verifier)
    else {
        return Ok(flash_redirect(jar, GOOGLE_LOGIN_FAILED, "/login").into_response());
    };

    if cb_state != stored_state {
        tracing::warn!("Google callback state mismatch");
        return Ok(flash_redirect(jar, GOOGLE_LOGIN_FAILED, "/login").into_response());
    }

    let Some(creds) = state.config.google.clone() else {
        return Ok(flash_redirect(jar, GOOGLE_LOGIN_FAILED, "/login").into_response());
    };

    let profile = match GoogleOAuth::new(creds).exchange(&state.http, &code, verifier).await {
        Ok(profile) => profile,
        Err(e) => {
            tracing::warn!(error = %e, "Google code exchange failed");
            return Ok(flash_redirect(jar, GOOGLE_LOGIN_FAILED, "/login").into_response());
        }
    };

    let user = resolve_provider_user(&state, OAuthProvider::Google, &profile).await?;
    let jar = establish_session(&state, jar, user.id, &user.name, &user.email, &client).await?;

    Ok((jar, Redirect::to("/")).into_response())
}

// ---------------------------------------------------------------------------
// GitHub
// ---------------------------------------------------------------------------

/// GET /github
///
/// Start the GitHub flow: stash state in an exchange-scoped cookie and
/// bounce to the provider.
pub async fn github_login(
    State(state): State<AppState>,
    OptionalUser(current): OptionalUser,
    jar: CookieJar,
) -> AppResult<Response> {
    if current.is_some() {
        return Ok(Redirect::to("/").into_response());
    }

    let Some(creds) = state.config.github.clone() else {
        return Ok(flash_redirect(jar, PROVIDER_UNAVAILABLE, "/login").into_response());
    };

    let (url, csrf_state) = GithubOAuth::new(creds).authorize_url();

    let jar = jar.add(auth_cookie(
        GITHUB_STATE_COOKIE,
        csrf_state,
        OAUTH_EXCHANGE_EXPIRY_SECS,
        state.config.secure_cookies,
    ));

    Ok((jar, Redirect::to(&url)).into_response())
}

/// GET /github/callback
pub async fn github_callback(
    State(state): State<AppState>,
    client: ClientInfo,
    jar: CookieJar,
    Query(query): Query<CallbackQuery>,
) -> AppResult<Response> {
    let stored_state = jar.get(GITHUB_STATE_COOKIE).map(|c| c.value().to_string());

    let jar = jar.add(removal_cookie(GITHUB_STATE_COOKIE));

    let (Some(code), Some(cb_state), Some(stored_state)) =
        (query.code, query.state, stored_state)
    else {
        return Ok(flash_redirect(jar, GITHUB_LOGIN_FAILED, "/login").into_response());
    };

    if cb_state != stored_state {
        tracing::warn!("GitHub callback state mismatch");
        return Ok(flash_redirect(jar, GITHUB_LOGIN_FAILED, "/login").into_response());
    }

    let Some(creds) = state.config.github.clone() else {
        return Ok(flash_redirect(jar, GITHUB_LOGIN_FAILED, "/login").into_response());
    };

    let profile = match GithubOAuth::new(creds).exchange(&state.http, &code).await {
        Ok(profile) => profile,
        Err(e) => {
            tracing::warn!(error = %e, "GitHub code exchange failed");
            return Ok(flash_redirect(jar, GITHUB_LOGIN_FAILED, "/login").into_response());
        }
    };

    let user = resolve_provider_user(&state, OAuthProvider::Github, &profile).await?;
    let jar = establish_session(&state, jar, user.id, &user.name, &user.email, &client).await?;

    Ok((jar, Redirect::to("/")).into_response())
}
