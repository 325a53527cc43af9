//! Authentication middleware that verifies bearer credentials and resolves the
//! local user for the request.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::{IntoResponse, Response},
};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    auth::{CredentialVerifier, Identity},
    user::{User, create_user, get_user_by_external_id},
};

/// The state needed for the auth middleware.
#[derive(Clone)]
pub struct AuthState {
    /// The database connection for looking up and creating users.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The external identity provider used to verify bearer credentials.
    pub verifier: Arc<dyn CredentialVerifier>,
}

impl FromRef<AppState> for AuthState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            verifier: state.verifier.clone(),
        }
    }
}

/// Middleware function that checks for a valid bearer credential in the
/// `Authorization` header.
///
/// The resolved [User] is placed into the request and the request executed
/// normally if the credential is valid, otherwise the translated error
/// response is returned. A previously unseen identity gets a user row created
/// on the spot.
///
/// **Note**: Route handlers can use the function argument
/// `Extension(user): Extension<User>` to receive the resolved user.
///
/// # Panics
///
/// Panics if the lock for the database connection is already held by the same thread.
pub async fn auth_guard(
    State(state): State<AuthState>,
    mut request: Request,
    next: Next,
) -> Response {
    let token = match bearer_token(&request) {
        Ok(token) => token,
        Err(error) => return error.into_response(),
    };

    let identity = match state.verifier.verify(&token).await {
        Ok(identity) => identity,
        Err(error) => return error.into_response(),
    };

    let user = {
        let connection = state.db_connection.lock().unwrap();

        match resolve_user(&identity, &connection) {
            Ok(user) => user,
            Err(error) => return error.into_response(),
        }
    };

    request.extensions_mut().insert(user);
    next.run(request).await
}

/// Extract the token from an `Authorization: Bearer <token>` header.
fn bearer_token(request: &Request) -> Result<String, Error> {
    let header = request
        .headers()
        .get(AUTHORIZATION)
        .ok_or(Error::Unauthenticated)?
        .to_str()
        .map_err(|_| Error::Unauthenticated)?;

    header
        .strip_prefix("Bearer ")
        .filter(|token| !token.is_empty())
        .map(str::to_owned)
        .ok_or(Error::Unauthenticated)
}

/// Look up the local user for a verified identity, creating one on first sight.
///
/// The unique constraint on the user table is the sole correctness mechanism
/// for concurrent first-sightings of the same identity: the second insert
/// fails and surfaces as [Error::Conflict].
///
/// # Errors
/// This function will return a:
/// - [Error::Conflict] if creating the user loses a uniqueness race,
/// - or [Error::SqlError] if there is some other SQL error.
pub(crate) fn resolve_user(identity: &Identity, connection: &Connection) -> Result<User, Error> {
    match get_user_by_external_id(&identity.subject, connection) {
        Ok(user) => Ok(user),
        Err(Error::NotFound) => {
            tracing::info!("Creating new user for {}", identity.email);
            create_user(identity, connection)
        }
        Err(error) => Err(error),
    }
}

#[cfg(test)]
mod auth_guard_tests {
    use axum::{
        Extension, Json, Router, http::StatusCode, middleware, routing::get,
    };
    use axum_test::TestServer;

    use crate::{
        auth::{AuthState, auth_guard, middleware::resolve_user},
        test_utils::{EXPIRED_TOKEN, VALID_TOKEN, test_app_state, test_identity},
        user::{User, count_users},
    };

    async fn whoami(Extension(user): Extension<User>) -> Json<User> {
        Json(user)
    }

    fn get_test_server(state: crate::AppState) -> TestServer {
        let app = Router::new()
            .route("/whoami", get(whoami))
            .route_layer(middleware::from_fn_with_state(state.clone(), auth_guard))
            .with_state(state);

        TestServer::new(app)
    }

    #[tokio::test]
    async fn request_without_credential_is_rejected() {
        let server = get_test_server(test_app_state());

        let response = server.get("/whoami").await;

        response.assert_status(StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn request_with_invalid_credential_is_rejected() {
        let server = get_test_server(test_app_state());

        let response = server
            .get("/whoami")
            .authorization_bearer("not-a-real-token")
            .await;

        response.assert_status(StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn expired_credential_gets_a_distinct_message() {
        let server = get_test_server(test_app_state());

        let response = server
            .get("/whoami")
            .authorization_bearer(EXPIRED_TOKEN)
            .await;

        response.assert_status(StatusCode::UNAUTHORIZED);
        let body: serde_json::Value = response.json();
        assert_eq!(body["error"], "Unauthorized: Token expired.");
    }

    #[tokio::test]
    async fn valid_credential_resolves_the_user() {
        let state = test_app_state();
        let server = get_test_server(state.clone());

        let response = server
            .get("/whoami")
            .authorization_bearer(VALID_TOKEN)
            .await;

        response.assert_status_ok();
        let user: User = response.json();
        assert_eq!(user.external_id, test_identity().subject);

        let connection = state.db_connection.lock().unwrap();
        assert_eq!(count_users(&connection).unwrap(), 1);
    }

    #[tokio::test]
    async fn first_sighting_creates_a_user_exactly_once() {
        let state = test_app_state();
        let server = get_test_server(state.clone());

        server
            .get("/whoami")
            .authorization_bearer(VALID_TOKEN)
            .await
            .assert_status_ok();
        server
            .get("/whoami")
            .authorization_bearer(VALID_TOKEN)
            .await
            .assert_status_ok();

        let connection = state.db_connection.lock().unwrap();
        assert_eq!(count_users(&connection).unwrap(), 1);
    }

    #[test]
    fn resolve_user_returns_the_same_user_on_repeat_sightings() {
        let state = test_app_state();
        let connection = state.db_connection.lock().unwrap();
        let identity = test_identity();

        let first = resolve_user(&identity, &connection).unwrap();
        let second = resolve_user(&identity, &connection).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn auth_state_can_be_derived_from_app_state() {
        use axum::extract::FromRef;

        let state = test_app_state();
        let auth_state = AuthState::from_ref(&state);

        let connection = auth_state.db_connection.lock().unwrap();
        assert_eq!(count_users(&connection).unwrap(), 0);
    }
}
