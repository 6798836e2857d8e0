use axum::{
    Router, middleware,
    routing::{get, post},
};

use crate::auth::{self, AppState};
use crate::middleware::require_auth;
use crate::{follows, users};

/// All API routes. Sign-up and login are public; everything else needs a
/// bearer token.
pub fn router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/login", post(auth::login))
        .route("/usuarios", post(users::create_user));

    let protected_routes = Router::new()
        .route("/usuarios", get(users::search_users))
        .route(
            "/usuarios/{usuarioId}",
            get(users::get_user)
                .put(users::update_user)
                .delete(users::delete_user),
        )
        .route("/usuarios/{usuarioId}/seguir", post(follows::follow))
        .route("/usuarios/{usuarioId}/parar-de-seguir", post(follows::unfollow))
        .route("/usuarios/{usuarioId}/seguidores", get(follows::followers))
        .route("/usuarios/{usuarioId}/seguindo", get(follows::following))
        .route("/usuarios/{usuarioId}/atualizar-senha", post(users::change_password))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .with_state(state)
}
