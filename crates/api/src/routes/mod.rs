//! API route definitions.

use axum::{Router, middleware};
use tranche_shared::types::Currency;
use tranche_shared::types::money::to_major;

use crate::{AppState, middleware::auth::auth_middleware};

pub mod health;
pub mod installments;
pub mod wallets;

/// Creates the API router: `/health` is public, everything else requires a
/// valid access token.
#[allow(clippy::needless_pass_by_value)]
pub fn api_routes_with_state(state: AppState) -> Router<AppState> {
    let protected_routes = Router::new()
        .merge(wallets::routes())
        .merge(installments::routes())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new()
        .merge(health::routes())
        .merge(protected_routes)
}

/// Renders a minor-unit RUB amount as a two-decimal ruble string.
pub(crate) fn rubles(minor_units: i64) -> String {
    to_major(minor_units, Currency::Rub).to_string()
}
