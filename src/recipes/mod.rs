use crate::state::AppState;
use axum::Router;

pub mod dto;
pub mod filter;
pub mod handlers;
pub mod repo;

pub fn router() -> Router<AppState> {
    handlers::recipe_routes()
}
