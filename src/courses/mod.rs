pub mod extract;
pub mod handlers;

use axum::{Router, routing::get};

use crate::app::AppState;
use handlers::{delete_course, get_course, update_course};

pub fn router() -> Router<AppState> {
    Router::new().route(
        "/courses/{id}",
        get(get_course).put(update_course).delete(delete_course),
    )
}
