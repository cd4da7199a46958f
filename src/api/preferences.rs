use axum::{extract::State, Json};

use super::response::{success, ApiResponse};
use crate::controller::AppState;
use crate::prefs::{Preferences, PreferencesUpdate};

/// GET /preferences
pub async fn get_preferences(State(st): State<AppState>) -> ApiResponse<Preferences> {
    success(st.prefs.load())
}

/// PUT /preferences
pub async fn update_preferences(
    State(st): State<AppState>,
    Json(update): Json<PreferencesUpdate>,
) -> ApiResponse<Preferences> {
    success(st.prefs.update(update))
}
