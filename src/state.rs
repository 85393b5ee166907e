use crate::{config::Config, db::Sql};
use axum::extract::FromRef;

#[derive(Clone)]
pub struct AppState {
    /// `None` when the deployment has no database configured.
    pub sql: Option<Sql>,
    pub config: Config,
}

impl FromRef<AppState> for Option<Sql> {
    fn from_ref(state: &AppState) -> Self {
        state.sql.clone()
    }
}

impl FromRef<AppState> for Config {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}
