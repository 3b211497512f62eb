use crate::{db::OrmConn, events::RatingBroadcaster, middleware::auth::TokenSettings};

#[derive(Clone)]
pub struct AppState {
    pub orm: OrmConn,
    pub tokens: TokenSettings,
    pub events: RatingBroadcaster,
}

impl AppState {
    pub fn new(orm: OrmConn, tokens: TokenSettings, events: RatingBroadcaster) -> Self {
        Self {
            orm,
            tokens,
            events,
        }
    }
}
