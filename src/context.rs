use crate::config::AppConfig;
use crate::store::TicketStore;

/// Everything a console session works against: the resolved configuration
/// and the one canonical store instance.
pub struct AppContext {
    pub config: AppConfig,
    pub store: TicketStore,
}

impl AppContext {
    pub fn new(config: AppConfig, store: TicketStore) -> Self {
        Self { config, store }
    }
}
