use std::sync::Arc;

use cartograph_core::{AppConfig, GraphStore};
use cartograph_translate::QueryTranslator;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub graph: Arc<dyn GraphStore>,
    pub translator: Arc<QueryTranslator>,
}
