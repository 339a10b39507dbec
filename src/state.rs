use std::sync::Arc;

use crate::config::Config;
use crate::connectivity::Connectivity;
use crate::dispatch::Dispatcher;
use crate::queue::OfflineQueue;
use crate::replay::ReplayHandler;

pub type SharedState = Arc<AppState>;

pub struct AppState {
    pub config: Config,
    pub queue: Arc<OfflineQueue>,
    pub connectivity: Arc<Connectivity>,
    pub dispatcher: Dispatcher,
    pub replayer: Arc<dyn ReplayHandler>,
}
