use std::sync::Arc;

use rse_admission::AdmissionService;
use rse_rulesets::RulesetService;
use rse_scheduled_jobs::ScheduledJobService;
use rse_store::Store;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub admission: Arc<AdmissionService>,
    pub rulesets: Arc<RulesetService>,
    pub scheduled_jobs: Arc<ScheduledJobService>,
}
