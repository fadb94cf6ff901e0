//! Wiring of repositories and media hosts into the application services.

pub mod unit_of_work;

use std::sync::Arc;

pub use unit_of_work::AppUnitOfWork;

use crate::catalog::CatalogService;
use crate::config::WatchConfig;
use crate::my_list::MyListService;
use crate::registration::RegistrationService;
use crate::upload::UploadPipeline;
use crate::watch::WatchProgressTracker;

/// Every service, sharing one unit of work.
#[derive(Debug, Clone)]
pub struct AppServices {
    pub registration: Arc<RegistrationService>,
    pub catalog: CatalogService,
    pub watch: Arc<WatchProgressTracker>,
    pub my_list: MyListService,
    pub watch_config: WatchConfig,
}

impl AppServices {
    pub fn new(
        unit_of_work: &AppUnitOfWork,
        uploads: UploadPipeline,
        watch_config: WatchConfig,
    ) -> Self {
        Self {
            registration: Arc::new(RegistrationService::new(
                Arc::clone(&unit_of_work.content),
                uploads,
            )),
            catalog: CatalogService::new(Arc::clone(&unit_of_work.content)),
            watch: Arc::new(WatchProgressTracker::new(
                Arc::clone(&unit_of_work.watch_progress),
                Arc::clone(&unit_of_work.content),
                &watch_config,
            )),
            my_list: MyListService::new(
                Arc::clone(&unit_of_work.my_list),
                Arc::clone(&unit_of_work.content),
            ),
            watch_config,
        }
    }
}
