use std::any::type_name_of_val;
use std::fmt;
use std::sync::Arc;

use crate::database::ports::{
    content::ContentRepository, my_list::MyListRepository,
    watch_progress::WatchProgressRepository,
};
#[cfg(feature = "database")]
use crate::database::PostgresDatabase;

/// Aggregates the repository ports used by application services.
#[derive(Clone)]
pub struct AppUnitOfWork {
    pub content: Arc<dyn ContentRepository>,
    pub watch_progress: Arc<dyn WatchProgressRepository>,
    pub my_list: Arc<dyn MyListRepository>,
}

impl fmt::Debug for AppUnitOfWork {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppUnitOfWork")
            .field("content", &type_name_of_val(self.content.as_ref()))
            .field(
                "watch_progress",
                &type_name_of_val(self.watch_progress.as_ref()),
            )
            .field("my_list", &type_name_of_val(self.my_list.as_ref()))
            .finish()
    }
}

#[cfg(feature = "database")]
impl AppUnitOfWork {
    /// Compose every Postgres-backed repository into a unit of work.
    pub fn from_postgres(db: &PostgresDatabase) -> Self {
        AppUnitOfWork {
            content: db.content(),
            watch_progress: db.watch_progress(),
            my_list: db.my_list(),
        }
    }
}
