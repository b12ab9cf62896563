//! Fixed-order dispatch over content controllers.

use std::sync::Arc;

use futures::future::join_all;
use tracing::{debug, error};

use crate::{
    content_set::ContentSet,
    controller::{ContentController, StageHook},
    error::Result,
    item::ContentItem,
};

/// Probe priority and hook groups, fixed at construction.
pub struct Dispatcher {
    describe_order: Vec<Arc<dyn ContentController>>,
    stage_groups: Vec<Vec<Arc<dyn ContentController>>>,
}

impl Dispatcher {
    /// Create a dispatcher.
    ///
    /// `describe_order` is probed front to back. `stage_groups` run one after
    /// another; controllers inside a group run concurrently.
    #[must_use]
    pub fn new(
        describe_order: Vec<Arc<dyn ContentController>>,
        stage_groups: Vec<Vec<Arc<dyn ContentController>>>,
    ) -> Self {
        Self {
            describe_order,
            stage_groups,
        }
    }

    /// First description any controller gives for `url_path`.
    #[must_use]
    pub fn probe(&self, url_path: &str) -> Option<ContentItem> {
        self.describe_order
            .iter()
            .find_map(|controller| controller.describe(url_path))
    }

    /// Run `hook` on every controller, group by group.
    ///
    /// Each group is awaited as a whole before the next one starts. If some
    /// hook fails, its siblings in the same group still run to completion,
    /// then the first failure is returned and later groups are skipped.
    pub async fn broadcast(&self, site: &ContentSet, hook: StageHook) -> Result<()> {
        for (index, group) in self.stage_groups.iter().enumerate() {
            let (names, pending): (Vec<_>, Vec<_>) = group
                .iter()
                .filter_map(|controller| {
                    hook.select(controller.as_ref(), site)
                        .map(|future| (controller.name(), future))
                })
                .unzip();

            if pending.is_empty() {
                continue;
            }

            debug!(group = index, controllers = ?names, ?hook, "dispatching stage hook");
            let results = join_all(pending).await;

            for (name, result) in names.into_iter().zip(results) {
                if let Err(e) = result {
                    error!(controller = name, ?hook, error = %e, "stage hook failed");
                    return Err(e);
                }
            }
        }

        Ok(())
    }
}
