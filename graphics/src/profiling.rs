//! Profiling support via Tracy.
//!
//! CPU scopes come from [`vexel_core::profiling`] and are re-exported here.
//! Build with `--features profiling` to enable them; otherwise every macro
//! compiles to nothing.
//!
//! On top of the CPU scopes the facade plots how far each queue's completed
//! value trails its latest reserved token, which makes stalls and starved
//! queues visible on the Tracy timeline.

pub use vexel_core::profiling::*;

use crate::sync::{QueueKind, SyncToken};

/// Plot the number of submissions `queue` still has in flight.
pub fn plot_queue_backlog(latest: SyncToken, completed: u64) {
    let backlog = latest.value.saturating_sub(completed);
    match latest.queue {
        QueueKind::Graphics => {
            vexel_core::profile_plot!("graphics queue backlog", backlog);
        }
        QueueKind::Compute => {
            vexel_core::profile_plot!("compute queue backlog", backlog);
        }
        QueueKind::Copy => {
            vexel_core::profile_plot!("copy queue backlog", backlog);
        }
    }
}
