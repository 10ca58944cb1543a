pub mod audit;
pub mod explain;
pub mod replay;
pub mod simulate;

use std::sync::Arc;

use warden_core::{Clock, IdSource, ManualClock, RandomIds, SequentialIds, SystemClock};

/// Wall clock and random ids, or a fixed clock and sequential ids when the
/// run has to hash identically every time.
pub(crate) fn time_and_ids(deterministic: bool) -> (Arc<dyn Clock>, Arc<dyn IdSource>) {
    if deterministic {
        (
            Arc::new(ManualClock::default()),
            Arc::new(SequentialIds::default()),
        )
    } else {
        (Arc::new(SystemClock), Arc::new(RandomIds))
    }
}
