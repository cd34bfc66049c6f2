use tokio::{
    runtime::Handle,
    time::{interval_at, Instant, MissedTickBehavior},
};

use crate::store::Store;

impl Store {
    /// Starts the automatic rotation. Calling it again restarts the interval.
    pub fn start_banner_rotation(&self) {
        self.schedule_banner_ticks();
    }

    pub fn stop_banner_rotation(&self) {
        self.inner.banner_task.cancel();
    }

    /// Jumps to `index` and restarts the interval, so the next automatic step
    /// is a full period away.
    pub fn set_banner_index(&self, index: usize) {
        self.update(|state| {
            let len = state.effective_banner_count();
            state.banner_index = if len == 0 { 0 } else { index % len };
        });
        self.schedule_banner_ticks();
    }

    pub(crate) fn advance_banner(&self) {
        self.update(|state| {
            let len = state.effective_banner_count();
            state.banner_index = if len == 0 { 0 } else { (state.banner_index + 1) % len };
        });
    }

    fn schedule_banner_ticks(&self) {
        let Ok(runtime) = Handle::try_current() else {
            tracing::debug!("no runtime, banner rotation disabled");
            return;
        };
        let store = self.downgrade();
        let period = self.inner.banner_interval;
        let task = runtime.spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let Some(store) = Store::upgrade(&store) else {
                    tracing::trace!("store dropped, banner rotation stopped");
                    break;
                };
                store.advance_banner();
            }
        });
        self.inner.banner_task.replace(task.abort_handle());
    }
}
