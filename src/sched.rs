//! Poll scheduler.
//!
//! Three independent repeating loops drive the fetch operations: camera
//! status (always), database data (only while the database tab is active)
//! and performance metrics (only while the performance tab is active).
//! Status and performance slow down while the page is hidden; the database
//! cadence never changes with visibility.
//!
//! Timers fire one full period after (re)scheduling and skip missed ticks.
//! Each tick spawns its fetch and moves on; overlapping fetches are fine
//! because every render replaces its whole region. A UI change wakes the
//! affected loops, and only an actual visibility flip rebuilds an interval,
//! so tab switches never disturb timer phase.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::time::{interval_at, Instant, Interval, MissedTickBehavior};
use tracing::info;

use crate::app::{AppContext, Tab, Visibility};

pub const STATUS_PERIOD: Duration = Duration::from_millis(3000);
pub const STATUS_PERIOD_HIDDEN: Duration = Duration::from_millis(15000);
pub const DATABASE_PERIOD: Duration = Duration::from_millis(10000);
pub const PERFORMANCE_PERIOD: Duration = Duration::from_millis(5000);
pub const PERFORMANCE_PERIOD_HIDDEN: Duration = Duration::from_millis(30000);

/// Effective status poll period for a visibility state.
pub fn status_period(visibility: Visibility) -> Duration {
    match visibility {
        Visibility::Visible => STATUS_PERIOD,
        Visibility::Hidden => STATUS_PERIOD_HIDDEN,
    }
}

/// Effective performance poll period for a visibility state.
pub fn performance_period(visibility: Visibility) -> Duration {
    match visibility {
        Visibility::Visible => PERFORMANCE_PERIOD,
        Visibility::Hidden => PERFORMANCE_PERIOD_HIDDEN,
    }
}

/// Owns the three poll loops.
pub struct PollScheduler {
    ctx: Arc<AppContext>,
    stop_tx: broadcast::Sender<()>,
}

impl PollScheduler {
    pub fn new(ctx: Arc<AppContext>) -> Self {
        let (stop_tx, _) = broadcast::channel(1);
        Self { ctx, stop_tx }
    }

    /// Kick off the initial loads and start the poll loops.
    ///
    /// The initial status, results and storage-info fetches run as
    /// fire-and-forget tasks; the loops tick one full period from now.
    pub fn start(&self) {
        info!("Scheduler: starting poll loops");

        let ctx = self.ctx.clone();
        tokio::spawn(async move {
            tokio::join!(
                ctx.refresh_status(),
                ctx.refresh_results(),
                ctx.refresh_database_info()
            );
        });

        tokio::spawn(run_status_loop(self.ctx.clone(), self.stop_tx.subscribe()));
        tokio::spawn(run_database_loop(
            self.ctx.clone(),
            self.stop_tx.subscribe(),
        ));
        tokio::spawn(run_performance_loop(
            self.ctx.clone(),
            self.stop_tx.subscribe(),
        ));
    }

    /// Stop all poll loops. In-flight fetches are left to finish.
    pub fn shutdown(&self) {
        info!("Scheduler: stopping poll loops");
        let _ = self.stop_tx.send(());
    }
}

/// Interval with `setInterval` semantics: first fire a full period away,
/// missed ticks skipped.
fn poll_interval(period: Duration) -> Interval {
    let mut interval = interval_at(Instant::now() + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    interval
}

async fn run_status_loop(ctx: Arc<AppContext>, mut stop_rx: broadcast::Receiver<()>) {
    let mut ui_rx = ctx.subscribe_ui();
    let mut visibility = ui_rx.borrow().visibility;
    let mut interval = poll_interval(status_period(visibility));

    loop {
        tokio::select! {
            _ = stop_rx.recv() => break,
            changed = ui_rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let current = ui_rx.borrow().visibility;
                if current != visibility {
                    visibility = current;
                    // The immediate fetch on becoming visible is issued by
                    // the visibility transition itself, not by the timer.
                    interval = poll_interval(status_period(visibility));
                }
            }
            _ = interval.tick() => {
                let ctx = ctx.clone();
                tokio::spawn(async move { ctx.refresh_status().await });
            }
        }
    }
}

async fn run_database_loop(ctx: Arc<AppContext>, mut stop_rx: broadcast::Receiver<()>) {
    // Fixed cadence: this interval is never rebuilt, so visibility cannot
    // affect it. The tab gate is evaluated at tick time.
    let mut interval = poll_interval(DATABASE_PERIOD);

    loop {
        tokio::select! {
            _ = stop_rx.recv() => break,
            _ = interval.tick() => {
                if ctx.ui_state().active_tab == Tab::Database {
                    let ctx = ctx.clone();
                    tokio::spawn(async move {
                        tokio::join!(ctx.refresh_results(), ctx.refresh_database_info());
                    });
                }
            }
        }
    }
}

async fn run_performance_loop(ctx: Arc<AppContext>, mut stop_rx: broadcast::Receiver<()>) {
    let mut ui_rx = ctx.subscribe_ui();
    let mut visibility = ui_rx.borrow().visibility;
    let mut interval = poll_interval(performance_period(visibility));

    loop {
        tokio::select! {
            _ = stop_rx.recv() => break,
            changed = ui_rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let current = ui_rx.borrow().visibility;
                if current != visibility {
                    visibility = current;
                    interval = poll_interval(performance_period(visibility));
                }
            }
            _ = interval.tick() => {
                if ctx.ui_state().active_tab == Tab::Performance {
                    let ctx = ctx.clone();
                    tokio::spawn(async move { ctx.refresh_performance().await });
                }
            }
        }
    }
}
