use std::time::Duration;

use runtime::TickToken;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

/// The single fixed-interval ticker behind playback.
///
/// At most one ticker task exists; arming again replaces it. Ticks already
/// queued when the task is aborted still reach the receiver, carrying their
/// old token, and are rejected there.
#[derive(Debug, Default)]
pub struct PlaybackTimer {
    task: Option<JoinHandle<()>>,
}

impl PlaybackTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts ticking `token` every `period`. The first tick fires one period from now.
    pub fn arm(
        &mut self,
        token: TickToken,
        period: Duration,
        ticks: mpsc::UnboundedSender<TickToken>,
    ) {
        self.disarm();
        self.task = Some(tokio::spawn(async move {
            let mut interval = time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                if ticks.send(token).is_err() {
                    break;
                }
            }
        }));
    }

    /// Aborts the ticker. Returns whether one was running.
    pub fn disarm(&mut self) -> bool {
        match self.task.take() {
            Some(task) => {
                task.abort();
                true
            }
            None => false,
        }
    }
}

impl Drop for PlaybackTimer {
    fn drop(&mut self) {
        self.disarm();
    }
}
