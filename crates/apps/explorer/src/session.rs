use compute::chart::ChartSurface;
use layers::surface::MapSurface;
use runtime::TickToken;
use tokio::sync::mpsc;
use tracing::debug;

use crate::explorer::{Explorer, Reaction};
use crate::intent::Intent;
use crate::timer::PlaybackTimer;

/// What a finished session hands back.
pub struct SessionOutcome<M, C> {
    pub explorer: Explorer<M, C>,
    pub ticks_applied: u64,
}

/// Event loop serializing user intents and playback ticks for one explorer.
///
/// Each intent or tick runs to completion before the next is taken. Intents
/// win when both are ready.
pub struct Session<M, C> {
    explorer: Explorer<M, C>,
    timer: PlaybackTimer,
    ticks_tx: mpsc::UnboundedSender<TickToken>,
    ticks_rx: mpsc::UnboundedReceiver<TickToken>,
}

impl<M: MapSurface, C: ChartSurface> Session<M, C> {
    pub fn new(explorer: Explorer<M, C>) -> Self {
        let (ticks_tx, ticks_rx) = mpsc::unbounded_channel();
        Self {
            explorer,
            timer: PlaybackTimer::new(),
            ticks_tx,
            ticks_rx,
        }
    }

    /// Runs until the intent stream closes.
    ///
    /// With a `tick_budget`, playback that is still running at that point keeps
    /// going until that many ticks have been applied in total; without one it
    /// is stopped right away.
    pub async fn run(
        mut self,
        mut intents: mpsc::UnboundedReceiver<Intent>,
        tick_budget: Option<u64>,
    ) -> SessionOutcome<M, C> {
        let mut intents_open = true;
        let mut ticks_applied = 0u64;

        loop {
            if !intents_open {
                let budget_left = tick_budget.is_some_and(|b| ticks_applied < b);
                if !self.explorer.is_playing() || !budget_left {
                    break;
                }
            }

            tokio::select! {
                biased;

                intent = intents.recv(), if intents_open => match intent {
                    Some(intent) => self.handle_intent(intent),
                    None => intents_open = false,
                },
                Some(token) = self.ticks_rx.recv() => {
                    if self.explorer.on_tick(token).is_applied() {
                        ticks_applied += 1;
                        if tick_budget.is_some_and(|b| ticks_applied >= b) {
                            debug!(ticks_applied, "tick budget spent");
                            self.handle_intent(Intent::Pause);
                        }
                    }
                }
            }
        }

        self.handle_intent(Intent::Pause);
        SessionOutcome {
            explorer: self.explorer,
            ticks_applied,
        }
    }

    /// Replays a fixed list of intents, then honours `tick_budget` as in [`Session::run`].
    pub async fn run_script(
        self,
        script: Vec<Intent>,
        tick_budget: Option<u64>,
    ) -> SessionOutcome<M, C> {
        let (tx, rx) = mpsc::unbounded_channel();
        for intent in script {
            // The receiver is alive until `run` returns.
            let _ = tx.send(intent);
        }
        drop(tx);
        self.run(rx, tick_budget).await
    }

    fn handle_intent(&mut self, intent: Intent) {
        match self.explorer.dispatch(intent) {
            Reaction::Started(token) => {
                let period = self.explorer.tick_period();
                self.timer.arm(token, period, self.ticks_tx.clone());
            }
            _ => {
                if !self.explorer.is_playing() {
                    self.timer.disarm();
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Session;
    use crate::explorer::{Explorer, ExplorerOptions};
    use crate::intent::Intent;
    use compute::chart::RecordingChart;
    use formats::loader::load_records_from_str;
    use foundation::years::YearRange;
    use layers::surface::InMemoryMapSurface;
    use layers::FILTERED_LAYERS;
    use pretty_assertions::assert_eq;
    use runtime::metrics;
    use scene::Dataset;
    use serde_json::json;
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::sync::mpsc;

    fn session() -> Session<InMemoryMapSurface, RecordingChart> {
        let features: Vec<serde_json::Value> = (1950..=2025)
            .map(|year| {
                json!({
                    "type": "Feature",
                    "geometry": { "type": "Point", "coordinates": [-97.0, 35.0] },
                    "properties": { "year": year, "ef": year % 6 }
                })
            })
            .collect();
        let fc = json!({ "type": "FeatureCollection", "features": features });
        let records = load_records_from_str(&fc.to_string()).unwrap().records;
        let d = Arc::new(Dataset::new(records));
        let map = InMemoryMapSurface::new(d.clone(), &FILTERED_LAYERS);
        Session::new(Explorer::new(
            d,
            map,
            RecordingChart::new(),
            RecordingChart::new(),
            ExplorerOptions::default(),
        ))
    }

    #[tokio::test(start_paused = true)]
    async fn plays_until_the_tick_budget_is_spent() {
        let outcome = session().run_script(vec![Intent::Play], Some(3)).await;
        assert_eq!(outcome.ticks_applied, 3);
        let e = outcome.explorer;
        assert_eq!(e.state().range, YearRange::single(2003));
        assert!(!e.is_playing());
        assert!(e.view().play_enabled);
        assert_eq!(e.metrics().counter(metrics::TICKS), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn script_without_budget_never_ticks() {
        let script = vec![
            Intent::CommitText {
                start: "1990".into(),
                end: "1991".into(),
            },
            Intent::Play,
        ];
        let outcome = session().run_script(script, None).await;
        assert_eq!(outcome.ticks_applied, 0);
        assert_eq!(outcome.explorer.state().range, YearRange::new(1990, 1991));
        assert!(!outcome.explorer.is_playing());
    }

    #[tokio::test(start_paused = true)]
    async fn manual_commit_during_playback_wins() {
        let (tx, rx) = mpsc::unbounded_channel();
        let run = tokio::spawn(session().run(rx, None));

        tx.send(Intent::Play).unwrap();
        tokio::time::sleep(Duration::from_millis(950)).await;
        tx.send(Intent::TimelineClick { year: 1960 }).unwrap();
        tokio::time::sleep(Duration::from_secs(2)).await;
        drop(tx);

        let outcome = run.await.unwrap();
        assert_eq!(outcome.ticks_applied, 3);
        let e = outcome.explorer;
        assert_eq!(e.state().range, YearRange::single(1960));
        assert!(!e.is_playing());
        assert_eq!(e.metrics().counter(metrics::COMMITS), 1);
    }
}
