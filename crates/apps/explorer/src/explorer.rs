use std::sync::Arc;
use std::time::Duration;

use compute::analysis::{EfHistogram, YearTimeline};
use compute::chart::ChartSurface;
use foundation::bounds::Aabb2;
use foundation::geo::GeoPoint;
use foundation::years::{range_label, YearDomain, YearRange};
use layers::surface::MapSurface;
use layers::tooltip::TooltipText;
use layers::vector::{HeatSample, HeatmapLayer, PointLayer, PointSample};
use layers::{FILTERED_LAYERS, POINTS_LAYER};
use runtime::metrics::{self, Metrics};
use runtime::{
    next_window, EventBus, PlaybackScheduler, TickToken, DEFAULT_TICK_PERIOD,
    DEFAULT_TRACE_CAPACITY,
};
use scene::query::{compile_predicate, filter_records};
use scene::selection::SelectionSet;
use scene::state::FilterState;
use scene::Dataset;
use tracing::{debug, warn};

use crate::controls::ControlView;
use crate::intent::Intent;
use crate::reducer::{reduce, Reduction, Rejection};

/// Session settings that do not change after startup.
#[derive(Debug, Clone, PartialEq)]
pub struct ExplorerOptions {
    pub domain: YearDomain,
    pub initial_range: YearRange,
    pub tick_period: Duration,
    pub hover_radius_deg: f64,
    /// Most recent trace events kept by [`Explorer::events`].
    pub trace_capacity: usize,
}

impl Default for ExplorerOptions {
    fn default() -> Self {
        Self {
            domain: YearDomain::default(),
            initial_range: FilterState::default().range,
            tick_period: DEFAULT_TICK_PERIOD,
            hover_radius_deg: 0.25,
            trace_capacity: DEFAULT_TRACE_CAPACITY,
        }
    }
}

/// Who is about to write the filter state.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Mutator {
    Manual,
    Playback(TickToken),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Reaction {
    /// Controls moved; nothing was recomputed.
    Live,
    Committed,
    Rejected(Rejection),
    /// Playback started; the caller arms a timer for this token.
    Started(TickToken),
    Stopped,
    Unchanged,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    Applied(YearRange),
    Stale,
}

impl TickOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, TickOutcome::Applied(_))
    }
}

/// Owns the filter state and keeps every consumer in step with it.
///
/// All writes go through [`Explorer::dispatch`] or [`Explorer::on_tick`], and
/// both pass [`Explorer::begin_mutation`] first.
pub struct Explorer<M, C> {
    dataset: Arc<Dataset>,
    options: ExplorerOptions,
    state: FilterState,
    view: ControlView,
    scheduler: PlaybackScheduler,
    timeline: YearTimeline,
    histogram: EfHistogram,
    visible: SelectionSet,
    map: M,
    histogram_chart: C,
    timeline_chart: C,
    bus: EventBus,
    metrics: Metrics,
}

impl<M: MapSurface, C: ChartSurface> Explorer<M, C> {
    /// Builds the session and draws the initial state once.
    pub fn new(
        dataset: Arc<Dataset>,
        map: M,
        histogram_chart: C,
        timeline_chart: C,
        options: ExplorerOptions,
    ) -> Self {
        let domain = options.domain;
        let range = domain
            .normalize_range(
                f64::from(options.initial_range.start()),
                f64::from(options.initial_range.end()),
            )
            .unwrap_or_else(|| domain.full_range());
        let timeline = YearTimeline::build(&dataset, domain);
        let view = ControlView::new(domain, dataset.state_codes());

        let mut explorer = Self {
            scheduler: PlaybackScheduler::new(options.tick_period),
            state: FilterState::with_range(range),
            view,
            timeline,
            histogram: EfHistogram::default(),
            visible: SelectionSet::new(),
            map,
            histogram_chart,
            timeline_chart,
            bus: EventBus::with_capacity(options.trace_capacity),
            metrics: Metrics::new(),
            dataset,
            options,
        };
        explorer.recompute();
        explorer
    }

    pub fn dispatch(&mut self, intent: Intent) -> Reaction {
        match intent {
            Intent::DragRange { handle, value } => {
                if !self.view.drag(handle, value) {
                    return Reaction::Unchanged;
                }
                self.metrics.inc(metrics::LIVE_UPDATES);
                self.bus.emit("live", self.view.label.clone());
                Reaction::Live
            }
            Intent::Play => match self.scheduler.start() {
                Some(token) => {
                    self.view.set_playing(true);
                    let generation = format!("generation {}", token.generation());
                    self.bus.emit("playback.start", generation);
                    debug!(generation = token.generation(), "playback started");
                    Reaction::Started(token)
                }
                None => Reaction::Unchanged,
            },
            Intent::Pause => {
                if self.stop_playback("pause") {
                    Reaction::Stopped
                } else {
                    Reaction::Unchanged
                }
            }
            committed => self.commit(committed),
        }
    }

    /// Mutual-exclusion guard in front of every state write.
    ///
    /// A manual mutator always proceeds, stopping playback first. A playback
    /// mutator proceeds only while its token is current.
    pub fn begin_mutation(&mut self, mutator: Mutator) -> bool {
        match mutator {
            Mutator::Manual => {
                self.stop_playback("manual commit");
                true
            }
            Mutator::Playback(token) => self.scheduler.accept(&token),
        }
    }

    /// One playback step: advance the window and recompute.
    pub fn on_tick(&mut self, token: TickToken) -> TickOutcome {
        if !self.begin_mutation(Mutator::Playback(token)) {
            self.metrics.inc(metrics::STALE_TICKS);
            let generation = format!("generation {}", token.generation());
            self.bus.emit("tick.stale", generation);
            warn!(
                generation = token.generation(),
                "dropping stale playback tick"
            );
            return TickOutcome::Stale;
        }
        self.state.range = next_window(self.state.range, self.options.domain);
        self.metrics.inc(metrics::TICKS);
        self.bus.emit("tick", range_label(self.state.range));
        debug!(range = %range_label(self.state.range), "playback tick");
        self.recompute();
        TickOutcome::Applied(self.state.range)
    }

    /// Recompiles the predicate and redraws the map, both charts and the controls.
    pub fn recompute(&mut self) {
        let predicate = compile_predicate(&self.state);
        let filter = predicate.to_expr().to_json();
        for layer in FILTERED_LAYERS {
            if self.map.has_layer(layer) {
                self.map.set_filter(layer, &filter);
            }
        }

        let visible = filter_records(&self.dataset, &predicate);
        let entered = visible.diff(&self.visible).len();
        let left = self.visible.diff(&visible).len();
        self.visible = visible;
        self.histogram = EfHistogram::build(&self.dataset, &predicate);
        self.histogram_chart.redraw(&self.histogram.buckets());
        let bars = self.timeline.bars(self.state.range);
        self.timeline_chart.redraw(&bars);
        self.view.sync(&self.state, self.scheduler.is_playing());

        self.metrics.inc(metrics::RECOMPUTES);
        self.metrics
            .set_gauge(metrics::VISIBLE_RECORDS, self.visible.len() as i64);
        self.bus.emit(
            "recompute",
            format!("{} visible (+{entered} -{left})", self.visible.len()),
        );
    }

    /// Tooltip for the first visible point within the hover radius of `at`.
    pub fn hover(&self, at: GeoPoint) -> Option<TooltipText> {
        let region = Aabb2::around(at, self.options.hover_radius_deg);
        let id = self
            .map
            .query_rendered(POINTS_LAYER, region)
            .into_iter()
            .next()?;
        self.dataset.get(id).map(TooltipText::from_record)
    }

    /// What the point layer draws for the current state.
    pub fn point_samples(&self) -> Vec<PointSample> {
        PointLayer.extract(&self.dataset, &self.visible)
    }

    pub fn heat_samples(&self) -> Vec<HeatSample> {
        HeatmapLayer.extract(&self.dataset, &self.visible)
    }

    pub fn state(&self) -> &FilterState {
        &self.state
    }

    pub fn view(&self) -> &ControlView {
        &self.view
    }

    pub fn is_playing(&self) -> bool {
        self.scheduler.is_playing()
    }

    pub fn tick_period(&self) -> Duration {
        self.scheduler.period()
    }

    pub fn histogram(&self) -> &EfHistogram {
        &self.histogram
    }

    pub fn visible(&self) -> &SelectionSet {
        &self.visible
    }

    pub fn map(&self) -> &M {
        &self.map
    }

    pub fn histogram_chart(&self) -> &C {
        &self.histogram_chart
    }

    pub fn timeline_chart(&self) -> &C {
        &self.timeline_chart
    }

    pub fn events(&self) -> &EventBus {
        &self.bus
    }

    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    fn commit(&mut self, intent: Intent) -> Reaction {
        if !self.begin_mutation(Mutator::Manual) {
            return Reaction::Unchanged;
        }
        match reduce(&self.state, &intent, &self.view, self.options.domain) {
            Reduction::Commit(next) => {
                self.state = next;
                self.metrics.inc(metrics::COMMITS);
                self.bus.emit("commit", format!("{intent:?}"));
                debug!(?intent, "committed");
                self.recompute();
                Reaction::Committed
            }
            Reduction::Rejected(why) => {
                self.metrics.inc(metrics::REJECTED);
                self.bus.emit("rejected", why.to_string());
                warn!(%why, "discarding control input");
                self.view.sync(&self.state, self.scheduler.is_playing());
                Reaction::Rejected(why)
            }
            Reduction::Unchanged => Reaction::Unchanged,
        }
    }

    fn stop_playback(&mut self, reason: &str) -> bool {
        if !self.scheduler.stop() {
            return false;
        }
        self.view.set_playing(false);
        self.bus.emit("playback.stop", reason.to_string());
        debug!(reason, "playback stopped");
        true
    }
}

#[cfg(test)]
mod tests {
    use super::{Explorer, ExplorerOptions, Mutator, Reaction, TickOutcome};
    use crate::intent::{Handle, Intent};
    use crate::reducer::Rejection;
    use compute::chart::RecordingChart;
    use formats::loader::load_records_from_str;
    use foundation::geo::GeoPoint;
    use foundation::years::YearRange;
    use layers::surface::{InMemoryMapSurface, MapSurface};
    use layers::{LayerId, FILTERED_LAYERS, HEAT_LAYER, POINTS_LAYER};
    use pretty_assertions::assert_eq;
    use runtime::metrics;
    use scene::state::{Bracket, Quantity, StateFilter};
    use scene::Dataset;
    use serde_json::json;
    use std::sync::Arc;

    type TestExplorer = Explorer<InMemoryMapSurface, RecordingChart>;

    fn feature(lon: f64, lat: f64, props: serde_json::Value) -> serde_json::Value {
        json!({
            "type": "Feature",
            "geometry": { "type": "Point", "coordinates": [lon, lat] },
            "properties": props
        })
    }

    fn dataset() -> Arc<Dataset> {
        let fc = json!({
            "type": "FeatureCollection",
            "features": [
                feature(-97.5, 35.3, json!({
                    "year": 2000, "ef": 3, "state": "TX", "date": "2000-04-01",
                    "damage_property": "5M", "injuries": "0", "deaths": "0"
                })),
                feature(-97.4, 35.4, json!({
                    "year": 2000, "ef": 1, "state": "OK",
                    "damage_property": "20K", "injuries": "4", "deaths": "0"
                })),
                feature(-90.0, 33.0, json!({ "year": 2024, "ef": 2, "state": "MS" })),
                feature(-88.0, 32.0, json!({ "year": 1950, "ef": 0, "state": "AL" })),
            ]
        });
        let loaded = load_records_from_str(&fc.to_string()).unwrap();
        Arc::new(Dataset::new(loaded.records))
    }

    fn explorer_with(present: &[LayerId], options: ExplorerOptions) -> TestExplorer {
        let d = dataset();
        let map = InMemoryMapSurface::new(d.clone(), present);
        Explorer::new(
            d,
            map,
            RecordingChart::new(),
            RecordingChart::new(),
            options,
        )
    }

    fn explorer() -> TestExplorer {
        explorer_with(&FILTERED_LAYERS, ExplorerOptions::default())
    }

    fn visible_ids(e: &TestExplorer) -> Vec<u32> {
        e.visible().iter().map(|id| id.index()).collect()
    }

    #[test]
    fn initial_state_is_drawn_once() {
        let e = explorer();
        assert_eq!(e.state().range, YearRange::single(2000));
        assert_eq!(visible_ids(&e), vec![0, 1]);
        assert_eq!(e.histogram_chart().redraws(), 1);
        assert_eq!(e.timeline_chart().redraws(), 1);
        assert_eq!(e.map().redraws(POINTS_LAYER), 1);
        assert_eq!(e.view().label, "2000");
        assert_eq!(e.view().state_options, vec!["ALL", "AL", "MS", "OK", "TX"]);
        assert_eq!(e.point_samples().len(), 2);
        let heat: Vec<f64> = e.heat_samples().iter().map(|h| h.weight).collect();
        assert!((heat[0] - 0.64).abs() < 1e-9);
        assert!((heat[1] - 0.28).abs() < 1e-9);
    }

    #[test]
    fn map_and_charts_agree_with_the_state() {
        let mut e = explorer();
        e.dispatch(Intent::SelectBracket {
            quantity: Quantity::Damage,
            value: "MED".into(),
        });
        assert_eq!(visible_ids(&e), vec![0]);
        let on_map: Vec<u32> = e
            .map()
            .visible(POINTS_LAYER)
            .unwrap()
            .iter()
            .map(|id| id.index())
            .collect();
        assert_eq!(on_map, vec![0]);
        assert_eq!(e.map().visible(HEAT_LAYER).unwrap().len(), 1);
        let counts: Vec<u32> = e.histogram_chart().last().iter().map(|b| b.count).collect();
        assert_eq!(counts, vec![0, 0, 0, 1, 0, 0]);
        assert_eq!(e.view().damage, Bracket::Med);
    }

    #[test]
    fn live_drag_does_not_recompute() {
        let mut e = explorer();
        let reaction = e.dispatch(Intent::DragRange {
            handle: Handle::End,
            value: 2024.0,
        });
        assert_eq!(reaction, Reaction::Live);
        assert_eq!(e.view().end_text, "2024");
        assert_eq!(e.view().label, "2000–2024");
        assert_eq!(e.state().range, YearRange::single(2000));
        assert_eq!(e.histogram_chart().redraws(), 1);
        assert_eq!(e.metrics().counter(metrics::RECOMPUTES), 1);

        assert_eq!(e.dispatch(Intent::ReleaseRange), Reaction::Committed);
        assert_eq!(e.state().range, YearRange::new(2000, 2024));
        assert_eq!(visible_ids(&e), vec![0, 1, 2]);
        let last = e.events().events().last().unwrap();
        assert_eq!(last.message, "3 visible (+1 -0)");
        assert_eq!(e.histogram_chart().redraws(), 2);
    }

    #[test]
    fn text_commit_swaps_reversed_years() {
        let mut e = explorer();
        e.dispatch(Intent::CommitText {
            start: "2024".into(),
            end: "1950".into(),
        });
        assert_eq!(e.state().range, YearRange::new(1950, 2024));
        assert_eq!(e.view().start_text, "1950");
    }

    #[test]
    fn invalid_input_leaves_state_untouched() {
        let mut e = explorer();
        e.dispatch(Intent::DragRange {
            handle: Handle::Start,
            value: 1990.0,
        });
        let before = e.state().clone();
        let reaction = e.dispatch(Intent::CommitText {
            start: "soon".into(),
            end: "2001".into(),
        });
        assert!(matches!(reaction, Reaction::Rejected(_)));
        assert_eq!(e.state(), &before);
        // Controls resync to the unchanged state.
        assert_eq!(e.view().start_text, "2000");
        assert_eq!(e.metrics().counter(metrics::REJECTED), 1);
        assert_eq!(e.metrics().counter(metrics::RECOMPUTES), 1);
    }

    #[test]
    fn timeline_click_selects_single_year() {
        let mut e = explorer();
        e.dispatch(Intent::TimelineClick { year: 1950 });
        assert_eq!(e.state().range, YearRange::single(1950));
        assert_eq!(visible_ids(&e), vec![3]);
        let lit: Vec<i32> = e
            .timeline_chart()
            .last()
            .iter()
            .filter(|b| b.highlighted)
            .map(|b| b.key)
            .collect();
        assert_eq!(lit, vec![1950]);
    }

    #[test]
    fn manual_commit_stops_playback_before_recompute() {
        let mut e = explorer();
        let Reaction::Started(token) = e.dispatch(Intent::Play) else {
            panic!("playback did not start");
        };
        assert!(e.view().pause_enabled);
        let mark = e.events().events().len();

        e.dispatch(Intent::ToggleEf {
            ef: 1,
            checked: false,
        });
        assert!(!e.is_playing());
        assert_eq!(
            e.events().kinds()[mark..].to_vec(),
            vec!["playback.stop", "commit", "recompute"]
        );
        assert!(e.view().play_enabled && !e.view().pause_enabled);

        // The timer's token died with the run it belonged to.
        assert_eq!(e.on_tick(token), TickOutcome::Stale);
        assert_eq!(e.metrics().counter(metrics::STALE_TICKS), 1);
    }

    #[test]
    fn ticks_advance_and_wrap() {
        let mut e = explorer();
        e.dispatch(Intent::CommitText {
            start: "2024".into(),
            end: "2025".into(),
        });
        let Reaction::Started(token) = e.dispatch(Intent::Play) else {
            panic!("playback did not start");
        };
        assert_eq!(e.dispatch(Intent::Play), Reaction::Unchanged);
        assert_eq!(
            e.on_tick(token),
            TickOutcome::Applied(YearRange::new(1950, 1951))
        );
        assert_eq!(visible_ids(&e), vec![3]);
        assert!(e.is_playing());
        assert_eq!(e.dispatch(Intent::Pause), Reaction::Stopped);
        assert_eq!(e.dispatch(Intent::Pause), Reaction::Unchanged);
        assert!(!e.begin_mutation(Mutator::Playback(token)));
    }

    #[test]
    fn long_playback_keeps_a_bounded_trace() {
        let options = ExplorerOptions {
            trace_capacity: 16,
            ..ExplorerOptions::default()
        };
        let mut e = explorer_with(&FILTERED_LAYERS, options);
        let Reaction::Started(token) = e.dispatch(Intent::Play) else {
            panic!("playback did not start");
        };
        for _ in 0..10_000 {
            assert!(e.on_tick(token).is_applied());
        }
        assert_eq!(e.events().events().len(), 16);
        assert_eq!(e.events().events().last().unwrap().kind, "recompute");
        assert_eq!(e.metrics().counter(metrics::TICKS), 10_000);
    }

    #[test]
    fn state_outside_the_dataset_is_rejected() {
        let mut e = explorer();
        e.dispatch(Intent::SelectState { value: "OK".into() });
        let reaction = e.dispatch(Intent::SelectState { value: "ZZ".into() });
        assert_eq!(
            reaction,
            Reaction::Rejected(Rejection::UnknownState("ZZ".into()))
        );
        assert_eq!(e.state().state, StateFilter::Code("OK".into()));
        assert_eq!(e.view().state_selected, "OK");
        assert_eq!(visible_ids(&e), vec![1]);
    }

    #[test]
    fn filters_reach_only_present_layers() {
        let e = explorer_with(&[POINTS_LAYER], ExplorerOptions::default());
        assert!(e.map().filter(POINTS_LAYER).is_some());
        assert!(!e.map().has_layer(HEAT_LAYER));
        assert_eq!(e.map().redraws(HEAT_LAYER), 0);
    }

    #[test]
    fn hover_reports_first_visible_record() {
        let mut e = explorer();
        let tip = e.hover(GeoPoint::new(-97.45, 35.35)).unwrap();
        assert_eq!(tip.state, "TX");
        assert_eq!(tip.date, "2000-04-01");
        assert_eq!(tip.ef, "EF3");

        e.dispatch(Intent::SelectState { value: "OK".into() });
        let tip = e.hover(GeoPoint::new(-97.45, 35.35)).unwrap();
        assert_eq!(tip.state, "OK");
        assert_eq!(tip.damage, "20K");
        assert!(e.hover(GeoPoint::new(0.0, 0.0)).is_none());
    }
}
