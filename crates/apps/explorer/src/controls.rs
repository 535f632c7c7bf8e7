//! Headless model of the explorer's control panel.
//!
//! Every field is what a control would display. The view is written from
//! [`FilterState`] on every resync and from live drags in between; nothing in
//! here feeds back into the filter without going through the reducer.

use foundation::years::{range_label, YearDomain, YearRange};
use formats::normalize::MAX_EF;
use scene::state::{Bracket, FilterState, StateFilter};
use serde::Serialize;

use crate::intent::Handle;

pub const ALL_STATES: &str = "ALL";

/// Highlighted span of the range track, in percent of the track width.
#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
pub struct TrackIndicator {
    pub left_pct: f64,
    pub width_pct: f64,
}

impl TrackIndicator {
    pub fn for_range(range: YearRange, domain: YearDomain) -> Self {
        let span = f64::from(domain.max - domain.min);
        if span <= 0.0 {
            return Self {
                left_pct: 0.0,
                width_pct: 100.0,
            };
        }
        Self {
            left_pct: f64::from(range.start() - domain.min) * 100.0 / span,
            width_pct: f64::from(range.width()) * 100.0 / span,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ControlView {
    #[serde(skip)]
    domain: YearDomain,
    pub start_slider: i32,
    pub end_slider: i32,
    pub start_text: String,
    pub end_text: String,
    pub track: TrackIndicator,
    pub label: String,
    pub ef_checked: [bool; MAX_EF as usize + 1],
    /// `ALL` first, then the dataset's state codes in sorted order.
    pub state_options: Vec<String>,
    pub state_selected: String,
    pub damage: Bracket,
    pub injuries: Bracket,
    pub fatalities: Bracket,
    pub play_enabled: bool,
    pub pause_enabled: bool,
}

impl ControlView {
    pub fn new(domain: YearDomain, state_codes: Vec<String>) -> Self {
        let mut state_options = Vec::with_capacity(state_codes.len() + 1);
        state_options.push(ALL_STATES.to_string());
        state_options.extend(state_codes);

        let mut view = Self {
            domain,
            start_slider: domain.min,
            end_slider: domain.min,
            start_text: String::new(),
            end_text: String::new(),
            track: TrackIndicator::for_range(YearRange::single(domain.min), domain),
            label: String::new(),
            ef_checked: [false; MAX_EF as usize + 1],
            state_options,
            state_selected: ALL_STATES.to_string(),
            damage: Bracket::All,
            injuries: Bracket::All,
            fatalities: Bracket::All,
            play_enabled: true,
            pause_enabled: false,
        };
        let initial = FilterState::with_range(YearRange::single(domain.min));
        view.sync(&initial, false);
        view
    }

    /// Whether `code` is one of the dropdown's state codes. `ALL` is not a code.
    pub fn offers_state(&self, code: &str) -> bool {
        self.state_options[1..].iter().any(|c| c == code)
    }

    /// Rewrites every control from `state`.
    pub fn sync(&mut self, state: &FilterState, playing: bool) {
        self.start_slider = state.range.start();
        self.end_slider = state.range.end();
        self.show_range(state.range);
        for (ef, checked) in self.ef_checked.iter_mut().enumerate() {
            *checked = state.efs.contains(ef as u8);
        }
        self.state_selected = match &state.state {
            StateFilter::All => ALL_STATES.to_string(),
            StateFilter::Code(code) => code.clone(),
        };
        self.damage = state.damage;
        self.injuries = state.injuries;
        self.fatalities = state.fatalities;
        self.set_playing(playing);
    }

    /// Live slider movement. Updates the paired text inputs, the track and the
    /// label only; returns `false` if the value was ignored.
    ///
    /// The sliders are linked: a handle dragged past the other one pushes it along.
    pub fn drag(&mut self, handle: Handle, value: f64) -> bool {
        if !value.is_finite() {
            return false;
        }
        let year = self.domain.clamp(value.round() as i32);
        match handle {
            Handle::Start => {
                self.start_slider = year;
                self.end_slider = self.end_slider.max(year);
            }
            Handle::End => {
                self.end_slider = year;
                self.start_slider = self.start_slider.min(year);
            }
        }
        self.show_range(self.pending_range());
        true
    }

    /// The window the sliders currently show.
    pub fn pending_range(&self) -> YearRange {
        YearRange::new(self.start_slider, self.end_slider)
    }

    /// Exactly one of play/pause is enabled.
    pub fn set_playing(&mut self, playing: bool) {
        self.play_enabled = !playing;
        self.pause_enabled = playing;
    }

    fn show_range(&mut self, range: YearRange) {
        self.start_text = range.start().to_string();
        self.end_text = range.end().to_string();
        self.track = TrackIndicator::for_range(range, self.domain);
        self.label = range_label(range);
    }
}
