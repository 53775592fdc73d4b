use serde::Serialize;

use crate::{
    geocode::SearchHit,
    map::{SelectedLocation, Status},
    proximity::ProximityBatch,
    tracker::{GeolocationError, TrackedPosition, TrackerState},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ToggleAction {
    Start,
    Stop,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Toggle {
    pub action: ToggleAction,
    pub enabled: bool,
}

impl Toggle {
    pub fn label(&self) -> &'static str {
        match self.action {
            ToggleAction::Start => "Live Location",
            ToggleAction::Stop => "Stop Live Location",
        }
    }
}

/// Everything a front end needs to draw the controls around the map.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WidgetView {
    pub map: Status,
    pub tracker: TrackerState,
    pub toggle: Toggle,
    /// Dismissible location problem.
    pub notice: Option<GeolocationError>,
    pub user_position: Option<TrackedPosition>,
    pub proximity: Option<ProximityBatch>,
    pub route_count: usize,
    pub selected: Option<SelectedLocation>,
    pub search: Option<SearchHit>,
}

impl Default for WidgetView {
    fn default() -> Self {
        Self {
            map: Status::Uninitialized,
            tracker: TrackerState::Idle,
            toggle: Toggle {
                action: ToggleAction::Start,
                enabled: true,
            },
            notice: None,
            user_position: None,
            proximity: None,
            route_count: 0,
            selected: None,
            search: None,
        }
    }
}
