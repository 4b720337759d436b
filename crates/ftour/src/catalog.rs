#![forbid(unsafe_code)]

//! Launchable tours.

use serde::Serialize;

use ftour_core::script::StepScript;

use crate::controller::TourStepList;
use crate::error::{TourError, TourResult};

/// A tour as offered on a help screen.
#[derive(Debug, Clone)]
pub struct TourDefinition {
    pub id: String,
    pub title: String,
    pub description: String,
    /// Human estimate such as "≈3 minutes".
    pub estimated_time: Option<String>,
    /// `data-tour-id` of the button that launches this tour.
    pub launch_tour_id: Option<String>,
    /// Runs before the first step opens.
    pub prepare: Option<StepScript>,
    pub steps: TourStepList,
}

impl TourDefinition {
    pub fn new(id: impl Into<String>, title: impl Into<String>, steps: impl Into<TourStepList>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: String::new(),
            estimated_time: None,
            launch_tour_id: None,
            prepare: None,
            steps: steps.into(),
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    #[must_use]
    pub fn with_estimated_time(mut self, estimate: impl Into<String>) -> Self {
        self.estimated_time = Some(estimate.into());
        self
    }

    #[must_use]
    pub fn with_launch_tour_id(mut self, id: impl Into<String>) -> Self {
        self.launch_tour_id = Some(id.into());
        self
    }

    #[must_use]
    pub fn with_prepare(mut self, script: StepScript) -> Self {
        self.prepare = Some(script);
        self
    }

    /// Listing entry for this tour.
    pub fn summary(&self) -> TourSummary {
        TourSummary {
            id: self.id.clone(),
            title: self.title.clone(),
            description: self.description.clone(),
            estimated_time: self.estimated_time.clone(),
            launch_tour_id: self.launch_tour_id.clone(),
            step_count: self.steps.len(),
        }
    }
}

/// Serializable listing entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TourSummary {
    pub id: String,
    pub title: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimated_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub launch_tour_id: Option<String>,
    pub step_count: usize,
}

/// Registered tours in insertion order.
#[derive(Debug, Clone, Default)]
pub struct TourCatalog {
    tours: Vec<TourDefinition>,
}

impl TourCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a tour, replacing any tour with the same id.
    pub fn register(&mut self, tour: TourDefinition) {
        match self.tours.iter_mut().find(|t| t.id == tour.id) {
            Some(slot) => *slot = tour,
            None => self.tours.push(tour),
        }
    }

    /// Parse a JSON descriptor and register it. Returns the tour id.
    pub fn register_json(&mut self, json: &str) -> TourResult<String> {
        let tour = crate::descriptor::parse_tour(json)?;
        let id = tour.id.clone();
        self.register(tour);
        Ok(id)
    }

    pub fn get(&self, id: &str) -> TourResult<&TourDefinition> {
        self.tours
            .iter()
            .find(|t| t.id == id)
            .ok_or_else(|| TourError::UnknownTour(id.to_owned()))
    }

    pub fn iter(&self) -> impl Iterator<Item = &TourDefinition> {
        self.tours.iter()
    }

    pub fn len(&self) -> usize {
        self.tours.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tours.is_empty()
    }

    /// JSON listing of every tour.
    pub fn summaries_json(&self) -> String {
        let summaries: Vec<TourSummary> = self.tours.iter().map(TourDefinition::summary).collect();
        serde_json::to_string_pretty(&summaries).unwrap_or_else(|_| "[]".to_owned())
    }
}
