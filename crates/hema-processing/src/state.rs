//! Explicit application state for a presentation layer.
//!
//! The state is a plain value. Every change goes through
//! [`AppState::apply`], which consumes the old state and returns the new one,
//! so there are no hidden flags to fall out of sync: whether data is loaded
//! or cleaned is derived from what the state holds.
//!
//! ```rust,ignore
//! let state = AppState::new()
//!     .apply(Action::DataLoaded(Box::new(outcome)))
//!     .apply(Action::Navigate(Page::Statistics));
//!
//! if let Some(stats) = state.quick_stats() {
//!     println!("{} records, {} diagnoses", stats.records, stats.diagnoses);
//! }
//! ```

use crate::quality::DataQualityAnalyzer;
use crate::types::{CleaningOutcome, QualityReport};
use polars::prelude::DataFrame;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Views of the dataset a front end can show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Page {
    #[default]
    Home,
    DataOverview,
    DataCleaning,
    Analytics,
    ClinicalInsights,
    Statistics,
    Export,
    Help,
}

impl Page {
    /// Every page, in navigation order.
    pub const ALL: [Page; 8] = [
        Page::Home,
        Page::DataOverview,
        Page::DataCleaning,
        Page::Analytics,
        Page::ClinicalInsights,
        Page::Statistics,
        Page::Export,
        Page::Help,
    ];

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Home => "Home",
            Self::DataOverview => "Data Overview",
            Self::DataCleaning => "Data Cleaning",
            Self::Analytics => "Analytics",
            Self::ClinicalInsights => "Clinical Insights",
            Self::Statistics => "Statistics",
            Self::Export => "Export",
            Self::Help => "Help",
        }
    }

    /// Whether the page has nothing to show until a dataset is loaded.
    pub fn requires_data(&self) -> bool {
        !matches!(self, Self::Home | Self::Help)
    }
}

/// State transitions.
#[derive(Debug, Clone)]
pub enum Action {
    Navigate(Page),
    /// A dataset was loaded and cleaned.
    DataLoaded(Box<CleaningOutcome>),
    /// Loading failed; the message is shown to the user.
    LoadFailed(String),
    /// Drop the loaded data and return to the home page.
    Reset,
}

/// Record, variable and diagnosis counts of the clean table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuickStats {
    pub records: usize,
    pub variables: usize,
    /// Distinct values of `Diagnosis`; 0 when the column is absent.
    pub diagnoses: usize,
}

#[derive(Debug, Clone, Default)]
pub struct AppState {
    page: Page,
    data: Option<CleaningOutcome>,
    last_error: Option<String>,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one action and return the resulting state.
    pub fn apply(self, action: Action) -> Self {
        debug!("Applying action {:?}", ActionKind::from(&action));
        match action {
            Action::Navigate(page) => Self { page, ..self },
            Action::DataLoaded(outcome) => Self {
                data: Some(*outcome),
                last_error: None,
                ..self
            },
            Action::LoadFailed(message) => Self {
                data: None,
                last_error: Some(message),
                ..self
            },
            Action::Reset => Self::default(),
        }
    }

    pub fn page(&self) -> Page {
        self.page
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn data_loaded(&self) -> bool {
        self.data.is_some()
    }

    /// Whether any cleaning stage changed the loaded table.
    pub fn data_cleaned(&self) -> bool {
        self.data
            .as_ref()
            .is_some_and(|outcome| !outcome.report.actions.is_empty())
    }

    /// Whether the current page has what it needs to render.
    pub fn can_render(&self) -> bool {
        !self.page.requires_data() || self.data_loaded()
    }

    pub fn clean_table(&self) -> Option<&DataFrame> {
        self.data.as_ref().map(|outcome| &outcome.clean)
    }

    pub fn raw_table(&self) -> Option<&DataFrame> {
        self.data.as_ref().map(|outcome| &outcome.raw)
    }

    pub fn report(&self) -> Option<&QualityReport> {
        self.data.as_ref().map(|outcome| &outcome.report)
    }

    /// Counts for the sidebar, `None` until data is loaded.
    pub fn quick_stats(&self) -> Option<QuickStats> {
        let clean = self.clean_table()?;
        let diagnoses = DataQualityAnalyzer::distinct_count(clean, "Diagnosis")
            .ok()
            .flatten()
            .unwrap_or(0);

        Some(QuickStats {
            records: clean.height(),
            variables: clean.width(),
            diagnoses,
        })
    }
}

// Action without its payload, for logging.
#[derive(Debug)]
enum ActionKind {
    Navigate(Page),
    DataLoaded,
    LoadFailed,
    Reset,
}

impl From<&Action> for ActionKind {
    fn from(action: &Action) -> Self {
        match action {
            Action::Navigate(page) => Self::Navigate(*page),
            Action::DataLoaded(_) => Self::DataLoaded,
            Action::LoadFailed(_) => Self::LoadFailed,
            Action::Reset => Self::Reset,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CleaningPipeline;
    use polars::prelude::*;

    fn outcome() -> CleaningOutcome {
        let raw = df! {
            "Age" => &[Some(30i64), None, Some(30)],
            "Gender" => &["  male ", "Female", "  male "],
            "Diagnosis" => &["AML", "CLL", "AML"],
        }
        .unwrap();
        CleaningPipeline::builder().build().unwrap().run(&raw).unwrap()
    }

    #[test]
    fn test_initial_state() {
        let state = AppState::new();
        assert_eq!(state.page(), Page::Home);
        assert!(!state.data_loaded());
        assert!(!state.data_cleaned());
        assert!(state.quick_stats().is_none());
        assert!(state.can_render());
    }

    #[test]
    fn test_navigate_without_data() {
        let state = AppState::new().apply(Action::Navigate(Page::Statistics));
        assert_eq!(state.page(), Page::Statistics);
        assert!(!state.can_render());

        let state = state.apply(Action::Navigate(Page::Help));
        assert!(state.can_render());
    }

    #[test]
    fn test_data_loaded() {
        let state = AppState::new()
            .apply(Action::Navigate(Page::DataCleaning))
            .apply(Action::DataLoaded(Box::new(outcome())));

        assert_eq!(state.page(), Page::DataCleaning);
        assert!(state.data_loaded());
        assert!(state.data_cleaned());
        assert!(state.can_render());
        assert_eq!(state.raw_table().unwrap().height(), 3);
        assert_eq!(state.clean_table().unwrap().height(), 2);
        assert_eq!(state.report().unwrap().duplicates_removed, 1);
    }

    #[test]
    fn test_quick_stats() {
        let state = AppState::new().apply(Action::DataLoaded(Box::new(outcome())));
        assert_eq!(
            state.quick_stats(),
            Some(QuickStats {
                records: 2,
                variables: 3,
                diagnoses: 2,
            })
        );
    }

    #[test]
    fn test_quick_stats_without_diagnosis_column() {
        let raw = df! { "Age" => &[1i64, 2] }.unwrap();
        let outcome = CleaningPipeline::builder().build().unwrap().run(&raw).unwrap();
        let state = AppState::new().apply(Action::DataLoaded(Box::new(outcome)));

        assert_eq!(state.quick_stats().unwrap().diagnoses, 0);
        assert!(!state.data_cleaned());
    }

    #[test]
    fn test_load_failed_clears_data() {
        let state = AppState::new()
            .apply(Action::DataLoaded(Box::new(outcome())))
            .apply(Action::LoadFailed("Dataset not found".to_string()));

        assert!(!state.data_loaded());
        assert_eq!(state.last_error(), Some("Dataset not found"));
    }

    #[test]
    fn test_reset() {
        let state = AppState::new()
            .apply(Action::Navigate(Page::Export))
            .apply(Action::DataLoaded(Box::new(outcome())))
            .apply(Action::Reset);

        assert_eq!(state.page(), Page::Home);
        assert!(!state.data_loaded());
    }

    #[test]
    fn test_pages() {
        assert_eq!(Page::ALL.len(), 8);
        assert_eq!(Page::ClinicalInsights.display_name(), "Clinical Insights");
        assert!(Page::Export.requires_data());
        assert!(!Page::Home.requires_data());
    }
}
