//! The record navigator: owns one record set and the active index.

use std::collections::VecDeque;
use std::path::Path;

use tokio::fs;
use tracing::{debug, warn};

use crate::error::{NavResult, NavigatorError};
use crate::labels::Labels;
use crate::notify::{Notification, Severity};
use crate::record::{Record, RecordSet};
use crate::render::{selector_label, RecordView};

/// Navigation direction for [`Navigator::step`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Previous,
    Next,
}

impl Direction {
    pub fn offset(self) -> isize {
        match self {
            Self::Previous => -1,
            Self::Next => 1,
        }
    }
}

/// Position of the active record. `index` is `None` when nothing is selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    pub index: Option<usize>,
    pub total: usize,
}

/// State changes published to the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigatorEvent {
    Loaded { total: usize },
    LoadFailed { message: String },
    Selected { index: usize },
}

impl NavigatorEvent {
    /// The notification to show for this event, if any.
    pub fn notification(&self, labels: &Labels) -> Option<Notification> {
        match self {
            Self::Loaded { .. } => Some(Notification::new(
                Severity::Success,
                &labels.success_title,
                &labels.load_succeeded,
            )),
            Self::LoadFailed { message } => Some(Notification::new(
                Severity::Error,
                &labels.error_title,
                format!("{} {}", labels.load_failed, message),
            )),
            Self::Selected { .. } => None,
        }
    }
}

/// Holds the loaded records and the active index for one viewing session.
///
/// Invariant: `active` is `Some(i)` with `i < records.len()` whenever the set
/// is non-empty, and `None` otherwise.
///
/// State changes are queued as [`NavigatorEvent`]s until the presentation
/// layer takes them with [`drain_events`](Self::drain_events); callers are
/// expected to drain after each interaction. Consecutive selections collapse
/// into the latest one, so navigating alone never grows the queue past one
/// `Selected` event.
#[derive(Debug, Default)]
pub struct Navigator {
    records: RecordSet,
    active: Option<usize>,
    labels: Labels,
    events: VecDeque<NavigatorEvent>,
}

impl Navigator {
    pub fn new(labels: Labels) -> Self {
        Self {
            labels,
            ..Self::default()
        }
    }

    pub fn labels(&self) -> &Labels {
        &self.labels
    }

    pub fn records(&self) -> &RecordSet {
        &self.records
    }

    /// Replace the record set with the parsed content of `raw`.
    ///
    /// On failure the previous records and selection are kept and a
    /// `LoadFailed` event is queued.
    pub fn load(&mut self, raw: &str) -> NavResult<usize> {
        let records = match RecordSet::parse(raw) {
            Ok(records) => records,
            Err(e) => {
                warn!(error = %e, "comparison file rejected");
                self.events.push_back(NavigatorEvent::LoadFailed {
                    message: e.to_string(),
                });
                return Err(e.into());
            }
        };

        let total = records.len();
        self.records = records;
        self.active = if total > 0 { Some(0) } else { None };

        debug!(total, "loaded comparison file");
        self.events.push_back(NavigatorEvent::Loaded { total });
        if let Some(index) = self.active {
            self.events.push_back(NavigatorEvent::Selected { index });
        }
        Ok(total)
    }

    /// Read and load a `.json` file.
    ///
    /// Takes `&mut self` for the whole read, so two loads against one
    /// navigator never interleave.
    pub async fn load_file(&mut self, path: impl AsRef<Path>) -> NavResult<usize> {
        let path = path.as_ref();

        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        if !is_json {
            debug!(path = %path.display(), "ignoring non-JSON file");
            return Err(NavigatorError::UnsupportedFile {
                path: path.to_path_buf(),
            });
        }

        let raw = match fs::read_to_string(path).await {
            Ok(raw) => raw,
            Err(e) => {
                let err = NavigatorError::Io {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                };
                warn!(error = %err, "comparison file unreadable");
                self.events.push_back(NavigatorEvent::LoadFailed {
                    message: err.to_string(),
                });
                return Err(err);
            }
        };

        self.load(&raw)
    }

    /// Select the record at `index`. Out-of-range requests are ignored.
    ///
    /// Returns whether the selection changed.
    pub fn select(&mut self, index: usize) -> bool {
        if index >= self.records.len() || self.active == Some(index) {
            return false;
        }
        self.active = Some(index);
        self.push_selected(index);
        true
    }

    /// Move one record back or forward. No wraparound at either end.
    pub fn step(&mut self, direction: Direction) -> bool {
        let Some(current) = self.active else {
            return false;
        };
        match current.checked_add_signed(direction.offset()) {
            Some(target) => self.select(target),
            None => false,
        }
    }

    pub fn active_index(&self) -> Option<usize> {
        self.active
    }

    pub fn current(&self) -> Option<&Record> {
        self.active.and_then(|i| self.records.get(i))
    }

    pub fn position(&self) -> Position {
        Position {
            index: self.active,
            total: self.records.len(),
        }
    }

    /// `(index + 1) / total`, or `0` when nothing is loaded.
    pub fn progress_fraction(&self) -> f64 {
        let total = self.records.len();
        match self.active {
            Some(index) if total > 0 => (index + 1) as f64 / total as f64,
            _ => 0.0,
        }
    }

    pub fn progress_percent(&self) -> f64 {
        self.progress_fraction() * 100.0
    }

    /// Counter text, e.g. `"(3 از 10)"`.
    pub fn counter_text(&self) -> String {
        let shown = self.active.map_or(0, |i| i + 1);
        format!("({} {} {})", shown, self.labels.of, self.records.len())
    }

    pub fn selector_labels(&self) -> Vec<String> {
        self.records
            .iter()
            .map(|record| selector_label(record, &self.labels))
            .collect()
    }

    pub fn current_view(&self) -> Option<RecordView> {
        self.current()
            .map(|record| RecordView::new(record, &self.labels))
    }

    fn push_selected(&mut self, index: usize) {
        match self.events.back_mut() {
            Some(NavigatorEvent::Selected { index: last }) => *last = index,
            _ => self.events.push_back(NavigatorEvent::Selected { index }),
        }
    }

    /// Take all queued events, oldest first.
    pub fn drain_events(&mut self) -> Vec<NavigatorEvent> {
        self.events.drain(..).collect()
    }
}
