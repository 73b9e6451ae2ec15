//! Direction-based and annotated window predictions.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::PredictResult;

use super::{PredictionEngine, SharedRecord};

/// Which way to look from the current counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PredictionDirection {
    /// Counters after the current one.
    #[default]
    Forwards,
    /// Counters before the current one, saturating at zero.
    Backwards,
}

/// Where a counter sits relative to the oracle's real counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimelinePosition {
    /// Already consumed by the host.
    Past,
    /// The next item the host will consume.
    Current,
    /// Not reached yet.
    Upcoming,
}

impl TimelinePosition {
    /// Classify `counter` against `current`.
    #[must_use]
    pub fn of(counter: u64, current: u64) -> Self {
        match counter.cmp(&current) {
            std::cmp::Ordering::Less => Self::Past,
            std::cmp::Ordering::Equal => Self::Current,
            std::cmp::Ordering::Greater => Self::Upcoming,
        }
    }
}

/// One annotated entry of a neighbourhood prediction.
#[derive(Debug, Clone)]
pub struct WindowEntry<K, O> {
    /// Counter the record was computed at.
    pub counter: u64,
    /// Position relative to the real counter at call time.
    pub position: TimelinePosition,
    /// The prediction.
    pub record: SharedRecord<K, O>,
}

impl<K, O> PredictionEngine<K, O>
where
    K: Clone + fmt::Debug + 'static,
    O: 'static,
{
    /// Predict the single counter `distance` away in `direction`.
    ///
    /// Forwards adds to the current counter; Backwards subtracts and stops at zero.
    ///
    /// # Errors
    /// See [`predict_at`](Self::predict_at).
    pub fn predict_at_distance(
        &mut self,
        distance: u64,
        direction: PredictionDirection,
    ) -> PredictResult<SharedRecord<K, O>> {
        let current = self.current_counter()?;
        let target = match direction {
            PredictionDirection::Forwards => current.saturating_add(distance),
            PredictionDirection::Backwards => current.saturating_sub(distance),
        };
        self.predict_at(target)
    }

    /// Like [`predict_window`](Self::predict_window), with each record tagged by
    /// its position relative to the current counter.
    ///
    /// # Errors
    /// See [`predict_range`](Self::predict_range).
    pub fn predict_neighbourhood(
        &mut self,
        ahead: u64,
        behind: u64,
    ) -> PredictResult<Vec<WindowEntry<K, O>>> {
        let current = self.current_counter()?;
        let records = self.predict_window(ahead, behind)?;
        Ok(records
            .into_iter()
            .map(|record| {
                let counter = record.counter();
                WindowEntry {
                    counter,
                    position: TimelinePosition::of(counter, current),
                    record,
                }
            })
            .collect())
    }

    /// [`predict_neighbourhood`](Self::predict_neighbourhood) using the configured
    /// default distance in both directions.
    ///
    /// # Errors
    /// See [`predict_range`](Self::predict_range).
    pub fn predict_default_window(&mut self) -> PredictResult<Vec<WindowEntry<K, O>>> {
        let distance = self.config.default_distance;
        self.predict_neighbourhood(distance, distance)
    }
}
