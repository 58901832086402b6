//! Time-range summary of a scene stack.

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{Map, Value};
use tracing::debug;

use super::loader::{Scene, SceneStack};
use crate::antimeridian::SearchBounds;
use crate::pipeline::{Processor, StageError};

/// Scenes usable for a tile plus the item properties describing them.
#[derive(Debug, Clone)]
pub struct TemporalSummary {
    pub scenes: Vec<Scene>,
    pub bands: Vec<String>,
    pub bounds: SearchBounds,
    /// `start_datetime`, `end_datetime`, `datetime`, `created` and, when
    /// every scene agrees, `proj:epsg`
    pub properties: Map<String, Value>,
}

/// Keeps scenes with every requested band and stamps their time range.
///
/// Returns no output when no scene qualifies.
#[derive(Debug, Clone)]
pub struct TemporalSummaryProcessor {
    bands: Vec<String>,
}

impl TemporalSummaryProcessor {
    pub fn new<I, B>(bands: I) -> Self
    where
        I: IntoIterator<Item = B>,
        B: Into<String>,
    {
        Self {
            bands: bands.into_iter().map(Into::into).collect(),
        }
    }

    fn properties(scenes: &[Scene], created: DateTime<Utc>) -> Map<String, Value> {
        let mut properties = Map::new();
        let times = scenes.iter().filter_map(|s| s.datetime);
        let start = times.clone().min();
        let end = times.max();

        properties.insert("start_datetime".into(), timestamp(start));
        properties.insert("end_datetime".into(), timestamp(end));
        properties.insert("datetime".into(), timestamp(start));
        properties.insert("created".into(), timestamp(Some(created)));

        let mut epsgs = scenes.iter().map(|s| s.epsg);
        if let Some(Some(first)) = epsgs.next() {
            if epsgs.all(|epsg| epsg == Some(first)) {
                properties.insert("proj:epsg".into(), Value::from(first));
            }
        }
        properties
    }
}

fn timestamp(time: Option<DateTime<Utc>>) -> Value {
    match time {
        Some(time) => Value::String(time.to_rfc3339_opts(SecondsFormat::Secs, true)),
        None => Value::Null,
    }
}

impl Processor for TemporalSummaryProcessor {
    type Input = SceneStack;
    type Output = TemporalSummary;

    fn process(&self, input: SceneStack) -> Result<Option<TemporalSummary>, StageError> {
        let total = input.scenes.len();
        let scenes: Vec<Scene> = input
            .scenes
            .into_iter()
            .filter(|scene| scene.has_bands(&self.bands))
            .collect();
        debug!(total, usable = scenes.len(), "Filtered scenes by band");

        if scenes.is_empty() {
            return Ok(None);
        }

        let properties = Self::properties(&scenes, Utc::now());
        Ok(Some(TemporalSummary {
            scenes,
            bands: self.bands.clone(),
            bounds: input.bounds,
            properties,
        }))
    }
}
