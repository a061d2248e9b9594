// The ordered log exchanged between a recording session and a later replay.
// Persisted as a JSON array; entries written by the earlier JavaScript recorder are imported too.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::InputError;
use crate::types::*;

/// Ordered recorded events. Non-decreasing timing is assumed, not checked.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordingLog {
    entries: Vec<RecordedEvent>,
}

impl RecordingLog {
    pub fn new() -> Self {
        RecordingLog {
            entries: Vec::new(),
        }
    }

    pub fn entries(&self) -> &[RecordedEvent] {
        &self.entries
    }

    pub fn get(&self, index: usize) -> Option<&RecordedEvent> {
        self.entries.get(index)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, RecordedEvent> {
        self.entries.iter()
    }

    pub(crate) fn push(&mut self, entry: RecordedEvent) {
        self.entries.push(entry);
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
    }

    /// True when every entry carries a logical frame, i.e. the log can be replayed.
    pub fn is_frame_indexed(&self) -> bool {
        self.entries.iter().all(|e| e.timing.frame().is_some())
    }

    pub fn to_json(&self) -> Result<String, InputError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, InputError> {
        Ok(serde_json::from_str(json)?)
    }
}

impl From<Vec<RecordedEvent>> for RecordingLog {
    fn from(entries: Vec<RecordedEvent>) -> Self {
        RecordingLog { entries }
    }
}

impl<'a> IntoIterator for &'a RecordingLog {
    type Item = &'a RecordedEvent;
    type IntoIter = std::slice::Iter<'a, RecordedEvent>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl Serialize for RecordingLog {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.entries.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for RecordingLog {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Vec::<EntryRepr>::deserialize(deserializer)?;
        raw.into_iter()
            .map(RecordedEvent::try_from)
            .collect::<Result<Vec<_>, _>>()
            .map(RecordingLog::from)
            .map_err(serde::de::Error::custom)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum EntryRepr {
    Current(RecordedEvent),
    Legacy(LegacyEntry),
}

/// `{"type":"mouse","event":"down","parameters":{...},"frameNumber":3}`
#[derive(Deserialize)]
struct LegacyEntry {
    #[serde(rename = "type")]
    category: String,
    event: String,
    #[serde(default)]
    parameters: serde_json::Value,
    #[serde(flatten)]
    timing: Timing,
}

impl TryFrom<EntryRepr> for RecordedEvent {
    type Error = InputError;

    fn try_from(repr: EntryRepr) -> Result<Self, Self::Error> {
        match repr {
            EntryRepr::Current(entry) => Ok(entry),
            EntryRepr::Legacy(legacy) => legacy.into_recorded(),
        }
    }
}

impl LegacyEntry {
    fn into_recorded(self) -> Result<RecordedEvent, InputError> {
        let input = match (self.category.as_str(), self.event.as_str()) {
            ("mouse" | "pointer", "down") => {
                RecordedInput::Pointer(PointerInput::Down(from_parameters(self.parameters)?))
            }
            ("mouse" | "pointer", "up") => {
                RecordedInput::Pointer(PointerInput::Up(from_parameters(self.parameters)?))
            }
            ("mouse" | "pointer", "move") => {
                RecordedInput::Pointer(PointerInput::Move(from_parameters(self.parameters)?))
            }
            ("mouse" | "pointer", "wheel") => {
                RecordedInput::Pointer(PointerInput::Wheel(from_parameters(self.parameters)?))
            }
            ("key", "down") => RecordedInput::Key(KeyInput::Down(from_parameters(self.parameters)?)),
            ("key", "up") => RecordedInput::Key(KeyInput::Up(from_parameters(self.parameters)?)),
            ("mouse" | "pointer" | "key", action) => {
                return Err(InputError::MalformedEntry(format!(
                    "unknown {} action `{}`",
                    self.category, action
                )))
            }
            _ => RecordedInput::Unrecognized,
        };

        Ok(RecordedEvent {
            input,
            timing: self.timing,
        })
    }
}

fn from_parameters<T: serde::de::DeserializeOwned>(
    parameters: serde_json::Value,
) -> Result<T, InputError> {
    serde_json::from_value(parameters).map_err(|e| InputError::MalformedEntry(e.to_string()))
}
