//! Explicit application state for the explorer.
//!
//! All mutation goes through [`AppState::apply`] with a [`Transition`], and
//! every applied transition is appended to the log:
//!
//! ```text
//! idle ──query_started──▶ in_flight ──query_succeeded──▶ idle (objects replaced)
//!                                   └─query_failed─────▶ idle (objects kept)
//! annotation_saved / snapshot_captured / selected: any phase
//! ```
//!
//! Query completions carry the ticket issued by `query_started`. A completion
//! whose ticket is not the one in flight is stale and ignored.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::entities::{AnnotationUpdate, ObservedObject};
use crate::errors::CoreError;
use crate::group::merge_annotations;

/// Identifies one issued query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub struct QueryTicket(pub u64);

impl fmt::Display for QueryTicket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Whether a region query is outstanding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case", tag = "phase")]
pub enum QueryPhase {
    Idle,
    InFlight {
        ticket: QueryTicket,
        started_at: DateTime<Utc>,
    },
}

/// A state change request.
#[derive(Debug, Clone, PartialEq)]
pub enum Transition {
    QueryStarted {
        ticket: QueryTicket,
    },
    QuerySucceeded {
        ticket: QueryTicket,
        objects: Vec<ObservedObject>,
    },
    QueryFailed {
        ticket: QueryTicket,
        error: String,
    },
    AnnotationSaved {
        index: usize,
        fields: AnnotationUpdate,
    },
    SnapshotCaptured {
        index: usize,
        image: String,
    },
    Selected {
        index: usize,
    },
}

impl Transition {
    #[must_use]
    pub const fn kind(&self) -> TransitionKind {
        match self {
            Self::QueryStarted { .. } => TransitionKind::QueryStarted,
            Self::QuerySucceeded { .. } => TransitionKind::QuerySucceeded,
            Self::QueryFailed { .. } => TransitionKind::QueryFailed,
            Self::AnnotationSaved { .. } => TransitionKind::AnnotationSaved,
            Self::SnapshotCaptured { .. } => TransitionKind::SnapshotCaptured,
            Self::Selected { .. } => TransitionKind::Selected,
        }
    }
}

/// Transition discriminant, as recorded in the log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum TransitionKind {
    QueryStarted,
    QuerySucceeded,
    QueryFailed,
    AnnotationSaved,
    SnapshotCaptured,
    Selected,
}

impl TransitionKind {
    /// Whether applying this transition changes the persisted collection.
    #[must_use]
    pub const fn mutates_objects(self) -> bool {
        matches!(
            self,
            Self::QuerySucceeded | Self::AnnotationSaved | Self::SnapshotCaptured
        )
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::QueryStarted => "query_started",
            Self::QuerySucceeded => "query_succeeded",
            Self::QueryFailed => "query_failed",
            Self::AnnotationSaved => "annotation_saved",
            Self::SnapshotCaptured => "snapshot_captured",
            Self::Selected => "selected",
        }
    }
}

impl fmt::Display for TransitionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry of the transition log.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct TransitionRecord {
    pub kind: TransitionKind,
    pub at: DateTime<Utc>,
    pub detail: String,
}

/// Result of applying a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    /// The state changed; `persist` tells whether the collection changed.
    Changed { persist: bool },
    /// A completion for a query that is no longer in flight.
    Stale,
}

/// The explorer's whole in-memory state.
#[derive(Debug, Clone)]
pub struct AppState {
    objects: Vec<ObservedObject>,
    current_index: usize,
    query: QueryPhase,
    next_ticket: u64,
    log: Vec<TransitionRecord>,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl AppState {
    /// Start from a previously persisted collection.
    #[must_use]
    pub const fn new(objects: Vec<ObservedObject>) -> Self {
        Self {
            objects,
            current_index: 0,
            query: QueryPhase::Idle,
            next_ticket: 1,
            log: Vec::new(),
        }
    }

    #[must_use]
    pub fn objects(&self) -> &[ObservedObject] {
        &self.objects
    }

    #[must_use]
    pub const fn current_index(&self) -> usize {
        self.current_index
    }

    #[must_use]
    pub fn current(&self) -> Option<&ObservedObject> {
        self.objects.get(self.current_index)
    }

    #[must_use]
    pub const fn query(&self) -> QueryPhase {
        self.query
    }

    #[must_use]
    pub const fn is_loading(&self) -> bool {
        matches!(self.query, QueryPhase::InFlight { .. })
    }

    #[must_use]
    pub fn log(&self) -> &[TransitionRecord] {
        &self.log
    }

    /// Position of the object with identifier `id`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::ObjectNotFound`] if no object has that id.
    pub fn index_of(&self, id: &str) -> Result<usize, CoreError> {
        self.objects
            .iter()
            .position(|object| object.id == id)
            .ok_or_else(|| CoreError::ObjectNotFound(id.to_string()))
    }

    /// Issue a fresh ticket and apply `QueryStarted` with it.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::QueryInFlight`] if a query is already outstanding.
    pub fn begin_query(&mut self) -> Result<QueryTicket, CoreError> {
        let ticket = QueryTicket(self.next_ticket);
        self.apply(Transition::QueryStarted { ticket })?;
        Ok(ticket)
    }

    /// Index reached by moving `delta` positions, clamped to the collection.
    #[must_use]
    pub fn step_index(&self, delta: isize) -> usize {
        let last = self.objects.len().saturating_sub(1);
        self.current_index.saturating_add_signed(delta).min(last)
    }

    /// Apply one transition.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::QueryInFlight`] when starting a second query, and
    /// [`CoreError::IndexOutOfRange`] when addressing a missing object.
    pub fn apply(&mut self, transition: Transition) -> Result<Applied, CoreError> {
        let kind = transition.kind();
        let detail = match transition {
            Transition::QueryStarted { ticket } => {
                if let QueryPhase::InFlight { ticket: active, .. } = self.query {
                    return Err(CoreError::QueryInFlight { ticket: active.0 });
                }
                self.query = QueryPhase::InFlight {
                    ticket,
                    started_at: Utc::now(),
                };
                self.next_ticket = self.next_ticket.max(ticket.0 + 1);
                format!("ticket {ticket}")
            }
            Transition::QuerySucceeded { ticket, objects } => {
                if !self.is_active(ticket) {
                    return Ok(self.stale(kind, ticket));
                }
                let previous = std::mem::take(&mut self.objects);
                self.objects = merge_annotations(objects, &previous);
                self.current_index = 0;
                self.query = QueryPhase::Idle;
                format!("ticket {ticket}: {} objects", self.objects.len())
            }
            Transition::QueryFailed { ticket, error } => {
                if !self.is_active(ticket) {
                    return Ok(self.stale(kind, ticket));
                }
                self.query = QueryPhase::Idle;
                format!("ticket {ticket}: {error}")
            }
            Transition::AnnotationSaved { index, fields } => {
                let object = self.object_mut(index)?;
                object.annotations.apply(fields);
                format!("object {}", object.id)
            }
            Transition::SnapshotCaptured { index, image } => {
                let object = self.object_mut(index)?;
                let bytes = image.len();
                object.snapshot = Some(image);
                format!("object {}: {bytes} bytes", object.id)
            }
            Transition::Selected { index } => {
                let id = self.object_mut(index)?.id.clone();
                self.current_index = index;
                format!("object {id} at {index}")
            }
        };

        tracing::debug!(transition = %kind, %detail, "applied transition");
        self.record(kind, detail);
        Ok(Applied::Changed {
            persist: kind.mutates_objects(),
        })
    }

    fn is_active(&self, ticket: QueryTicket) -> bool {
        matches!(self.query, QueryPhase::InFlight { ticket: active, .. } if active == ticket)
    }

    fn stale(&self, kind: TransitionKind, ticket: QueryTicket) -> Applied {
        tracing::warn!(transition = %kind, %ticket, phase = ?self.query, "ignoring stale query completion");
        Applied::Stale
    }

    fn object_mut(&mut self, index: usize) -> Result<&mut ObservedObject, CoreError> {
        let len = self.objects.len();
        self.objects
            .get_mut(index)
            .ok_or(CoreError::IndexOutOfRange { index, len })
    }

    fn record(&mut self, kind: TransitionKind, detail: String) {
        self.log.push(TransitionRecord {
            kind,
            at: Utc::now(),
            detail,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::Measurement;
    use pretty_assertions::assert_eq;

    fn object(id: &str, times: &[f64]) -> ObservedObject {
        let mut object = ObservedObject::new(id, Some(150.0), Some(2.0));
        object.measurements = times
            .iter()
            .map(|&time| Measurement {
                time,
                magnitude: 20.0,
                magnitude_error: None,
                filter: None,
            })
            .collect();
        object
    }

    fn loaded(ids: &[&str]) -> AppState {
        AppState::new(ids.iter().map(|id| object(id, &[1.0])).collect())
    }

    #[test]
    fn successful_query_replaces_objects_and_resets_index() {
        let mut state = loaded(&["old"]);
        let ticket = state.begin_query().unwrap();
        assert!(state.is_loading());

        let applied = state
            .apply(Transition::QuerySucceeded {
                ticket,
                objects: vec![object("a", &[1.0]), object("b", &[2.0])],
            })
            .unwrap();

        assert_eq!(applied, Applied::Changed { persist: true });
        assert!(!state.is_loading());
        assert_eq!(state.objects().len(), 2);
        assert_eq!(state.current_index(), 0);
    }

    #[test]
    fn second_query_while_in_flight_is_rejected() {
        let mut state = AppState::default();
        let first = state.begin_query().unwrap();
        let err = state.begin_query().unwrap_err();
        assert!(matches!(err, CoreError::QueryInFlight { ticket } if ticket == first.0));
    }

    #[test]
    fn failure_clears_loading_and_keeps_objects() {
        let mut state = loaded(&["a"]);
        let ticket = state.begin_query().unwrap();
        state
            .apply(Transition::QueryFailed {
                ticket,
                error: "connection refused".into(),
            })
            .unwrap();
        assert!(!state.is_loading());
        assert_eq!(state.objects().len(), 1);
        assert!(state.begin_query().is_ok());
    }

    #[test]
    fn stale_completion_is_ignored() {
        let mut state = loaded(&["keep"]);
        let first = state.begin_query().unwrap();
        state
            .apply(Transition::QueryFailed {
                ticket: first,
                error: "timeout".into(),
            })
            .unwrap();
        let second = state.begin_query().unwrap();
        assert_ne!(first, second);

        let applied = state
            .apply(Transition::QuerySucceeded {
                ticket: first,
                objects: vec![],
            })
            .unwrap();
        assert_eq!(applied, Applied::Stale);
        assert_eq!(state.objects()[0].id, "keep");
        assert!(state.is_loading());
    }

    #[test]
    fn requery_preserves_annotations_by_identifier() {
        let mut state = AppState::default();
        let fresh = vec![object("a", &[1.0, 2.0]), object("b", &[3.0])];

        let ticket = state.begin_query().unwrap();
        state
            .apply(Transition::QuerySucceeded {
                ticket,
                objects: fresh.clone(),
            })
            .unwrap();
        state
            .apply(Transition::AnnotationSaved {
                index: 1,
                fields: AnnotationUpdate {
                    name: Some("eclipsing".into()),
                    ..Default::default()
                },
            })
            .unwrap();

        let ticket = state.begin_query().unwrap();
        state
            .apply(Transition::QuerySucceeded {
                ticket,
                objects: fresh.clone(),
            })
            .unwrap();

        assert_eq!(state.objects()[0], fresh[0]);
        assert_eq!(state.objects()[1].measurements, fresh[1].measurements);
        assert_eq!(state.objects()[1].annotations.name, "eclipsing");
    }

    #[test]
    fn snapshot_and_annotation_address_by_index() {
        let mut state = loaded(&["a", "b"]);
        state
            .apply(Transition::SnapshotCaptured {
                index: 1,
                image: "data:image/svg+xml;base64,AA==".into(),
            })
            .unwrap();
        assert!(state.objects()[1].snapshot.is_some());

        let err = state
            .apply(Transition::AnnotationSaved {
                index: 5,
                fields: AnnotationUpdate::default(),
            })
            .unwrap_err();
        assert!(matches!(err, CoreError::IndexOutOfRange { index: 5, len: 2 }));
    }

    #[test]
    fn navigation_clamps_to_collection() {
        let mut state = loaded(&["a", "b", "c"]);
        assert_eq!(state.step_index(-1), 0);
        state.apply(Transition::Selected { index: 2 }).unwrap();
        assert_eq!(state.step_index(1), 2);
        assert_eq!(state.step_index(-1), 1);
        assert_eq!(state.current().map(|o| o.id.as_str()), Some("c"));

        let selected = state.apply(Transition::Selected { index: 1 }).unwrap();
        assert_eq!(selected, Applied::Changed { persist: false });
    }

    #[test]
    fn log_records_every_applied_transition() {
        let mut state = loaded(&["a"]);
        let ticket = state.begin_query().unwrap();
        state
            .apply(Transition::QueryFailed {
                ticket,
                error: "boom".into(),
            })
            .unwrap();
        state.apply(Transition::Selected { index: 0 }).unwrap();

        let kinds: Vec<TransitionKind> = state.log().iter().map(|r| r.kind).collect();
        assert_eq!(
            kinds,
            vec![
                TransitionKind::QueryStarted,
                TransitionKind::QueryFailed,
                TransitionKind::Selected
            ]
        );
        assert!(state.log()[1].detail.contains("boom"));
    }
}
