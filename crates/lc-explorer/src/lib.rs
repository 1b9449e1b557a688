//! # lc-explorer
//!
//! The controller behind the `lce` commands. An [`Explorer`] owns the
//! [`AppState`], the on-disk slot, and a [`QueryGateway`], and turns user
//! actions into state transitions:
//!
//! - region queries run as a spawned task with a timeout and can be cancelled
//! - every transition that changes the collection is written to the slot
//! - navigation updates the remembered selection
//!
//! ```no_run
//! # async fn demo() -> Result<(), lc_explorer::ExplorerError> {
//! use lc_config::LightcurveConfig;
//! use lc_explorer::Explorer;
//!
//! let config = LightcurveConfig::load()?;
//! let mut explorer = Explorer::from_config(&config)?;
//! let outcome = explorer.fetch_region(&config.query.parameters()?).await?;
//! println!("{} objects", outcome.objects);
//! # Ok(())
//! # }
//! ```

mod error;

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use serde_json::Value;
use tokio::task::JoinHandle;

use lc_config::{LightcurveConfig, TapConfig};
use lc_core::adql::{DEFAULT_TABLE, build_region_query};
use lc_core::group::group_by_object;
use lc_core::normalize::{NormalizedRows, normalize};
use lc_core::{
    AnnotationUpdate, AppState, Applied, CoreError, ObservedObject, QueryParameters, QueryTicket,
    ResponseShape, Transition,
};
use lc_store::{Cursor, ObjectStore};
use lc_tap::{Gateway, QueryGateway, TapError};

pub use error::ExplorerError;

/// Query settings taken from the `tap` config section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExplorerOptions {
    /// Table the region query reads from.
    pub table: String,
    /// Upper bound on one query, `None` for no limit.
    pub timeout: Option<Duration>,
}

impl Default for ExplorerOptions {
    fn default() -> Self {
        Self::from_tap(&TapConfig::default())
    }
}

impl ExplorerOptions {
    #[must_use]
    pub fn from_tap(tap: &TapConfig) -> Self {
        Self {
            table: if tap.table.trim().is_empty() {
                DEFAULT_TABLE.to_string()
            } else {
                tap.table.clone()
            },
            timeout: tap.timeout(),
        }
    }
}

/// Summary of a completed region query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct QueryOutcome {
    pub ticket: QueryTicket,
    pub shape: ResponseShape,
    /// Rows in the normalized payload.
    pub rows: usize,
    /// Objects kept after grouping and the object limit.
    pub objects: usize,
}

struct InFlight {
    ticket: QueryTicket,
    limit: usize,
    handle: JoinHandle<Result<Value, TapError>>,
}

pub struct Explorer<G = Gateway> {
    state: AppState,
    store: ObjectStore,
    gateway: Arc<G>,
    options: ExplorerOptions,
    in_flight: Option<InFlight>,
}

impl Explorer<Gateway> {
    /// Build the gateway and store described by `config` and load saved state.
    ///
    /// # Errors
    ///
    /// Returns an error if the store path cannot be resolved, the HTTP client
    /// cannot be built, or the saved state cannot be read.
    pub fn from_config(config: &LightcurveConfig) -> Result<Self, ExplorerError> {
        let store = ObjectStore::new(config.store.resolve_path()?);
        let gateway = Gateway::from_config(config)?;
        Self::open(gateway, store, ExplorerOptions::from_tap(&config.tap))
    }
}

impl<G: QueryGateway> Explorer<G> {
    /// Load the saved collection and selection from `store`.
    ///
    /// # Errors
    ///
    /// Returns [`ExplorerError::Store`] if the slot exists but cannot be read.
    pub fn open(
        gateway: G,
        store: ObjectStore,
        options: ExplorerOptions,
    ) -> Result<Self, ExplorerError> {
        let mut state = AppState::new(store.load()?);

        if let Some(id) = store.load_cursor()?.object_id {
            match state.index_of(&id) {
                Ok(index) => {
                    state.apply(Transition::Selected { index })?;
                }
                Err(_) => tracing::debug!(%id, "remembered object is gone; starting at the first"),
            }
        }

        tracing::debug!(
            objects = state.objects().len(),
            current = state.current_index(),
            path = %store.path().display(),
            "explorer opened"
        );
        Ok(Self {
            state,
            store,
            gateway: Arc::new(gateway),
            options,
            in_flight: None,
        })
    }

    #[must_use]
    pub const fn state(&self) -> &AppState {
        &self.state
    }

    #[must_use]
    pub const fn store(&self) -> &ObjectStore {
        &self.store
    }

    #[must_use]
    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    #[must_use]
    pub const fn options(&self) -> &ExplorerOptions {
        &self.options
    }

    /// ADQL that [`Self::start_query`] would send for `params`.
    #[must_use]
    pub fn region_query(&self, params: &QueryParameters) -> String {
        build_region_query(params, &self.options.table)
    }

    /// Validate `params`, mark a query in flight, and spawn it.
    ///
    /// Must be called inside a Tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Validation`] for bad parameters and
    /// [`CoreError::QueryInFlight`] if a query is already running.
    pub fn start_query(&mut self, params: &QueryParameters) -> Result<QueryTicket, ExplorerError> {
        params.validate()?;
        let ticket = self.state.begin_query()?;
        let adql = self.region_query(params);

        tracing::info!(
            %ticket,
            ra = params.ra,
            dec = params.dec,
            radius_deg = params.radius_deg,
            limit = params.object_limit,
            "starting region query"
        );

        let gateway = Arc::clone(&self.gateway);
        let handle = tokio::spawn(async move { gateway.run(&adql).await });
        self.in_flight = Some(InFlight {
            ticket,
            limit: usize::try_from(params.object_limit).unwrap_or(usize::MAX),
            handle,
        });
        Ok(ticket)
    }

    /// Wait for the in-flight query and apply its outcome.
    ///
    /// On success the grouped objects replace the collection (annotations
    /// carried over by id) and are persisted. On failure, timeout, or
    /// cancellation the query is marked failed and the collection is kept.
    ///
    /// Cancel-safe: if the returned future is dropped before completion the
    /// query stays in flight and can still be finished or cancelled.
    ///
    /// # Errors
    ///
    /// Returns [`ExplorerError::NoQueryInFlight`] if nothing was started,
    /// [`ExplorerError::Timeout`] when the configured timeout elapses, and
    /// [`ExplorerError::Gateway`] when the service call fails.
    pub async fn finish_query(&mut self) -> Result<QueryOutcome, ExplorerError> {
        let in_flight = self
            .in_flight
            .as_mut()
            .ok_or(ExplorerError::NoQueryInFlight)?;
        let joined = match self.options.timeout {
            Some(after) => tokio::time::timeout(after, &mut in_flight.handle).await.ok(),
            None => Some((&mut in_flight.handle).await),
        };

        let InFlight {
            ticket,
            limit,
            handle,
        } = self
            .in_flight
            .take()
            .ok_or(ExplorerError::NoQueryInFlight)?;

        let Some(joined) = joined else {
            handle.abort();
            let after = self.options.timeout.unwrap_or_default();
            self.fail(ticket, &format!("timed out after {after:?}"))?;
            return Err(ExplorerError::Timeout { ticket, after });
        };

        let payload = match joined {
            Ok(Ok(payload)) => payload,
            Ok(Err(error)) => {
                self.fail(ticket, &error.to_string())?;
                return Err(error.into());
            }
            Err(join_error) if join_error.is_cancelled() => {
                self.fail(ticket, "cancelled")?;
                return Err(ExplorerError::Cancelled(ticket));
            }
            Err(join_error) => {
                let reason = join_error.to_string();
                self.fail(ticket, &reason)?;
                return Err(ExplorerError::TaskFailed { ticket, reason });
            }
        };

        let NormalizedRows { shape, rows } = normalize(&payload);
        let objects = group_by_object(&rows, limit);
        let outcome = QueryOutcome {
            ticket,
            shape,
            rows: rows.len(),
            objects: objects.len(),
        };

        let applied = self
            .state
            .apply(Transition::QuerySucceeded { ticket, objects })?;
        self.persist(applied)?;
        if applied != Applied::Stale {
            self.remember_selection()?;
        }

        tracing::info!(%ticket, %shape, rows = outcome.rows, objects = outcome.objects, "region query finished");
        Ok(outcome)
    }

    /// Run one region query to completion.
    ///
    /// # Errors
    ///
    /// See [`Self::start_query`] and [`Self::finish_query`].
    pub async fn fetch_region(
        &mut self,
        params: &QueryParameters,
    ) -> Result<QueryOutcome, ExplorerError> {
        self.start_query(params)?;
        self.finish_query().await
    }

    /// Abort the in-flight query. Objects are left as they were.
    ///
    /// # Errors
    ///
    /// Returns [`ExplorerError::NoQueryInFlight`] if nothing is running.
    pub fn cancel_query(&mut self) -> Result<QueryTicket, ExplorerError> {
        let in_flight = self
            .in_flight
            .take()
            .ok_or(ExplorerError::NoQueryInFlight)?;
        in_flight.handle.abort();
        self.fail(in_flight.ticket, "cancelled")?;
        Ok(in_flight.ticket)
    }

    fn fail(&mut self, ticket: QueryTicket, reason: &str) -> Result<(), ExplorerError> {
        tracing::warn!(%ticket, error = reason, "region query failed");
        self.state.apply(Transition::QueryFailed {
            ticket,
            error: reason.to_string(),
        })?;
        Ok(())
    }

    /// Currently selected object.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::NoObjects`] when the collection is empty.
    pub fn current(&self) -> Result<&ObservedObject, ExplorerError> {
        self.state.current().ok_or(ExplorerError::Core(CoreError::NoObjects))
    }

    /// Select the object at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::IndexOutOfRange`] for a missing index.
    pub fn select(&mut self, index: usize) -> Result<&ObservedObject, ExplorerError> {
        self.require_objects()?;
        self.state.apply(Transition::Selected { index })?;
        self.remember_selection()?;
        self.current()
    }

    /// Select the object with identifier `id`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::ObjectNotFound`] if no object has that id.
    pub fn select_id(&mut self, id: &str) -> Result<&ObservedObject, ExplorerError> {
        let index = self.state.index_of(id)?;
        self.select(index)
    }

    /// Move to the next object, staying on the last one.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::NoObjects`] when the collection is empty.
    pub fn next(&mut self) -> Result<&ObservedObject, ExplorerError> {
        self.step(1)
    }

    /// Move to the previous object, staying on the first one.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::NoObjects`] when the collection is empty.
    pub fn prev(&mut self) -> Result<&ObservedObject, ExplorerError> {
        self.step(-1)
    }

    fn step(&mut self, delta: isize) -> Result<&ObservedObject, ExplorerError> {
        self.require_objects()?;
        self.select(self.state.step_index(delta))
    }

    /// Apply an annotation edit to the selected object and persist.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::NoObjects`] when the collection is empty and
    /// [`ExplorerError::Store`] if the slot cannot be written.
    pub fn annotate(&mut self, update: AnnotationUpdate) -> Result<&ObservedObject, ExplorerError> {
        self.require_objects()?;
        let index = self.state.current_index();
        let applied = self.state.apply(Transition::AnnotationSaved {
            index,
            fields: update,
        })?;
        self.persist(applied)?;
        self.current()
    }

    /// Render the selected object's chart, store it as its snapshot, and
    /// return the data URL.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::NoObjects`] when the collection is empty and
    /// [`ExplorerError::Store`] if the slot cannot be written.
    pub fn capture_snapshot(&mut self) -> Result<String, ExplorerError> {
        let image = lc_chart::snapshot_data_url(&self.current()?.measurements);
        let index = self.state.current_index();
        let applied = self.state.apply(Transition::SnapshotCaptured {
            index,
            image: image.clone(),
        })?;
        self.persist(applied)?;
        Ok(image)
    }

    /// SVG chart of the selected object.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::NoObjects`] when the collection is empty.
    pub fn render_current(&self) -> Result<String, ExplorerError> {
        Ok(lc_chart::render_svg(&self.current()?.measurements))
    }

    /// CSV of every object with its annotations and snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Csv`] if serialization fails.
    pub fn export_csv(&self) -> Result<String, ExplorerError> {
        Ok(lc_core::export::export_csv(self.state.objects())?)
    }

    fn require_objects(&self) -> Result<(), ExplorerError> {
        if self.state.objects().is_empty() {
            return Err(CoreError::NoObjects.into());
        }
        Ok(())
    }

    fn persist(&self, applied: Applied) -> Result<(), ExplorerError> {
        if applied == (Applied::Changed { persist: true }) {
            self.store.save(self.state.objects())?;
        }
        Ok(())
    }

    fn remember_selection(&self) -> Result<(), ExplorerError> {
        let cursor = Cursor {
            object_id: self.state.current().map(|object| object.id.clone()),
        };
        self.store.save_cursor(&cursor)?;
        Ok(())
    }
}

impl<G> Drop for Explorer<G> {
    fn drop(&mut self) {
        if let Some(in_flight) = self.in_flight.take() {
            tracing::debug!(ticket = %in_flight.ticket, "aborting unfinished query");
            in_flight.handle.abort();
        }
    }
}
