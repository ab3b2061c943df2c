// ── Dashboard facade ──
//
// Owns the gateway client, the query cache and the session port for the
// application's lifetime. Reads go through the cache; mutations go through
// the gateway and then invalidate the keys they affect. Any Unauthorized
// answer ends the session and clears the cache.

use std::future::Future;
use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{info, warn};

use agrosync_api::types::{CreateFacilityBody, CreatePlotBody, CreateSpeciesBody};
use agrosync_api::{ApiClient, TlsMode, TransportConfig};

use crate::config::{DashboardConfig, TlsVerification};
use crate::error::CoreError;
use crate::model::{
    Facility, FacilityId, FacilityIrrigations, IrrigationEvent, IrrigationSummary,
    LastIrrigation, NewFacility, NewPlot, Plot, PlotId, PlotState, ResponsibleSet, Species,
    SpeciesThresholds,
};
use crate::mutation::{OptimisticState, ResponsiblesEditor, ThresholdEditor};
use crate::query::{CacheDiagnostics, QueryCache, QueryKey, TracingDiagnostics};
use crate::session::SessionPort;

/// Result of [`Dashboard::create_plot`].
#[derive(Debug, Clone)]
pub struct PlotCreation {
    pub plot: Plot,
    /// Set when the plot named a species that had to be registered first.
    pub new_species: Option<Species>,
}

/// Entry point for every read and mutation.
///
/// Cheap to clone: all clones share one cache and one session.
#[derive(Clone)]
pub struct Dashboard {
    inner: Arc<DashboardInner>,
}

pub(crate) struct DashboardInner {
    pub(crate) api: ApiClient,
    pub(crate) cache: QueryCache,
    pub(crate) session: Arc<dyn SessionPort>,
}

impl Dashboard {
    /// Build a dashboard from runtime config. No network call is made.
    ///
    /// Fails with `CoreError::Config` naming every missing identity
    /// provider setting.
    pub fn new(config: &DashboardConfig, session: Arc<dyn SessionPort>) -> Result<Self, CoreError> {
        Self::with_diagnostics(config, session, Arc::new(TracingDiagnostics))
    }

    pub fn with_diagnostics(
        config: &DashboardConfig,
        session: Arc<dyn SessionPort>,
        diagnostics: Arc<dyn CacheDiagnostics>,
    ) -> Result<Self, CoreError> {
        let missing = config.identity.missing_keys();
        if !missing.is_empty() {
            return Err(CoreError::Config {
                message: format!(
                    "identity provider settings missing: {}",
                    missing.join(", ")
                ),
            });
        }

        let tls = match &config.tls {
            TlsVerification::SystemDefaults => TlsMode::System,
            TlsVerification::CustomCa(path) => TlsMode::CustomCa(path.clone()),
            TlsVerification::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
        };
        let transport = TransportConfig {
            tls,
            timeout: config.timeout,
            access_token: config.access_token.clone(),
        };
        let api = ApiClient::new(config.api_url.as_str(), &transport)?;
        let cache = QueryCache::with_diagnostics(config.query, diagnostics);
        Ok(Self::from_parts(api, cache, session))
    }

    /// Assemble from an existing client and cache.
    pub fn from_parts(api: ApiClient, cache: QueryCache, session: Arc<dyn SessionPort>) -> Self {
        Self {
            inner: Arc::new(DashboardInner {
                api,
                cache,
                session,
            }),
        }
    }

    pub fn cache(&self) -> &QueryCache {
        &self.inner.cache
    }

    pub fn is_authenticated(&self) -> bool {
        self.inner.session.is_authenticated()
    }

    /// End the session and forget every cached read.
    pub fn logout(&self) {
        self.inner.end_session();
    }

    // ── Reads ────────────────────────────────────────────────────────

    pub async fn facilities(&self) -> Result<Arc<Vec<Facility>>, CoreError> {
        let api = self.inner.api.clone();
        self.inner
            .query(QueryKey::Facilities, move || {
                let api = api.clone();
                async move {
                    let list = api.list_facilities().await?;
                    Ok::<_, CoreError>(list.into_iter().map(Facility::from).collect::<Vec<_>>())
                }
            })
            .await
    }

    pub async fn plots(&self, facility_id: &FacilityId) -> Result<Arc<Vec<Plot>>, CoreError> {
        let api = self.inner.api.clone();
        let id = facility_id.clone();
        self.inner
            .query(QueryKey::FacilityPlots(facility_id.clone()), move || {
                let (api, id) = (api.clone(), id.clone());
                async move {
                    let list = api.list_facility_plots(id.as_str()).await?;
                    Ok::<_, CoreError>(list.into_iter().map(Plot::from).collect::<Vec<_>>())
                }
            })
            .await
    }

    /// Latest sensor snapshot, or `None` when the plot has reported nothing yet.
    pub async fn plot_state(&self, plot_id: &PlotId) -> Result<Option<Arc<PlotState>>, CoreError> {
        let api = self.inner.api.clone();
        let id = plot_id.clone();
        self.inner
            .query_optional(QueryKey::PlotState(plot_id.clone()), move || {
                let (api, id) = (api.clone(), id.clone());
                async move {
                    let state = api.get_plot_state(id.as_str()).await?;
                    Ok::<_, CoreError>(PlotState::from(state))
                }
            })
            .await
    }

    pub async fn plot_history(&self, plot_id: &PlotId) -> Result<Arc<Vec<PlotState>>, CoreError> {
        let api = self.inner.api.clone();
        let id = plot_id.clone();
        self.inner
            .query(QueryKey::PlotHistory(plot_id.clone()), move || {
                let (api, id) = (api.clone(), id.clone());
                async move {
                    let history = api.get_plot_history(id.as_str()).await?;
                    Ok::<_, CoreError>(history.into_iter().map(PlotState::from).collect::<Vec<_>>())
                }
            })
            .await
    }

    pub async fn last_irrigation(
        &self,
        plot_id: &PlotId,
    ) -> Result<Option<Arc<LastIrrigation>>, CoreError> {
        let api = self.inner.api.clone();
        let id = plot_id.clone();
        self.inner
            .query_optional(QueryKey::LastIrrigation(plot_id.clone()), move || {
                let (api, id) = (api.clone(), id.clone());
                async move {
                    let last = api.get_last_irrigation(id.as_str()).await?;
                    Ok::<_, CoreError>(LastIrrigation::from(last))
                }
            })
            .await
    }

    pub async fn irrigations(&self, plot_id: &PlotId) -> Result<Arc<Vec<IrrigationEvent>>, CoreError> {
        let api = self.inner.api.clone();
        let id = plot_id.clone();
        self.inner
            .query(QueryKey::Irrigations(plot_id.clone()), move || {
                let (api, id) = (api.clone(), id.clone());
                async move {
                    let events = api.list_irrigations(id.as_str()).await?;
                    Ok::<_, CoreError>(
                        events.into_iter().map(IrrigationEvent::from).collect::<Vec<_>>(),
                    )
                }
            })
            .await
    }

    /// Irrigations of every plot in a facility on `date` (backend default:
    /// today, UTC).
    pub async fn facility_irrigations(
        &self,
        facility_id: &FacilityId,
        date: Option<NaiveDate>,
    ) -> Result<Arc<FacilityIrrigations>, CoreError> {
        let api = self.inner.api.clone();
        let id = facility_id.clone();
        self.inner
            .query(QueryKey::FacilityIrrigations(facility_id.clone(), date), move || {
                let (api, id) = (api.clone(), id.clone());
                async move {
                    let day = api.list_facility_irrigations(id.as_str(), date).await?;
                    FacilityIrrigations::try_from(day)
                }
            })
            .await
    }

    /// Last irrigation, event count and water used on `today`.
    ///
    /// A plot that was never irrigated yields an empty summary.
    pub async fn irrigation_summary(
        &self,
        plot_id: &PlotId,
        today: NaiveDate,
    ) -> Result<IrrigationSummary, CoreError> {
        let (last, events) = tokio::join!(self.last_irrigation(plot_id), self.irrigations(plot_id));
        let last = last?.map(|l| (*l).clone());
        let events = match events {
            Ok(events) => events,
            Err(CoreError::NotFound { .. }) => Arc::new(Vec::new()),
            Err(e) => return Err(e),
        };
        Ok(IrrigationSummary::build(plot_id.clone(), last, &events, today))
    }

    pub async fn species(&self) -> Result<Arc<Vec<Species>>, CoreError> {
        let api = self.inner.api.clone();
        self.inner
            .query(QueryKey::Species, move || {
                let api = api.clone();
                async move {
                    let list = api.list_species().await?;
                    Ok::<_, CoreError>(list.into_iter().map(Species::from).collect::<Vec<_>>())
                }
            })
            .await
    }

    /// The plot's thresholds, or `None` when none were configured.
    pub async fn thresholds(
        &self,
        plot_id: &PlotId,
    ) -> Result<Option<Arc<SpeciesThresholds>>, CoreError> {
        self.inner.thresholds(plot_id).await
    }

    pub async fn responsibles(
        &self,
        facility_id: &FacilityId,
    ) -> Result<Arc<ResponsibleSet>, CoreError> {
        let api = self.inner.api.clone();
        let id = facility_id.clone();
        self.inner
            .query(QueryKey::Responsibles(facility_id.clone()), move || {
                let (api, id) = (api.clone(), id.clone());
                async move {
                    let emails = api.get_responsibles(id.as_str()).await?;
                    Ok::<_, CoreError>(ResponsibleSet::from_server(emails))
                }
            })
            .await
    }

    // ── Mutations ────────────────────────────────────────────────────

    pub async fn create_facility(&self, input: NewFacility) -> Result<Facility, CoreError> {
        let input = input.validated()?;
        let body = CreateFacilityBody {
            name: input.name,
            location: input.location,
        };
        let created = self.inner.mutate(self.inner.api.create_facility(&body)).await?;
        self.inner.cache.invalidate(&QueryKey::Facilities);
        info!(facility = %created.facility_id, "facility created");
        Ok(Facility::from(created))
    }

    pub async fn create_species(&self, name: &str) -> Result<Species, CoreError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(CoreError::validation("Species name is required"));
        }
        let body = CreateSpeciesBody {
            name: name.to_owned(),
        };
        let created = self.inner.mutate(self.inner.api.create_species(&body)).await?;
        self.inner.cache.invalidate(&QueryKey::Species);
        info!(species = %created.name, "species created");
        Ok(Species::from(created))
    }

    /// Create a plot. A species name that is not registered yet is
    /// created first.
    pub async fn create_plot(&self, input: NewPlot) -> Result<PlotCreation, CoreError> {
        let input = input.validated()?;

        let new_species = match input.species.as_deref() {
            Some(name) => {
                let known = self.species().await?;
                if known.iter().any(|s| s.is_named(name)) {
                    None
                } else {
                    Some(self.create_species(name).await?)
                }
            }
            None => None,
        };

        let facility_id = input.facility_id.clone();
        let body = CreatePlotBody::from(input);
        let created = self.inner.mutate(self.inner.api.create_plot(&body)).await?;
        self.inner
            .cache
            .invalidate(&QueryKey::FacilityPlots(facility_id.clone()));
        info!(plot = %created.plot_id, facility = %facility_id, "plot created");

        Ok(PlotCreation {
            plot: Plot::from(created),
            new_species,
        })
    }

    // ── Editors ──────────────────────────────────────────────────────

    /// Load a facility's responsibles into an optimistic editor.
    pub async fn responsibles_editor(
        &self,
        facility_id: &FacilityId,
    ) -> Result<ResponsiblesEditor, CoreError> {
        let current = self.responsibles(facility_id).await?;
        Ok(ResponsiblesEditor::new(
            facility_id.clone(),
            Arc::clone(&self.inner),
            (*current).clone(),
        ))
    }

    /// Load a plot's thresholds into an editor in the `Viewing` phase.
    pub async fn threshold_editor(&self, plot_id: &PlotId) -> Result<ThresholdEditor, CoreError> {
        let current = self.inner.thresholds(plot_id).await?;
        Ok(ThresholdEditor::new(
            plot_id.clone(),
            Arc::clone(&self.inner),
            current.map(|t| (*t).clone()),
        ))
    }
}

impl DashboardInner {
    fn ensure_session(&self) -> Result<(), CoreError> {
        if self.session.is_authenticated() {
            Ok(())
        } else {
            Err(CoreError::Unauthorized {
                message: "not signed in".into(),
            })
        }
    }

    fn end_session(&self) {
        self.session.logout();
        self.cache.clear();
    }

    /// Apply the session side effects of `result`.
    pub(crate) fn observe<T>(&self, result: Result<T, CoreError>) -> Result<T, CoreError> {
        if let Err(err) = &result {
            if err.is_unauthorized() {
                warn!(error = %err, "backend rejected the session");
                self.end_session();
            }
        }
        result
    }

    pub(crate) async fn query<T, F, Fut>(&self, key: QueryKey, fetcher: F) -> Result<Arc<T>, CoreError>
    where
        T: Send + Sync + 'static,
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, CoreError>> + Send + 'static,
    {
        self.ensure_session()?;
        let result = self.cache.fetch(key, fetcher).await;
        self.observe(result)
    }

    /// Like [`query`](Self::query), with NotFound mapped to `None`.
    pub(crate) async fn query_optional<T, F, Fut>(
        &self,
        key: QueryKey,
        fetcher: F,
    ) -> Result<Option<Arc<T>>, CoreError>
    where
        T: Send + Sync + 'static,
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, CoreError>> + Send + 'static,
    {
        match self.query(key, fetcher).await {
            Ok(value) => Ok(Some(value)),
            Err(CoreError::NotFound { .. }) => Ok(None),
            Err(err) => Err(err),
        }
    }

    /// Run one gateway mutation under the session rules.
    pub(crate) async fn mutate<T, Fut>(&self, call: Fut) -> Result<T, CoreError>
    where
        Fut: Future<Output = Result<T, agrosync_api::Error>>,
    {
        self.ensure_session()?;
        let result = call.await.map_err(CoreError::from);
        self.observe(result)
    }

    /// Run an optimistic mutation under the session rules.
    pub(crate) async fn mutate_optimistic<T, F, Fut>(
        &self,
        state: &OptimisticState<T>,
        next: T,
        send: F,
    ) -> Result<Arc<T>, CoreError>
    where
        T: Send + Sync + 'static,
        F: FnOnce(Arc<T>) -> Fut,
        Fut: Future<Output = Result<T, CoreError>>,
    {
        self.ensure_session()?;
        let result = state.apply(next, send).await;
        self.observe(result)
    }

    pub(crate) async fn thresholds(
        &self,
        plot_id: &PlotId,
    ) -> Result<Option<Arc<SpeciesThresholds>>, CoreError> {
        let api = self.api.clone();
        let id = plot_id.clone();
        self.query_optional(QueryKey::Thresholds(plot_id.clone()), move || {
            let (api, id) = (api.clone(), id.clone());
            async move {
                let body = api.get_plot_thresholds(id.as_str()).await?;
                Ok::<_, CoreError>(SpeciesThresholds::from(body))
            }
        })
        .await
    }
}

impl std::fmt::Debug for Dashboard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dashboard")
            .field("api", self.inner.api.base_url())
            .field("cache", &self.inner.cache)
            .field("authenticated", &self.inner.session.is_authenticated())
            .finish()
    }
}
