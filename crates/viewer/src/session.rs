use catalog::{CatalogError, ContentKind, CountryRecord, DisplayImage, ImageKind, ImageLoad, ImageRef};
use foundation::ids::Generation;
use formats::{GeoDataset, GeoFeature, SeedAlias};
use runtime::{AutoRotation, Completion, Counter, Event, EventBus, Frame, Metrics, RequestTracker, Ticket};
use scene::{
    Camera, CountryCode, CountryIndex, CountryVisuals, Identifier, PickOptions, SelectionMachine, SelectionObserver,
    TapClassifier, TouchPoint, TouchVerdict, Transition, Viewport, pick_screen,
};
use tracing::{debug, info, warn};

use crate::config::{ConfigError, GlobeConfig};
use crate::panel::{CountryPanel, PanelState};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectError {
    /// No country matches the identifier; the selection is unchanged.
    UnresolvedIdentifier(String),
    /// A country was picked but has no alpha-3 code.
    UnknownCountry { id: String, name: String },
}

impl std::fmt::Display for SelectError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SelectError::UnresolvedIdentifier(id) => write!(f, "no country matches identifier {id:?}"),
            SelectError::UnknownCountry { id, name } => write!(f, "country {name:?} (id {id:?}) has no alpha-3 code"),
        }
    }
}

impl std::error::Error for SelectError {}

/// A metadata request bound to the selection generation it was issued in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    pub generation: Generation,
    pub code: CountryCode,
    request: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    Applied,
    /// Issued before the latest selection change; discarded.
    Stale,
}

/// A picture for the shown panel: decoded in place, or to be fetched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageRequest {
    Ready(DisplayImage),
    Fetch(ImageTicket),
}

/// An image fetch bound to the selection generation it was issued in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageTicket {
    pub generation: Generation,
    pub code: CountryCode,
    pub kind: ImageKind,
    pub src: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    Picked { code: Option<CountryCode> },
    Missed,
    TapIgnored,
    Selected { code: CountryCode },
    Deselected { code: CountryCode },
    FetchApplied { code: CountryCode },
    StaleDropped { code: CountryCode },
}

/// One interactive globe: meshes, selection, rotation and the info panel.
///
/// Input handlers and fetch completions run between frames on the same
/// thread as `tick`.
pub struct GlobeSession {
    config: GlobeConfig,
    index: CountryIndex,
    visuals: CountryVisuals,
    selection: SelectionMachine,
    fetches: RequestTracker<CountryCode>,
    rotation: AutoRotation,
    metrics: Metrics,
    events: EventBus<SessionEvent>,
    camera: Camera,
    viewport: Viewport,
    pick_options: PickOptions,
    taps: TapClassifier,
    touch_start: Option<TouchPoint>,
    frame: Frame,
    panel: PanelState,
}

impl std::fmt::Debug for GlobeSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GlobeSession")
            .field("countries", &self.index.len())
            .field("selection", self.selection.state())
            .field("generation", &self.fetches.current())
            .field("frame", &self.frame.index)
            .finish()
    }
}

impl GlobeSession {
    pub fn new(features: &[GeoFeature], config: GlobeConfig, viewport: Viewport) -> Result<Self, ConfigError> {
        config.validate()?;
        let mesh_options = config.mesh_options()?;
        info!(
            features = features.len(),
            triangulation = mesh_options.triangulation.as_str(),
            "building country index"
        );
        let index = CountryIndex::build(features, &mesh_options);

        let report = index.report().clone();
        let mut metrics = Metrics::new();
        metrics.add(Counter::DegenerateRings, report.degenerate_rings as u64);
        if report.triangulation_failures > 0 {
            warn!(failures = report.triangulation_failures, "some polygons could not be triangulated");
        }

        Ok(Self {
            visuals: CountryVisuals::for_index(&index),
            index,
            selection: SelectionMachine::new(),
            fetches: RequestTracker::new(),
            rotation: AutoRotation::new(config.globe_speed, config.cloud_drift),
            metrics,
            events: EventBus::new(),
            camera: Camera::default(),
            viewport,
            pick_options: config.pick_options(),
            taps: config.tap_classifier(),
            touch_start: None,
            frame: Frame::first(),
            panel: PanelState::Hidden,
            config,
        })
    }

    pub fn from_dataset(dataset: &GeoDataset, config: GlobeConfig, viewport: Viewport) -> Result<Self, ConfigError> {
        if dataset.skipped > 0 {
            debug!(skipped = dataset.skipped, "dataset features without areal geometry were skipped");
        }
        Self::new(&dataset.features, config, viewport)
    }

    /// Adds seed aliases and re-derives which code each slot highlights as.
    pub fn seed_aliases(&mut self, seeds: &[SeedAlias]) {
        self.index.seed_aliases(seeds);
        self.visuals.refresh_codes(&self.index);
    }

    pub fn add_observer(&mut self, observer: Box<dyn SelectionObserver>) {
        self.selection.add_observer(observer);
    }

    pub fn config(&self) -> &GlobeConfig {
        &self.config
    }

    pub fn index(&self) -> &CountryIndex {
        &self.index
    }

    pub fn visuals(&self) -> &CountryVisuals {
        &self.visuals
    }

    pub fn selected(&self) -> Option<&CountryCode> {
        self.selection.highlighted()
    }

    pub fn rotation(&self) -> &AutoRotation {
        &self.rotation
    }

    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    pub fn events(&self) -> &[Event<SessionEvent>] {
        self.events.events()
    }

    pub fn drain_events(&mut self) -> Vec<Event<SessionEvent>> {
        self.events.drain()
    }

    pub fn panel(&self) -> &PanelState {
        &self.panel
    }

    pub fn generation(&self) -> Generation {
        self.fetches.current()
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn set_camera(&mut self, camera: Camera) {
        self.camera = camera;
    }

    pub fn resize(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    /// Per-frame callback. Returns `true` if the globe turned.
    pub fn tick(&mut self, frame: Frame) -> bool {
        self.frame = frame;
        self.rotation.advance(self.selection.rotation_suspended())
    }

    /// Picks at a pointer position and selects whatever country is hit.
    ///
    /// A miss is `Ok(Transition::Rejected)`. A hit whose identity cannot be
    /// resolved is `SelectError::UnknownCountry`. Both leave the selection
    /// as it was.
    pub fn on_click(&mut self, x_px: f64, y_px: f64) -> Result<Transition, SelectError> {
        let camera = self.camera.in_globe_frame(self.rotation.globe_yaw_rad());
        let outcome = pick_screen(&self.index, x_px, y_px, &camera, self.viewport, self.pick_options);
        self.metrics.inc(Counter::Picks);
        self.metrics.record_pick_candidates(outcome.candidates);

        let Some(hit) = outcome.hit else {
            self.metrics.inc(Counter::PickMisses);
            self.events.emit(self.frame, SessionEvent::Missed);
            return Ok(self.selection.select(None, &mut self.visuals));
        };

        let Some(code) = self.index.resolve(&hit.country_id) else {
            self.metrics.inc(Counter::UnresolvedIdentifiers);
            self.events.emit(self.frame, SessionEvent::Picked { code: None });
            debug!(id = %hit.country_id, name = %hit.country_name, "picked country has no alpha-3 code");
            return Err(SelectError::UnknownCountry {
                id: hit.country_id.text(),
                name: hit.country_name,
            });
        };
        self.events.emit(self.frame, SessionEvent::Picked { code: Some(code.clone()) });
        let transition = self.selection.select(Some(code), &mut self.visuals);
        self.after_transition(&transition);
        Ok(transition)
    }

    pub fn on_touch_start(&mut self, x_px: f64, y_px: f64, time_ms: f64) {
        self.touch_start = Some(TouchPoint::new(x_px, y_px, time_ms));
    }

    /// Ends a touch; taps pick like clicks. Returns `None` for drags, long
    /// presses, or an end without a start.
    pub fn on_touch_end(&mut self, x_px: f64, y_px: f64, time_ms: f64) -> Option<Result<Transition, SelectError>> {
        let start = self.touch_start.take()?;
        match self.taps.classify(start, TouchPoint::new(x_px, y_px, time_ms)) {
            TouchVerdict::Tap { x_px, y_px } => Some(self.on_click(x_px, y_px)),
            TouchVerdict::Ignored => {
                self.metrics.inc(Counter::TapsIgnored);
                self.events.emit(self.frame, SessionEvent::TapIgnored);
                None
            }
        }
    }

    /// Selects a country by any alias (numeric id, code or name).
    pub fn select_by_alias(&mut self, id: &Identifier) -> Result<Transition, SelectError> {
        let Some(code) = self.index.resolve(id) else {
            self.metrics.inc(Counter::UnresolvedIdentifiers);
            warn!(%id, "cannot select unknown country");
            return Err(SelectError::UnresolvedIdentifier(id.text()));
        };
        let transition = self.selection.select(Some(code), &mut self.visuals);
        self.after_transition(&transition);
        Ok(transition)
    }

    pub fn deselect(&mut self) -> Transition {
        let transition = self.selection.deselect(&mut self.visuals);
        self.after_transition(&transition);
        transition
    }

    fn after_transition(&mut self, transition: &Transition) {
        if !transition.is_effective() {
            return;
        }
        let cancelled = self.fetches.advance();
        match transition {
            Transition::Selected { code, .. } => {
                self.metrics.inc(Counter::Selections);
                self.events.emit(self.frame, SessionEvent::Selected { code: code.clone() });
                self.panel = PanelState::Loading(code.clone());
            }
            Transition::Deselected { previous } => {
                self.metrics.inc(Counter::Deselections);
                self.events.emit(self.frame, SessionEvent::Deselected { code: previous.clone() });
                self.panel = PanelState::Hidden;
            }
            Transition::Unchanged | Transition::Rejected => {}
        }
        debug!(generation = %self.fetches.current(), cancelled, "selection generation advanced");
    }

    /// Issues a metadata request for the selected country.
    pub fn begin_fetch(&mut self) -> Option<FetchTicket> {
        let code = self.selection.highlighted()?.clone();
        let ticket = self.fetches.issue(code.clone());
        self.metrics.inc(Counter::FetchesIssued);
        Some(FetchTicket {
            generation: ticket.generation,
            code,
            request: ticket.id,
        })
    }

    /// Applies a metadata response if its ticket is still current.
    pub fn complete_fetch(&mut self, ticket: FetchTicket, result: Result<CountryRecord, CatalogError>) -> FetchOutcome {
        let (completion, _) = self.fetches.complete(Ticket {
            id: ticket.request,
            generation: ticket.generation,
        });
        if completion == Completion::Stale {
            self.metrics.inc(Counter::StaleResultsDropped);
            self.events.emit(self.frame, SessionEvent::StaleDropped { code: ticket.code.clone() });
            debug!(code = %ticket.code, generation = %ticket.generation, "dropped stale metadata response");
            return FetchOutcome::Stale;
        }

        self.panel = match result {
            Ok(record) => {
                let panel = CountryPanel::new(record, &self.config.api_base);
                self.metrics.add(Counter::ImageFallbacks, panel.images.fallbacks() as u64);
                PanelState::Shown(Box::new(panel))
            }
            Err(CatalogError::NotFound) => PanelState::Unknown(ticket.code.clone()),
            Err(err) => {
                warn!(code = %ticket.code, %err, "metadata request failed");
                PanelState::Error {
                    code: ticket.code.clone(),
                    message: err.to_string(),
                }
            }
        };
        self.metrics.inc(Counter::FetchesApplied);
        self.events.emit(self.frame, SessionEvent::FetchApplied { code: ticket.code });
        FetchOutcome::Applied
    }

    /// Merges generated basic info into the shown record of `code`.
    pub fn apply_generated_info(&mut self, code: &CountryCode, text: &str) -> usize {
        self.panel.fill_generated(code, text)
    }

    /// Content the shown country lacks.
    pub fn missing_content(&self) -> Vec<ContentKind> {
        self.panel.missing_content()
    }

    /// Starts showing one picture of the shown country.
    ///
    /// Inline payloads are decoded immediately; remote and relative images
    /// come back as a ticket for [`GlobeSession::complete_image_load`].
    pub fn load_image(&mut self, kind: ImageKind) -> Option<ImageRequest> {
        let generation = self.fetches.current();
        let PanelState::Shown(panel) = &mut self.panel else {
            return None;
        };
        let reference = panel.record.image(kind).map_or(ImageRef::Unknown, ImageRef::classify);
        let load = match reference.inline_bytes() {
            Some(Ok(bytes)) => ImageLoad::Loaded(bytes),
            Some(Err(err)) => {
                debug!(code = %panel.record.alpha3_code, kind = kind.as_str(), %err, "inline image does not decode");
                self.metrics.inc(Counter::ImageFallbacks);
                ImageLoad::Failed
            }
            None => match reference.to_src(&self.config.api_base) {
                Some(src) => {
                    return Some(ImageRequest::Fetch(ImageTicket {
                        generation,
                        code: CountryCode::new(panel.record.alpha3_code.clone()),
                        kind,
                        src,
                    }));
                }
                None => ImageLoad::Failed,
            },
        };
        let shown = DisplayImage::from_load(load, kind);
        panel.set_display(kind, shown.clone());
        Some(ImageRequest::Ready(shown))
    }

    /// Shows a fetched picture if its ticket still matches the shown panel.
    /// A failed load shows the kind's placeholder.
    pub fn complete_image_load(&mut self, ticket: ImageTicket, load: ImageLoad) -> FetchOutcome {
        let current = self.fetches.current();
        let panel = match &mut self.panel {
            PanelState::Shown(panel)
                if ticket.generation == current && panel.record.alpha3_code == ticket.code.as_str() =>
            {
                panel
            }
            _ => {
                self.metrics.inc(Counter::StaleResultsDropped);
                self.events.emit(self.frame, SessionEvent::StaleDropped { code: ticket.code.clone() });
                debug!(code = %ticket.code, kind = ticket.kind.as_str(), "dropped stale image");
                return FetchOutcome::Stale;
            }
        };
        let shown = DisplayImage::from_load(load, ticket.kind);
        if shown.is_fallback() {
            self.metrics.inc(Counter::ImageFallbacks);
            warn!(code = %ticket.code, src = %ticket.src, "image failed to load, showing placeholder");
        }
        panel.set_display(ticket.kind, shown);
        FetchOutcome::Applied
    }
}
