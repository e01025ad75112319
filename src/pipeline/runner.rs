//! Coordinator: owns the session and reacts to every event.
//!
//! [`Coordinator`] owns the [`SharedState`], the drawing surface and the
//! stroke renderer, and handles [`Event`]s received over a
//! `tokio::sync::mpsc` channel one at a time.  Camera frames, timers and
//! recognition results all arrive on that same channel, so no two handlers
//! ever run concurrently.
//!
//! # Recognition flow
//!
//! ```text
//! Tracking(Hand(pen down))  → draw segment                  [Drawing]
//! Tracking(Hand(pen up))    → arm debounce                  [PendingRecognition]
//! Timer(Recognize)          → preprocess
//!     ├─ no ink             → NoChar, revert later           [NoContent]
//!     └─ tile               → spawn_blocking(recognize)      [Recognizing]
//! RecognitionFinished
//!     ├─ char               → append, clear later            [Recognized]
//!     ├─ empty              → clear later                    [NotRecognized]
//!     └─ error              → keep ink                       [RecognitionFailed]
//! ```
//!
//! Recognition runs on the blocking pool.  Every explicit clear bumps a
//! generation counter; a result started under an older generation is
//! dropped on arrival.

use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::mpsc;

use crate::canvas::{map_to_surface, preprocess, DrawingSurface, StrokeRenderer};
use crate::config::{AppConfig, Preferences};
use crate::i18n::MessageKey;
use crate::ocr::{OcrError, Recognition, RecognitionEngine, RecognizeParams};
use crate::tracking::{
    Camera, CameraRequest, FrameLoop, HandLandmarks, HandTracker, PenState, TrackingEvent,
};

use super::scheduler::{Debounce, Scheduler, TimerId};
use super::state::{PipelineState, SharedState, Status, StatusKind};

// ---------------------------------------------------------------------------
// Event
// ---------------------------------------------------------------------------

/// Everything the coordinator reacts to.
#[derive(Debug)]
pub enum Event {
    StartCamera,
    StopCamera,
    /// Wipe the surface, the output and the confidence.
    Clear,
    ToggleDrawing,
    ToggleLanguage,
    Tracking(TrackingEvent),
    Timer(TimerKind, TimerId),
    RecognitionFinished {
        generation: u64,
        outcome: Result<Recognition, OcrError>,
    },
    /// Stop [`Coordinator::run`].
    Shutdown,
}

impl From<TrackingEvent> for Event {
    fn from(event: TrackingEvent) -> Self {
        Event::Tracking(event)
    }
}

/// What a timer does when it fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerKind {
    /// The debounce quiet period elapsed.
    Recognize,
    /// Wipe the surface after a recognition, then show `next_status`.
    ClearSurface { next_status: Option<Status> },
    /// Go back to "ready" if the camera is on, otherwise to `when_inactive`.
    RevertStatus { when_inactive: Option<Status> },
}

// ---------------------------------------------------------------------------
// Coordinator
// ---------------------------------------------------------------------------

/// Drives one air-writing session.
///
/// ```rust,no_run
/// use std::sync::Arc;
/// use air_writer::config::AppConfig;
/// use air_writer::i18n::Language;
/// use air_writer::pipeline::{new_shared_state, Coordinator, Event};
///
/// # async fn example() {
/// # use air_writer::ocr::RecognitionEngine;
/// # use air_writer::tracking::{Camera, HandTracker};
/// # fn make_engine() -> Arc<dyn RecognitionEngine> { unimplemented!() }
/// # fn make_camera() -> Arc<dyn Camera> { unimplemented!() }
/// # fn make_tracker() -> Arc<dyn HandTracker> { unimplemented!() }
/// let state = new_shared_state(Language::En);
/// let (tx, rx) = tokio::sync::mpsc::channel(64);
/// let coordinator = Coordinator::new(
///     AppConfig::default(),
///     state,
///     make_engine(),
///     make_camera(),
///     make_tracker(),
///     tx.clone(),
/// );
/// tokio::spawn(coordinator.run(rx));
/// tx.send(Event::StartCamera).await.unwrap();
/// # }
/// ```
pub struct Coordinator {
    config: AppConfig,
    state: SharedState,
    surface: DrawingSurface,
    renderer: StrokeRenderer,

    engine: Arc<dyn RecognitionEngine>,
    params: RecognizeParams,

    camera: Arc<dyn Camera>,
    tracker: Arc<dyn HandTracker>,
    frame_loop: Option<FrameLoop>,

    events: mpsc::Sender<Event>,
    scheduler: Scheduler<Event>,
    recognize_timer: Debounce,
    clear_timer: Debounce,
    status_timer: Debounce,

    in_flight: bool,
    generation: u64,

    preferences_path: Option<PathBuf>,
}

impl Coordinator {
    /// Create a coordinator.
    ///
    /// `events` must be the sending half of the channel later passed to
    /// [`run`](Self::run); timers, the frame loop and recognition workers
    /// report back through it.
    pub fn new(
        config: AppConfig,
        state: SharedState,
        engine: Arc<dyn RecognitionEngine>,
        camera: Arc<dyn Camera>,
        tracker: Arc<dyn HandTracker>,
        events: mpsc::Sender<Event>,
    ) -> Self {
        Self {
            surface: DrawingSurface::from_config(&config.canvas),
            renderer: StrokeRenderer::from_config(&config.canvas),
            params: RecognizeParams::from(&config.recognition),
            scheduler: Scheduler::new(events.clone()),
            config,
            state,
            engine,
            camera,
            tracker,
            frame_loop: None,
            events,
            recognize_timer: Debounce::new(),
            clear_timer: Debounce::new(),
            status_timer: Debounce::new(),
            in_flight: false,
            generation: 0,
            preferences_path: None,
        }
    }

    /// Persist language changes to `path`.
    pub fn with_preferences_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.preferences_path = Some(path.into());
        self
    }

    pub fn surface(&self) -> &DrawingSurface {
        &self.surface
    }

    // -----------------------------------------------------------------------
    // Main async loop
    // -----------------------------------------------------------------------

    /// Handle events until [`Event::Shutdown`] arrives or every sender is gone.
    pub async fn run(mut self, mut rx: mpsc::Receiver<Event>) {
        while let Some(event) = rx.recv().await {
            if matches!(event, Event::Shutdown) {
                break;
            }
            self.handle(event);
        }

        log::info!("pipeline: coordinator shutting down");
    }

    /// Apply a single event.  Must be called from within a tokio runtime.
    pub fn handle(&mut self, event: Event) {
        match event {
            Event::StartCamera => self.start_camera(),
            Event::StopCamera => self.stop_camera(),
            Event::Clear => self.clear(),
            Event::ToggleDrawing => self.toggle_drawing(),
            Event::ToggleLanguage => self.toggle_language(),
            Event::Tracking(tracking) => self.on_tracking(tracking),
            Event::Timer(kind, id) => self.on_timer(kind, id),
            Event::RecognitionFinished {
                generation,
                outcome,
            } => self.on_recognition(generation, outcome),
            Event::Shutdown => {}
        }
    }

    // -----------------------------------------------------------------------
    // Camera
    // -----------------------------------------------------------------------

    fn start_camera(&mut self) {
        {
            let mut st = self.state.lock().unwrap();
            if st.camera_active || st.camera_starting {
                log::debug!("pipeline: camera already on, ignoring start");
                return;
            }
            st.camera_starting = true;
            st.stream_ended = false;
            st.status = Status::new(MessageKey::StatusStarting, StatusKind::Loading);
        }

        let request = CameraRequest::from(&self.config.camera);
        self.frame_loop = Some(FrameLoop::spawn(
            Arc::clone(&self.camera),
            Arc::clone(&self.tracker),
            request,
            self.events.clone(),
        ));
    }

    fn stop_camera(&mut self) {
        {
            let mut st = self.state.lock().unwrap();
            if !st.camera_active && !st.camera_starting {
                return;
            }
            st.status = Status::new(MessageKey::StatusStopping, StatusKind::Loading);
        }

        self.frame_loop = None;
        self.end_stroke();

        let mut st = self.state.lock().unwrap();
        st.camera_active = false;
        st.camera_starting = false;
        st.status = Status::new(MessageKey::StatusOff, StatusKind::Loading);
        log::info!("pipeline: camera stopped");
    }

    fn on_tracking(&mut self, event: TrackingEvent) {
        match event {
            TrackingEvent::Started => {
                let mut st = self.state.lock().unwrap();
                if !st.camera_starting {
                    return;
                }
                st.camera_starting = false;
                st.camera_active = true;
                st.status = Status::new(MessageKey::StatusActive, StatusKind::Active);
            }
            TrackingEvent::Failed(e) => {
                log::error!("pipeline: camera error: {e}");
                self.frame_loop = None;
                let mut st = self.state.lock().unwrap();
                st.camera_starting = false;
                st.camera_active = false;
                st.status = Status::new(MessageKey::StatusError, StatusKind::Error);
            }
            TrackingEvent::Hand(hand) => self.on_hand(hand),
            TrackingEvent::Ended => {
                self.end_stroke();
                self.state.lock().unwrap().stream_ended = true;
            }
        }
    }

    // -----------------------------------------------------------------------
    // Drawing
    // -----------------------------------------------------------------------

    fn on_hand(&mut self, hand: Option<HandLandmarks>) {
        let (active, enabled) = {
            let st = self.state.lock().unwrap();
            (st.camera_active, st.drawing_enabled)
        };
        if !active {
            return;
        }

        match hand {
            None => self.end_stroke(),
            Some(_) if !enabled => {}
            Some(landmarks) => match PenState::from_hand(Some(&landmarks)) {
                PenState::Down => self.draw_point(&landmarks),
                PenState::Up => self.end_stroke(),
            },
        }
    }

    fn draw_point(&mut self, landmarks: &HandLandmarks) {
        {
            let mut st = self.state.lock().unwrap();
            if !st.is_drawing {
                st.is_drawing = true;
                st.status = Status::new(MessageKey::StatusDrawing, StatusKind::Active);
                st.pipeline = PipelineState::Drawing;
                // The quiet period restarts from the end of this stroke.
                self.recognize_timer.cancel();
                self.status_timer.cancel();
            }
        }

        let point = map_to_surface(
            landmarks.index_tip(),
            self.surface.width(),
            self.surface.height(),
        );
        self.renderer.draw_to(&mut self.surface, point);
    }

    /// Pen up.  Arms the recognition debounce if a stroke was in progress
    /// and the camera is on.
    fn end_stroke(&mut self) {
        self.renderer.lift();

        let mut st = self.state.lock().unwrap();
        if !st.is_drawing {
            return;
        }
        st.is_drawing = false;

        if !st.camera_active {
            st.pipeline = PipelineState::Idle;
            return;
        }

        st.status = Status::new(MessageKey::StatusReady, StatusKind::Active);
        // The engine is still busy with the previous glyph; this stroke waits
        // behind it.
        st.pipeline = if self.in_flight {
            PipelineState::Recognizing
        } else {
            PipelineState::PendingRecognition
        };
        drop(st);

        self.recognize_timer.arm(
            &mut self.scheduler,
            self.config.recognition.debounce(),
            |id| Event::Timer(TimerKind::Recognize, id),
        );
    }

    /// Wipe the surface and end any stroke in progress.
    fn clear_surface(&mut self) {
        self.surface.clear();
        self.end_stroke();
    }

    // -----------------------------------------------------------------------
    // Timers
    // -----------------------------------------------------------------------

    fn on_timer(&mut self, kind: TimerKind, id: TimerId) {
        match kind {
            TimerKind::Recognize => {
                if self.recognize_timer.fire(id) {
                    self.start_recognition();
                }
            }
            TimerKind::ClearSurface { next_status } => {
                if !self.clear_timer.fire(id) {
                    return;
                }
                self.clear_surface();
                let mut st = self.state.lock().unwrap();
                if let Some(status) = next_status {
                    st.status = status;
                }
                if matches!(
                    st.pipeline,
                    PipelineState::Recognized | PipelineState::NotRecognized
                ) {
                    st.pipeline = PipelineState::Idle;
                }
            }
            TimerKind::RevertStatus { when_inactive } => {
                if !self.status_timer.fire(id) {
                    return;
                }
                let mut st = self.state.lock().unwrap();
                if st.camera_active {
                    st.status = Status::new(MessageKey::StatusReady, StatusKind::Active);
                } else if let Some(status) = when_inactive {
                    st.status = status;
                }
                if st.pipeline == PipelineState::NoContent {
                    st.pipeline = PipelineState::Idle;
                }
            }
        }
    }

    // -----------------------------------------------------------------------
    // Recognition
    // -----------------------------------------------------------------------

    fn start_recognition(&mut self) {
        if self.in_flight {
            log::debug!("pipeline: recognition in flight, re-arming debounce");
            self.recognize_timer.arm(
                &mut self.scheduler,
                self.config.recognition.debounce(),
                |id| Event::Timer(TimerKind::Recognize, id),
            );
            return;
        }

        self.set_status(
            Status::new(MessageKey::StatusRecognizing, StatusKind::Loading),
            PipelineState::Recognizing,
        );

        let tile = match preprocess(&self.surface, &self.config.preprocess) {
            Ok(Some(tile)) => tile,
            Ok(None) => {
                log::debug!("pipeline: nothing drawn, skipping recognition");
                self.set_status(
                    Status::new(MessageKey::StatusNoChar, StatusKind::Error),
                    PipelineState::NoContent,
                );
                self.status_timer.arm(
                    &mut self.scheduler,
                    self.config.recognition.status_revert(),
                    |id| Event::Timer(TimerKind::RevertStatus { when_inactive: None }, id),
                );
                return;
            }
            Err(e) => {
                log::error!("pipeline: preprocessing failed: {e}");
                self.set_status(
                    Status::new(MessageKey::StatusRecognitionFailed, StatusKind::Error),
                    PipelineState::RecognitionFailed,
                );
                return;
            }
        };

        log::debug!(
            "pipeline: recognising {}x{} tile (generation {})",
            tile.side(),
            tile.side(),
            self.generation
        );

        self.in_flight = true;
        let engine = Arc::clone(&self.engine);
        let params = self.params.clone();
        let events = self.events.clone();
        let generation = self.generation;
        let png = tile.png;

        tokio::spawn(async move {
            let outcome =
                match tokio::task::spawn_blocking(move || engine.recognize(&png, &params)).await {
                    Ok(result) => result,
                    Err(e) => Err(OcrError::Internal(e.to_string())),
                };
            let _ = events
                .send(Event::RecognitionFinished {
                    generation,
                    outcome,
                })
                .await;
        });
    }

    fn on_recognition(&mut self, generation: u64, outcome: Result<Recognition, OcrError>) {
        self.in_flight = false;

        if generation != self.generation {
            log::debug!(
                "pipeline: discarding result from generation {generation} (now {})",
                self.generation
            );
            return;
        }

        let (status, phase, clear_after) = match outcome {
            Ok(recognition) => match recognition.first_char() {
                Some(c) => {
                    let percent = recognition.confidence_percent();
                    log::info!("pipeline: recognised {c:?} ({percent}%)");
                    let mut st = self.state.lock().unwrap();
                    st.output.push(c);
                    st.confidence = Some(percent);
                    drop(st);
                    (
                        Status::new(MessageKey::StatusRecognized, StatusKind::Active),
                        PipelineState::Recognized,
                        Some(Some(Status::new(
                            MessageKey::StatusReadyNext,
                            StatusKind::Active,
                        ))),
                    )
                }
                None => {
                    log::info!("pipeline: engine returned no character");
                    (
                        Status::new(MessageKey::StatusNotRecognized, StatusKind::Error),
                        PipelineState::NotRecognized,
                        Some(None),
                    )
                }
            },
            Err(e) => {
                log::warn!("pipeline: recognition failed: {e}");
                (
                    Status::new(MessageKey::StatusRecognitionFailed, StatusKind::Error),
                    PipelineState::RecognitionFailed,
                    None,
                )
            }
        };

        // A stroke ended while the engine was busy.  Its recognition is still
        // to come and its ink must survive until then.
        let pending = self.recognize_timer.is_pending();
        let phase = if pending {
            PipelineState::PendingRecognition
        } else {
            phase
        };
        self.set_status(status, phase);

        if pending {
            return;
        }
        if let Some(next_status) = clear_after {
            self.clear_timer.arm(
                &mut self.scheduler,
                self.config.recognition.clear_delay(),
                move |id| Event::Timer(TimerKind::ClearSurface { next_status }, id),
            );
        }
    }

    // -----------------------------------------------------------------------
    // User actions
    // -----------------------------------------------------------------------

    fn clear(&mut self) {
        self.generation += 1;
        self.clear_surface();
        self.recognize_timer.cancel();
        self.clear_timer.cancel();

        {
            let mut st = self.state.lock().unwrap();
            st.output.clear();
            st.confidence = None;
            st.status = Status::new(MessageKey::StatusCleared, StatusKind::Active);
            st.pipeline = PipelineState::Idle;
        }
        log::info!("pipeline: cleared (generation {})", self.generation);

        let when_inactive = Status::new(MessageKey::StatusWaiting, StatusKind::Loading);
        self.status_timer.arm(
            &mut self.scheduler,
            self.config.recognition.status_revert(),
            move |id| {
                Event::Timer(
                    TimerKind::RevertStatus {
                        when_inactive: Some(when_inactive),
                    },
                    id,
                )
            },
        );
    }

    fn toggle_drawing(&mut self) {
        let enabled = {
            let mut st = self.state.lock().unwrap();
            st.drawing_enabled = !st.drawing_enabled;
            let key = if st.drawing_enabled {
                MessageKey::StatusDrawingOn
            } else {
                MessageKey::StatusDrawingOff
            };
            st.status = Status::new(key, StatusKind::Active);
            st.drawing_enabled
        };

        if !enabled {
            self.end_stroke();
        }
    }

    fn toggle_language(&mut self) {
        let language = {
            let mut st = self.state.lock().unwrap();
            st.language = st.language.toggled();
            st.language
        };
        log::info!("pipeline: language set to {}", language.code());

        if let Some(path) = &self.preferences_path {
            if let Err(e) = (Preferences { language }).save_to(path) {
                log::warn!("pipeline: could not save language preference: {e}");
            }
        }
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    fn set_status(&self, status: Status, phase: PipelineState) {
        let mut st = self.state.lock().unwrap();
        st.status = status;
        st.pipeline = phase;
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::i18n::Language;
    use crate::ocr::MockRecognitionEngine;
    use crate::pipeline::state::{new_shared_state, SessionState};
    use crate::tracking::{
        CameraError, Frame, FrameStream, Landmark, TrackingError, INDEX_FINGER_PIP,
        INDEX_FINGER_TIP,
    };
    use async_trait::async_trait;
    use std::sync::MutexGuard;
    use std::time::Duration;

    // -----------------------------------------------------------------------
    // Test doubles
    // -----------------------------------------------------------------------

    /// Opens instantly; the stream never yields a frame.
    struct SilentCamera;

    struct SilentStream;

    #[async_trait]
    impl FrameStream for SilentStream {
        async fn next_frame(&mut self) -> Option<Frame> {
            std::future::pending().await
        }
    }

    #[async_trait]
    impl Camera for SilentCamera {
        async fn open(
            &self,
            _request: &CameraRequest,
        ) -> Result<Box<dyn FrameStream>, CameraError> {
            Ok(Box::new(SilentStream))
        }
    }

    struct DeniedCamera;

    #[async_trait]
    impl Camera for DeniedCamera {
        async fn open(
            &self,
            _request: &CameraRequest,
        ) -> Result<Box<dyn FrameStream>, CameraError> {
            Err(CameraError::PermissionDenied)
        }
    }

    struct NoHands;

    #[async_trait]
    impl HandTracker for NoHands {
        async fn detect(&self, _frame: &Frame) -> Result<Option<HandLandmarks>, TrackingError> {
            Ok(None)
        }
    }

    // -----------------------------------------------------------------------
    // Harness
    // -----------------------------------------------------------------------

    struct Harness {
        coordinator: Coordinator,
        rx: mpsc::Receiver<Event>,
        state: SharedState,
        engine: Arc<MockRecognitionEngine>,
    }

    impl Harness {
        fn new(engine: MockRecognitionEngine) -> Self {
            Self::with_camera(engine, Arc::new(SilentCamera))
        }

        fn with_camera(engine: MockRecognitionEngine, camera: Arc<dyn Camera>) -> Self {
            let (tx, rx) = mpsc::channel(64);
            let state = new_shared_state(Language::En);
            let engine = Arc::new(engine);
            let coordinator = Coordinator::new(
                AppConfig::default(),
                Arc::clone(&state),
                Arc::clone(&engine) as Arc<dyn RecognitionEngine>,
                camera,
                Arc::new(NoHands),
                tx,
            );
            Self {
                coordinator,
                rx,
                state,
                engine,
            }
        }

        /// Start the camera and wait until it reports open.
        async fn started(engine: MockRecognitionEngine) -> Self {
            let mut h = Self::new(engine);
            h.send(Event::StartCamera);
            h.pump().await;
            assert!(h.state().camera_active);
            h
        }

        fn send(&mut self, event: Event) {
            self.coordinator.handle(event);
        }

        /// Handle the next event the coordinator sent itself.
        async fn pump(&mut self) -> &'static str {
            let event = self.rx.recv().await.expect("channel open");
            let name = match &event {
                Event::Tracking(TrackingEvent::Started) => "started",
                Event::Tracking(TrackingEvent::Failed(_)) => "failed",
                Event::Tracking(_) => "tracking",
                Event::Timer(TimerKind::Recognize, _) => "recognize",
                Event::Timer(TimerKind::ClearSurface { .. }, _) => "clear-surface",
                Event::Timer(TimerKind::RevertStatus { .. }, _) => "revert-status",
                Event::RecognitionFinished { .. } => "finished",
                _ => "other",
            };
            self.coordinator.handle(event);
            name
        }

        /// Pump until an event named `name` has been handled.
        async fn pump_until(&mut self, name: &str) {
            loop {
                if self.pump().await == name {
                    return;
                }
            }
        }

        fn hand(&mut self, x: f32, y: f32, pen_down: bool) {
            let mut points = [Landmark::new(0.5, 0.5); 21];
            points[INDEX_FINGER_TIP] = Landmark::new(x, y);
            let pip_y = if pen_down { y + 0.05 } else { y - 0.05 };
            points[INDEX_FINGER_PIP] = Landmark::new(x, pip_y);
            self.send(Event::Tracking(TrackingEvent::Hand(Some(HandLandmarks::new(
                points,
            )))));
        }

        fn no_hand(&mut self) {
            self.send(Event::Tracking(TrackingEvent::Hand(None)));
        }

        fn state(&self) -> MutexGuard<'_, SessionState> {
            self.state.lock().unwrap()
        }

        fn surface_blank(&self) -> bool {
            self.coordinator.surface().is_blank()
        }
    }

    fn status_key(h: &Harness) -> MessageKey {
        h.state().status.key
    }

    // -----------------------------------------------------------------------
    // Camera lifecycle
    // -----------------------------------------------------------------------

    #[tokio::test(start_paused = true)]
    async fn start_camera_reports_active() {
        let mut h = Harness::new(MockRecognitionEngine::ok("x", 1.0));
        h.send(Event::StartCamera);
        {
            let st = h.state();
            assert!(st.camera_starting);
            assert!(!st.start_enabled());
            assert_eq!(st.status.key, MessageKey::StatusStarting);
        }

        assert_eq!(h.pump().await, "started");
        let st = h.state();
        assert!(st.camera_active);
        assert!(!st.camera_starting);
        assert_eq!(st.status, Status::new(MessageKey::StatusActive, StatusKind::Active));
    }

    #[tokio::test(start_paused = true)]
    async fn camera_failure_sets_error_and_allows_retry() {
        let mut h =
            Harness::with_camera(MockRecognitionEngine::ok("x", 1.0), Arc::new(DeniedCamera));
        h.send(Event::StartCamera);
        assert_eq!(h.pump().await, "failed");

        let st = h.state();
        assert_eq!(st.status, Status::new(MessageKey::StatusError, StatusKind::Error));
        assert!(!st.camera_active);
        assert!(st.start_enabled());
    }

    #[tokio::test(start_paused = true)]
    async fn hands_are_ignored_while_camera_is_off() {
        let mut h = Harness::new(MockRecognitionEngine::ok("x", 1.0));
        h.hand(0.5, 0.5, true);
        assert!(h.surface_blank());
        assert!(!h.state().is_drawing);
    }

    #[tokio::test(start_paused = true)]
    async fn stopping_mid_stroke_still_schedules_recognition() {
        let mut h = Harness::started(MockRecognitionEngine::ok("L", 80.0)).await;
        h.hand(0.5, 0.5, true);
        h.send(Event::StopCamera);

        {
            let st = h.state();
            assert!(!st.camera_active);
            assert_eq!(st.status.key, MessageKey::StatusOff);
            assert_eq!(st.pipeline, PipelineState::PendingRecognition);
        }

        h.pump_until("finished").await;
        assert_eq!(h.state().output, "L");
    }

    // -----------------------------------------------------------------------
    // Recognition cycle
    // -----------------------------------------------------------------------

    #[tokio::test(start_paused = true)]
    async fn dot_is_recognised_then_cleared() {
        let mut h = Harness::started(MockRecognitionEngine::ok("7", 92.0)).await;

        h.hand(0.5, 0.5, true);
        assert_eq!(status_key(&h), MessageKey::StatusDrawing);
        assert!(!h.surface_blank());

        h.no_hand();
        assert_eq!(status_key(&h), MessageKey::StatusReady);
        assert_eq!(h.state().pipeline, PipelineState::PendingRecognition);

        let before = tokio::time::Instant::now();
        assert_eq!(h.pump().await, "recognize");
        assert!(before.elapsed() >= Duration::from_millis(1500));
        assert_eq!(status_key(&h), MessageKey::StatusRecognizing);

        assert_eq!(h.pump().await, "finished");
        {
            let st = h.state();
            assert_eq!(st.output, "7");
            assert_eq!(st.confidence_label(), "92%");
            assert_eq!(st.status.key, MessageKey::StatusRecognized);
            assert_eq!(st.pipeline, PipelineState::Recognized);
        }
        // The 8 px dot plus 20 px padding on each side.
        let tile = h.engine.last_tile_image().expect("tile");
        let side = tile.width();
        assert_eq!(tile.height(), side);
        assert!((40..=50).contains(&side), "unexpected tile side {side}");

        let padding = AppConfig::default().preprocess.padding;
        let ink: Vec<(u32, u32)> = tile
            .enumerate_pixels()
            .filter(|(_, _, px)| px.0[0] == 0)
            .map(|(x, y, _)| (x, y))
            .collect();
        assert!(tile.pixels().all(|px| px.0[0] == 0 || px.0[0] == 255));
        assert_eq!(ink.iter().map(|p| p.0).min(), Some(padding));
        assert_eq!(ink.iter().map(|p| p.1).min(), Some(padding));
        assert_eq!(ink.iter().map(|p| p.0).max(), Some(side - 1 - padding));
        assert_eq!(ink.iter().map(|p| p.1).max(), Some(side - 1 - padding));
        assert_eq!(tile.get_pixel(side / 2, side / 2).0[0], 0);
        assert!(!h.surface_blank());

        assert_eq!(h.pump().await, "clear-surface");
        assert!(h.surface_blank());
        let st = h.state();
        assert_eq!(st.status.key, MessageKey::StatusReadyNext);
        assert_eq!(st.pipeline, PipelineState::Idle);
        assert_eq!(st.output, "7");
    }

    #[tokio::test(start_paused = true)]
    async fn characters_accumulate() {
        let mut h = Harness::started(MockRecognitionEngine::ok(" A\n", 50.0)).await;

        for _ in 0..2 {
            h.hand(0.3, 0.3, true);
            h.hand(0.4, 0.4, true);
            h.no_hand();
            h.pump_until("clear-surface").await;
        }

        assert_eq!(h.state().output, "AA");
        assert_eq!(h.engine.calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn multi_stroke_burst_recognises_once() {
        let mut h = Harness::started(MockRecognitionEngine::ok("T", 75.0)).await;

        for i in 0..4 {
            let x = 0.2 + 0.1 * i as f32;
            h.hand(x, 0.3, true);
            h.hand(x, 0.5, true);
            h.hand(x, 0.5, false);
            tokio::time::sleep(Duration::from_millis(300)).await;
        }

        h.pump_until("finished").await;
        assert_eq!(h.engine.calls(), 1);
        assert_eq!(h.state().output, "T");

        h.pump_until("clear-surface").await;
        let more = tokio::time::timeout(Duration::from_secs(5), h.rx.recv()).await;
        assert!(more.is_err(), "unexpected extra event");
    }

    #[tokio::test(start_paused = true)]
    async fn debounce_during_recognition_is_rearmed() {
        let mut h = Harness::started(MockRecognitionEngine::ok("7", 92.0)).await;

        h.hand(0.5, 0.5, true);
        h.no_hand();
        assert_eq!(h.pump().await, "recognize");
        assert_eq!(h.state().pipeline, PipelineState::Recognizing);

        // Hold the first result back so the engine still counts as busy.
        let first = h.rx.recv().await.expect("channel open");
        assert!(matches!(first, Event::RecognitionFinished { .. }));
        assert_eq!(h.engine.calls(), 1);

        h.hand(0.3, 0.5, true);
        assert_eq!(h.state().pipeline, PipelineState::Drawing);
        h.no_hand();
        {
            let st = h.state();
            assert!(!st.is_drawing);
            assert_eq!(st.status.key, MessageKey::StatusReady);
            assert_eq!(st.pipeline, PipelineState::Recognizing);
        }

        // The second stroke's debounce expires while the first is in flight.
        assert_eq!(h.pump().await, "recognize");
        assert_eq!(h.engine.calls(), 1);
        assert_eq!(h.state().pipeline, PipelineState::Recognizing);

        tokio::time::sleep(Duration::from_millis(100)).await;
        h.send(first);
        {
            let st = h.state();
            assert_eq!(st.output, "7");
            assert_eq!(st.status.key, MessageKey::StatusRecognized);
            assert_eq!(st.pipeline, PipelineState::PendingRecognition);
        }

        // No clear was armed: the second stroke is still on the surface.
        assert!(!h.surface_blank());
        assert_eq!(h.pump().await, "recognize");
        assert_eq!(h.state().pipeline, PipelineState::Recognizing);

        assert_eq!(h.pump().await, "finished");
        assert_eq!(h.engine.calls(), 2);
        {
            let st = h.state();
            assert_eq!(st.output, "77");
            assert_eq!(st.pipeline, PipelineState::Recognized);
        }

        assert_eq!(h.pump().await, "clear-surface");
        assert!(h.surface_blank());
    }

    #[tokio::test(start_paused = true)]
    async fn pen_down_restarts_the_quiet_period() {
        let mut h = Harness::started(MockRecognitionEngine::ok("H", 60.0)).await;

        h.hand(0.2, 0.2, true);
        h.no_hand();
        tokio::time::sleep(Duration::from_millis(1000)).await;
        h.hand(0.6, 0.2, true);
        tokio::time::sleep(Duration::from_millis(1000)).await;
        // Still drawing after the first debounce would have expired.
        assert_eq!(h.state().pipeline, PipelineState::Drawing);
        assert_eq!(h.engine.calls(), 0);

        h.no_hand();
        h.pump_until("finished").await;
        assert_eq!(h.engine.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn engine_error_keeps_ink_and_output() {
        let mut h = Harness::started(MockRecognitionEngine::err(OcrError::Recognition(
            "boom".into(),
        )))
        .await;
        h.state.lock().unwrap().output = "AB".into();

        h.hand(0.5, 0.5, true);
        h.no_hand();
        h.pump_until("finished").await;

        {
            let st = h.state();
            assert_eq!(st.status.key, MessageKey::StatusRecognitionFailed);
            assert_eq!(st.status.kind, StatusKind::Error);
            assert_eq!(st.pipeline, PipelineState::RecognitionFailed);
            assert_eq!(st.output, "AB");
        }
        assert!(!h.surface_blank());

        // No retry and no clear.
        let more = tokio::time::timeout(Duration::from_secs(10), h.rx.recv()).await;
        assert!(more.is_err());
        assert!(!h.surface_blank());
        assert_eq!(h.engine.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn empty_result_clears_surface_and_keeps_output() {
        let mut h = Harness::started(MockRecognitionEngine::ok(" \n", 10.0)).await;
        h.state.lock().unwrap().output = "Q".into();

        h.hand(0.5, 0.5, true);
        h.no_hand();
        h.pump_until("finished").await;
        assert_eq!(status_key(&h), MessageKey::StatusNotRecognized);
        assert_eq!(h.state().pipeline, PipelineState::NotRecognized);

        h.pump_until("clear-surface").await;
        assert!(h.surface_blank());
        let st = h.state();
        assert_eq!(st.output, "Q");
        assert_eq!(st.status.key, MessageKey::StatusNotRecognized);
        assert_eq!(st.pipeline, PipelineState::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn blank_surface_reports_no_character() {
        let mut h = Harness::started(MockRecognitionEngine::ok("x", 1.0)).await;
        h.hand(0.5, 0.5, true);
        h.no_hand();
        // Wipe the ink behind the pending debounce.
        h.coordinator.surface.clear();

        h.pump_until("recognize").await;
        assert_eq!(status_key(&h), MessageKey::StatusNoChar);
        assert_eq!(h.state().pipeline, PipelineState::NoContent);
        assert_eq!(h.engine.calls(), 0);

        h.pump_until("revert-status").await;
        assert_eq!(status_key(&h), MessageKey::StatusReady);
        assert_eq!(h.state().pipeline, PipelineState::Idle);
    }

    // -----------------------------------------------------------------------
    // Clear
    // -----------------------------------------------------------------------

    #[tokio::test(start_paused = true)]
    async fn clear_mid_draw_starts_fresh_stroke() {
        let mut h = Harness::started(MockRecognitionEngine::ok("x", 1.0)).await;
        h.state.lock().unwrap().output = "XY".into();
        h.state.lock().unwrap().confidence = Some(40);

        h.hand(0.9, 0.1, true);
        h.hand(0.8, 0.2, true);
        h.send(Event::Clear);

        assert!(h.surface_blank());
        {
            let st = h.state();
            assert_eq!(st.output_label(), "...");
            assert_eq!(st.confidence_label(), "N/A");
            assert_eq!(st.status.key, MessageKey::StatusCleared);
            assert!(!st.is_drawing);
        }

        // The next pen-down point is a new stroke, not a line from the old one.
        h.hand(0.2, 0.8, true);
        let last = h.coordinator.renderer.last_point().expect("drawing");
        assert_eq!((last.x, last.y), (512.0, 320.0));
        // Halfway between the old (128, 80) and the new point.
        let midpoint = h.coordinator.surface().image().get_pixel(320, 200);
        assert_eq!(midpoint.0, [255, 255, 255, 255]);

        // Clear cancelled the debounce from the interrupted stroke.
        h.no_hand();
        h.pump_until("finished").await;
        assert_eq!(h.engine.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn clear_status_reverts() {
        let mut h = Harness::new(MockRecognitionEngine::ok("x", 1.0));
        h.send(Event::Clear);
        assert_eq!(status_key(&h), MessageKey::StatusCleared);

        h.pump_until("revert-status").await;
        assert_eq!(status_key(&h), MessageKey::StatusWaiting);
    }

    #[tokio::test(start_paused = true)]
    async fn result_from_before_clear_is_discarded() {
        let mut h = Harness::started(MockRecognitionEngine::ok("Z", 99.0)).await;
        h.hand(0.5, 0.5, true);
        h.no_hand();

        assert_eq!(h.pump().await, "recognize");
        // The engine is running; the user clears before it reports back.
        h.send(Event::Clear);
        assert_eq!(h.pump().await, "finished");

        let st = h.state();
        assert_eq!(st.output, "");
        assert!(st.confidence.is_none());
        assert_eq!(st.status.key, MessageKey::StatusCleared);
        drop(st);

        let next = h.pump().await;
        assert_eq!(next, "revert-status");
        assert_eq!(h.engine.calls(), 1);
    }

    // -----------------------------------------------------------------------
    // Toggles
    // -----------------------------------------------------------------------

    #[tokio::test(start_paused = true)]
    async fn drawing_toggle_ignores_landmarks() {
        let mut h = Harness::started(MockRecognitionEngine::ok("x", 1.0)).await;
        h.send(Event::ToggleDrawing);
        assert_eq!(status_key(&h), MessageKey::StatusDrawingOff);
        assert_eq!(h.state().drawing_button_label(), "⏸️ Drawing: OFF");

        h.hand(0.5, 0.5, true);
        assert!(h.surface_blank());

        h.send(Event::ToggleDrawing);
        assert_eq!(status_key(&h), MessageKey::StatusDrawingOn);
        h.hand(0.5, 0.5, true);
        assert!(!h.surface_blank());
    }

    #[tokio::test(start_paused = true)]
    async fn disabling_drawing_ends_the_stroke() {
        let mut h = Harness::started(MockRecognitionEngine::ok("k", 70.0)).await;
        h.hand(0.5, 0.5, true);
        h.send(Event::ToggleDrawing);

        assert!(!h.state().is_drawing);
        assert_eq!(status_key(&h), MessageKey::StatusReady);
        h.pump_until("finished").await;
        assert_eq!(h.state().output, "k");
    }

    #[tokio::test(start_paused = true)]
    async fn language_toggle_is_persisted() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("preferences.toml");

        let mut h = Harness::new(MockRecognitionEngine::ok("x", 1.0));
        h.coordinator.preferences_path = Some(path.clone());

        h.send(Event::ToggleLanguage);
        assert_eq!(h.state().language, Language::Tr);
        assert_eq!(h.state().confidence_label(), "—");
        assert_eq!(Preferences::load_from(&path).unwrap().language, Language::Tr);

        h.send(Event::ToggleLanguage);
        assert_eq!(Preferences::load_from(&path).unwrap().language, Language::En);
    }

    #[tokio::test(start_paused = true)]
    async fn run_stops_on_shutdown() {
        let (tx, rx) = mpsc::channel(8);
        let state = new_shared_state(Language::En);
        let coordinator = Coordinator::new(
            AppConfig::default(),
            Arc::clone(&state),
            Arc::new(MockRecognitionEngine::ok("x", 1.0)),
            Arc::new(SilentCamera),
            Arc::new(NoHands),
            tx.clone(),
        );

        tx.send(Event::ToggleDrawing).await.unwrap();
        tx.send(Event::Shutdown).await.unwrap();
        coordinator.run(rx).await;

        assert!(!state.lock().unwrap().drawing_enabled);
    }
}
