//! Burst controller: the [`BurstFacade`] implementation.

use super::error::check_dimensions;
use super::{BurstConfig, BurstConsumer, BurstError, BurstFacade, BurstWriter};
use crate::capture::{self, Frame, SharedCamera};
use crate::config::FileConfig;
use crate::distributor::{lock_consumer, DistributorConfig, FrameDistributor, PreviewConsumer};
use crate::session::CaptureSession;
use crate::surface::SurfaceTexture;
use chrono::{DateTime, Local};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// Counters describing the controller's activity.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BurstStats {
    /// Bursts accepted by `start_burst`.
    pub bursts_started: u64,
    /// Bursts whose session finished successfully.
    pub bursts_completed: u64,
    /// Bursts whose session ended with a failure.
    pub bursts_failed: u64,
    /// Frames persisted by completed bursts.
    pub frames_saved: u64,
    /// Frames held by the running burst.
    pub frames_buffered: u64,
    /// Frames evicted from burst buffers.
    pub frames_evicted: u64,
    /// Frames handed to consumers, across all distributors.
    pub frames_distributed: u64,
    /// Frames dropped at input surfaces because the distributor lagged.
    pub frames_dropped: u64,
    /// Whether a frame distributor is currently running.
    pub distributor_running: bool,
}

struct ActiveBurst {
    session: Box<dyn CaptureSession>,
    temp_dir: PathBuf,
    started_at: DateTime<Local>,
    number: u64,
}

/// Runs bursts on top of a frame distributor.
///
/// While a burst is active the burst consumer buffers every distributed
/// frame (keeping the newest `max_frames`). Stopping the burst writes the
/// buffered frames into the burst's temp directory and finishes its
/// session.
pub struct BurstController {
    config: BurstConfig,
    distributor_config: DistributorConfig,
    camera: Option<SharedCamera>,
    active: Option<ActiveBurst>,
    display: Option<(SurfaceTexture, u32, u32)>,
    preview: Option<Arc<Mutex<PreviewConsumer>>>,
    preview_size: Option<(u32, u32)>,
    input_size: (u32, u32),
    distributor: Option<FrameDistributor>,
    burst_consumer: Arc<Mutex<BurstConsumer>>,
    stats: BurstStats,
}

impl BurstController {
    /// Creates a controller with no camera, surfaces or distributor.
    pub fn new(config: BurstConfig, distributor_config: DistributorConfig) -> Self {
        let burst_consumer = Arc::new(Mutex::new(BurstConsumer::new(config.max_frames)));
        Self {
            config,
            distributor_config,
            camera: None,
            active: None,
            display: None,
            preview: None,
            preview_size: None,
            input_size: (640, 480),
            distributor: None,
            burst_consumer,
            stats: BurstStats::default(),
        }
    }

    /// Builds a controller whose input buffer matches the capture size and
    /// whose preview consumer uses the configured preview size.
    pub fn from_config(config: &FileConfig) -> Self {
        let mut controller = Self::new(config.burst.clone(), config.distributor.clone());
        controller.input_size = (config.capture.width, config.capture.height);
        controller.preview_size = Some((config.preview.width, config.preview.height));
        controller
    }

    /// Burst settings in use.
    pub fn config(&self) -> &BurstConfig {
        &self.config
    }

    /// Whether a camera is attached.
    pub fn has_camera(&self) -> bool {
        self.camera.is_some()
    }

    /// Size the next input surface will be created with.
    pub fn preview_buffer_size(&self) -> (u32, u32) {
        self.input_size
    }

    /// Output size of the preview consumer, if one exists or was requested.
    pub fn preview_consumer_size(&self) -> Option<(u32, u32)> {
        match &self.preview {
            Some(preview) => Some(lock_consumer(&**preview).size()),
            None => self.preview_size,
        }
    }

    /// Frames rendered by the preview consumer.
    pub fn preview_frames_rendered(&self) -> Option<u64> {
        self.preview
            .as_ref()
            .map(|preview| lock_consumer(&**preview).frames_rendered())
    }

    /// Current counters, including those of the running distributor.
    pub fn stats(&self) -> BurstStats {
        let consumer = lock_consumer(&*self.burst_consumer);
        let mut stats = self.stats.clone();
        stats.frames_buffered = consumer.buffered() as u64;
        stats.frames_evicted = consumer.evicted_total();
        if let Some(distributor) = &self.distributor {
            stats.frames_distributed += distributor.frames_distributed();
            if let Some(input) = distributor.input_surface_texture() {
                stats.frames_dropped += input.frames_dropped();
            }
            stats.distributor_running = distributor.is_running();
        }
        stats
    }

    fn set_camera_burst_mode(&self, enabled: bool) -> Result<(), BurstError> {
        match &self.camera {
            Some(camera) => Ok(capture::lock(camera).set_burst_mode(enabled)?),
            None => Err(BurstError::CameraUnavailable),
        }
    }

    fn retire_distributor(&mut self) {
        if let Some(mut distributor) = self.distributor.take() {
            if let Some(input) = distributor.input_surface_texture() {
                self.stats.frames_dropped += input.frames_dropped();
            }
            distributor.close();
            self.stats.frames_distributed += distributor.frames_distributed();
        }
    }

    fn fail_burst(&mut self, mut burst: ActiveBurst, reason: &str) {
        burst.session.finish_with_failure(reason);
        self.stats.bursts_failed += 1;
        tracing::warn!(session = burst.session.title(), reason, "burst failed");
    }

    fn finish_burst(&mut self, mut burst: ActiveBurst, frames: Vec<Frame>) {
        if frames.is_empty() {
            self.fail_burst(burst, "no frames captured");
            return;
        }

        let writer = BurstWriter::new(&burst.temp_dir, burst.started_at, burst.number);
        let total = frames.len();
        let mut written = Vec::with_capacity(total);
        for (index, frame) in frames.iter().enumerate() {
            match writer.write(index, frame) {
                Ok(path) => {
                    burst.session.add_artifact(&path);
                    burst.session.update_progress(((index + 1) * 100 / total) as u8);
                    written.push(path);
                }
                Err(e) => {
                    remove_partial_output(&written);
                    self.fail_burst(burst, &e.to_string());
                    return;
                }
            }
        }

        match burst.session.finish() {
            Ok(()) => {
                self.stats.bursts_completed += 1;
                self.stats.frames_saved += total as u64;
                tracing::info!(
                    session = burst.session.title(),
                    frames = total,
                    "burst completed"
                );
            }
            Err(e) => {
                self.stats.bursts_failed += 1;
                tracing::warn!(session = burst.session.title(), error = %e, "burst session failed to finish");
            }
        }
    }
}

fn remove_partial_output(paths: &[PathBuf]) {
    for path in paths {
        if let Err(e) = std::fs::remove_file(path) {
            tracing::warn!(path = %path.display(), error = %e, "failed to remove partial burst frame");
        }
    }
}

impl BurstFacade for BurstController {
    fn on_camera_attached(&mut self, camera: SharedCamera) {
        let previous = self.camera.replace(camera);
        tracing::info!("camera attached");
        if previous.is_some() {
            tracing::debug!("replaced previously attached camera");
        }
        if self.active.is_none() {
            return;
        }

        // A running burst moves to the new camera.
        if let Some(previous) = previous {
            if let Err(e) = capture::lock(&previous).set_burst_mode(false) {
                tracing::warn!(error = %e, "previous camera failed to leave burst mode");
            }
        }
        if let Err(e) = self.set_camera_burst_mode(true) {
            if let Some(burst) = self.active.take() {
                lock_consumer(&*self.burst_consumer).disarm();
                self.fail_burst(burst, &format!("replacement camera rejected burst mode: {e}"));
            }
        }
    }

    fn on_camera_detached(&mut self) {
        self.camera = None;
        tracing::info!("camera detached");

        if let Some(burst) = self.active.take() {
            lock_consumer(&*self.burst_consumer).disarm();
            self.fail_burst(burst, "camera detached");
        }
    }

    fn start_burst(
        &mut self,
        mut session: Box<dyn CaptureSession>,
        temp_dir: &Path,
    ) -> Result<(), BurstError> {
        if self.active.is_some() {
            return Err(BurstError::BurstInProgress);
        }
        if self.camera.is_none() {
            return Err(BurstError::CameraUnavailable);
        }
        if !self.distributor.as_ref().is_some_and(FrameDistributor::is_running) {
            return Err(BurstError::DistributorNotRunning);
        }
        std::fs::create_dir_all(temp_dir)?;
        self.set_camera_burst_mode(true)?;

        lock_consumer(&*self.burst_consumer).arm();
        session.update_progress(0);
        tracing::info!(
            session = session.title(),
            temp_dir = %temp_dir.display(),
            max_frames = self.config.max_frames,
            "burst started"
        );

        self.active = Some(ActiveBurst {
            session,
            temp_dir: temp_dir.to_path_buf(),
            started_at: Local::now(),
            number: self.stats.bursts_started + 1,
        });
        self.stats.bursts_started += 1;
        Ok(())
    }

    fn is_ready(&self) -> bool {
        self.active.is_none()
    }

    fn stop_burst(&mut self) -> bool {
        let Some(burst) = self.active.take() else {
            return false;
        };

        let frames = lock_consumer(&*self.burst_consumer).disarm();
        if let Err(e) = self.set_camera_burst_mode(false) {
            tracing::warn!(error = %e, "failed to leave camera burst mode");
        }
        tracing::debug!(frames = frames.len(), "burst stopped");

        self.finish_burst(burst, frames);
        true
    }

    fn set_surface_texture(&mut self, texture: SurfaceTexture, width: u32, height: u32) {
        if check_dimensions(width, height).is_err() {
            tracing::warn!(width, height, "ignoring surface texture with empty size");
            return;
        }
        tracing::debug!(surface = texture.id(), width, height, "surface texture set");
        self.display = Some((texture, width, height));
    }

    fn initialize_surface_texture_consumer(
        &mut self,
        width: u32,
        height: u32,
    ) -> Result<(), BurstError> {
        check_dimensions(width, height)?;
        let (texture, _, _) = self.display.clone().ok_or(BurstError::NoSurfaceTexture)?;

        if let Err(e) = texture.set_default_buffer_size(width, height) {
            tracing::debug!(error = %e, "display surface size unchanged");
        }
        let (out_width, out_height) = self.preview_size.unwrap_or((width, height));
        match &self.preview {
            // The existing consumer may be attached to the running
            // distributor, so it is retargeted in place.
            Some(preview) => {
                let mut preview = lock_consumer(&**preview);
                preview.set_output(texture.clone());
                preview.set_size(out_width, out_height);
            }
            None => {
                self.preview = Some(Arc::new(Mutex::new(PreviewConsumer::new(
                    texture.clone(),
                    out_width,
                    out_height,
                ))));
                if self.distributor.as_ref().is_some_and(FrameDistributor::is_running) {
                    tracing::debug!("preview consumer takes effect on next distributor start");
                }
            }
        }
        self.display = Some((texture, width, height));
        Ok(())
    }

    fn initialize_surface_texture_consumer_with(
        &mut self,
        texture: SurfaceTexture,
        width: u32,
        height: u32,
    ) -> Result<(), BurstError> {
        check_dimensions(width, height)?;
        self.set_surface_texture(texture, width, height);
        self.initialize_surface_texture_consumer(width, height)
    }

    fn update_preview_buffer_size(&mut self, width: u32, height: u32) {
        if check_dimensions(width, height).is_err() {
            tracing::warn!(width, height, "ignoring empty preview buffer size");
            return;
        }
        self.input_size = (width, height);
        if let Some(input) = self.distributor.as_ref().and_then(|d| d.input_surface_texture()) {
            if let Err(e) = input.set_default_buffer_size(width, height) {
                tracing::warn!(error = %e, "failed to resize input surface");
            }
        }
    }

    fn initialize_and_start_frame_distributor(&mut self) -> Result<(), BurstError> {
        self.retire_distributor();

        let mut distributor = FrameDistributor::new(self.distributor_config.clone());
        if let Some(preview) = &self.preview {
            distributor.add_consumer(preview.clone())?;
        }
        distributor.add_consumer(self.burst_consumer.clone())?;

        let (width, height) = self.input_size;
        let input = SurfaceTexture::new(width, height, self.distributor_config.queue_capacity);
        distributor.configure(input)?;
        distributor.start()?;

        self.distributor = Some(distributor);
        Ok(())
    }

    fn close_frame_distributor(&mut self) {
        self.retire_distributor();
    }

    fn input_surface_texture(&self) -> Option<SurfaceTexture> {
        self.distributor
            .as_ref()
            .and_then(|d| d.input_surface_texture())
            .cloned()
    }

    fn set_preview_consumer_size(&mut self, width: u32, height: u32) {
        if check_dimensions(width, height).is_err() {
            tracing::warn!(width, height, "ignoring empty preview consumer size");
            return;
        }
        self.preview_size = Some((width, height));
        if let Some(preview) = &self.preview {
            lock_consumer(&**preview).set_size(width, height);
        }
    }
}

impl Drop for BurstController {
    fn drop(&mut self) {
        if let Some(burst) = self.active.take() {
            self.fail_burst(burst, "burst controller dropped");
        }
        self.retire_distributor();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::{share, CaptureConfig, MockCamera};
    use crate::session::{SessionError, SessionState};
    use std::time::{Duration, Instant};
    use tempfile::tempdir;

    /// Session recording every call, observable after being boxed.
    #[derive(Clone, Default)]
    struct Recorder(Arc<Mutex<RecorderState>>);

    #[derive(Default)]
    struct RecorderState {
        progress: Vec<u8>,
        artifacts: Vec<PathBuf>,
        finished: u32,
        failure: Option<String>,
    }

    impl Recorder {
        fn calls(&self) -> std::sync::MutexGuard<'_, RecorderState> {
            self.0.lock().unwrap()
        }
    }

    impl CaptureSession for Recorder {
        fn title(&self) -> &str {
            "recorder"
        }

        fn update_progress(&mut self, percent: u8) {
            self.calls().progress.push(percent);
        }

        fn add_artifact(&mut self, path: &Path) {
            self.calls().artifacts.push(path.to_path_buf());
        }

        fn finish(&mut self) -> Result<(), SessionError> {
            self.calls().finished += 1;
            Ok(())
        }

        fn finish_with_failure(&mut self, reason: &str) {
            self.calls().failure = Some(reason.to_string());
        }

        fn state(&self) -> SessionState {
            let state = self.0.lock().unwrap();
            match (&state.failure, state.finished) {
                (Some(reason), _) => SessionState::Failed(reason.clone()),
                (None, 0) => SessionState::Active,
                (None, _) => SessionState::Finished,
            }
        }
    }

    fn camera() -> SharedCamera {
        share(MockCamera::opened(&CaptureConfig::with_dimensions(8, 6)).unwrap())
    }

    fn running_controller(max_frames: usize) -> BurstController {
        let mut controller =
            BurstController::new(BurstConfig { max_frames }, DistributorConfig::default());
        controller.update_preview_buffer_size(8, 6);
        controller.on_camera_attached(camera());
        controller.initialize_and_start_frame_distributor().unwrap();
        controller
    }

    fn feed(controller: &BurstController, count: u64) {
        let input = controller.input_surface_texture().unwrap();
        let before = controller.stats().frames_distributed;
        for sequence in 0..count {
            input.queue_frame(Frame::new(vec![128u8; 48], 8, 6, sequence)).unwrap();
            // Wait for each frame so the input queue never drops one.
            let deadline = Instant::now() + Duration::from_secs(2);
            while controller.stats().frames_distributed < before + sequence + 1
                && Instant::now() < deadline
            {
                std::thread::sleep(Duration::from_millis(1));
            }
        }
    }

    #[test]
    fn test_ready_after_construction() {
        let controller = BurstController::new(BurstConfig::default(), DistributorConfig::default());
        assert!(controller.is_ready());
        assert!(controller.input_surface_texture().is_none());
    }

    #[test]
    fn test_stop_without_burst_is_noop() {
        let mut controller = running_controller(4);
        let before = controller.stats();

        assert!(!controller.stop_burst());
        assert!(controller.is_ready());
        assert_eq!(controller.stats().bursts_started, before.bursts_started);
    }

    #[test]
    fn test_start_then_stop_persists_frames() {
        let temp = tempdir().unwrap();
        let mut controller = running_controller(10);
        let recorder = Recorder::default();

        controller
            .start_burst(Box::new(recorder.clone()), temp.path())
            .unwrap();
        assert!(!controller.is_ready());

        feed(&controller, 3);
        assert!(controller.stop_burst());
        assert!(controller.is_ready());

        let state = recorder.calls();
        assert_eq!(state.finished, 1);
        assert_eq!(state.artifacts.len(), 3);
        assert!(state.artifacts.iter().all(|path| path.exists()));
        assert_eq!(state.progress.first(), Some(&0));
        assert_eq!(state.progress.last(), Some(&100));

        let stats = controller.stats();
        assert_eq!(stats.bursts_completed, 1);
        assert_eq!(stats.frames_saved, 3);
    }

    #[test]
    fn test_burst_keeps_newest_frames() {
        let temp = tempdir().unwrap();
        let mut controller = running_controller(2);
        let recorder = Recorder::default();

        controller
            .start_burst(Box::new(recorder.clone()), temp.path())
            .unwrap();
        feed(&controller, 5);
        assert_eq!(controller.stats().frames_evicted, 3);

        controller.stop_burst();
        assert_eq!(recorder.calls().artifacts.len(), 2);
    }

    #[test]
    fn test_stop_immediately_after_start() {
        let temp = tempdir().unwrap();
        let mut controller = running_controller(4);
        let recorder = Recorder::default();

        controller
            .start_burst(Box::new(recorder.clone()), temp.path())
            .unwrap();
        assert!(controller.stop_burst());
        assert!(!controller.stop_burst());
        assert!(controller.is_ready());
        // Either no frame arrived (failure) or a few did (finished).
        let state = recorder.calls();
        assert!(state.finished == 1 || state.failure.is_some());
    }

    #[test]
    fn test_second_start_rejected() {
        let temp = tempdir().unwrap();
        let mut controller = running_controller(4);
        controller
            .start_burst(Box::new(Recorder::default()), temp.path())
            .unwrap();

        assert!(matches!(
            controller.start_burst(Box::new(Recorder::default()), temp.path()),
            Err(BurstError::BurstInProgress)
        ));
        assert_eq!(controller.stats().bursts_started, 1);
    }

    #[test]
    fn test_start_requires_camera_and_distributor() {
        let temp = tempdir().unwrap();
        let mut controller = BurstController::new(BurstConfig::default(), DistributorConfig::default());

        assert!(matches!(
            controller.start_burst(Box::new(Recorder::default()), temp.path()),
            Err(BurstError::CameraUnavailable)
        ));

        controller.on_camera_attached(camera());
        assert!(matches!(
            controller.start_burst(Box::new(Recorder::default()), temp.path()),
            Err(BurstError::DistributorNotRunning)
        ));
        assert!(controller.is_ready());
    }

    #[test]
    fn test_camera_refusing_burst_mode() {
        let temp = tempdir().unwrap();
        let mut controller = running_controller(4);
        let refusing = MockCamera::opened(&CaptureConfig::default())
            .unwrap()
            .rejecting_burst_mode();
        controller.on_camera_attached(share(refusing));

        assert!(matches!(
            controller.start_burst(Box::new(Recorder::default()), temp.path()),
            Err(BurstError::Camera(_))
        ));
        assert!(controller.is_ready());
    }

    #[test]
    fn test_camera_toggled_into_burst_mode() {
        let temp = tempdir().unwrap();
        let mut controller = running_controller(4);
        let shared = camera();
        controller.on_camera_attached(shared.clone());

        controller
            .start_burst(Box::new(Recorder::default()), temp.path())
            .unwrap();
        assert!(capture::lock(&shared).burst_mode());

        controller.stop_burst();
        assert!(!capture::lock(&shared).burst_mode());
    }

    #[test]
    fn test_detach_aborts_burst() {
        let temp = tempdir().unwrap();
        let mut controller = running_controller(4);
        let recorder = Recorder::default();
        controller
            .start_burst(Box::new(recorder.clone()), temp.path())
            .unwrap();

        controller.on_camera_detached();

        assert!(controller.is_ready());
        assert!(!controller.has_camera());
        assert!(!controller.stop_burst());
        assert_eq!(recorder.calls().failure.as_deref(), Some("camera detached"));
        assert_eq!(controller.stats().bursts_failed, 1);
    }

    #[test]
    fn test_empty_burst_fails_session() {
        let temp = tempdir().unwrap();
        let mut controller = running_controller(4);
        let recorder = Recorder::default();
        controller
            .start_burst(Box::new(recorder.clone()), temp.path())
            .unwrap();
        controller.close_frame_distributor();

        assert!(controller.stop_burst());
        assert_eq!(recorder.calls().failure.as_deref(), Some("no frames captured"));
    }

    #[test]
    fn test_drop_fails_active_burst() {
        let temp = tempdir().unwrap();
        let recorder = Recorder::default();
        {
            let mut controller = running_controller(4);
            controller
                .start_burst(Box::new(recorder.clone()), temp.path())
                .unwrap();
        }
        assert!(recorder.calls().failure.is_some());
    }

    #[test]
    fn test_input_surface_lifecycle() {
        let mut controller = BurstController::new(BurstConfig::default(), DistributorConfig::default());
        controller.update_preview_buffer_size(32, 24);
        assert!(controller.input_surface_texture().is_none());

        controller.initialize_and_start_frame_distributor().unwrap();
        let input = controller.input_surface_texture().unwrap();
        assert_eq!(input.default_buffer_size(), (32, 24));

        controller.update_preview_buffer_size(16, 12);
        assert_eq!(input.default_buffer_size(), (16, 12));

        controller.close_frame_distributor();
        assert!(controller.input_surface_texture().is_none());
        assert!(input.is_released());
        assert!(!controller.stats().distributor_running);
    }

    #[test]
    fn test_restart_creates_fresh_input() {
        let mut controller = BurstController::new(BurstConfig::default(), DistributorConfig::default());
        controller.initialize_and_start_frame_distributor().unwrap();
        let first = controller.input_surface_texture().unwrap();

        controller.initialize_and_start_frame_distributor().unwrap();
        let second = controller.input_surface_texture().unwrap();

        assert!(first.is_released());
        assert!(!second.same_surface(&first));
    }

    #[test]
    fn test_consumer_requires_surface_texture() {
        let mut controller = BurstController::new(BurstConfig::default(), DistributorConfig::default());
        assert!(matches!(
            controller.initialize_surface_texture_consumer(4, 4),
            Err(BurstError::NoSurfaceTexture)
        ));
        assert!(matches!(
            controller.initialize_surface_texture_consumer_with(SurfaceTexture::new(4, 4, 1), 0, 4),
            Err(BurstError::InvalidDimensions { .. })
        ));
    }

    #[test]
    fn test_preview_receives_scaled_frames() {
        let display = SurfaceTexture::new(4, 3, 8);
        let mut controller = BurstController::new(BurstConfig::default(), DistributorConfig::default());
        controller.update_preview_buffer_size(8, 6);
        controller
            .initialize_surface_texture_consumer_with(display.clone(), 4, 3)
            .unwrap();
        controller.initialize_and_start_frame_distributor().unwrap();

        feed(&controller, 1);
        let shown = display.acquire_frame(Duration::from_secs(2)).unwrap();
        assert_eq!(shown.dimensions(), (4, 3));

        controller.set_preview_consumer_size(2, 2);
        assert_eq!(controller.preview_consumer_size(), Some((2, 2)));
        feed(&controller, 1);
        let shown = display.acquire_frame(Duration::from_secs(2)).unwrap();
        assert_eq!(shown.dimensions(), (2, 2));
        assert_eq!(controller.preview_frames_rendered(), Some(2));
    }

    #[test]
    fn test_preview_size_remembered_before_consumer() {
        let mut controller = BurstController::new(BurstConfig::default(), DistributorConfig::default());
        controller.set_preview_consumer_size(160, 120);
        controller.set_surface_texture(SurfaceTexture::new(640, 480, 1), 640, 480);
        controller.initialize_surface_texture_consumer(640, 480).unwrap();

        assert_eq!(controller.preview_consumer_size(), Some((160, 120)));
    }

    #[test]
    fn test_preview_reinitialized_while_running() {
        let first = SurfaceTexture::new(8, 6, 8);
        let second = SurfaceTexture::new(8, 6, 8);
        let mut controller = BurstController::new(BurstConfig::default(), DistributorConfig::default());
        controller.update_preview_buffer_size(8, 6);
        controller
            .initialize_surface_texture_consumer_with(first.clone(), 8, 6)
            .unwrap();
        controller.initialize_and_start_frame_distributor().unwrap();

        controller
            .initialize_surface_texture_consumer_with(second.clone(), 8, 6)
            .unwrap();
        controller.set_preview_consumer_size(2, 2);
        feed(&controller, 1);

        let shown = second.acquire_frame(Duration::from_secs(2)).unwrap();
        assert_eq!(shown.dimensions(), (2, 2));
        assert!(first.try_acquire_frame().is_none());
        assert_eq!(controller.preview_consumer_size(), Some((2, 2)));
        assert_eq!(controller.preview_frames_rendered(), Some(1));
    }

    #[test]
    fn test_failed_write_removes_partial_frames() {
        let temp = tempdir().unwrap();
        let mut controller = running_controller(10);
        let recorder = Recorder::default();
        controller
            .start_burst(Box::new(recorder.clone()), temp.path())
            .unwrap();

        feed(&controller, 2);
        let input = controller.input_surface_texture().unwrap();
        input.queue_frame(Frame::new(vec![0u8; 5], 8, 6, 99)).unwrap();
        let deadline = Instant::now() + Duration::from_secs(2);
        while controller.stats().frames_buffered < 3 && Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(1));
        }

        assert!(controller.stop_burst());
        let state = recorder.calls();
        assert!(state.failure.is_some());
        assert_eq!(state.finished, 0);
        assert_eq!(std::fs::read_dir(temp.path()).unwrap().count(), 0);
        assert_eq!(controller.stats().bursts_failed, 1);
    }

    #[test]
    fn test_camera_swap_moves_burst_mode() {
        let temp = tempdir().unwrap();
        let mut controller = running_controller(4);
        let first = camera();
        let second = camera();
        controller.on_camera_attached(first.clone());
        controller
            .start_burst(Box::new(Recorder::default()), temp.path())
            .unwrap();

        controller.on_camera_attached(second.clone());
        assert!(!capture::lock(&first).burst_mode());
        assert!(capture::lock(&second).burst_mode());
        assert!(!controller.is_ready());

        controller.stop_burst();
        assert!(!capture::lock(&second).burst_mode());
    }

    #[test]
    fn test_camera_swap_to_refusing_camera_fails_burst() {
        let temp = tempdir().unwrap();
        let mut controller = running_controller(4);
        let first = camera();
        controller.on_camera_attached(first.clone());
        let recorder = Recorder::default();
        controller
            .start_burst(Box::new(recorder.clone()), temp.path())
            .unwrap();

        let refusing = MockCamera::opened(&CaptureConfig::default())
            .unwrap()
            .rejecting_burst_mode();
        controller.on_camera_attached(share(refusing));

        assert!(!capture::lock(&first).burst_mode());
        assert!(controller.is_ready());
        assert!(recorder.calls().failure.is_some());
        assert_eq!(controller.stats().bursts_failed, 1);
    }
}
