//! Frame distributor state machine.

use super::consumer::{lock_consumer, SharedConsumer};
use super::DistributorConfig;
use crate::surface::SurfaceTexture;
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;
use thiserror::Error;

/// Lifecycle state of a [`FrameDistributor`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DistributorState {
    /// No input surface yet.
    Unconfigured,
    /// Input surface set, worker not started.
    Configured,
    /// Worker thread is distributing frames.
    Running,
    /// Terminal. Input released, consumers stopped.
    Closed,
}

impl fmt::Display for DistributorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Unconfigured => "unconfigured",
            Self::Configured => "configured",
            Self::Running => "running",
            Self::Closed => "closed",
        };
        f.write_str(name)
    }
}

/// Errors raised by distributor transitions.
#[derive(Debug, Error)]
pub enum DistributorError {
    /// The operation is not allowed in the current state.
    #[error("cannot {op} frame distributor while {from}")]
    InvalidTransition {
        /// State the distributor was in.
        from: DistributorState,
        /// Rejected operation.
        op: &'static str,
    },
    /// The worker thread could not be spawned.
    #[error("failed to spawn distributor worker: {0}")]
    Spawn(#[from] std::io::Error),
}

/// Routes frames from one input surface to any number of consumers.
///
/// Transitions are guarded:
///
/// ```text
/// Unconfigured --configure--> Configured --start--> Running
///      |                        |  ^ configure         |
///      +--------close-----------+--+-------close-------+--> Closed
/// ```
///
/// Consumers receive frames in registration order. Dropping a running
/// distributor closes it.
pub struct FrameDistributor {
    config: DistributorConfig,
    state: DistributorState,
    input: Option<SurfaceTexture>,
    consumers: Vec<SharedConsumer>,
    running: Arc<AtomicBool>,
    distributed: Arc<AtomicU64>,
    worker: Option<JoinHandle<()>>,
}

impl FrameDistributor {
    /// Creates an unconfigured distributor.
    pub fn new(config: DistributorConfig) -> Self {
        Self {
            config,
            state: DistributorState::Unconfigured,
            input: None,
            consumers: Vec::new(),
            running: Arc::new(AtomicBool::new(false)),
            distributed: Arc::new(AtomicU64::new(0)),
            worker: None,
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> DistributorState {
        self.state
    }

    /// Whether the worker is distributing frames.
    pub fn is_running(&self) -> bool {
        self.state == DistributorState::Running
    }

    /// Registers a consumer. Only allowed before [`start`](Self::start).
    pub fn add_consumer(&mut self, consumer: SharedConsumer) -> Result<(), DistributorError> {
        match self.state {
            DistributorState::Unconfigured | DistributorState::Configured => {
                self.consumers.push(consumer);
                Ok(())
            }
            from => Err(DistributorError::InvalidTransition {
                from,
                op: "add a consumer to",
            }),
        }
    }

    /// Registered consumers.
    pub fn consumer_count(&self) -> usize {
        self.consumers.len()
    }

    /// Sets the input surface. A previously configured surface is released.
    pub fn configure(&mut self, input: SurfaceTexture) -> Result<(), DistributorError> {
        match self.state {
            DistributorState::Unconfigured | DistributorState::Configured => {
                if let Some(previous) = self.input.replace(input) {
                    previous.release();
                }
                self.state = DistributorState::Configured;
                tracing::debug!(
                    input = self.input.as_ref().map(SurfaceTexture::id),
                    "frame distributor configured"
                );
                Ok(())
            }
            from => Err(DistributorError::InvalidTransition {
                from,
                op: "configure",
            }),
        }
    }

    /// Starts the worker thread.
    pub fn start(&mut self) -> Result<(), DistributorError> {
        let input = match (self.state, &self.input) {
            (DistributorState::Configured, Some(input)) => input.clone(),
            (from, _) => {
                return Err(DistributorError::InvalidTransition { from, op: "start" })
            }
        };

        for consumer in &self.consumers {
            lock_consumer(&**consumer).on_start();
        }

        self.running.store(true, Ordering::Release);
        let worker = Worker {
            input,
            consumers: self.consumers.clone(),
            running: Arc::clone(&self.running),
            distributed: Arc::clone(&self.distributed),
            poll_interval: self.config.poll_interval(),
        };

        match std::thread::Builder::new()
            .name("frame-distributor".into())
            .spawn(move || worker.run())
        {
            Ok(handle) => {
                self.worker = Some(handle);
                self.state = DistributorState::Running;
                tracing::info!(consumers = self.consumers.len(), "frame distributor started");
                Ok(())
            }
            Err(e) => {
                self.running.store(false, Ordering::Release);
                for consumer in &self.consumers {
                    lock_consumer(&**consumer).on_stop();
                }
                Err(e.into())
            }
        }
    }

    /// Stops the worker, notifies consumers and releases the input surface.
    ///
    /// Closing an already closed distributor does nothing.
    pub fn close(&mut self) {
        match self.state {
            DistributorState::Closed => return,
            DistributorState::Running => {
                self.running.store(false, Ordering::Release);
                if let Some(worker) = self.worker.take() {
                    if worker.join().is_err() {
                        tracing::warn!("frame distributor worker panicked");
                    }
                }
                for consumer in &self.consumers {
                    lock_consumer(&**consumer).on_stop();
                }
            }
            DistributorState::Unconfigured | DistributorState::Configured => {}
        }

        if let Some(input) = self.input.take() {
            input.release();
        }
        self.consumers.clear();
        self.state = DistributorState::Closed;
        tracing::info!(
            frames = self.frames_distributed(),
            "frame distributor closed"
        );
    }

    /// The input surface, while configured or running.
    pub fn input_surface_texture(&self) -> Option<&SurfaceTexture> {
        match self.state {
            DistributorState::Configured | DistributorState::Running => self.input.as_ref(),
            DistributorState::Unconfigured | DistributorState::Closed => None,
        }
    }

    /// Frames handed to consumers so far.
    pub fn frames_distributed(&self) -> u64 {
        self.distributed.load(Ordering::Relaxed)
    }
}

impl Drop for FrameDistributor {
    fn drop(&mut self) {
        self.close();
    }
}

impl fmt::Debug for FrameDistributor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FrameDistributor")
            .field("state", &self.state)
            .field("input", &self.input)
            .field("consumers", &self.consumers.len())
            .field("frames_distributed", &self.frames_distributed())
            .finish()
    }
}

struct Worker {
    input: SurfaceTexture,
    consumers: Vec<SharedConsumer>,
    running: Arc<AtomicBool>,
    distributed: Arc<AtomicU64>,
    poll_interval: Duration,
}

impl Worker {
    fn run(self) {
        while self.running.load(Ordering::Acquire) {
            let Some(frame) = self.input.acquire_frame(self.poll_interval) else {
                continue;
            };
            for consumer in &self.consumers {
                lock_consumer(&**consumer).on_new_frame(&frame);
            }
            self.distributed.fetch_add(1, Ordering::Relaxed);
            tracing::trace!(sequence = frame.sequence(), "frame distributed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::Frame;
    use crate::distributor::FrameConsumer;
    use std::sync::Mutex;
    use std::time::Instant;

    #[derive(Default)]
    struct Recorder {
        started: u32,
        stopped: u32,
        sequences: Vec<u64>,
    }

    impl FrameConsumer for Recorder {
        fn on_start(&mut self) {
            self.started += 1;
        }

        fn on_new_frame(&mut self, frame: &Frame) {
            self.sequences.push(frame.sequence());
        }

        fn on_stop(&mut self) {
            self.stopped += 1;
        }
    }

    fn frame(sequence: u64) -> Frame {
        Frame::new(vec![0u8; 4], 2, 2, sequence)
    }

    fn wait_for(mut condition: impl FnMut() -> bool) {
        let deadline = Instant::now() + Duration::from_secs(2);
        while !condition() && Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(2));
        }
    }

    #[test]
    fn test_full_lifecycle() {
        let recorder = Arc::new(Mutex::new(Recorder::default()));
        let mut distributor = FrameDistributor::new(DistributorConfig::default());
        distributor.add_consumer(recorder.clone()).unwrap();

        let input = SurfaceTexture::new(2, 2, 8);
        distributor.configure(input.clone()).unwrap();
        distributor.start().unwrap();
        assert_eq!(distributor.state(), DistributorState::Running);

        for sequence in 1..=3 {
            input.queue_frame(frame(sequence)).unwrap();
        }
        wait_for(|| distributor.frames_distributed() == 3);

        distributor.close();
        assert_eq!(distributor.state(), DistributorState::Closed);
        assert!(input.is_released());

        let recorder = recorder.lock().unwrap();
        assert_eq!(recorder.started, 1);
        assert_eq!(recorder.stopped, 1);
        assert_eq!(recorder.sequences, vec![1, 2, 3]);
    }

    #[test]
    fn test_fan_out_reaches_every_consumer() {
        let first = Arc::new(Mutex::new(Recorder::default()));
        let second = Arc::new(Mutex::new(Recorder::default()));
        let mut distributor = FrameDistributor::new(DistributorConfig::default());
        distributor.add_consumer(first.clone()).unwrap();
        distributor.add_consumer(second.clone()).unwrap();

        let input = SurfaceTexture::new(2, 2, 4);
        distributor.configure(input.clone()).unwrap();
        distributor.start().unwrap();
        input.queue_frame(frame(7)).unwrap();
        wait_for(|| distributor.frames_distributed() == 1);
        distributor.close();

        assert_eq!(first.lock().unwrap().sequences, vec![7]);
        assert_eq!(second.lock().unwrap().sequences, vec![7]);
    }

    #[test]
    fn test_start_requires_configuration() {
        let mut distributor = FrameDistributor::new(DistributorConfig::default());
        assert!(matches!(
            distributor.start(),
            Err(DistributorError::InvalidTransition {
                from: DistributorState::Unconfigured,
                ..
            })
        ));
    }

    #[test]
    fn test_cannot_reconfigure_while_running() {
        let mut distributor = FrameDistributor::new(DistributorConfig::default());
        distributor.configure(SurfaceTexture::new(2, 2, 1)).unwrap();
        distributor.start().unwrap();

        assert!(distributor.configure(SurfaceTexture::new(2, 2, 1)).is_err());
        assert!(distributor.start().is_err());
        assert!(distributor
            .add_consumer(Arc::new(Mutex::new(Recorder::default())))
            .is_err());
    }

    #[test]
    fn test_reconfigure_releases_previous_input() {
        let mut distributor = FrameDistributor::new(DistributorConfig::default());
        let first = SurfaceTexture::new(2, 2, 1);
        let second = SurfaceTexture::new(4, 4, 1);

        distributor.configure(first.clone()).unwrap();
        distributor.configure(second.clone()).unwrap();

        assert!(first.is_released());
        assert!(distributor
            .input_surface_texture()
            .is_some_and(|input| input.same_surface(&second)));
    }

    #[test]
    fn test_input_surface_only_while_live() {
        let mut distributor = FrameDistributor::new(DistributorConfig::default());
        assert!(distributor.input_surface_texture().is_none());

        distributor.configure(SurfaceTexture::new(2, 2, 1)).unwrap();
        assert!(distributor.input_surface_texture().is_some());

        distributor.close();
        assert!(distributor.input_surface_texture().is_none());
    }

    #[test]
    fn test_close_is_idempotent_and_terminal() {
        let mut distributor = FrameDistributor::new(DistributorConfig::default());
        distributor.close();
        distributor.close();

        assert_eq!(distributor.state(), DistributorState::Closed);
        assert!(distributor.configure(SurfaceTexture::new(2, 2, 1)).is_err());
    }

    #[test]
    fn test_drop_stops_consumers() {
        let recorder = Arc::new(Mutex::new(Recorder::default()));
        {
            let mut distributor = FrameDistributor::new(DistributorConfig::default());
            distributor.add_consumer(recorder.clone()).unwrap();
            distributor.configure(SurfaceTexture::new(2, 2, 1)).unwrap();
            distributor.start().unwrap();
        }
        assert_eq!(recorder.lock().unwrap().stopped, 1);
    }
}
