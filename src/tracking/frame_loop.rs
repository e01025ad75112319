//! Camera → landmark model loop.
//!
//! [`FrameLoop::spawn`] opens the camera on a tokio task, then pulls frames
//! one at a time, runs the [`HandTracker`] on each and forwards the outcome
//! as a [`TrackingEvent`].  Sending on a bounded channel means a slow
//! consumer stalls frame acquisition instead of queueing frames.
//!
//! Dropping the [`FrameLoop`] aborts the task, which drops the open
//! [`FrameStream`](super::FrameStream) and with it the camera.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use super::camera::{Camera, CameraError, CameraRequest};
use super::landmarks::{HandLandmarks, HandTracker};

/// Events emitted by the frame loop.
#[derive(Debug, Clone)]
pub enum TrackingEvent {
    /// The camera opened successfully.
    Started,
    /// The camera could not be opened.  The loop has exited.
    Failed(CameraError),
    /// Landmarks for one frame; `None` when no hand was found.
    Hand(Option<HandLandmarks>),
    /// The stream ran out of frames.
    Ended,
}

/// Handle to a running frame loop.
pub struct FrameLoop {
    task: JoinHandle<()>,
}

impl FrameLoop {
    /// Spawn the loop on the current tokio runtime.
    ///
    /// Per-frame tracker errors are logged and reported as "no hand" so a
    /// single bad frame lifts the pen rather than stalling the stream.
    pub fn spawn<E>(
        camera: Arc<dyn Camera>,
        tracker: Arc<dyn HandTracker>,
        request: CameraRequest,
        tx: mpsc::Sender<E>,
    ) -> Self
    where
        E: From<TrackingEvent> + Send + 'static,
    {
        let task = tokio::spawn(async move {
            let mut stream = match camera.open(&request).await {
                Ok(stream) => stream,
                Err(e) => {
                    log::error!("tracking: camera open failed: {e}");
                    let _ = tx.send(TrackingEvent::Failed(e).into()).await;
                    return;
                }
            };

            log::info!(
                "tracking: camera open ({}x{}, {:?})",
                request.width,
                request.height,
                request.facing
            );
            if tx.send(TrackingEvent::Started.into()).await.is_err() {
                return;
            }

            while let Some(frame) = stream.next_frame().await {
                let hand = match tracker.detect(&frame).await {
                    Ok(hand) => hand,
                    Err(e) => {
                        log::warn!("tracking: frame {} dropped: {e}", frame.sequence);
                        None
                    }
                };

                if tx.send(TrackingEvent::Hand(hand).into()).await.is_err() {
                    log::debug!("tracking: event channel closed, stopping");
                    return;
                }
            }

            log::info!("tracking: stream ended");
            let _ = tx.send(TrackingEvent::Ended.into()).await;
        });

        Self { task }
    }
}

impl Drop for FrameLoop {
    fn drop(&mut self) {
        self.task.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracking::camera::{FacingMode, Frame, FrameStream};
    use crate::tracking::landmarks::{Landmark, TrackingError};
    use async_trait::async_trait;

    struct ListStream {
        remaining: u64,
        next: u64,
    }

    #[async_trait]
    impl FrameStream for ListStream {
        async fn next_frame(&mut self) -> Option<Frame> {
            if self.next >= self.remaining {
                return None;
            }
            let frame = Frame {
                sequence: self.next,
                width: 4,
                height: 4,
                rgba: Vec::new(),
            };
            self.next += 1;
            Some(frame)
        }
    }

    struct FiniteCamera(u64);

    #[async_trait]
    impl Camera for FiniteCamera {
        async fn open(
            &self,
            _request: &CameraRequest,
        ) -> Result<Box<dyn FrameStream>, CameraError> {
            Ok(Box::new(ListStream {
                remaining: self.0,
                next: 0,
            }))
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

    /// Hand on even frames, error on frame 3, nothing otherwise.
    struct AlternatingTracker;

    #[async_trait]
    impl HandTracker for AlternatingTracker {
        async fn detect(&self, frame: &Frame) -> Result<Option<HandLandmarks>, TrackingError> {
            match frame.sequence {
                3 => Err(TrackingError::Inference("blurry".into())),
                n if n % 2 == 0 => Ok(Some(HandLandmarks::new([Landmark::default(); 21]))),
                _ => Ok(None),
            }
        }
    }

    fn request() -> CameraRequest {
        CameraRequest {
            width: 640,
            height: 480,
            facing: FacingMode::User,
        }
    }

    #[tokio::test]
    async fn forwards_every_frame_then_ends() {
        let (tx, mut rx) = mpsc::channel::<TrackingEvent>(8);
        let _loop = FrameLoop::spawn(
            Arc::new(FiniteCamera(4)),
            Arc::new(AlternatingTracker),
            request(),
            tx,
        );

        assert!(matches!(rx.recv().await, Some(TrackingEvent::Started)));
        let mut hands = Vec::new();
        loop {
            match rx.recv().await {
                Some(TrackingEvent::Hand(h)) => hands.push(h.is_some()),
                Some(TrackingEvent::Ended) => break,
                other => panic!("unexpected event: {other:?}"),
            }
        }
        // Frame 3 errored and is reported as "no hand".
        assert_eq!(hands, vec![true, false, true, false]);
    }

    #[tokio::test]
    async fn open_failure_is_reported_once() {
        let (tx, mut rx) = mpsc::channel::<TrackingEvent>(8);
        let _loop = FrameLoop::spawn(
            Arc::new(DeniedCamera),
            Arc::new(AlternatingTracker),
            request(),
            tx,
        );

        assert!(matches!(
            rx.recv().await,
            Some(TrackingEvent::Failed(CameraError::PermissionDenied))
        ));
        // Sender dropped when the task exits.
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn dropping_the_handle_stops_the_loop() {
        let (tx, mut rx) = mpsc::channel::<TrackingEvent>(1);
        let handle = FrameLoop::spawn(
            Arc::new(FiniteCamera(1_000)),
            Arc::new(AlternatingTracker),
            request(),
            tx,
        );

        assert!(matches!(rx.recv().await, Some(TrackingEvent::Started)));
        drop(handle);

        // Drain whatever was buffered before the abort; the channel must close.
        let mut drained = 0;
        while rx.recv().await.is_some() {
            drained += 1;
            assert!(drained < 1_000, "loop kept running after drop");
        }
    }
}
