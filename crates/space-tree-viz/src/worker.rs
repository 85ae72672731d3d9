//! Background render worker with last-request-wins coalescing.
//!
//! The worker owns a [`SceneCache`] on its own thread and renders one
//! request at a time. Live requests are posted into a single-slot mailbox: a
//! request posted while another one is pending replaces it, so a burst of
//! camera moves only renders the latest pose once the current frame is done.
//! Export requests are queued separately and never replaced; they run before
//! the pending live request. Nothing cancels an in-flight render.

use std::collections::VecDeque;
use std::io;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use space_tree::Camera;

use crate::error::{RenderError, Result};
use crate::protocol::{RenderRequest, RenderResponse};
use crate::render::{Frame, render_frame};
use crate::scene::SceneCache;
use crate::source::AssetSource;

#[derive(Debug, Default)]
struct Mailbox {
    pending: Option<RenderRequest>,
    exports: VecDeque<RenderRequest>,
    busy: bool,
    shutdown: bool,
}

/// The most recent live frame and a counter bumped on every update.
#[derive(Debug, Clone)]
pub struct CanvasFrame {
    pub generation: u64,
    pub frame: Arc<Frame>,
}

#[derive(Debug, Default)]
struct Shared {
    mailbox: Mutex<Mailbox>,
    wake: Condvar,
    canvas: Mutex<Option<CanvasFrame>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Handle to the render thread. Dropping it stops the thread.
#[derive(Debug)]
pub struct RenderWorker {
    shared: Arc<Shared>,
    responses: Receiver<RenderResponse>,
    handle: Option<JoinHandle<()>>,
}

impl RenderWorker {
    /// Starts a worker loading assets from `source`.
    pub fn spawn<S: AssetSource + 'static>(source: S) -> io::Result<Self> {
        let shared = Arc::new(Shared::default());
        let (tx, responses) = mpsc::channel();
        let handle = thread::Builder::new()
            .name("render-worker".into())
            .spawn({
                let shared = Arc::clone(&shared);
                move || run(shared, SceneCache::new(source), tx)
            })?;
        Ok(Self {
            shared,
            responses,
            handle: Some(handle),
        })
    }

    /// Posts a request.
    ///
    /// A live request replaces any live request that has not started yet.
    /// Export requests are queued and always run.
    pub fn request(&self, request: RenderRequest) {
        let mut mailbox = lock(&self.shared.mailbox);
        if request.options.export_image {
            mailbox.exports.push_back(request);
        } else if let Some(stale) = mailbox.pending.replace(request) {
            log::warn!("superseded pending render of {}", stale.model_path);
        }
        self.shared.wake.notify_one();
    }

    /// Returns `true` while a render is in progress.
    pub fn is_busy(&self) -> bool {
        lock(&self.shared.mailbox).busy
    }

    /// Returns a response if one is ready.
    pub fn try_recv(&self) -> Option<RenderResponse> {
        self.responses.try_recv().ok()
    }

    /// Waits up to `timeout` for the next response.
    pub fn recv_timeout(&self, timeout: Duration) -> Result<Option<RenderResponse>> {
        match self.responses.recv_timeout(timeout) {
            Ok(response) => Ok(Some(response)),
            Err(RecvTimeoutError::Timeout) => Ok(None),
            Err(RecvTimeoutError::Disconnected) => Err(RenderError::WorkerGone),
        }
    }

    /// The latest live frame, if any render has completed.
    pub fn canvas(&self) -> Option<CanvasFrame> {
        lock(&self.shared.canvas).clone()
    }
}

impl Drop for RenderWorker {
    fn drop(&mut self) {
        lock(&self.shared.mailbox).shutdown = true;
        self.shared.wake.notify_one();
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                log::error!("render worker panicked");
            }
        }
    }
}

fn run<S: AssetSource>(shared: Arc<Shared>, mut cache: SceneCache<S>, tx: Sender<RenderResponse>) {
    let mut generation = 0;
    loop {
        let request = {
            let mut mailbox = lock(&shared.mailbox);
            loop {
                if mailbox.shutdown {
                    return;
                }
                if let Some(request) = mailbox
                    .exports
                    .pop_front()
                    .or_else(|| mailbox.pending.take())
                {
                    mailbox.busy = true;
                    break request;
                }
                mailbox = shared
                    .wake
                    .wait(mailbox)
                    .unwrap_or_else(PoisonError::into_inner);
            }
        };

        let response = match serve(&mut cache, &request) {
            Ok(frame) if request.options.export_image => match frame.encode_png() {
                Ok(png) => RenderResponse::rendered(&request, Some(png)),
                Err(err) => failed(err),
            },
            Ok(frame) => {
                generation += 1;
                *lock(&shared.canvas) = Some(CanvasFrame {
                    generation,
                    frame: Arc::new(frame),
                });
                RenderResponse::rendered(&request, None)
            }
            Err(err) => failed(err),
        };

        lock(&shared.mailbox).busy = false;
        if tx.send(response).is_err() {
            return;
        }
    }
}

fn serve<S: AssetSource>(cache: &mut SceneCache<S>, request: &RenderRequest) -> Result<Frame> {
    let scene = cache.load(&request.model_path, request.normals_path.as_deref())?;
    render_frame(&scene, &Camera::from(request.camera), &request.options)
}

fn failed(err: RenderError) -> RenderResponse {
    log::debug!("render failed: {err}");
    RenderResponse::Failed {
        error: err.to_string(),
    }
}
