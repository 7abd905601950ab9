// filepath: src/input/listener.rs
//! Background touch polling loop
//!
//! Devices are watched by a calloop event loop on an owned thread. The
//! thread is cancelled with a flag plus a loop wakeup and joined in `stop`,
//! so no callback runs once `stop` has returned.

use std::{
    io,
    os::fd::AsFd,
    path::{Path, PathBuf},
    sync::{
        atomic::{AtomicBool, Ordering},
        mpsc, Arc,
    },
    thread::{self, JoinHandle},
    time::Duration,
};

use calloop::{generic::Generic, EventLoop, Interest, LoopSignal, Mode, PostAction};
use evdev::{Device, InputEvent};
use log::{debug, error, info, warn};

use super::decoder::{RawInput, TouchDecoder, TouchEvent};
use super::device::{enumerate_touch_devices, TouchDevice};
use crate::config::InputConfig;
use crate::error::InputError;

pub type TouchCallback = Box<dyn FnMut(TouchEvent) + Send>;

/// Readable descriptor yielding raw evdev records
trait RecordSource: AsFd {
    fn fetch(&mut self) -> io::Result<impl Iterator<Item = InputEvent> + '_>;
}

impl RecordSource for Device {
    fn fetch(&mut self) -> io::Result<impl Iterator<Item = InputEvent> + '_> {
        self.fetch_events()
    }
}

struct LoopData {
    decoder: TouchDecoder,
    callback: TouchCallback,
    open_devices: usize,
}

struct Worker {
    cancel: Arc<AtomicBool>,
    signal: LoopSignal,
    handle: JoinHandle<()>,
}

impl Worker {
    /// Start the loop thread and wait until every source is registered
    fn spawn<D>(
        sources: Vec<(PathBuf, D)>,
        data: LoopData,
        timing: (Duration, Duration),
    ) -> Result<Self, InputError>
    where
        D: RecordSource + Send + 'static,
    {
        let cancel = Arc::new(AtomicBool::new(false));
        let (ready_tx, ready_rx) = mpsc::channel();

        let thread_cancel = Arc::clone(&cancel);
        let handle = thread::Builder::new()
            .name("touch-input".to_string())
            .spawn(move || run_loop(sources, data, thread_cancel, timing, ready_tx))
            .map_err(InputError::Spawn)?;

        match ready_rx.recv() {
            Ok(Ok(signal)) => Ok(Self {
                cancel,
                signal,
                handle,
            }),
            Ok(Err(msg)) => {
                let _ = handle.join();
                Err(InputError::EventLoop(msg))
            }
            Err(_) => {
                let _ = handle.join();
                Err(InputError::EventLoop(
                    "input thread exited during setup".to_string(),
                ))
            }
        }
    }

    fn stop(self) {
        self.cancel.store(true, Ordering::Release);
        self.signal.wakeup();
        if self.handle.join().is_err() {
            error!("Input thread panicked");
        }
    }
}

pub struct TouchListener {
    config: InputConfig,
    worker: Option<Worker>,
}

impl TouchListener {
    pub fn new(config: InputConfig) -> Self {
        Self {
            config,
            worker: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.worker.is_some()
    }

    /// Start polling in the background. Returns false, with no thread
    /// left behind, when no touch device qualifies or the loop cannot start.
    pub fn start(&mut self, screen_w: i32, screen_h: i32, callback: TouchCallback) -> bool {
        if self.worker.is_some() {
            return true;
        }

        match self.spawn(screen_w, screen_h, callback) {
            Ok((worker, count)) => {
                self.worker = Some(worker);
                info!("Input listener started for {count} devices");
                true
            }
            Err(e) => {
                error!("{e}");
                false
            }
        }
    }

    fn spawn(
        &self,
        screen_w: i32,
        screen_h: i32,
        callback: TouchCallback,
    ) -> Result<(Worker, usize), InputError> {
        let devices = enumerate_touch_devices(&self.config.device_dir)?;
        let Some(first) = devices.first() else {
            return Err(InputError::NoDevices {
                path: self.config.device_dir.clone(),
            });
        };
        if devices.len() > 1 {
            warn!(
                "{} touch devices found; all samples are calibrated against {} ({})",
                devices.len(),
                first.path.display(),
                first.calibration.name
            );
        }

        let data = LoopData {
            decoder: TouchDecoder::new(
                first.calibration.clone(),
                screen_w,
                screen_h,
                self.config.move_threshold,
            ),
            callback,
            open_devices: 0,
        };
        let sources: Vec<(PathBuf, Device)> = devices
            .into_iter()
            .map(|TouchDevice { path, device, .. }| (path, device))
            .collect();
        let count = sources.len();
        let timing = (self.config.poll_timeout(), self.config.idle_sleep());
        Ok((Worker::spawn(sources, data, timing)?, count))
    }

    /// Stop polling, join the thread and close every device
    pub fn stop(&mut self) {
        let Some(worker) = self.worker.take() else {
            return;
        };
        worker.stop();
        info!("Input listener stopped");
    }
}

impl Drop for TouchListener {
    fn drop(&mut self) {
        self.stop();
    }
}

fn run_loop<D: RecordSource + 'static>(
    sources: Vec<(PathBuf, D)>,
    mut data: LoopData,
    cancel: Arc<AtomicBool>,
    (poll_timeout, idle_sleep): (Duration, Duration),
    ready: mpsc::Sender<Result<LoopSignal, String>>,
) {
    let mut event_loop: EventLoop<'_, LoopData> = match EventLoop::try_new() {
        Ok(event_loop) => event_loop,
        Err(e) => {
            let _ = ready.send(Err(e.to_string()));
            return;
        }
    };

    let handle = event_loop.handle();
    for (path, source) in sources {
        let label = path.display().to_string();
        let generic = Generic::new(source, Interest::READ, Mode::Level);
        let inserted = handle.insert_source(generic, move |_readiness, source, data| {
            // SAFETY: the source is only read from; it is never replaced or closed here.
            let source = unsafe { source.get_mut() };
            Ok(dispatch_read(&path, source.fetch(), data))
        });
        match inserted {
            Ok(_) => data.open_devices += 1,
            Err(e) => warn!("Failed to watch {label}: {}", e.error),
        }
    }

    if data.open_devices == 0 {
        let _ = ready.send(Err("no device could be watched".to_string()));
        return;
    }
    if ready.send(Ok(event_loop.get_signal())).is_err() {
        return;
    }

    while !cancel.load(Ordering::Acquire) {
        // With every device gone there is nothing to wait on but a wakeup
        let timeout = if data.open_devices == 0 {
            idle_sleep
        } else {
            poll_timeout
        };
        if let Err(e) = event_loop.dispatch(Some(timeout), &mut data) {
            warn!("Input poll failed: {e}");
        }
    }
}

/// Feed one batched read to the decoder and decide whether the source stays
fn dispatch_read<I>(path: &Path, fetched: io::Result<I>, data: &mut LoopData) -> PostAction
where
    I: IntoIterator<Item = InputEvent>,
{
    match fetched {
        Ok(events) => {
            for ev in events {
                if let Some(touch) = data.decoder.feed(RawInput::from_event(&ev)) {
                    (data.callback)(touch);
                }
            }
            PostAction::Continue
        }
        Err(e) if e.kind() == io::ErrorKind::WouldBlock => PostAction::Continue,
        Err(e) if e.raw_os_error() == Some(nix::libc::ENODEV) => {
            warn!("Input {} went away: {e}", path.display());
            data.open_devices = data.open_devices.saturating_sub(1);
            PostAction::Remove
        }
        Err(e) => {
            debug!("Read from {} failed: {e}", path.display());
            PostAction::Continue
        }
    }
}
