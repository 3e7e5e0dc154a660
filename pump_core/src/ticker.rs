//! Background delivery ticking.
//!
//! Spawns a thread that advances the injection controller at a fixed period,
//! independent of request arrival. The bounded channel doubles as the tick
//! timer and the shutdown signal.
//!
//! Safety: Each `Ticker` spawns exactly one thread that is shut down when
//! the `Ticker` is dropped, preventing thread leaks.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use crossbeam_channel as xch;
use pump_traits::{GlucoseSensor, Indicator, Pump};

use crate::device::Device;

pub struct Ticker {
    stop_tx: Option<xch::Sender<()>>,
    join_handle: Option<std::thread::JoinHandle<()>>,
}

impl Ticker {
    pub fn spawn<S, P, L>(device: Arc<Mutex<Device<S, P, L>>>, period: Duration) -> Self
    where
        S: GlucoseSensor + Send + 'static,
        P: Pump + Send + 'static,
        L: Indicator + Send + 'static,
    {
        let (stop_tx, stop_rx) = xch::bounded::<()>(1);

        let join_handle = std::thread::spawn(move || {
            loop {
                match stop_rx.recv_timeout(period) {
                    Ok(()) | Err(xch::RecvTimeoutError::Disconnected) => {
                        tracing::debug!("ticker thread received shutdown signal");
                        break;
                    }
                    Err(xch::RecvTimeoutError::Timeout) => {}
                }

                let mut dev = match device.lock() {
                    Ok(guard) => guard,
                    Err(poisoned) => poisoned.into_inner(),
                };
                if let Err(e) = dev.tick() {
                    tracing::warn!(error = %e, "tick failed");
                }
            }
            tracing::trace!("ticker thread exiting cleanly");
        });

        Self {
            stop_tx: Some(stop_tx),
            join_handle: Some(join_handle),
        }
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        if let Some(tx) = self.stop_tx.take() {
            let _ = tx.send(());
            drop(tx);
        }
        if let Some(handle) = self.join_handle.take() {
            match handle.join() {
                Ok(()) => {
                    tracing::trace!("ticker thread joined successfully");
                }
                Err(e) => {
                    // Thread panicked; log but don't propagate (we're in Drop)
                    tracing::warn!(?e, "ticker thread panicked during shutdown");
                }
            }
        }
    }
}
