use crossbeam_channel::{unbounded, Receiver, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::trace;

#[derive(Debug)]
pub(crate) enum TimerCommand {
    /// (Re)start the countdown; expiry reports `generation`
    Arm { generation: u64, after: Duration },
    Disarm,
    Shutdown,
}

/// Control side of a gesture timeout timer
#[derive(Clone)]
pub(crate) struct TimerHandle {
    tx: Sender<TimerCommand>,
}

impl TimerHandle {
    pub(crate) fn channel() -> (Self, Receiver<TimerCommand>) {
        let (tx, rx) = unbounded();
        (Self { tx }, rx)
    }

    pub(crate) fn arm(&self, generation: u64, after: Duration) {
        self.send(TimerCommand::Arm { generation, after });
    }

    pub(crate) fn disarm(&self) {
        self.send(TimerCommand::Disarm);
    }

    pub(crate) fn shutdown(&self) {
        self.send(TimerCommand::Shutdown);
    }

    fn send(&self, command: TimerCommand) {
        if self.tx.send(command).is_err() {
            trace!("Timeout timer already stopped");
        }
    }
}

/// Start the timer thread. `on_expire` runs on that thread with the
/// generation of the countdown that ran out.
pub(crate) fn spawn<F>(rx: Receiver<TimerCommand>, on_expire: F) -> std::io::Result<JoinHandle<()>>
where
    F: Fn(u64) + Send + 'static,
{
    thread::Builder::new()
        .name("gesture-timeout".to_string())
        .spawn(move || run_timer(&rx, on_expire))
}

fn run_timer<F: Fn(u64)>(rx: &Receiver<TimerCommand>, on_expire: F) {
    let mut pending: Option<(Instant, u64)> = None;

    loop {
        let command = match pending {
            Some((deadline, generation)) => {
                let wait = deadline.saturating_duration_since(Instant::now());
                match rx.recv_timeout(wait) {
                    Ok(command) => command,
                    Err(RecvTimeoutError::Timeout) => {
                        pending = None;
                        trace!("Timeout generation {} expired", generation);
                        on_expire(generation);
                        continue;
                    }
                    Err(RecvTimeoutError::Disconnected) => break,
                }
            }
            None => match rx.recv() {
                Ok(command) => command,
                Err(_) => break,
            },
        };

        match command {
            TimerCommand::Arm { generation, after } => {
                pending = Some((Instant::now() + after, generation));
            }
            TimerCommand::Disarm => pending = None,
            TimerCommand::Shutdown => break,
        }
    }
    trace!("Timeout timer stopped");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expires_with_generation() {
        let (handle, rx) = TimerHandle::channel();
        let (fired_tx, fired_rx) = unbounded();
        let _thread = spawn(rx, move |generation| {
            let _ = fired_tx.send(generation);
        })
        .unwrap();

        handle.arm(7, Duration::from_millis(10));
        assert_eq!(fired_rx.recv_timeout(Duration::from_secs(2)), Ok(7));
        handle.shutdown();
    }

    #[test]
    fn test_rearm_replaces_countdown() {
        let (handle, rx) = TimerHandle::channel();
        let (fired_tx, fired_rx) = unbounded();
        let _thread = spawn(rx, move |generation| {
            let _ = fired_tx.send(generation);
        })
        .unwrap();

        handle.arm(1, Duration::from_millis(200));
        handle.arm(2, Duration::from_millis(10));
        assert_eq!(fired_rx.recv_timeout(Duration::from_secs(2)), Ok(2));
        assert!(fired_rx.recv_timeout(Duration::from_millis(400)).is_err());
        handle.shutdown();
    }

    #[test]
    fn test_disarm() {
        let (handle, rx) = TimerHandle::channel();
        let (fired_tx, fired_rx) = unbounded();
        let thread = spawn(rx, move |generation| {
            let _ = fired_tx.send(generation);
        })
        .unwrap();

        handle.arm(1, Duration::from_millis(20));
        handle.disarm();
        assert!(fired_rx.recv_timeout(Duration::from_millis(100)).is_err());
        handle.shutdown();
        thread.join().unwrap();
    }
}
