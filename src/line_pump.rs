//! Background line framing for an active transport, and the timeout-bounded
//! read built on top of it.

use crate::error::{Error, Result};
use std::io;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

/// Number of lines the pump may queue ahead of the reader before it waits.
pub const LINE_QUEUE_CAPACITY: usize = 100;

/// Handle to the task that owns a transport's read half.
///
/// Dropping the handle aborts the task.
pub struct LinePump {
    lines: mpsc::Receiver<Vec<u8>>,
    fault: Option<oneshot::Receiver<io::Error>>,
    task: JoinHandle<()>,
}

/// Spawns a task that reads `reader` line by line until it faults.
pub fn spawn_line_pump<R>(reader: R) -> LinePump
where
    R: AsyncRead + Unpin + Send + 'static,
{
    let (line_tx, line_rx) = mpsc::channel(LINE_QUEUE_CAPACITY);
    let (fault_tx, fault_rx) = oneshot::channel();

    let task = tokio::spawn(async move {
        let mut reader = BufReader::new(reader);
        let fault = loop {
            let mut line = Vec::new();
            match reader.read_until(b'\n', &mut line).await {
                Ok(0) => {
                    break io::Error::new(
                        io::ErrorKind::UnexpectedEof,
                        "device closed the stream",
                    );
                }
                Ok(_) => {
                    if line_tx.send(line).await.is_err() {
                        return; // Reader dropped
                    }
                }
                Err(e) => break e,
            }
        };
        tracing::debug!(error = %fault, "line pump stopped");
        let _ = fault_tx.send(fault);
    });

    LinePump {
        lines: line_rx,
        fault: Some(fault_rx),
        task,
    }
}

impl LinePump {
    /// Collect whatever lines arrive within `timeout`, concatenated as received.
    ///
    /// The timer covers the whole call, not each line. If the pump faults the
    /// bytes collected so far are returned inside [`Error::Disconnected`]; the
    /// fault is reported once, after which reads only drain what is left.
    pub async fn read_timeout(&mut self, timeout: Duration) -> Result<Vec<u8>> {
        let mut received = Vec::new();
        let timer = tokio::time::sleep(timeout);
        tokio::pin!(timer);

        loop {
            tokio::select! {
                biased;

                _ = &mut timer => return Ok(received),

                Some(line) = self.lines.recv() => received.extend_from_slice(&line),

                source = next_fault(&mut self.fault) => {
                    self.fault = None;
                    return Err(Error::Disconnected { received, source });
                }
            }
        }
    }

    /// Abort the pump task. Lines already queued can still be read.
    pub fn stop(&self) {
        self.task.abort();
    }
}

impl Drop for LinePump {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn next_fault(slot: &mut Option<oneshot::Receiver<io::Error>>) -> io::Error {
    match slot {
        Some(rx) => rx.await.unwrap_or_else(|_| {
            io::Error::new(io::ErrorKind::BrokenPipe, "line pump exited without a fault")
        }),
        None => std::future::pending().await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncWriteExt;
    use tokio::time::Instant;

    #[tokio::test(start_paused = true)]
    async fn test_silent_device_times_out_empty() {
        let (_device, host) = tokio::io::duplex(64);
        let mut pump = spawn_line_pump(host);

        let start = Instant::now();
        let out = pump.read_timeout(Duration::from_millis(200)).await.unwrap();
        assert!(out.is_empty());
        assert_eq!(start.elapsed(), Duration::from_millis(200));
    }

    #[tokio::test(start_paused = true)]
    async fn test_lines_are_concatenated_verbatim() {
        let (mut device, host) = tokio::io::duplex(64);
        let mut pump = spawn_line_pump(host);

        device.write_all(b"Router>\r\nen\r\n").await.unwrap();
        let out = pump.read_timeout(Duration::from_millis(200)).await.unwrap();
        assert_eq!(out, b"Router>\r\nen\r\n");
    }

    #[tokio::test(start_paused = true)]
    async fn test_timer_covers_the_whole_call() {
        let (mut device, host) = tokio::io::duplex(64);
        let mut pump = spawn_line_pump(host);

        tokio::spawn(async move {
            for i in 0..4 {
                device.write_all(format!("line{i}\n").as_bytes()).await.unwrap();
                tokio::time::sleep(Duration::from_millis(100)).await;
            }
            // Keep the stream open past the read window.
            tokio::time::sleep(Duration::from_secs(10)).await;
        });

        let start = Instant::now();
        let out = pump.read_timeout(Duration::from_millis(250)).await.unwrap();
        assert_eq!(start.elapsed(), Duration::from_millis(250));
        assert_eq!(out, b"line0\nline1\nline2\n");

        let rest = pump.read_timeout(Duration::from_millis(250)).await.unwrap();
        assert_eq!(rest, b"line3\n");
    }

    #[tokio::test(start_paused = true)]
    async fn test_disconnect_carries_partial_output() {
        let (mut device, host) = tokio::io::duplex(64);
        let mut pump = spawn_line_pump(host);

        device.write_all(b"bye\npartial").await.unwrap();
        drop(device);

        let start = Instant::now();
        let err = pump.read_timeout(Duration::from_secs(5)).await.unwrap_err();
        assert!(start.elapsed() < Duration::from_secs(5));
        match err {
            Error::Disconnected { received, source } => {
                assert_eq!(received, b"bye\npartial");
                assert_eq!(source.kind(), io::ErrorKind::UnexpectedEof);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_fault_is_reported_once() {
        let (device, host) = tokio::io::duplex(64);
        let mut pump = spawn_line_pump(host);
        drop(device);

        assert!(pump.read_timeout(Duration::from_secs(1)).await.is_err());
        let out = pump.read_timeout(Duration::from_millis(100)).await.unwrap();
        assert!(out.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_full_queue_holds_back_pump_without_losing_lines() {
        let (mut device, host) = tokio::io::duplex(64 * 1024);
        let mut pump = spawn_line_pump(host);

        let burst = LINE_QUEUE_CAPACITY * 5 / 2;
        let mut expected = Vec::new();
        for i in 0..burst {
            let line = format!("%LINK-3-UPDOWN: Gi0/{i}\r\n");
            device.write_all(line.as_bytes()).await.unwrap();
            expected.extend_from_slice(line.as_bytes());
        }
        // Let the pump fill its queue and block before anyone reads.
        tokio::task::yield_now().await;

        let start = Instant::now();
        let out = pump.read_timeout(Duration::from_millis(100)).await.unwrap();
        assert_eq!(start.elapsed(), Duration::from_millis(100));
        assert_eq!(out.len(), expected.len());
        assert_eq!(out, expected);

        drop(device);
        match pump.read_timeout(Duration::from_secs(1)).await.unwrap_err() {
            Error::Disconnected { received, source } => {
                assert!(received.is_empty());
                assert_eq!(source.kind(), io::ErrorKind::UnexpectedEof);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropping_pump_stops_task() {
        let (_device, host) = tokio::io::duplex(64);
        let pump = spawn_line_pump(host);
        let task = pump.task.abort_handle();
        drop(pump);
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(task.is_finished());
    }
}
