use crate::error::Result;
use crate::serial::LidarPort;
use crate::time::sleep_ms;
use std::collections::VecDeque;
use std::io::{self, Read, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

/// Builds a scan frame with a valid checksum.
///
/// The checksum is computed bytewise: the low byte of a word XOR is the XOR of
/// the even bytes, the high byte the XOR of the odd bytes.
pub(crate) fn build_frame(
    freq_and_type: u8,
    start_code: u16,
    end_code: u16,
    payload: &[u8],
) -> Vec<u8> {
    let sample_count = if freq_and_type & 0x01 == 1 {
        1
    } else {
        (payload.len() / 3) as u8
    };
    let mut frame = vec![0xA5, 0x5A, freq_and_type, sample_count];
    frame.extend(start_code.to_le_bytes());
    frame.extend(end_code.to_le_bytes());

    let mut checksum = [0u8; 2];
    for (i, b) in frame.iter().chain(payload).enumerate() {
        checksum[i % 2] ^= b;
    }
    frame.extend(checksum);
    frame.extend(payload);
    frame
}

/// Shared view on what a `MockPort` saw, usable after the port moved to a worker.
#[derive(Clone, Default)]
pub(crate) struct MockPortMonitor {
    written: Arc<Mutex<Vec<u8>>>,
    cleared: Arc<AtomicBool>,
}

impl MockPortMonitor {
    pub(crate) fn written(&self) -> Vec<u8> {
        self.written.lock().unwrap().clone()
    }

    pub(crate) fn was_cleared(&self) -> bool {
        self.cleared.load(Ordering::SeqCst)
    }
}

/// In-memory stand-in for the serial device.
pub(crate) struct MockPort {
    input: VecDeque<u8>,
    repeat: Option<Vec<u8>>,
    max_read: usize,
    timeout_when_empty: bool,
    monitor: MockPortMonitor,
}

impl MockPort {
    pub(crate) fn new(input: &[u8]) -> MockPort {
        MockPort {
            input: input.iter().copied().collect(),
            repeat: None,
            max_read: usize::MAX,
            timeout_when_empty: false,
            monitor: MockPortMonitor::default(),
        }
    }

    pub(crate) fn with_max_read(mut self, max_read: usize) -> Self {
        self.max_read = max_read;
        self
    }

    /// Reads on an empty port wait briefly and time out instead of reporting end of stream.
    pub(crate) fn with_timeout_when_empty(mut self) -> Self {
        self.timeout_when_empty = true;
        self
    }

    /// Once the scripted input is consumed, `data` is replayed forever.
    pub(crate) fn with_repeat(mut self, data: &[u8]) -> Self {
        self.repeat = Some(data.to_vec());
        self
    }

    pub(crate) fn monitor(&self) -> MockPortMonitor {
        self.monitor.clone()
    }

    pub(crate) fn remaining(&self) -> usize {
        self.input.len()
    }

    pub(crate) fn written(&self) -> Vec<u8> {
        self.monitor.written()
    }

    pub(crate) fn was_cleared(&self) -> bool {
        self.monitor.was_cleared()
    }
}

impl Read for MockPort {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.input.is_empty() {
            if let Some(data) = &self.repeat {
                self.input.extend(data);
            }
        }
        if self.input.is_empty() {
            if self.timeout_when_empty {
                sleep_ms(5);
                return Err(io::Error::from(io::ErrorKind::TimedOut));
            }
            return Ok(0);
        }
        let n = buf.len().min(self.max_read).min(self.input.len());
        for (dst, src) in buf.iter_mut().zip(self.input.drain(..n)) {
            *dst = src;
        }
        Ok(n)
    }
}

impl Write for MockPort {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.monitor.written.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl LidarPort for MockPort {
    fn clear_buffers(&mut self) -> Result<()> {
        self.input.clear();
        self.repeat = None;
        self.monitor.cleared.store(true, Ordering::SeqCst);
        Ok(())
    }
}

#[test]
fn test_build_frame() {
    let frame = build_frame(0x00, 0x0280, 0x0280, &[0x12, 0x83, 0x40]);
    assert_eq!(
        frame,
        vec![0xA5, 0x5A, 0x00, 0x01, 0x80, 0x02, 0x80, 0x02, 0xF7, 0xD8, 0x12, 0x83, 0x40]
    );
}
