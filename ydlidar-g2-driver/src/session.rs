use crate::config::DriverConfig;
use crate::error::{Result, YDLidarError};
use crate::frame::FrameReader;
use crate::packet::read_packet;
use crate::revolution::Revolutions;
use crate::serial::{open_port, start_scan, stop_scan_and_flush, LidarPort};
use crate::{check_device_health, get_device_info, get_health_status, reboot};
use crossbeam_channel::{bounded, select, Receiver, RecvTimeoutError, Sender, TryRecvError};
use log::{debug, info, warn};
use serialport::SerialPort;
use std::thread::JoinHandle;
use std::time::Duration;
use ydlidar_g2_data::{DeviceInfo, HealthStatus, ScanPacket};

/// One entry of the packet stream. Frames that fail to decode show up as `Err`.
pub type ScanItem = Result<ScanPacket>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Scanning,
    Stopping,
}

/// Receiving end of a running scan.
///
/// The stream ends once the scan is stopped or the device stream closes.
pub struct ScanStream {
    rx: Receiver<ScanItem>,
}

impl ScanStream {
    /// Blocks until the next item arrives. `None` once the stream is closed.
    pub fn recv(&self) -> Option<ScanItem> {
        self.rx.recv().ok()
    }

    pub fn recv_timeout(
        &self,
        timeout: Duration,
    ) -> std::result::Result<ScanItem, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }

    /// Groups the stream into full revolutions.
    pub fn revolutions(self) -> Revolutions<ScanStream> {
        Revolutions::new(self)
    }
}

impl Iterator for ScanStream {
    type Item = ScanItem;

    fn next(&mut self) -> Option<ScanItem> {
        self.recv()
    }
}

struct ScanWorker<P> {
    stop_tx: Sender<()>,
    thread: JoinHandle<P>,
}

/// Owns the device and drives the scan.
///
/// While scanning, the port belongs to a worker thread that decodes frames
/// and hands them to the [`ScanStream`]; it comes back to the session when
/// the scan is stopped.
pub struct ScanSession<P: LidarPort> {
    config: DriverConfig,
    state: SessionState,
    port: Option<P>,
    worker: Option<ScanWorker<P>>,
}

impl ScanSession<Box<dyn SerialPort>> {
    /// Opens a serial port such as `/dev/ttyUSB0`.
    pub fn open(port_name: &str, config: DriverConfig) -> Result<Self> {
        let port = open_port(port_name, &config)?;
        ScanSession::attach(port, config)
    }
}

impl<P: LidarPort> ScanSession<P> {
    pub fn new(port: P, config: DriverConfig) -> Self {
        ScanSession {
            config,
            state: SessionState::Idle,
            port: Some(port),
            worker: None,
        }
    }

    /// Takes over a device that may still be streaming from an earlier run:
    /// the scan is stopped and any buffered bytes are dropped.
    pub fn attach(mut port: P, config: DriverConfig) -> Result<Self> {
        stop_scan_and_flush(&mut port)?;
        Ok(ScanSession::new(port, config))
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn config(&self) -> &DriverConfig {
        &self.config
    }

    /// Stops the scan and closes the packet stream. Does nothing when idle.
    pub fn stop_scan(&mut self) -> Result<()> {
        let worker = match self.worker.take() {
            Some(worker) => worker,
            None => return Ok(()),
        };
        self.state = SessionState::Stopping;
        info!("Stopping scan");

        // The worker may already be gone if the consumer or the device went away.
        let _ = worker.stop_tx.try_send(());
        let joined = worker.thread.join();
        self.state = SessionState::Idle;

        let mut port = joined.map_err(|_| YDLidarError::WorkerPanicked)?;
        let result = stop_scan_and_flush(&mut port);
        self.port = Some(port);
        result
    }

    pub fn device_info(&mut self) -> Result<DeviceInfo> {
        get_device_info(self.idle_port()?)
    }

    pub fn health_status(&mut self) -> Result<HealthStatus> {
        get_health_status(self.idle_port()?)
    }

    /// Like [`ScanSession::health_status`], but an unhealthy device is an error.
    pub fn check_device_health(&mut self) -> Result<()> {
        check_device_health(self.idle_port()?)
    }

    /// Soft-restarts the device.
    pub fn reboot(&mut self) -> Result<()> {
        reboot(self.idle_port()?)
    }

    /// Stops any running scan and gives the port back.
    pub fn into_port(mut self) -> Result<P> {
        self.stop_scan()?;
        self.port.take().ok_or(YDLidarError::PortUnavailable)
    }

    fn idle_port(&mut self) -> Result<&mut P> {
        if self.state != SessionState::Idle {
            return Err(YDLidarError::SessionBusy);
        }
        self.port.as_mut().ok_or(YDLidarError::PortUnavailable)
    }
}

impl<P: LidarPort + 'static> ScanSession<P> {
    /// Enters continuous scan mode.
    ///
    /// Fails without producing any packet when the device does not
    /// acknowledge a continuous scan; the session then stays idle.
    pub fn start_scan(&mut self) -> Result<ScanStream> {
        start_scan(self.idle_port()?)?;
        let mut port = self.port.take().ok_or(YDLidarError::PortUnavailable)?;

        let (packet_tx, packet_rx) = bounded(self.config.packet_buffer);
        let (stop_tx, stop_rx) = bounded(1);
        let mut reader = FrameReader::new(self.config.resync_on_bad_preamble);
        let thread = std::thread::spawn(move || {
            decode_frames(&mut port, &mut reader, packet_tx, stop_rx);
            port
        });

        self.worker = Some(ScanWorker { stop_tx, thread });
        self.state = SessionState::Scanning;
        info!("Scan started");
        Ok(ScanStream { rx: packet_rx })
    }
}

impl<P: LidarPort> Drop for ScanSession<P> {
    fn drop(&mut self) {
        if let Err(e) = self.stop_scan() {
            warn!("Failed to stop scan: {e}");
        }
    }
}

fn stop_requested(stop_rx: &Receiver<()>) -> bool {
    match stop_rx.try_recv() {
        Ok(()) | Err(TryRecvError::Disconnected) => true,
        Err(TryRecvError::Empty) => false,
    }
}

fn read_scan_packet<P: LidarPort>(port: &mut P, reader: &mut FrameReader) -> ScanItem {
    let header = reader.read_header(port)?;
    read_packet(port, &header)
}

/// Decode loop run by the worker. Returns when stopped, when the consumer
/// drops the stream or when the device stream closes.
fn decode_frames<P: LidarPort>(
    port: &mut P,
    reader: &mut FrameReader,
    packet_tx: Sender<ScanItem>,
    stop_rx: Receiver<()>,
) {
    while !stop_requested(&stop_rx) {
        let item = read_scan_packet(port, reader);
        let closed = match &item {
            Ok(_) => false,
            Err(e) => {
                warn!("Dropped frame: {e}");
                e.is_stream_closed()
            }
        };

        select! {
            send(packet_tx, item) -> res => {
                if res.is_err() {
                    debug!("Packet stream dropped by the consumer");
                    return;
                }
            },
            recv(stop_rx) -> _ => return,
        }

        if closed {
            info!("Device stream closed");
            return;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FramingError;
    use crate::test_utils::{build_frame, MockPort};
    use std::time::Instant;
    use ydlidar_g2_data::PacketKind;

    const SCAN_ACK: [u8; 7] = [0xA5, 0x5A, 0x05, 0x00, 0x00, 0x40, 0x81];

    fn marker() -> Vec<u8> {
        build_frame(0x01, 0x0500, 0x0500, &[])
    }

    fn point_cloud() -> Vec<u8> {
        let payload = [0x12, 0x83, 0x40, 0x00, 0x00, 0x00, 0x12, 0x83, 0x40];
        build_frame(0x8C, 10 * 128, 20 * 128, &payload)
    }

    #[test]
    fn test_scan_until_end_of_stream() {
        let mut input = SCAN_ACK.to_vec();
        input.extend(marker());
        input.extend(point_cloud());
        let mut bad = point_cloud();
        bad[11] ^= 0xFF;
        input.extend(bad);
        input.extend(point_cloud());

        let port = MockPort::new(&input);
        let monitor = port.monitor();
        let mut session = ScanSession::new(port, DriverConfig::default());
        let stream = session.start_scan().unwrap();
        assert_eq!(session.state(), SessionState::Scanning);

        let items = stream.collect::<Vec<_>>();
        assert_eq!(items.len(), 5);
        assert!(items[0].as_ref().unwrap().is_heading_marker());
        assert_eq!(items[1].as_ref().unwrap().kind, PacketKind::PointCloud);
        assert_eq!(items[1].as_ref().unwrap().samples.len(), 3);
        assert!(matches!(items[2], Err(YDLidarError::Checksum(_))));
        assert!(items[3].is_ok());
        assert!(items[4].as_ref().unwrap_err().is_stream_closed());

        session.stop_scan().unwrap();
        assert_eq!(session.state(), SessionState::Idle);
        assert_eq!(monitor.written(), vec![0xA5, 0x60, 0xA5, 0x65]);
        assert!(monitor.was_cleared());
    }

    #[test]
    fn test_bad_preamble_then_normal_decoding() {
        let mut input = SCAN_ACK.to_vec();
        input.extend([0x00; 10]);
        input.extend(marker());
        input.extend(point_cloud());

        let mut session = ScanSession::new(MockPort::new(&input), DriverConfig::default());
        let items = session.start_scan().unwrap().collect::<Vec<_>>();
        assert_eq!(items.len(), 4);
        assert!(matches!(
            items[0],
            Err(YDLidarError::Framing(FramingError::BadPreamble(0x0000)))
        ));
        assert!(items[1].as_ref().unwrap().is_heading_marker());
        assert_eq!(items[2].as_ref().unwrap().samples.len(), 3);
        assert!(items[3].as_ref().unwrap_err().is_stream_closed());
    }

    #[test]
    fn test_resync_keeps_frame_after_garbage() {
        let mut input = SCAN_ACK.to_vec();
        input.extend([0x11, 0x22, 0x33]);
        input.extend(marker());
        input.extend(point_cloud());

        let config = DriverConfig::default().with_resync(true);
        let mut session = ScanSession::new(MockPort::new(&input), config);
        let items = session.start_scan().unwrap().collect::<Vec<_>>();
        assert_eq!(items.len(), 4);
        assert!(matches!(
            items[0],
            Err(YDLidarError::Framing(FramingError::BadPreamble(0x2211)))
        ));
        assert!(items[1].as_ref().unwrap().is_heading_marker());
        assert_eq!(items[2].as_ref().unwrap().kind, PacketKind::PointCloud);
        assert!(items[3].as_ref().unwrap_err().is_stream_closed());
    }

    #[test]
    fn test_attach_stops_a_streaming_device() {
        // Left over from a scan nobody stopped
        let port = MockPort::new(&point_cloud()[3..]).with_repeat(&point_cloud());
        let monitor = port.monitor();
        let session = ScanSession::attach(port, DriverConfig::default()).unwrap();
        assert_eq!(monitor.written(), vec![0xA5, 0x65]);
        assert!(monitor.was_cleared());
        assert_eq!(session.state(), SessionState::Idle);

        let port = session.into_port().unwrap();
        assert_eq!(port.remaining(), 0);
    }

    #[test]
    fn test_failed_negotiation() {
        let port = MockPort::new(&[0xA5, 0x5A, 0x05, 0x00, 0x00, 0x00, 0x81]);
        let monitor = port.monitor();
        let mut session = ScanSession::new(port, DriverConfig::default());
        let err = session.start_scan().err().unwrap();
        assert!(matches!(err, YDLidarError::InvalidResponseMode(1, 0)));
        assert_eq!(session.state(), SessionState::Idle);

        // Still idle and usable; dropping it does not send a stop command
        drop(session);
        assert_eq!(monitor.written(), vec![0xA5, 0x60]);
    }

    #[test]
    fn test_short_reads_keep_the_stream_alive() {
        let mut input = SCAN_ACK.to_vec();
        input.extend(&point_cloud()[..6]);
        let port = MockPort::new(&input).with_timeout_when_empty();
        let mut session = ScanSession::new(port, DriverConfig::default());
        let mut stream = session.start_scan().unwrap();

        assert!(matches!(
            stream.next(),
            Some(Err(YDLidarError::Framing(FramingError::ShortRead {
                expected: 10,
                got: 6
            })))
        ));
        assert!(matches!(
            stream.next(),
            Some(Err(YDLidarError::Framing(FramingError::ShortRead {
                expected: 10,
                got: 0
            })))
        ));

        session.stop_scan().unwrap();
        assert!(stream.next().is_none());
    }

    #[test]
    fn test_stop_while_consumer_is_idle() {
        let mut input = SCAN_ACK.to_vec();
        input.extend(marker());
        let port = MockPort::new(&input).with_repeat(&point_cloud());
        let monitor = port.monitor();
        let mut session = ScanSession::new(port, DriverConfig::default());
        let mut stream = session.start_scan().unwrap();

        let first = stream.by_ref().take(3).collect::<Vec<_>>();
        assert!(first.iter().all(|p| p.is_ok()));

        // The worker is blocked handing over the next packet
        session.stop_scan().unwrap();
        assert!(stream.next().is_none());
        assert_eq!(session.state(), SessionState::Idle);
        assert!(monitor.written().ends_with(&[0xA5, 0x65]));
    }

    #[test]
    fn test_stop_from_another_thread() {
        let port = MockPort::new(&SCAN_ACK)
            .with_repeat(&point_cloud())
            .with_max_read(4);
        let mut session = ScanSession::new(port, DriverConfig::default());
        let stream = session.start_scan().unwrap();

        let consumer = std::thread::spawn(move || stream.filter(|p| p.is_ok()).count());
        std::thread::sleep(Duration::from_millis(20));

        let started = Instant::now();
        session.stop_scan().unwrap();
        assert!(started.elapsed() < Duration::from_secs(1));
        assert!(consumer.join().unwrap() > 0);
    }

    #[test]
    fn test_stop_after_consumer_dropped_stream() {
        let port = MockPort::new(&SCAN_ACK).with_repeat(&point_cloud());
        let mut session = ScanSession::new(port, DriverConfig::default());
        let stream = session.start_scan().unwrap();
        drop(stream);
        session.stop_scan().unwrap();
        assert_eq!(session.state(), SessionState::Idle);
    }

    #[test]
    fn test_commands_rejected_while_scanning() {
        let port = MockPort::new(&SCAN_ACK).with_repeat(&point_cloud());
        let mut session = ScanSession::new(port, DriverConfig::default());
        let _stream = session.start_scan().unwrap();

        assert!(matches!(session.device_info(), Err(YDLidarError::SessionBusy)));
        assert!(matches!(session.health_status(), Err(YDLidarError::SessionBusy)));
        assert!(matches!(session.start_scan(), Err(YDLidarError::SessionBusy)));

        let port = session.into_port().unwrap();
        assert!(port.was_cleared());
    }

    #[test]
    fn test_revolutions() {
        let mut input = SCAN_ACK.to_vec();
        input.extend(marker());
        input.extend(point_cloud());
        input.extend(point_cloud());
        input.extend(marker());
        input.extend(point_cloud());

        let mut session = ScanSession::new(MockPort::new(&input), DriverConfig::default());
        let scans = session.start_scan().unwrap().revolutions().collect::<Vec<_>>();
        assert_eq!(scans.len(), 2);
        assert_eq!(scans[0].len(), 6);
        assert_eq!(scans[0].frequency_hz, Some(7.));
        assert_eq!(scans[1].len(), 3);
        // The end of stream error is counted against the trailing revolution
        assert_eq!(scans[1].dropped_frames, 1);
    }
}
