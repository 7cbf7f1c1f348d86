use std::time::Duration;
use ydlidar_g2_data::YdlidarModel;

/// Settings fixed for the lifetime of a session.
#[derive(Clone, Debug, PartialEq)]
pub struct DriverConfig {
    pub baud_rate: u32,
    /// Timeout of a single serial read. Bounds how long a stop request can wait.
    pub read_timeout: Duration,
    /// Capacity of the packet channel. Zero hands each packet over directly.
    pub packet_buffer: usize,
    /// Skip forward to the next preamble after a corrupt header.
    pub resync_on_bad_preamble: bool,
}

impl Default for DriverConfig {
    fn default() -> Self {
        DriverConfig::for_model(YdlidarModel::G2)
    }
}

impl DriverConfig {
    pub fn for_model(model: YdlidarModel) -> DriverConfig {
        DriverConfig {
            baud_rate: model.baud_rate(),
            read_timeout: Duration::from_millis(1000),
            packet_buffer: 0,
            resync_on_bad_preamble: false,
        }
    }

    pub fn with_read_timeout(mut self, read_timeout: Duration) -> Self {
        self.read_timeout = read_timeout;
        self
    }

    pub fn with_packet_buffer(mut self, packet_buffer: usize) -> Self {
        self.packet_buffer = packet_buffer;
        self
    }

    pub fn with_resync(mut self, resync_on_bad_preamble: bool) -> Self {
        self.resync_on_bad_preamble = resync_on_bad_preamble;
        self
    }
}
