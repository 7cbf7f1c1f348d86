pub mod device_info;
pub mod model;
pub mod packet;
pub mod scan;

pub use device_info::{DeviceInfo, HealthStatus};
pub use model::YdlidarModel;
pub use packet::{DecodedSample, PacketKind, ScanPacket};
pub use scan::Scan;
