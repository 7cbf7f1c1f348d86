use crate::model::YdlidarModel;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DeviceInfo {
    pub model_number: u8,
    pub firmware_major_version: u8,
    pub firmware_minor_version: u8,
    pub hardware_version: u8,
    pub serial_number: [u8; 16],
}

impl DeviceInfo {
    pub fn model(&self) -> YdlidarModel {
        YdlidarModel::from_model_number(self.model_number)
    }

    pub fn firmware_version(&self) -> String {
        format!(
            "{}.{}",
            self.firmware_major_version, self.firmware_minor_version
        )
    }

    /// Serial number as printed on the device, one decimal digit per byte.
    pub fn serial_number_string(&self) -> String {
        self.serial_number.iter().map(|d| d.to_string()).collect()
    }
}

/// Device health as reported by the health status command.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct HealthStatus {
    /// 0 when the device is operating normally.
    pub status: u8,
    pub error_code: u16,
}

impl HealthStatus {
    pub fn is_healthy(&self) -> bool {
        self.status == 0
    }
}
