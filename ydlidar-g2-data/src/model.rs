#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Lidar models known to this crate.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum YdlidarModel {
    G2,
    Unknown(u8),
}

impl YdlidarModel {
    pub fn from_model_number(model_number: u8) -> YdlidarModel {
        match model_number {
            15 => YdlidarModel::G2,
            n => YdlidarModel::Unknown(n),
        }
    }

    pub fn baud_rate(&self) -> u32 {
        match self {
            YdlidarModel::G2 | YdlidarModel::Unknown(_) => 230400,
        }
    }
}
