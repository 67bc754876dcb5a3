use serde::{Deserialize, Serialize};

/// How a barcode gets captured.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanMethod {
    /// Device camera, decoded in software.
    Camera,
    /// USB/Bluetooth scanner acting as a keyboard.
    Hardware,
    /// Code typed by hand.
    Manual,
}

/// Transactional operation started from a scan.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationKind {
    Receive,
    Ship,
    Reserve,
    Unreserve,
    Transfer,
    Adjust,
}

impl OperationKind {
    pub const ALL: [OperationKind; 6] = [
        OperationKind::Receive,
        OperationKind::Ship,
        OperationKind::Reserve,
        OperationKind::Unreserve,
        OperationKind::Transfer,
        OperationKind::Adjust,
    ];
}
