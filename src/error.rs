use std::fmt;

/// Why a ticker produced no full report during a scan
#[derive(Debug, Clone, PartialEq)]
pub enum ScanError {
    DataUnavailable(String),
    OptionsFetch(String),
    InvalidReferencePrice(f64),
}

impl fmt::Display for ScanError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ScanError::DataUnavailable(msg) => write!(f, "Price data unavailable: {}", msg),
            ScanError::OptionsFetch(msg) => write!(f, "Options chain fetch failed: {}", msg),
            ScanError::InvalidReferencePrice(price) => {
                write!(f, "Invalid reference price: {}", price)
            }
        }
    }
}

impl std::error::Error for ScanError {}

impl ScanError {
    /// Convert a provider error, keeping the whole context chain in the message
    pub fn data_unavailable(err: &anyhow::Error) -> Self {
        ScanError::DataUnavailable(format!("{:#}", err))
    }

    pub fn options_fetch(err: &anyhow::Error) -> Self {
        ScanError::OptionsFetch(format!("{:#}", err))
    }
}
