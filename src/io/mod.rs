//! I/O modules: download monitoring, alerts, configuration, and the mosaic
//! catalog

pub mod config;
pub mod monitor;
pub mod mosaic;
pub mod notify;

pub use config::RunConfig;
pub use monitor::{CancelToken, DownloadMonitor, StabilityProbe};
pub use mosaic::MosaicIndex;
pub use notify::{LogNotifier, Notifier};
