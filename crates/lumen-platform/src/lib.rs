//! Side-effecting capabilities used by the launcher: the clipboard, the
//! default browser and HTTPS downloads.

pub mod shared;
pub mod traits;

pub use shared::{ArboardClipboard, OpenCrateOpener, ReqwestFetcher};
pub use traits::{ClipboardAccess, Platform, SystemOpen};
