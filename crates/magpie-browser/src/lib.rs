mod auth;
mod collector;
mod error;
mod finder;
mod profile;
mod session;
mod source;

pub use auth::{login, verify, Credentials, LoginStage, LoginStatus};
pub use collector::{Collector, CollectorConfig, Harvest, StopReason};
pub use error::{Error, Result};
pub use finder::BrowserFinder;
pub use profile::ProfileManager;
pub use session::{BrowserSession, SessionOptions};
pub use source::{ContentSource, LiveTimeline};
