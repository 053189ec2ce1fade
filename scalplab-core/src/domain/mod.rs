//! Domain types shared by every stage of the pipeline and the drivers.

pub mod bar;
pub mod feature;
pub mod position;
pub mod session;
pub mod trade;

pub use bar::{Bar, ExchangeTime};
pub use feature::{FeatureBar, SignalRecord};
pub use position::{Position, PositionSnapshot, TrailStage, TrailingStop};
pub use session::Session;
pub use trade::{ExitReason, TradeRecord};
