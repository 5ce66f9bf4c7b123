mod driver;
mod engine;
mod history;
mod session;
mod ticker;

pub use driver::{Clock, TimerDriver};
pub use engine::{TimerEngine, TimerRecord, TimerState};
pub use history::{HistoryEntry, TimerHistory, HISTORY_LIMIT};
pub use session::TimerSession;
pub use ticker::{Ticker, TICK_PERIOD};
