pub mod cache;
pub mod data;
pub mod error;
pub mod fetch;
pub mod record;
pub mod schedule;
pub mod simulate;
pub mod utility;

pub use chrono::NaiveDate;
pub use cache::CacheMode;
pub use data::{Fund, NavSlice};
pub use error::{Error, Result};
pub use fetch::{load_nav_history, EastmoneyClient};
pub use record::{Ledger, LedgerRow};
pub use schedule::{investment_dates, schedule_description, Frequency};
pub use simulate::{compute_return, simulate, SimulationResult};
