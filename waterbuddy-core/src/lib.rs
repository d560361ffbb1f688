//! Water Buddy Core Library
//!
//! Hydration models, goal arithmetic and the JSON-backed store shared by
//! Water Buddy front ends.

pub mod clock;
pub mod error;
pub mod goal;
pub mod models;
pub mod password;
pub mod reminder;
pub mod storage;
pub mod store;

pub use clock::{Clock, FixedClock, SystemClock};
pub use error::StoreError;
pub use goal::{calculate_daily_goal, progress_percent, ProgressMood};
pub use models::{
    DailyTotal, HealthCondition, NewUser, Progress, Session, UserProfile, HYDRATION_HERO_BADGE,
};
pub use password::KdfParams;
pub use reminder::{dispatch, is_due, Notifier, NotifyError, ReminderError, ReminderSchedule};
pub use storage::{DocType, DocumentBackend, FileBackend, MemoryBackend, StorageError};
pub use store::HydrationStore;

pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
