mod badge;
mod health;
mod intake;
mod session;
mod user;

pub use badge::HYDRATION_HERO_BADGE;
pub use health::HealthCondition;
pub use intake::{DailyTotal, Progress};
pub use session::Session;
pub use user::{NewUser, UserProfile};
