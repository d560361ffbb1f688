/// Awarded the first time a user reaches 100% of their daily goal.
pub const HYDRATION_HERO_BADGE: &str = "Hydration Hero Badge 🏅";
