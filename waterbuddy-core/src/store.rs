//! The hydration store.
//!
//! Three JSON documents, each keyed by user identifier:
//!
//! ```text
//! users.json   { "ana@example.com": { "name": ..., "daily_goal": 2000, ... } }
//! logs.json    { "ana@example.com": { "2025-03-09": 1250 } }
//! badges.json  { "ana@example.com": ["Hydration Hero Badge 🏅"] }
//! ```
//!
//! Every operation reloads the documents it touches and every mutation
//! rewrites the whole document. Nothing is cached between calls, so two
//! stores over the same backend see each other's writes, and concurrent
//! writers race with last-writer-wins semantics.

use chrono::{Days, NaiveDate};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::clock::{Clock, SystemClock};
use crate::error::StoreError;
use crate::goal::calculate_daily_goal;
use crate::models::{DailyTotal, NewUser, Progress, Session, UserProfile, HYDRATION_HERO_BADGE};
use crate::password::{self, KdfParams};
use crate::storage::{DocType, DocumentBackend, StorageError};

type UsersDoc = BTreeMap<String, UserProfile>;
type LogsDoc = BTreeMap<String, BTreeMap<NaiveDate, u32>>;
type BadgesDoc = BTreeMap<String, Vec<String>>;

/// User profiles, intake buckets and badges over a [`DocumentBackend`].
pub struct HydrationStore<B: DocumentBackend> {
    backend: B,
    clock: Arc<dyn Clock>,
    kdf: KdfParams,
}

impl<B: DocumentBackend> HydrationStore<B> {
    /// Creates a store using the system clock and default hashing cost.
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            clock: Arc::new(SystemClock),
            kdf: KdfParams::default(),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_kdf_params(mut self, kdf: KdfParams) -> Self {
        self.kdf = kdf;
        self
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    // ------------------------------------------------------------------
    // Users
    // ------------------------------------------------------------------

    /// Registers a new user and returns their computed daily goal.
    pub fn register(&self, identifier: &str, new_user: NewUser) -> Result<u32, StoreError> {
        if identifier.trim().is_empty() {
            return Err(StoreError::InvalidProfile("email is required".into()));
        }
        if new_user.name.trim().is_empty() {
            return Err(StoreError::InvalidProfile("name is required".into()));
        }
        if new_user.password.is_empty() {
            return Err(StoreError::InvalidProfile("password is required".into()));
        }
        if new_user.age == 0 {
            return Err(StoreError::InvalidProfile("age must be at least 1".into()));
        }

        let mut users: UsersDoc = self.load(DocType::Users)?;
        if users.contains_key(identifier) {
            return Err(StoreError::DuplicateIdentifier(identifier.to_string()));
        }

        let daily_goal = calculate_daily_goal(new_user.age, &new_user.conditions);
        let profile = UserProfile {
            identifier: identifier.to_string(),
            name: new_user.name,
            password: password::hash_password(&new_user.password, &self.kdf)?,
            age: new_user.age,
            profession: new_user.profession.filter(|p| !p.trim().is_empty()),
            health_conditions: UserProfile::condition_flags(&new_user.conditions),
            daily_goal,
            created_at: self.clock.now(),
        };

        users.insert(identifier.to_string(), profile);
        self.save(DocType::Users, &users)?;

        tracing::info!(identifier, daily_goal, "Registered user");
        Ok(daily_goal)
    }

    /// Verifies credentials and opens a session.
    ///
    /// Legacy SHA-256 credentials are re-hashed on success.
    pub fn authenticate(&self, identifier: &str, password: &str) -> Result<Session, StoreError> {
        let mut users: UsersDoc = self.load(DocType::Users)?;
        let Some(profile) = users.get_mut(identifier) else {
            return Err(StoreError::InvalidCredential);
        };

        if !password::verify_password(password, &profile.password)? {
            return Err(StoreError::InvalidCredential);
        }

        if password::needs_rehash(&profile.password) {
            profile.password = password::hash_password(password, &self.kdf)?;
            self.save(DocType::Users, &users)?;
            tracing::info!(identifier, "Upgraded legacy password hash");
        }

        tracing::info!(identifier, "Signed in");
        Ok(Session::new(identifier, self.clock.now()))
    }

    /// Returns a user's profile.
    pub fn profile(&self, identifier: &str) -> Result<UserProfile, StoreError> {
        let mut users: UsersDoc = self.load(DocType::Users)?;
        let mut profile = users
            .remove(identifier)
            .ok_or_else(|| StoreError::MissingProfile(identifier.to_string()))?;
        profile.identifier = identifier.to_string();
        Ok(profile)
    }

    /// Overrides the daily goal with a user-chosen value.
    pub fn set_daily_goal(&self, identifier: &str, goal_ml: u32) -> Result<(), StoreError> {
        if goal_ml == 0 {
            return Err(StoreError::InvalidGoal);
        }
        self.update_profile(identifier, |profile| profile.daily_goal = goal_ml)?;

        tracing::info!(identifier, goal_ml, "Daily goal set");
        Ok(())
    }

    /// Recomputes the daily goal from the stored age and conditions.
    pub fn recalculate_goal(&self, identifier: &str) -> Result<u32, StoreError> {
        let mut goal_ml = 0;
        self.update_profile(identifier, |profile| {
            goal_ml = calculate_daily_goal(profile.age, &profile.conditions());
            profile.daily_goal = goal_ml;
        })?;

        tracing::info!(identifier, goal_ml, "Daily goal recalculated");
        Ok(goal_ml)
    }

    fn update_profile(
        &self,
        identifier: &str,
        apply: impl FnOnce(&mut UserProfile),
    ) -> Result<(), StoreError> {
        let mut users: UsersDoc = self.load(DocType::Users)?;
        let profile = users
            .get_mut(identifier)
            .ok_or_else(|| StoreError::MissingProfile(identifier.to_string()))?;
        apply(profile);
        self.save(DocType::Users, &users)
    }

    // ------------------------------------------------------------------
    // Intake
    // ------------------------------------------------------------------

    /// Adds `amount_ml` to today's bucket and returns the new total.
    pub fn log_intake(&self, identifier: &str, amount_ml: u32) -> Result<u32, StoreError> {
        if amount_ml == 0 {
            return Err(StoreError::InvalidAmount);
        }
        self.profile(identifier)?;

        let today = self.clock.today();
        let mut logs: LogsDoc = self.load(DocType::Logs)?;
        let bucket = logs
            .entry(identifier.to_string())
            .or_default()
            .entry(today)
            .or_insert(0);
        *bucket = bucket.saturating_add(amount_ml);
        let total = *bucket;

        self.save(DocType::Logs, &logs)?;

        tracing::debug!(identifier, amount_ml, total, %today, "Logged intake");
        Ok(total)
    }

    /// Millilitres logged today, or 0.
    pub fn today_total(&self, identifier: &str) -> Result<u32, StoreError> {
        let logs: LogsDoc = self.load(DocType::Logs)?;
        let today = self.clock.today();
        Ok(logs
            .get(identifier)
            .and_then(|days| days.get(&today))
            .copied()
            .unwrap_or(0))
    }

    /// Totals for the `n_days` most recent days ending today, oldest first.
    /// Days without entries are reported as 0.
    pub fn history(&self, identifier: &str, n_days: u32) -> Result<Vec<DailyTotal>, StoreError> {
        let logs: LogsDoc = self.load(DocType::Logs)?;
        let days = logs.get(identifier);
        let today = self.clock.today();

        Ok((0..n_days)
            .rev()
            .filter_map(|offset| today.checked_sub_days(Days::new(u64::from(offset))))
            .map(|date| DailyTotal {
                date,
                total_ml: days.and_then(|d| d.get(&date)).copied().unwrap_or(0),
            })
            .collect())
    }

    /// Today's total measured against the user's goal.
    pub fn today_progress(&self, identifier: &str) -> Result<Progress, StoreError> {
        let profile = self.profile(identifier)?;
        let total = self.today_total(identifier)?;
        Ok(Progress::new(total, profile.daily_goal))
    }

    // ------------------------------------------------------------------
    // Badges
    // ------------------------------------------------------------------

    /// Adds a badge. Returns false if the user already had it.
    pub fn award_badge(&self, identifier: &str, name: &str) -> Result<bool, StoreError> {
        self.profile(identifier)?;

        let mut badges: BadgesDoc = self.load(DocType::Badges)?;
        let earned = badges.entry(identifier.to_string()).or_default();
        if earned.iter().any(|b| b == name) {
            return Ok(false);
        }
        earned.push(name.to_string());
        self.save(DocType::Badges, &badges)?;

        tracing::info!(identifier, badge = name, "Awarded badge");
        Ok(true)
    }

    /// Badges in the order they were earned.
    pub fn badges(&self, identifier: &str) -> Result<Vec<String>, StoreError> {
        let mut badges: BadgesDoc = self.load(DocType::Badges)?;
        Ok(badges.remove(identifier).unwrap_or_default())
    }

    /// Awards any badge whose criteria today's progress meets. Returns the
    /// badges that were newly earned.
    pub fn check_achievements(&self, identifier: &str) -> Result<Vec<String>, StoreError> {
        let progress = self.today_progress(identifier)?;

        let mut earned = Vec::new();
        if progress.goal_reached() && self.award_badge(identifier, HYDRATION_HERO_BADGE)? {
            earned.push(HYDRATION_HERO_BADGE.to_string());
        }
        Ok(earned)
    }

    // ------------------------------------------------------------------
    // Persistence
    // ------------------------------------------------------------------

    /// Loads a document. Missing or blank documents are empty; malformed
    /// ones are quarantined and treated as empty.
    fn load<T: DeserializeOwned + Default>(&self, doc_type: DocType) -> Result<T, StoreError> {
        let Some(contents) = self.backend.read(doc_type)? else {
            return Ok(T::default());
        };
        if contents.trim().is_empty() {
            return Ok(T::default());
        }

        match serde_json::from_str(&contents) {
            Ok(doc) => Ok(doc),
            Err(e) => {
                tracing::warn!(
                    "{} is malformed ({}); continuing with an empty document",
                    doc_type.filename(),
                    e
                );
                self.backend.quarantine(doc_type)?;
                Ok(T::default())
            }
        }
    }

    /// Writes a document indented with four spaces.
    fn save<T: Serialize>(&self, doc_type: DocType, doc: &T) -> Result<(), StoreError> {
        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
        doc.serialize(&mut serializer)
            .map_err(|e| StorageError::Encode(doc_type.filename(), e))?;

        let contents = String::from_utf8(buf).map_err(|e| {
            StorageError::Encode(doc_type.filename(), serde::ser::Error::custom(e))
        })?;
        self.backend.write(doc_type, &contents)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::models::HealthCondition;
    use crate::storage::{FileBackend, MemoryBackend};
    use chrono::{Duration, TimeZone, Utc};
    use tempfile::TempDir;

    const ANA: &str = "ana@example.com";

    fn setup() -> (HydrationStore<MemoryBackend>, Arc<FixedClock>) {
        let clock = Arc::new(FixedClock::new(
            Utc.with_ymd_and_hms(2025, 3, 9, 10, 0, 0).unwrap(),
        ));
        let store = HydrationStore::new(MemoryBackend::new())
            .with_clock(clock.clone())
            .with_kdf_params(KdfParams::for_test());
        (store, clock)
    }

    fn register_ana(store: &HydrationStore<MemoryBackend>) -> u32 {
        store
            .register(ANA, NewUser::new("Ana", "s3cret", 30))
            .unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_register_computes_goal() {
        let (store, _clock) = setup();

        let goal = store
            .register(
                ANA,
                NewUser::new("Ana", "s3cret", 30)
                    .with_conditions(vec![HealthCondition::Heart, HealthCondition::Diabetes]),
            )
            .unwrap();

        assert_eq!(goal, 2440);
        let profile = store.profile(ANA).unwrap();
        assert_eq!(profile.identifier, ANA);
        assert_eq!(profile.daily_goal, 2440);
        assert_ne!(profile.password, "s3cret");
        assert_eq!(
            profile.conditions(),
            vec![HealthCondition::Heart, HealthCondition::Diabetes]
        );
    }

    #[test]
    fn test_register_duplicate_leaves_first_profile() {
        let (store, _clock) = setup();
        register_ana(&store);
        let before = store.profile(ANA).unwrap();

        let result = store.register(ANA, NewUser::new("Impostor", "other", 70));

        assert!(matches!(result, Err(StoreError::DuplicateIdentifier(id)) if id == ANA));
        assert_eq!(store.profile(ANA).unwrap(), before);
    }

    #[test]
    fn test_register_validates_input() {
        let (store, _clock) = setup();

        assert!(matches!(
            store.register("", NewUser::new("Ana", "pw", 30)),
            Err(StoreError::InvalidProfile(_))
        ));
        assert!(matches!(
            store.register(ANA, NewUser::new("  ", "pw", 30)),
            Err(StoreError::InvalidProfile(_))
        ));
        assert!(matches!(
            store.register(ANA, NewUser::new("Ana", "", 30)),
            Err(StoreError::InvalidProfile(_))
        ));
        assert!(matches!(
            store.register(ANA, NewUser::new("Ana", "pw", 0)),
            Err(StoreError::InvalidProfile(_))
        ));
    }

    #[test]
    fn test_authenticate() {
        let (store, clock) = setup();
        register_ana(&store);

        let session = store.authenticate(ANA, "s3cret").unwrap();
        assert_eq!(session.identifier, ANA);
        assert_eq!(session.signed_in_at, clock.now());

        assert!(matches!(
            store.authenticate(ANA, "wrong"),
            Err(StoreError::InvalidCredential)
        ));
        assert!(matches!(
            store.authenticate("nobody@example.com", "s3cret"),
            Err(StoreError::InvalidCredential)
        ));
    }

    #[test]
    fn test_log_intake_accumulates() {
        let (store, _clock) = setup();
        register_ana(&store);

        assert_eq!(store.log_intake(ANA, 100).unwrap(), 100);
        assert_eq!(store.log_intake(ANA, 150).unwrap(), 250);
        assert_eq!(store.today_total(ANA).unwrap(), 250);
    }

    #[test]
    fn test_log_intake_rejects_zero_and_unknown_user() {
        let (store, _clock) = setup();
        register_ana(&store);

        assert!(matches!(store.log_intake(ANA, 0), Err(StoreError::InvalidAmount)));
        assert!(matches!(
            store.log_intake("ghost@example.com", 100),
            Err(StoreError::MissingProfile(_))
        ));
    }

    #[test]
    fn test_new_day_starts_new_bucket() {
        let (store, clock) = setup();
        register_ana(&store);

        store.log_intake(ANA, 900).unwrap();
        clock.advance(Duration::days(1));

        assert_eq!(store.today_total(ANA).unwrap(), 0);
        assert_eq!(store.log_intake(ANA, 200).unwrap(), 200);
    }

    #[test]
    fn test_history_zero_fills_and_orders() {
        let (store, clock) = setup();
        register_ana(&store);

        clock.set(Utc.with_ymd_and_hms(2025, 3, 5, 9, 0, 0).unwrap());
        store.log_intake(ANA, 500).unwrap();
        clock.set(Utc.with_ymd_and_hms(2025, 3, 9, 9, 0, 0).unwrap());
        store.log_intake(ANA, 300).unwrap();
        store.log_intake(ANA, 200).unwrap();

        let history = store.history(ANA, 7).unwrap();

        assert_eq!(history.len(), 7);
        assert_eq!(history[0].date, date(2025, 3, 3));
        assert_eq!(history[6].date, date(2025, 3, 9));
        assert!(history.windows(2).all(|w| w[0].date < w[1].date));
        let totals: Vec<u32> = history.iter().map(|d| d.total_ml).collect();
        assert_eq!(totals, vec![0, 0, 500, 0, 0, 0, 500]);
    }

    #[test]
    fn test_history_for_unknown_user_and_zero_days() {
        let (store, _clock) = setup();

        let history = store.history("nobody@example.com", 3).unwrap();
        assert_eq!(history.len(), 3);
        assert!(history.iter().all(|d| d.total_ml == 0));

        assert!(store.history(ANA, 0).unwrap().is_empty());
    }

    #[test]
    fn test_history_ignores_entries_older_than_window() {
        let (store, clock) = setup();
        register_ana(&store);

        store.log_intake(ANA, 400).unwrap();
        clock.advance(Duration::days(10));

        let history = store.history(ANA, 7).unwrap();
        assert!(history.iter().all(|d| d.total_ml == 0));
    }

    #[test]
    fn test_award_badge_is_idempotent() {
        let (store, _clock) = setup();
        register_ana(&store);

        assert!(store.award_badge(ANA, "Early Bird").unwrap());
        assert!(!store.award_badge(ANA, "Early Bird").unwrap());
        assert!(store.award_badge(ANA, HYDRATION_HERO_BADGE).unwrap());

        assert_eq!(
            store.badges(ANA).unwrap(),
            vec!["Early Bird".to_string(), HYDRATION_HERO_BADGE.to_string()]
        );
    }

    #[test]
    fn test_check_achievements_awards_once() {
        let (store, _clock) = setup();
        register_ana(&store);

        store.log_intake(ANA, 1500).unwrap();
        assert!(store.check_achievements(ANA).unwrap().is_empty());

        store.log_intake(ANA, 500).unwrap();
        assert_eq!(
            store.check_achievements(ANA).unwrap(),
            vec![HYDRATION_HERO_BADGE.to_string()]
        );
        assert!(store.check_achievements(ANA).unwrap().is_empty());
        assert_eq!(store.badges(ANA).unwrap().len(), 1);
    }

    #[test]
    fn test_today_progress() {
        let (store, _clock) = setup();
        register_ana(&store);
        store.log_intake(ANA, 1500).unwrap();

        let progress = store.today_progress(ANA).unwrap();
        assert_eq!(progress.total_ml, 1500);
        assert_eq!(progress.goal_ml, 2000);
        assert_eq!(progress.percent, 75);
    }

    #[test]
    fn test_set_and_recalculate_goal() {
        let (store, _clock) = setup();
        register_ana(&store);

        store.set_daily_goal(ANA, 3000).unwrap();
        assert_eq!(store.profile(ANA).unwrap().daily_goal, 3000);

        assert!(matches!(store.set_daily_goal(ANA, 0), Err(StoreError::InvalidGoal)));
        assert!(matches!(
            store.set_daily_goal("ghost@example.com", 100),
            Err(StoreError::MissingProfile(_))
        ));

        assert_eq!(store.recalculate_goal(ANA).unwrap(), 2000);
        assert_eq!(store.profile(ANA).unwrap().daily_goal, 2000);
    }

    #[test]
    fn test_malformed_document_recovers_empty() {
        let (store, _clock) = setup();
        register_ana(&store);
        store.backend().write(DocType::Logs, "{ truncated").unwrap();

        assert_eq!(store.today_total(ANA).unwrap(), 0);
        assert_eq!(store.backend().quarantined_count(), 1);

        assert_eq!(store.log_intake(ANA, 100).unwrap(), 100);
    }

    #[test]
    fn test_blank_document_is_empty() {
        let (store, _clock) = setup();
        store.backend().write(DocType::Badges, "  \n").unwrap();

        assert!(store.badges(ANA).unwrap().is_empty());
        assert_eq!(store.backend().quarantined_count(), 0);
    }

    #[test]
    fn test_file_backend_documents_on_disk() {
        let temp_dir = TempDir::new().unwrap();
        let clock = Arc::new(FixedClock::new(
            Utc.with_ymd_and_hms(2025, 3, 9, 10, 0, 0).unwrap(),
        ));
        let store = HydrationStore::new(FileBackend::new(temp_dir.path()))
            .with_clock(clock)
            .with_kdf_params(KdfParams::for_test());

        store
            .register(ANA, NewUser::new("Ana", "s3cret", 30))
            .unwrap();
        store.log_intake(ANA, 250).unwrap();
        store.award_badge(ANA, HYDRATION_HERO_BADGE).unwrap();

        let logs = std::fs::read_to_string(temp_dir.path().join("logs.json")).unwrap();
        assert_eq!(
            logs,
            "{\n    \"ana@example.com\": {\n        \"2025-03-09\": 250\n    }\n}"
        );

        let badges: serde_json::Value = serde_json::from_str(
            &std::fs::read_to_string(temp_dir.path().join("badges.json")).unwrap(),
        )
        .unwrap();
        assert_eq!(badges[ANA][0], HYDRATION_HERO_BADGE);

        let users: serde_json::Value = serde_json::from_str(
            &std::fs::read_to_string(temp_dir.path().join("users.json")).unwrap(),
        )
        .unwrap();
        assert_eq!(users[ANA]["daily_goal"], 2000);
        assert_eq!(users[ANA]["created_at"], "2025-03-09T10:00:00Z");
    }

    #[test]
    fn test_reads_legacy_files_and_upgrades_password() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(
            temp_dir.path().join("users.json"),
            r#"{
    "old@example.com": {
        "name": "Old Timer",
        "password": "5e884898da28047151d0e56f8dc6292773603d0d6aabbdd62a11ef721d1542d8",
        "age": 66,
        "health_conditions": {"Heart Issue": false, "Diabetes": false, "Kidney Issue": true},
        "daily_goal": 1954,
        "created_at": "2024-06-01T07:15:42.918273"
    }
}"#,
        )
        .unwrap();
        std::fs::write(
            temp_dir.path().join("logs.json"),
            r#"{"old@example.com": {"2025-03-08": 1200, "2025-03-09": 800}}"#,
        )
        .unwrap();

        let clock = Arc::new(FixedClock::new(
            Utc.with_ymd_and_hms(2025, 3, 9, 18, 0, 0).unwrap(),
        ));
        let store = HydrationStore::new(FileBackend::new(temp_dir.path()))
            .with_clock(clock)
            .with_kdf_params(KdfParams::for_test());

        store.authenticate("old@example.com", "password").unwrap();

        let profile = store.profile("old@example.com").unwrap();
        assert!(profile.password.starts_with("argon2id$"));
        assert_eq!(profile.daily_goal, 1954);
        assert_eq!(store.today_total("old@example.com").unwrap(), 800);

        // Still signs in after the upgrade
        store.authenticate("old@example.com", "password").unwrap();
        assert!(matches!(
            store.authenticate("old@example.com", "nope"),
            Err(StoreError::InvalidCredential)
        ));

        assert_eq!(store.recalculate_goal("old@example.com").unwrap(), 1955);
    }

    #[test]
    fn test_two_stores_share_backend_state() {
        let temp_dir = TempDir::new().unwrap();
        let a = HydrationStore::new(FileBackend::new(temp_dir.path()))
            .with_kdf_params(KdfParams::for_test());
        let b = HydrationStore::new(FileBackend::new(temp_dir.path()))
            .with_kdf_params(KdfParams::for_test());

        a.register(ANA, NewUser::new("Ana", "s3cret", 30)).unwrap();
        b.log_intake(ANA, 300).unwrap();

        assert_eq!(a.today_total(ANA).unwrap(), 300);
    }
}
