use anyhow::Result;
use dotenvy::dotenv;
use log::{info, warn};
use std::env;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

use dosewatch::api::HttpScheduleApi;
use dosewatch::core::Config;
use dosewatch::features::cache::CacheRepository;
use dosewatch::features::invalidation::Invalidator;
use dosewatch::features::reminders::{background_reconcile_loop, reminder_dispatch_loop};
use dosewatch::features::{
    AlertManager, MutationPipeline, ReminderScheduler, ScheduleService, WarningService,
};
use dosewatch::platform::{LogNotifier, LoggingAudio, TokioAlarms};
use dosewatch::storage::SqliteStore;

/// Capacity of the fired-reminder channel; reminders are rare enough that
/// backpressure here means something is badly wrong
const FIRED_CHANNEL_CAPACITY: usize = 32;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    env_logger::init();

    let config = Config::from_env()?;
    info!(
        "Starting tracker (api: {}, lookahead: {}h, background interval: {}h)",
        config.api_base_url, config.lookahead_hours, config.reschedule_interval_hours
    );

    // Infrastructure
    let store = Arc::new(SqliteStore::open(&config.database_path)?);
    let api = Arc::new(HttpScheduleApi::new(config.api_base_url.clone()));
    let repo = CacheRepository::new(store.clone());

    // Platform
    let (fired_tx, fired_rx) = mpsc::channel(FIRED_CHANNEL_CAPACITY);
    let alarms = Arc::new(TokioAlarms::new(fired_tx));
    let audio = Arc::new(LoggingAudio::new());
    let notifier = Arc::new(LogNotifier::new());

    // Core services, constructed once and shared
    let alerts = Arc::new(AlertManager::new(audio));
    let scheduler = Arc::new(ReminderScheduler::new(
        repo.clone(),
        api.clone(),
        alarms,
        alerts.clone(),
        store,
        config.lookahead_hours,
    ));
    let pipeline = Arc::new(MutationPipeline::new(
        Invalidator::new(repo.clone()),
        scheduler.clone(),
    ));

    let schedule = ScheduleService::new(repo.clone(), api.clone(), pipeline.clone());
    let warnings = WarningService::new(repo.clone(), api.clone(), pipeline);

    // Fired timers -> alert sound + notification
    tokio::spawn(reminder_dispatch_loop(fired_rx, alerts, notifier));

    // Periodic background reconcile keyed off the durable user marker
    let interval = Duration::from_secs(u64::from(config.reschedule_interval_hours) * 3600);
    tokio::spawn(background_reconcile_loop(scheduler.clone(), interval));

    // When a user is named on the command line: remember them for the
    // background loop, reconcile once, and warm the offline caches
    if let Some(user_id) = env::args().nth(1) {
        scheduler.set_current_user(&user_id).await?;
        match scheduler.reconcile(&user_id).await {
            Ok(report) => info!(
                "Initial reconcile: {} reminders armed for {user_id}",
                report.armed
            ),
            Err(e) => warn!("Initial reconcile failed, will retry in background: {e}"),
        }

        let today = chrono::Utc::now().date_naive();
        if let Err(e) = schedule.daily_schedule(&user_id, today).await {
            warn!("Could not warm today's schedule: {e}");
        }
        match warnings.low_inventory(&user_id).await {
            Ok(fetched) => {
                for warning in &fetched.value {
                    warn!(
                        "{} is low: {} left (~{:.0} days)",
                        warning.medicine_name, warning.remaining, warning.days_left
                    );
                }
            }
            Err(e) => warn!("Could not check inventory warnings: {e}"),
        }
    }

    info!("Tracker running; press Ctrl-C to stop");
    tokio::signal::ctrl_c().await?;
    info!("Shutting down");
    Ok(())
}
