//! Cache key layout.
//!
//! Every key is `<entity-kind>_<userId>[_<subkey>]`. Each domain service
//! owns its own namespace; nothing outside that service writes to it. The
//! invalidation table in `features::invalidation` is the only cross-cutting
//! consumer of these names.

use chrono::NaiveDate;

/// Durable marker naming the user the background scheduler works for
pub const CURRENT_USER: &str = "current_user";

pub fn medicines(user_id: &str) -> String {
    format!("medicines_{user_id}")
}

pub fn upcoming(user_id: &str) -> String {
    format!("upcoming_{user_id}")
}

pub fn overdue(user_id: &str) -> String {
    format!("overdue_{user_id}")
}

pub fn daily_schedule(user_id: &str, date: NaiveDate) -> String {
    format!("daily_schedule_{user_id}_{date}")
}

pub fn low_inventory(user_id: &str) -> String {
    format!("low_inventory_{user_id}")
}

pub fn stats(user_id: &str, period: &str) -> String {
    format!("stats_{user_id}_{period}")
}

pub fn search(user_id: &str, query: &str) -> String {
    format!("search_{user_id}_{query}")
}

pub fn last_sync(user_id: &str) -> String {
    format!("last_sync_{user_id}")
}

pub fn reminder_manifest(user_id: &str) -> String {
    format!("reminder_manifest_{user_id}")
}
