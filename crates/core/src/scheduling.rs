//! Scheduled-notification constants, request validation, and status state
//! machine.
//!
//! Pure functions only, so the API handler, the dispatcher, and the cleanup
//! job can share them without pulling in the database layer.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::Deserialize;

use crate::error::CoreError;
use crate::types::Timestamp;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// How often the dispatcher looks for due notifications.
pub const DISPATCH_INTERVAL_SECS: u64 = 60;

/// How often the cleanup job runs.
pub const CLEANUP_INTERVAL_SECS: u64 = 24 * 60 * 60;

/// Records whose trigger time is older than this many days are deleted.
pub const RETENTION_DAYS: i64 = 7;

const MISSING_FIELDS_MSG: &str = "Missing required fields";
const INVALID_TRIGGER_MSG: &str = "Trigger time must be a valid future timestamp";

// ---------------------------------------------------------------------------
// Request validation
// ---------------------------------------------------------------------------

/// Body of a schedule request as submitted by the client.
///
/// Every field is optional at the wire level so that a missing field can be
/// reported as an invalid argument rather than a deserialization failure.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleRequest {
    pub token: Option<String>,
    pub title: Option<String>,
    pub body: Option<String>,
    /// ISO-8601 timestamp.
    pub trigger_time: Option<String>,
    pub payload: Option<serde_json::Value>,
}

/// A schedule request that passed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedSchedule {
    pub token: String,
    pub title: String,
    pub body: String,
    pub trigger_time: Timestamp,
    /// Always a JSON object when present.
    pub payload: Option<serde_json::Value>,
}

/// Validate a schedule request against the current time.
///
/// Rules:
/// - `token`, `title`, `body`, and `triggerTime` must be present and non-empty.
/// - `triggerTime` must parse (see [`parse_trigger_time`]) and lie strictly
///   after `now`.
/// - `payload`, when present and not `null`, must be a JSON object.
pub fn validate_schedule_request(
    req: ScheduleRequest,
    now: Timestamp,
) -> Result<ValidatedSchedule, CoreError> {
    let (Some(token), Some(title), Some(body), Some(trigger_raw)) = (
        non_empty(req.token),
        non_empty(req.title),
        non_empty(req.body),
        non_empty(req.trigger_time),
    ) else {
        return Err(CoreError::Validation(MISSING_FIELDS_MSG.into()));
    };

    let trigger_time = parse_trigger_time(&trigger_raw)
        .filter(|t| *t > now)
        .ok_or_else(|| CoreError::Validation(INVALID_TRIGGER_MSG.into()))?;

    let payload = match req.payload {
        None | Some(serde_json::Value::Null) => None,
        Some(value @ serde_json::Value::Object(_)) => Some(value),
        Some(_) => {
            return Err(CoreError::Validation(
                "Payload must be a JSON object".into(),
            ))
        }
    };

    Ok(ValidatedSchedule {
        token,
        title,
        body,
        trigger_time,
        payload,
    })
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.is_empty())
}

/// Parse an ISO-8601 trigger time.
///
/// Accepted forms, tried in order:
/// 1. RFC 3339 with an explicit offset (`2030-01-01T09:00:00+02:00`).
/// 2. A date-time without offset, read as UTC (`2030-01-01T09:00:00.250`).
/// 3. A bare date, read as midnight UTC (`2030-01-01`).
pub fn parse_trigger_time(input: &str) -> Option<Timestamp> {
    let input = input.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(input, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Cutoff for the cleanup job: anything triggered before this is deleted.
pub fn retention_cutoff(now: Timestamp, retention_days: i64) -> Timestamp {
    now - chrono::Duration::days(retention_days)
}

// ---------------------------------------------------------------------------
// State machine
// ---------------------------------------------------------------------------

/// Notification status IDs matching `notification_statuses` seed data.
///
/// Duplicated from the `db` crate's status enum because `core` must have
/// zero internal deps.
pub mod state_machine {
    pub const PENDING: i16 = 1;
    pub const SENT: i16 = 2;
    pub const FAILED: i16 = 3;

    /// Returns the set of valid target status IDs reachable from `from_status`.
    ///
    /// Sent and Failed are terminal.
    pub fn valid_transitions(from_status: i16) -> &'static [i16] {
        match from_status {
            PENDING => &[SENT, FAILED],
            _ => &[],
        }
    }

    /// Check whether a transition from `from` to `to` is valid.
    pub fn can_transition(from: i16, to: i16) -> bool {
        valid_transitions(from).contains(&to)
    }

    /// Human-readable name for a status ID.
    pub fn status_name(id: i16) -> &'static str {
        match id {
            PENDING => "pending",
            SENT => "sent",
            FAILED => "failed",
            _ => "unknown",
        }
    }

    /// Reverse of [`status_name`], used for query-string filters.
    pub fn status_id(name: &str) -> Option<i16> {
        match name {
            "pending" => Some(PENDING),
            "sent" => Some(SENT),
            "failed" => Some(FAILED),
            _ => None,
        }
    }
}
