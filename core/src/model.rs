//! Request models for the calendar operations.
//!
//! Only the payloads the client sends are modeled; responses are read through
//! `BeehiveBody`. Every struct carries its `beeType` discriminator on the
//! wire, and `None` fields are omitted.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use crate::wire_time;

/// Identifier of a Beehive entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "beeType", rename = "beeId", rename_all = "camelCase")]
pub struct BeeId {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_type: Option<String>,
}

impl BeeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            resource_type: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OccurrenceType {
    Meeting,
    DayEvent,
    Holiday,
    JournalEntry,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OccurrenceStatus {
    Tentative,
    Confirmed,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OccurrenceParticipantStatus {
    NeedsAction,
    Accepted,
    Declined,
    Tentative,
    Delegated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Priority {
    None,
    Lowest,
    Low,
    Medium,
    High,
    Highest,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Transparency {
    Opaque,
    Transparent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChangeStatus {
    Created,
    Updated,
    Deleted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MeetingParticipantUpdaterOperation {
    Add,
    Remove,
    Update,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TriggerRelativeTo {
    Start,
    End,
}

/// When a reminder fires: relative to the occurrence, or at a fixed instant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "beeType", rename_all_fields = "camelCase")]
pub enum TimedTrigger {
    #[serde(rename = "relativeTrigger")]
    Relative {
        /// ISO-8601 duration, e.g. `-PT15M`.
        offset: String,
        relative_to: TriggerRelativeTo,
    },
    #[serde(rename = "absoluteTrigger")]
    Absolute {
        #[serde(with = "wire_time")]
        datetime: DateTime<FixedOffset>,
    },
}

/// One change to a meeting's participant list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "beeType", rename = "meetingParticipantUpdater", rename_all = "camelCase")]
pub struct MeetingParticipantUpdater {
    /// `mailto:` address of the participant.
    pub address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub operation: MeetingParticipantUpdaterOperation,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bookable_resource: Option<BeeId>,
}

/// Fields of a meeting to set on create or update.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "beeType", rename = "meetingUpdater", rename_all = "camelCase")]
pub struct MeetingUpdater {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub change_status: Option<ChangeStatus>,
    #[serde(default, with = "wire_time::option", skip_serializing_if = "Option::is_none")]
    pub user_created_on: Option<DateTime<FixedOffset>>,
    #[serde(default, with = "wire_time::option", skip_serializing_if = "Option::is_none")]
    pub user_modified_on: Option<DateTime<FixedOffset>>,
    #[serde(default, with = "wire_time::option", skip_serializing_if = "Option::is_none")]
    pub end: Option<DateTime<FixedOffset>>,
    #[serde(default)]
    pub include_online_conference: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invitee_participant_status: Option<OccurrenceParticipantStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invitee_primary_client_reminder_trigger: Option<TimedTrigger>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invitee_priority: Option<Priority>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invitee_transparency: Option<Transparency>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location_name: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub participant_updaters: Vec<MeetingParticipantUpdater>,
    #[serde(default, with = "wire_time::option", skip_serializing_if = "Option::is_none")]
    pub start: Option<DateTime<FixedOffset>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<OccurrenceStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub xhtml_fragment_description: Option<String>,
}

/// Payload of `invt/create`: which calendar, what kind of occurrence, and its
/// fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "beeType", rename = "meetingCreator", rename_all = "camelCase")]
pub struct MeetingCreator {
    pub calendar: BeeId,
    pub meeting_updater: MeetingUpdater,
    #[serde(rename = "type")]
    pub occurrence_type: OccurrenceType,
}
