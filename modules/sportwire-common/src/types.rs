use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Closed set of tag kinds. Replaces the untyped string tag types the
/// original tagger produced (spec.md §9 REDESIGN FLAGS).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum TagType {
    Sport,
    Tournament,
    Team,
    Player,
    Unknown,
}

impl std::fmt::Display for TagType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            TagType::Sport => "sport",
            TagType::Tournament => "tournament",
            TagType::Team => "team",
            TagType::Player => "player",
            TagType::Unknown => "unknown",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for TagType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sport" => Ok(TagType::Sport),
            "tournament" => Ok(TagType::Tournament),
            "team" => Ok(TagType::Team),
            "player" => Ok(TagType::Player),
            "unknown" => Ok(TagType::Unknown),
            other => Err(format!("unknown tag type: {other}")),
        }
    }
}

/// Distinguishes the two publishable item kinds stored alongside the queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ItemType {
    Story,
    Article,
}

impl std::fmt::Display for ItemType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ItemType::Story => "story",
            ItemType::Article => "article",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for ItemType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "story" => Ok(ItemType::Story),
            "article" => Ok(ItemType::Article),
            other => Err(format!("unknown item type: {other}")),
        }
    }
}

/// Publish queue entry status. Transitions are one-way: `Queued` to exactly
/// one of `Sent` or `Error`, never back (spec.md §4 publish_queue invariants).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum QueueStatus {
    Queued,
    Sent,
    Error,
}

impl std::fmt::Display for QueueStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            QueueStatus::Queued => "queued",
            QueueStatus::Sent => "sent",
            QueueStatus::Error => "error",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for QueueStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "queued" => Ok(QueueStatus::Queued),
            "sent" => Ok(QueueStatus::Sent),
            "error" => Ok(QueueStatus::Error),
            other => Err(format!("unknown queue status: {other}")),
        }
    }
}

/// Outcome of a single scheduler tick, surfaced to the CLI/logs so an
/// operator can tell "nothing to do" apart from "declined to do it"
/// (spec.md §7: dedup skips are not errors).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerOutcome {
    Sent,
    Dedup,
    Quiet,
    IntervalCapReached,
    HourCapReached,
    DayCapReached,
    Empty,
    Error,
}

impl std::fmt::Display for SchedulerOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            SchedulerOutcome::Sent => "sent",
            SchedulerOutcome::Dedup => "dedup",
            SchedulerOutcome::Quiet => "quiet",
            SchedulerOutcome::IntervalCapReached => "interval",
            SchedulerOutcome::HourCapReached => "hour",
            SchedulerOutcome::DayCapReached => "day",
            SchedulerOutcome::Empty => "empty",
            SchedulerOutcome::Error => "error",
        };
        write!(f, "{s}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tag_type_round_trips_through_display_and_fromstr() {
        for t in [
            TagType::Sport,
            TagType::Tournament,
            TagType::Team,
            TagType::Player,
            TagType::Unknown,
        ] {
            let s = t.to_string();
            assert_eq!(s.parse::<TagType>().unwrap(), t);
        }
    }

    #[test]
    fn tag_type_rejects_unknown_string() {
        assert!("goalkeeper".parse::<TagType>().is_err());
    }

    #[test]
    fn queue_status_round_trips() {
        for s in [QueueStatus::Queued, QueueStatus::Sent, QueueStatus::Error] {
            assert_eq!(s.to_string().parse::<QueueStatus>().unwrap(), s);
        }
    }

    #[test]
    fn item_type_round_trips() {
        for t in [ItemType::Story, ItemType::Article] {
            assert_eq!(t.to_string().parse::<ItemType>().unwrap(), t);
        }
    }
}
