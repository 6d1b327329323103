//! Calendar event assembly.
//!
//! Pure mappings from located instants (or threshold crossings, or almanac
//! records) to the domain event record handed to the external upsert sink
//! and calendar writer. No I/O happens here.

use hifitime::Epoch;

use crate::bodies::Body;
use crate::ephemeris::usno::AlmanacRecord;
use crate::search::engine::{FoundEvent, FoundEventPair};
use crate::search::predicate::{AspectKind, StationDirection};
use crate::search::twilight::TwilightCrossing;
use crate::zodiac::Sign;

/// A calendar event: a start instant, a short summary, and a description.
///
/// Persistence and calendar-file export are external collaborators; events
/// are upserted idempotently by identity (start + summary) downstream.
#[derive(Debug, Clone, PartialEq)]
pub struct CalendarEvent {
    pub start: Epoch,
    pub summary: String,
    pub description: String,
}

/// Event for a station point located by the search engine.
pub fn station_event(body: Body, direction: StationDirection, found: &FoundEvent) -> CalendarEvent {
    let motion = match direction {
        StationDirection::Retrograde => "Stations Retrograde",
        StationDirection::Direct => "Stations Direct",
    };
    let description = format!("{} {motion}", body.name());

    CalendarEvent {
        start: found.timestamp,
        summary: format!("{} {description}", body.glyph()),
        description,
    }
}

/// Event for a sign or decan ingress located by the search engine.
pub fn ingress_event(body: Body, sign: Sign, found: &FoundEvent) -> CalendarEvent {
    let description = format!("{} enters {}", body.name(), sign.name());

    CalendarEvent {
        start: found.timestamp,
        summary: format!("{} {} {description}", body.glyph(), sign.glyph()),
        description,
    }
}

/// Event for an exact aspect located by the dual-body search.
pub fn aspect_event(
    primary: Body,
    secondary: Body,
    kind: AspectKind,
    found: &FoundEventPair,
) -> CalendarEvent {
    let description = format!(
        "{} {} {}",
        primary.name(),
        kind.name(),
        secondary.name()
    );

    CalendarEvent {
        start: found.timestamp,
        summary: format!(
            "{} {} {} {description}",
            primary.glyph(),
            kind.glyph(),
            secondary.glyph()
        ),
        description,
    }
}

/// Event for a twilight threshold crossing.
pub fn twilight_event(crossing: &TwilightCrossing) -> CalendarEvent {
    let description = crossing.kind.description().to_string();

    CalendarEvent {
        start: crossing.timestamp,
        summary: description.clone(),
        description,
    }
}

/// Event for a lunar phase reported by the almanac provider.
pub fn lunar_phase_event(record: &AlmanacRecord) -> CalendarEvent {
    CalendarEvent {
        start: record.timestamp,
        summary: format!("{} {}", Body::Moon.glyph(), record.name),
        description: record.name.clone(),
    }
}

/// Event for a season boundary reported by the almanac provider.
pub fn season_event(record: &AlmanacRecord) -> CalendarEvent {
    CalendarEvent {
        start: record.timestamp,
        summary: format!("{} {}", Body::Sun.glyph(), record.name),
        description: record.name.clone(),
    }
}
