//! Predicate catalog for the event searches.
//!
//! Predicates are pure functions of their numeric inputs: the engine calls
//! them once per adjacent sample pair and must get identical results on
//! repeated calls. They are represented as tagged variants rather than
//! opaque closures so each event type dispatches through one small table.

use crate::constants::{wrap180, wrap360, Degree};

/// Direction of a station: the sense the apparent motion settles into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StationDirection {
    /// Longitude starts decreasing between consecutive samples
    Retrograde,
    /// Longitude starts increasing between consecutive samples
    Direct,
}

/// A predicate over one body's longitude at two adjacent samples.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LongitudePredicate {
    /// The body crosses a fixed boundary moving forward along the ecliptic
    /// (sign or decan ingress). Wrap-aware: a Pisces-to-Aries crossing of
    /// the 0-degree boundary is detected like any other.
    AscendingCrossing { boundary: Degree },

    /// The body's apparent motion has the given sense between the two
    /// samples (station detection: the first pair with reversed motion).
    Station { direction: StationDirection },
}

impl LongitudePredicate {
    /// Evaluate the predicate on an adjacent pair of longitudes.
    pub fn eval(&self, previous: Degree, current: Degree) -> bool {
        match self {
            LongitudePredicate::AscendingCrossing { boundary } => {
                // forward displacement from the previous sample to the
                // boundary, and to the current sample; the boundary is
                // crossed when it sits inside the step
                let to_boundary = wrap360(boundary - previous);
                let step = wrap360(current - previous);
                to_boundary > 0.0 && to_boundary <= step && step < 180.0
            }
            LongitudePredicate::Station { direction } => {
                let motion = wrap180(current - previous);
                match direction {
                    StationDirection::Retrograde => motion < 0.0,
                    StationDirection::Direct => motion > 0.0,
                }
            }
        }
    }
}

/// The aspect angles of the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AspectKind {
    Conjunction,
    SemiSextile,
    SemiSquare,
    Sextile,
    Quintile,
    Square,
    Trine,
    Sesquiquadrate,
    BiQuintile,
    Quincunx,
    Opposition,
}

impl AspectKind {
    pub fn angle(&self) -> Degree {
        match self {
            AspectKind::Conjunction => 0.0,
            AspectKind::SemiSextile => 30.0,
            AspectKind::SemiSquare => 45.0,
            AspectKind::Sextile => 60.0,
            AspectKind::Quintile => 72.0,
            AspectKind::Square => 90.0,
            AspectKind::Trine => 120.0,
            AspectKind::Sesquiquadrate => 135.0,
            AspectKind::BiQuintile => 144.0,
            AspectKind::Quincunx => 150.0,
            AspectKind::Opposition => 180.0,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            AspectKind::Conjunction => "Conjunction",
            AspectKind::SemiSextile => "Semi-Sextile",
            AspectKind::SemiSquare => "Semi-Square",
            AspectKind::Sextile => "Sextile",
            AspectKind::Quintile => "Quintile",
            AspectKind::Square => "Square",
            AspectKind::Trine => "Trine",
            AspectKind::Sesquiquadrate => "Sesquiquadrate",
            AspectKind::BiQuintile => "Bi-Quintile",
            AspectKind::Quincunx => "Quincunx",
            AspectKind::Opposition => "Opposition",
        }
    }

    pub fn glyph(&self) -> &'static str {
        match self {
            AspectKind::Conjunction => "\u{260C}",
            AspectKind::SemiSextile => "\u{26BA}",
            AspectKind::SemiSquare => "\u{2220}",
            AspectKind::Sextile => "\u{26B9}",
            AspectKind::Quintile => "Q",
            AspectKind::Square => "\u{25A1}",
            AspectKind::Trine => "\u{25B3}",
            AspectKind::Sesquiquadrate => "\u{26BC}",
            AspectKind::BiQuintile => "bQ",
            AspectKind::Quincunx => "\u{26BB}",
            AspectKind::Opposition => "\u{260D}",
        }
    }
}

/// The six longitudes a dual-body predicate sees: previous/current/next
/// sample for each body.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PairLongitudes {
    pub previous_1: Degree,
    pub previous_2: Degree,
    pub current_1: Degree,
    pub current_2: Degree,
    pub next_1: Degree,
    pub next_2: Degree,
}

/// A predicate over the longitudes of two bodies at three adjacent samples.
///
/// The look-ahead pair exists to disambiguate a genuine crossing from the
/// ±180-degree wrap of the signed separation: a crossing is only reported
/// when neither flank of the center pair jumps across the wrap.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AspectPredicate {
    pub kind: AspectKind,
}

impl AspectPredicate {
    pub fn new(kind: AspectKind) -> Self {
        AspectPredicate { kind }
    }

    /// Evaluate the predicate on three adjacent sample pairs.
    ///
    /// The aspect is exact where the signed separation of the two bodies
    /// crosses `+angle` or `-angle`; the transition is attributed to the
    /// (previous, current) pair.
    pub fn eval(&self, longitudes: &PairLongitudes) -> bool {
        let angle = self.kind.angle();

        let separation_previous = wrap180(longitudes.previous_1 - longitudes.previous_2);
        let separation_current = wrap180(longitudes.current_1 - longitudes.current_2);
        let separation_next = wrap180(longitudes.next_1 - longitudes.next_2);

        branch_crossed(
            wrap180(separation_previous - angle),
            wrap180(separation_current - angle),
            wrap180(separation_next - angle),
        ) || branch_crossed(
            wrap180(separation_previous + angle),
            wrap180(separation_current + angle),
            wrap180(separation_next + angle),
        )
    }
}

/// True when a signed offset changes sign between the previous and current
/// samples, with both flanks free of the ±180-degree wrap jump.
///
/// A genuine crossing has small offsets on both sides; a pair straddling
/// the wrap shows up as two offsets near ±180 and is rejected here. This is
/// what the look-ahead sample exists for.
fn branch_crossed(previous: Degree, current: Degree, next: Degree) -> bool {
    if (previous - current).abs() >= 180.0 || (current - next).abs() >= 180.0 {
        return false;
    }
    (previous < 0.0 && current >= 0.0) || (previous > 0.0 && current <= 0.0)
}

#[cfg(test)]
mod predicate_tests {
    use super::*;

    #[test]
    fn test_ascending_crossing() {
        let ingress = LongitudePredicate::AscendingCrossing { boundary: 30.0 };

        assert!(ingress.eval(29.5, 30.5));
        assert!(ingress.eval(29.5, 30.0));
        assert!(!ingress.eval(30.0, 30.5)); // already past at the previous sample
        assert!(!ingress.eval(28.0, 29.9));
        assert!(!ingress.eval(30.5, 31.0));
    }

    #[test]
    fn test_ascending_crossing_wraps_at_zero() {
        let ingress = LongitudePredicate::AscendingCrossing { boundary: 0.0 };

        assert!(ingress.eval(359.8, 0.1));
        assert!(!ingress.eval(0.1, 0.4));
        // retrograde motion back across the boundary is not an ascending crossing
        assert!(!ingress.eval(0.1, 359.8));
    }

    #[test]
    fn test_station_directions() {
        let retrograde = LongitudePredicate::Station {
            direction: StationDirection::Retrograde,
        };
        let direct = LongitudePredicate::Station {
            direction: StationDirection::Direct,
        };

        assert!(retrograde.eval(100.2, 100.1));
        assert!(!retrograde.eval(100.1, 100.2));
        assert!(direct.eval(100.1, 100.2));

        // wrap: 359.9 -> 0.1 is forward motion, not a retrograde jump
        assert!(!retrograde.eval(359.9, 0.1));
        assert!(direct.eval(359.9, 0.1));
    }

    #[test]
    fn test_aspect_crossing() {
        let square = AspectPredicate::new(AspectKind::Square);

        // separation moves 89.8 -> 90.1 -> 90.4: crossing at the center pair
        assert!(square.eval(&PairLongitudes {
            previous_1: 139.8,
            previous_2: 50.0,
            current_1: 140.1,
            current_2: 50.0,
            next_1: 140.4,
            next_2: 50.0,
        }));

        // separation stays below the angle: no crossing
        assert!(!square.eval(&PairLongitudes {
            previous_1: 139.0,
            previous_2: 50.0,
            current_1: 139.5,
            current_2: 50.0,
            next_1: 139.9,
            next_2: 50.0,
        }));
    }

    #[test]
    fn test_aspect_negative_branch() {
        let square = AspectPredicate::new(AspectKind::Square);

        // body 1 trails body 2: separation crosses -90
        assert!(square.eval(&PairLongitudes {
            previous_1: 50.0,
            previous_2: 139.8,
            current_1: 50.0,
            current_2: 140.1,
            next_1: 50.0,
            next_2: 140.4,
        }));
    }

    #[test]
    fn test_opposition_across_the_wrap() {
        let opposition = AspectPredicate::new(AspectKind::Opposition);

        // signed separation walks 179.8 -> -179.9 (through 180): exact opposition
        assert!(opposition.eval(&PairLongitudes {
            previous_1: 179.8,
            previous_2: 0.0,
            current_1: 180.1,
            current_2: 0.0,
            next_1: 180.4,
            next_2: 0.0,
        }));
    }

    #[test]
    fn test_conjunction_sign_change() {
        let conjunction = AspectPredicate::new(AspectKind::Conjunction);

        assert!(conjunction.eval(&PairLongitudes {
            previous_1: 99.9,
            previous_2: 100.0,
            current_1: 100.05,
            current_2: 100.0,
            next_1: 100.2,
            next_2: 100.0,
        }));

        assert!(!conjunction.eval(&PairLongitudes {
            previous_1: 99.0,
            previous_2: 100.0,
            current_1: 99.5,
            current_2: 100.0,
            next_1: 99.9,
            next_2: 100.0,
        }));
    }
}
