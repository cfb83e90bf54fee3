//! Search score encoding.
//!
//! A score is a single `i32`. Two narrow bands at the extremes are reserved
//! for forced mates: `i32::MAX - d` means the side to move mates in `d`
//! plies, `i32::MIN + d` means it is mated in `d`. Everything between is a
//! centipawn value from the side-to-move perspective. Negation flips the
//! perspective and keeps mate distances intact, so negamax backup works on
//! the raw encoding.

use std::fmt;

/// Width of the reserved mate bands at each end of the range.
const MATE_BAND: i32 = 1_000;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct Score(pub i32);

impl Score {
    pub const DRAW: Score = Score(0);
    pub const MIN: Score = Score(i32::MIN + 1);
    pub const MAX: Score = Score(i32::MAX);

    /// Centipawn score from the side-to-move perspective.
    #[inline]
    pub fn centipawns(cp: i32) -> Score {
        debug_assert!(cp.abs() < i32::MAX - MATE_BAND);
        Score(cp)
    }

    /// The side to move delivers mate in `plies`.
    #[inline]
    pub fn mate_in(plies: u32) -> Score {
        Score(i32::MAX - plies as i32)
    }

    /// The side to move is mated in `plies`.
    #[inline]
    pub fn mated_in(plies: u32) -> Score {
        Score(i32::MIN + 1 + plies as i32)
    }

    #[inline]
    pub fn is_mate(self) -> bool {
        self.0 > i32::MAX - MATE_BAND || self.0 < i32::MIN + 1 + MATE_BAND
    }

    /// Signed mate distance in plies: positive when the side to move wins.
    pub fn mate_distance(self) -> Option<i32> {
        if self.0 > i32::MAX - MATE_BAND {
            Some(i32::MAX - self.0)
        } else if self.0 < i32::MIN + 1 + MATE_BAND {
            Some(-(self.0 - (i32::MIN + 1)))
        } else {
            None
        }
    }

    /// One ply farther from the mate, for backing scores up the tree.
    pub fn backed_up(self) -> Score {
        if self.0 > i32::MAX - MATE_BAND {
            Score(self.0 - 1)
        } else if self.0 < i32::MIN + 1 + MATE_BAND {
            Score(self.0 + 1)
        } else {
            self
        }
    }

    /// Lossy 16-bit form for stashing in a move's flag word.
    pub fn to_flag_score(self) -> i16 {
        if let Some(d) = self.mate_distance() {
            if d >= 0 {
                i16::MAX - d.min(MATE_BAND) as i16
            } else {
                i16::MIN + (-d).min(MATE_BAND) as i16
            }
        } else {
            self.0.clamp(i16::MIN as i32 + MATE_BAND, i16::MAX as i32 - MATE_BAND) as i16
        }
    }
}

impl std::ops::Neg for Score {
    type Output = Score;
    /// Perspective flip; mate distances survive unchanged.
    fn neg(self) -> Score {
        if self.0 == i32::MAX {
            Score(i32::MIN + 1)
        } else if self.0 == i32::MIN + 1 {
            Score(i32::MAX)
        } else if self.0 > i32::MAX - MATE_BAND {
            Score(i32::MIN + 1 + (i32::MAX - self.0))
        } else if self.0 < i32::MIN + 1 + MATE_BAND {
            Score(i32::MAX - (self.0 - (i32::MIN + 1)))
        } else {
            Score(-self.0)
        }
    }
}

impl fmt::Display for Score {
    /// `#N` / `#-N` for mates, a 3-decimal pawn-scaled float otherwise.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.mate_distance() {
            Some(d) => write!(f, "#{d}"),
            None => write!(f, "{:.3}", self.0 as f64 / 100.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordering_puts_mates_at_the_extremes() {
        assert!(Score::mate_in(1) > Score::centipawns(5_000));
        assert!(Score::mated_in(1) < Score::centipawns(-5_000));
        assert!(Score::mate_in(1) > Score::mate_in(5));
        assert!(Score::mated_in(1) < Score::mated_in(5));
    }

    #[test]
    fn negation_flips_perspective() {
        assert_eq!(-Score::centipawns(120), Score::centipawns(-120));
        assert_eq!(-Score::mate_in(3), Score::mated_in(3));
        assert_eq!(-Score::mated_in(7), Score::mate_in(7));
        assert_eq!(-(-Score::mate_in(4)), Score::mate_in(4));
    }

    #[test]
    fn mate_distance_round_trips() {
        assert_eq!(Score::mate_in(0).mate_distance(), Some(0));
        assert_eq!(Score::mate_in(9).mate_distance(), Some(9));
        assert_eq!(Score::mated_in(2).mate_distance(), Some(-2));
        assert_eq!(Score::centipawns(300).mate_distance(), None);
    }

    #[test]
    fn backed_up_lengthens_the_mate() {
        assert_eq!(Score::mate_in(1).backed_up(), Score::mate_in(2));
        assert_eq!(Score::mated_in(0).backed_up(), Score::mated_in(1));
        assert_eq!(Score::centipawns(42).backed_up(), Score::centipawns(42));
    }

    #[test]
    fn display_formats() {
        assert_eq!(Score::centipawns(150).to_string(), "1.500");
        assert_eq!(Score::centipawns(-25).to_string(), "-0.250");
        assert_eq!(Score::DRAW.to_string(), "0.000");
        assert_eq!(Score::mate_in(3).to_string(), "#3");
        assert_eq!(Score::mated_in(2).to_string(), "#-2");
    }

    #[test]
    fn flag_score_preserves_sign_and_mates() {
        assert!(Score::mate_in(1).to_flag_score() > Score::centipawns(9_999).to_flag_score());
        assert!(Score::mated_in(1).to_flag_score() < Score::centipawns(-9_999).to_flag_score());
        assert_eq!(Score::centipawns(77).to_flag_score(), 77);
    }
}
