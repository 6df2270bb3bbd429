use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
    Horizontal,
    Vertical,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Left,
    Right,
    Up,
    Down,
}

impl Direction {
    pub fn orientation(self) -> Orientation {
        match self {
            Direction::Left | Direction::Right => Orientation::Horizontal,
            Direction::Up | Direction::Down => Orientation::Vertical,
        }
    }

    /// +1 for directions that increase the coordinate, -1 otherwise.
    pub fn sign(self) -> i32 {
        match self {
            Direction::Right | Direction::Down => 1,
            Direction::Left | Direction::Up => -1,
        }
    }
}

/// Quarter-turn angle of a layout part, always stored in `0..360`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
pub struct Angle(u16);

impl Angle {
    pub const fn zero() -> Self { Angle(0) }

    pub fn degrees(self) -> u16 { self.0 }

    /// Snaps any integer onto the nearest lower quarter turn, mod 360.
    pub fn from_degrees(degrees: i32) -> Self {
        Angle((degrees.rem_euclid(360) / 90 * 90) as u16)
    }

    pub fn rotated(self, amount: i32) -> Self { Self::from_degrees(i32::from(self.0) + amount) }

    /// Split and column parts lay out along x when horizontal.
    pub fn is_horizontal(self) -> bool { self.0 == 0 || self.0 == 180 }

    /// 180 and 270 put the primary part on the trailing side.
    pub fn is_reversed(self) -> bool { self.0 == 180 || self.0 == 270 }
}

impl From<Angle> for u16 {
    fn from(value: Angle) -> Self { value.0 }
}

impl TryFrom<u16> for Angle {
    type Error = String;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        if value % 90 == 0 {
            Ok(Angle::from_degrees(i32::from(value)))
        } else {
            Err(format!("angle {value} is not a multiple of 90"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn angle_wraps_both_ways() {
        assert_eq!(Angle::zero().rotated(-90).degrees(), 270);
        assert_eq!(Angle::from_degrees(270).rotated(90).degrees(), 0);
        assert_eq!(Angle::from_degrees(450).degrees(), 90);
    }

    #[test]
    fn angle_rejects_non_quarter_turns() {
        assert!(Angle::try_from(45).is_err());
        assert_eq!(Angle::try_from(180).map(Angle::degrees), Ok(180));
    }
}
