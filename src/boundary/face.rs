use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::discretization::grid::{Axis, Side};
use crate::error::BoundaryError;

pub const NUM_FACES: usize = 6;

/// One of the six cardinal faces (patches) of a box.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Face {
    Front,
    Back,
    Bottom,
    Top,
    Left,
    Right,
}

#[derive(Clone, Copy, Debug)]
struct FaceInfo {
    axis: Axis,
    side: Side,
    name: &'static str,
}

const FACE_TABLE: [FaceInfo; NUM_FACES] = [
    FaceInfo { axis: Axis::Z, side: Side::Minus, name: "front" },
    FaceInfo { axis: Axis::Z, side: Side::Plus, name: "back" },
    FaceInfo { axis: Axis::Y, side: Side::Minus, name: "bottom" },
    FaceInfo { axis: Axis::Y, side: Side::Plus, name: "top" },
    FaceInfo { axis: Axis::X, side: Side::Minus, name: "left" },
    FaceInfo { axis: Axis::X, side: Side::Plus, name: "right" },
];

impl Face {
    pub const ALL: [Face; NUM_FACES] = [
        Face::Front,
        Face::Back,
        Face::Bottom,
        Face::Top,
        Face::Left,
        Face::Right,
    ];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Result<Face, BoundaryError> {
        Face::ALL
            .get(index)
            .copied()
            .ok_or_else(|| BoundaryError::InvalidFace(index.to_string()))
    }

    #[inline]
    pub fn axis(self) -> Axis {
        FACE_TABLE[self.index()].axis
    }

    /// Side of the axis the face lies on, which is also its outward direction.
    #[inline]
    pub fn side(self) -> Side {
        FACE_TABLE[self.index()].side
    }

    pub fn name(self) -> &'static str {
        FACE_TABLE[self.index()].name
    }

    pub fn opposite(self) -> Face {
        match self {
            Face::Front => Face::Back,
            Face::Back => Face::Front,
            Face::Bottom => Face::Top,
            Face::Top => Face::Bottom,
            Face::Left => Face::Right,
            Face::Right => Face::Left,
        }
    }

    /// Cell one step outward from `cell` across this face, if it exists.
    pub fn step_outward(self, cell: [usize; 3]) -> Option<[usize; 3]> {
        let a = self.axis().index();
        let mut out = cell;
        out[a] = cell[a].checked_add_signed(self.side().sign())?;
        Some(out)
    }
}

impl TryFrom<usize> for Face {
    type Error = BoundaryError;

    fn try_from(index: usize) -> Result<Self, Self::Error> {
        Face::from_index(index)
    }
}

impl FromStr for Face {
    type Err = BoundaryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        FACE_TABLE
            .iter()
            .position(|info| info.name == lower)
            .map(|i| Face::ALL[i])
            .ok_or_else(|| BoundaryError::InvalidFace(s.to_string()))
    }
}

impl fmt::Display for Face {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
