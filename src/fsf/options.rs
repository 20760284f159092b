//! Enumerated FEAT settings and the tokens FEAT expects for them.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Motion correction method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MotionCorrection {
    #[default]
    None,
    /// MCFLIRT rigid-body realignment.
    Mcflirt,
}

impl MotionCorrection {
    pub fn is_enabled(self) -> bool {
        self != Self::None
    }
}

/// Slice-timing correction method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SliceTiming {
    #[default]
    None,
    /// Regular up (0, 1, 2, ... n-1).
    RegularUp,
    /// Regular down (n-1, n-2, ... 0).
    RegularDown,
    /// Interleaved (0, 2, 4, ... 1, 3, 5, ...).
    Interleaved,
}

impl SliceTiming {
    pub fn is_enabled(self) -> bool {
        self != Self::None
    }

    /// FEAT `fmri(st)` code.
    pub const fn code(self) -> u8 {
        match self {
            Self::None => 0,
            Self::RegularUp => 1,
            Self::RegularDown => 2,
            Self::Interleaved => 5,
        }
    }
}

/// Search range of the linear registration to standard space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinearSearch {
    /// No search; images already aligned.
    None,
    #[default]
    Normal,
    Full,
}

impl LinearSearch {
    pub const fn token(self) -> &'static str {
        match self {
            Self::None => "0",
            Self::Normal => "90",
            Self::Full => "180",
        }
    }
}

/// Degrees of freedom of the registration to standard space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Dof {
    #[serde(rename = "3")]
    Translation,
    #[default]
    #[serde(rename = "6")]
    RigidBody,
    #[serde(rename = "7")]
    GlobalRescale,
    #[serde(rename = "9")]
    TraditionalRescale,
    #[serde(rename = "12")]
    Affine,
    #[serde(rename = "bbr")]
    Bbr,
}

impl Dof {
    pub const fn token(self) -> &'static str {
        match self {
            Self::Translation => "3",
            Self::RigidBody => "6",
            Self::GlobalRescale => "7",
            Self::TraditionalRescale => "9",
            Self::Affine => "12",
            Self::Bbr => "BBR",
        }
    }
}

/// Statistical thresholding mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Thresholding {
    #[default]
    None,
    Uncorrected,
    Voxel,
    Cluster,
}

impl Thresholding {
    pub const fn token(self) -> &'static str {
        match self {
            Self::None => "0",
            Self::Uncorrected => "1",
            Self::Voxel => "2",
            Self::Cluster => "3",
        }
    }
}

/// What a higher-level analysis takes as its inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputType {
    /// Lower-level `.feat` directories.
    #[default]
    FeatDirectories,
    /// 3-D COPE images.
    CopeImages,
}

impl InputType {
    pub const fn token(self) -> &'static str {
        match self {
            Self::FeatDirectories => "1",
            Self::CopeImages => "2",
        }
    }
}

/// Higher-level modelling of between-input variance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MixedEffects {
    /// Mixed effects: simple OLS.
    Ols,
    /// Mixed effects: FLAME 1.
    #[default]
    Flame1,
    /// Mixed effects: FLAME 1+2.
    Flame12,
    FixedEffects,
}

impl MixedEffects {
    pub const fn token(self) -> &'static str {
        match self {
            Self::Ols => "0",
            Self::Flame12 => "1",
            Self::Flame1 => "2",
            Self::FixedEffects => "3",
        }
    }
}

macro_rules! display_token {
    ($($ty:ty),*) => {$(
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.token())
            }
        }
    )*};
}

display_token!(LinearSearch, Dof, Thresholding, InputType, MixedEffects);
