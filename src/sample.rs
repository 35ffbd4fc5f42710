/*!
 * Leaf color readings and the geotagged samples built from them.
 *
 * The classifier reports one of the four leaf color chart panels ("swap1" through "swap4") or
 * "Uncertain" when it could not decide. Everything downstream works with the integer [Level],
 * where 0 stands for an uncertain reading.
 */
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};

/// The categorical output of the leaf color classifier for a single image.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::EnumString,
    strum::Display,
    strum::IntoStaticStr,
    strum::EnumIter,
)]
pub enum LeafReading {
    #[serde(rename = "swap1")]
    #[strum(serialize = "swap1")]
    Swap1,
    #[serde(rename = "swap2")]
    #[strum(serialize = "swap2")]
    Swap2,
    #[serde(rename = "swap3")]
    #[strum(serialize = "swap3")]
    Swap3,
    #[serde(rename = "swap4")]
    #[strum(serialize = "swap4")]
    Swap4,
    Uncertain,
}

impl LeafReading {
    /// The classes in the order of the classifier's output vector.
    pub const CLASSES: [LeafReading; 4] = [
        LeafReading::Swap1,
        LeafReading::Swap2,
        LeafReading::Swap3,
        LeafReading::Swap4,
    ];

    /// Map a reading onto the leaf color chart level.
    pub fn level(self) -> Level {
        use LeafReading::*;

        match self {
            Swap1 => Level(1),
            Swap2 => Level(2),
            Swap3 => Level(3),
            Swap4 => Level(4),
            Uncertain => Level::UNCERTAIN,
        }
    }
}

/**
 * A leaf color chart level in the range 0 to 4.
 *
 * Level 0 means the reading was undetermined, levels 1 through 4 go from a pale (nitrogen
 * deficient) leaf to a dark green one.
 */
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(try_from = "u8", into = "u8")]
pub struct Level(u8);

impl Level {
    pub const UNCERTAIN: Level = Level(0);
    pub const MAX: u8 = 4;

    /// Create a level, returning `None` if it is outside of 0..=4.
    pub fn new(value: u8) -> Option<Self> {
        if value <= Self::MAX {
            Some(Level(value))
        } else {
            None
        }
    }

    pub fn value(self) -> u8 {
        self.0
    }

    /// A decidable level is any level other than the uncertain level 0.
    pub fn is_decidable(self) -> bool {
        self.0 > 0
    }

    /**
     * The rounded mean of the decidable levels, or [Level::UNCERTAIN] if there are none.
     *
     * Ties are rounded to the even level, so a mean of 2.5 becomes 2 and 3.5 becomes 4.
     */
    pub fn decidable_mean<I>(levels: I) -> Level
    where
        I: IntoIterator<Item = Level>,
    {
        let (sum, count) = levels
            .into_iter()
            .filter(|lvl| lvl.is_decidable())
            .fold((0u32, 0u32), |(sum, count), lvl| {
                (sum + u32::from(lvl.0), count + 1)
            });

        if count == 0 {
            return Level::UNCERTAIN;
        }

        let mean = f64::from(sum) / f64::from(count);
        // The mean of values in 1..=4 always rounds back into 1..=4.
        Level(mean.round_ties_even() as u8)
    }
}

impl TryFrom<u8> for Level {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Level::new(value).ok_or_else(|| format!("level {} is outside of 0..=4", value))
    }
}

impl From<Level> for u8 {
    fn from(level: Level) -> u8 {
        level.0
    }
}

impl From<LeafReading> for Level {
    fn from(reading: LeafReading) -> Level {
        reading.level()
    }
}

impl Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
        write!(f, "{}", self.0)
    }
}

/// A leaf color level observed at a location in the field.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// Latitude in degrees.
    pub latitude: f64,
    /// Longitude in degrees.
    pub longitude: f64,
    pub level: Level,
}

impl Sample {
    pub fn new(latitude: f64, longitude: f64, level: Level) -> Self {
        Sample {
            latitude,
            longitude,
            level,
        }
    }

    /// Build a sample from the classifier output for the image taken at this location.
    pub fn from_reading(latitude: f64, longitude: f64, reading: LeafReading) -> Self {
        Self::new(latitude, longitude, reading.level())
    }

    /// Check the coordinates are within the valid range for latitude and longitude.
    pub fn has_valid_coordinates(&self) -> bool {
        crate::geodesy::valid_lat_lon(self.latitude, self.longitude)
    }
}
