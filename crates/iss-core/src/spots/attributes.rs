use std::io::Write;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Column name of the z-plane coordinate.
pub const PLANE: &str = "plane";
/// Column name of the row coordinate.
pub const Y: &str = "y";
/// Column name of the column coordinate.
pub const X: &str = "x";
/// Column name of the spot radius.
pub const RADIUS: &str = "radius";
/// Column name of the measured intensity.
pub const INTENSITY: &str = "intensity";
/// Column name of the per-slice spot identifier.
pub const SPOT_ID: &str = "spot_id";

/// Every column of a spot table, in output order.
pub const COLUMNS: [&str; 6] = [PLANE, Y, X, RADIUS, INTENSITY, SPOT_ID];

/// One detected blob.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Spot {
    pub plane: usize,
    pub y: usize,
    pub x: usize,
    /// `round(sigma * sqrt(3))` of the kernel scale the blob was found at.
    pub radius: f64,
    /// Floating-point value in the stack's units (`[0, 1]` for loaded planes).
    pub intensity: f32,
    /// Zero-based, unique within one detection call.
    pub spot_id: usize,
}

/// Table of detected spots with a fixed column schema.
///
/// Rows combined with [`SpotAttributes::concat`] keep no particular order.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SpotAttributes {
    spots: Vec<Spot>,
}

impl SpotAttributes {
    /// A table with zero rows and the full column schema.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_spots(spots: Vec<Spot>) -> Self {
        Self { spots }
    }

    /// Append every table's rows into one.
    pub fn concat<I>(tables: I) -> Self
    where
        I: IntoIterator<Item = SpotAttributes>,
    {
        let spots = tables.into_iter().flat_map(|t| t.spots).collect();
        Self { spots }
    }

    pub fn columns(&self) -> &'static [&'static str] {
        &COLUMNS
    }

    pub fn len(&self) -> usize {
        self.spots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spots.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Spot> {
        self.spots.iter()
    }

    pub fn spots(&self) -> &[Spot] {
        &self.spots
    }

    pub fn into_spots(self) -> Vec<Spot> {
        self.spots
    }

    /// Write the table as CSV with a header row, also for an empty table.
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<()> {
        let mut out = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(writer);
        out.write_record(COLUMNS)?;
        for spot in &self.spots {
            out.serialize(spot)?;
        }
        out.flush()?;
        Ok(())
    }
}

impl<'a> IntoIterator for &'a SpotAttributes {
    type Item = &'a Spot;
    type IntoIter = std::slice::Iter<'a, Spot>;

    fn into_iter(self) -> Self::IntoIter {
        self.spots.iter()
    }
}
