//! Nearest-fit garment size from a measurement set.
//!
//! Each size in a [`SizeGuide`] is scored by summing, over every measurement
//! the guide and the input share, how far the value falls outside that
//! size's range. The lowest score wins; ties go to the size listed first.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::measurements::{MeasurementKind, Measurements};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    #[default]
    Male,
    Female,
}

impl FromStr for Gender {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "male" | "m" => Ok(Self::Male),
            "female" | "f" => Ok(Self::Female),
            _ => Err(Error::UnknownGender(s.to_string())),
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Male => "male",
            Self::Female => "female",
        })
    }
}

/// Inclusive range of acceptable values for one measurement.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SizeRange {
    pub min: f32,
    pub max: f32,
}

impl SizeRange {
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    /// Distance to the nearest bound, zero inside the range.
    pub fn deviation(&self, value: f32) -> f32 {
        if value < self.min {
            self.min - value
        } else if value > self.max {
            value - self.max
        } else {
            0.0
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SizeRow {
    pub label: String,
    pub ranges: BTreeMap<MeasurementKind, SizeRange>,
}

impl SizeRow {
    /// Summed deviation over measurements present in both row and input.
    pub fn score(&self, measurements: &Measurements) -> f32 {
        measurements
            .iter()
            .filter_map(|(kind, value)| self.ranges.get(&kind).map(|r| r.deviation(value)))
            .sum()
    }
}

/// Ordered size table. Order decides ties.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SizeGuide {
    pub sizes: Vec<SizeRow>,
}

/// Columns of a built-in row, each contributing a min and max.
const GUIDE_COLUMNS: [MeasurementKind; 3] = [
    MeasurementKind::ShoulderWidth,
    MeasurementKind::Chest,
    MeasurementKind::Waist,
];

/// Label, then min and max per [`GUIDE_COLUMNS`] entry.
type RawRow = (&'static str, [f32; 6]);

const MALE_GUIDE: &[RawRow] = &[
    ("XS", [38.0, 41.0, 81.0, 86.0, 66.0, 71.0]),
    ("S", [41.0, 44.0, 86.0, 94.0, 71.0, 79.0]),
    ("M", [44.0, 47.0, 94.0, 102.0, 79.0, 87.0]),
    ("L", [47.0, 50.0, 102.0, 110.0, 87.0, 95.0]),
    ("XL", [50.0, 53.0, 110.0, 118.0, 95.0, 103.0]),
    ("XXL", [53.0, 56.0, 118.0, 126.0, 103.0, 111.0]),
];

/// UK dress sizes.
const FEMALE_GUIDE: &[RawRow] = &[
    ("6", [33.0, 35.0, 76.0, 80.0, 58.0, 62.0]),
    ("8", [35.0, 36.5, 80.0, 84.0, 62.0, 66.0]),
    ("10", [36.5, 38.0, 84.0, 88.0, 66.0, 70.0]),
    ("12", [38.0, 39.5, 88.0, 93.0, 70.0, 75.0]),
    ("14", [39.5, 41.0, 93.0, 98.0, 75.0, 80.0]),
    ("16", [41.0, 42.5, 98.0, 103.0, 80.0, 85.0]),
    ("18", [42.5, 44.0, 103.0, 108.0, 85.0, 90.0]),
];

const UK_TO_US: &[(&str, &str)] = &[
    ("6", "2"),
    ("8", "4"),
    ("10", "6"),
    ("12", "8"),
    ("14", "10"),
    ("16", "12"),
    ("18", "14"),
];

/// US equivalent of a UK size label, or the label itself when unmapped.
pub fn uk_to_us(label: &str) -> &str {
    UK_TO_US
        .iter()
        .find(|(uk, _)| *uk == label)
        .map(|(_, us)| *us)
        .unwrap_or(label)
}

impl SizeGuide {
    pub fn new(sizes: Vec<SizeRow>) -> Self {
        Self { sizes }
    }

    /// Built-in guide in centimetres.
    pub fn builtin(gender: Gender) -> Self {
        let raw = match gender {
            Gender::Male => MALE_GUIDE,
            Gender::Female => FEMALE_GUIDE,
        };
        let sizes = raw
            .iter()
            .map(|(label, bounds)| SizeRow {
                label: label.to_string(),
                ranges: GUIDE_COLUMNS
                    .iter()
                    .zip(bounds.chunks_exact(2))
                    .map(|(kind, pair)| (*kind, SizeRange::new(pair[0], pair[1])))
                    .collect(),
            })
            .collect();
        Self { sizes }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn is_empty(&self) -> bool {
        self.sizes.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SizeEstimate {
    pub label: String,
    /// Cross-region equivalent, same as `label` when no mapping exists.
    pub regional_label: String,
    /// Total out-of-range distance for the winning size.
    pub score: f32,
}

/// Pick the best-fitting size from `guide`.
pub fn estimate_size(measurements: &Measurements, guide: &SizeGuide) -> Result<SizeEstimate> {
    let mut best: Option<(&SizeRow, f32)> = None;
    for row in &guide.sizes {
        let score = row.score(measurements);
        debug!(size = %row.label, score, "size scored");
        // Strict comparison keeps the first of equal scores.
        if best.map_or(true, |(_, best_score)| score < best_score) {
            best = Some((row, score));
        }
    }

    let (row, score) = best.ok_or(Error::EmptySizeGuide)?;
    Ok(SizeEstimate {
        label: row.label.clone(),
        regional_label: uk_to_us(&row.label).to_string(),
        score,
    })
}

/// [`estimate_size`] against the built-in guide for `gender`.
pub fn estimate_clothing_size(measurements: &Measurements, gender: Gender) -> Result<SizeEstimate> {
    estimate_size(measurements, &SizeGuide::builtin(gender))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tape(shoulder: f32, chest: f32, waist: f32) -> Measurements {
        Measurements::from_values([
            (MeasurementKind::ShoulderWidth, shoulder),
            (MeasurementKind::Chest, chest),
            (MeasurementKind::Waist, waist),
        ])
    }

    #[test]
    fn builtin_rows_cover_every_column() {
        for gender in [Gender::Male, Gender::Female] {
            for row in SizeGuide::builtin(gender).sizes {
                assert_eq!(row.ranges.len(), GUIDE_COLUMNS.len(), "{}", row.label);
                for kind in GUIDE_COLUMNS {
                    let range = &row.ranges[&kind];
                    assert!(range.min < range.max, "{} {kind}", row.label);
                }
            }
        }
    }

    #[test]
    fn deviation_is_distance_to_nearest_bound() {
        let r = SizeRange::new(10.0, 20.0);
        assert_eq!(r.deviation(5.0), 5.0);
        assert_eq!(r.deviation(10.0), 0.0);
        assert_eq!(r.deviation(15.0), 0.0);
        assert_eq!(r.deviation(20.0), 0.0);
        assert_eq!(r.deviation(26.0), 6.0);
    }

    #[test]
    fn in_range_measurements_pick_that_size() {
        let est = estimate_clothing_size(&tape(45.0, 98.0, 83.0), Gender::Male).unwrap();
        assert_eq!(est.label, "M");
        assert_eq!(est.regional_label, "M");
        assert_eq!(est.score, 0.0);
    }

    #[test]
    fn nearest_size_when_nothing_fits() {
        // Shoulders M, chest and waist L.
        let est = estimate_clothing_size(&tape(45.0, 108.0, 92.0), Gender::Male).unwrap();
        assert_eq!(est.label, "L");
        assert!((est.score - 2.0).abs() < 1e-4);

        let huge = estimate_clothing_size(&tape(70.0, 150.0, 140.0), Gender::Male).unwrap();
        assert_eq!(huge.label, "XXL");
    }

    #[test]
    fn female_sizes_map_to_us() {
        let est = estimate_clothing_size(&tape(37.0, 86.0, 68.0), Gender::Female).unwrap();
        assert_eq!(est.label, "10");
        assert_eq!(est.regional_label, "6");
    }

    #[test]
    fn ties_go_to_first_listed_size() {
        // Shared boundary: 44 is inside both S and M.
        let m = Measurements::from_values([(MeasurementKind::ShoulderWidth, 44.0)]);
        let est = estimate_clothing_size(&m, Gender::Male).unwrap();
        assert_eq!(est.label, "S");

        let guide = SizeGuide::new(vec![
            SizeRow {
                label: "B".into(),
                ranges: [(MeasurementKind::Chest, SizeRange::new(90.0, 100.0))].into(),
            },
            SizeRow {
                label: "A".into(),
                ranges: [(MeasurementKind::Chest, SizeRange::new(110.0, 120.0))].into(),
            },
        ]);
        // 105 is 5 away from both.
        let m = Measurements::from_values([(MeasurementKind::Chest, 105.0)]);
        assert_eq!(estimate_size(&m, &guide).unwrap().label, "B");
    }

    #[test]
    fn measurements_outside_the_guide_are_ignored() {
        let m = Measurements::from_values([
            (MeasurementKind::ShoulderWidth, 45.0),
            (MeasurementKind::Chest, 98.0),
            (MeasurementKind::Waist, 83.0),
            (MeasurementKind::LeftArm, 900.0),
        ]);
        let est = estimate_clothing_size(&m, Gender::Male).unwrap();
        assert_eq!(est.label, "M");
        assert_eq!(est.score, 0.0);
    }

    #[test]
    fn estimation_is_idempotent() {
        let m = tape(39.0, 91.0, 77.0);
        let a = estimate_clothing_size(&m, Gender::Female).unwrap();
        let b = estimate_clothing_size(&m, Gender::Female).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn empty_guide_is_an_error() {
        let result = estimate_size(&tape(45.0, 98.0, 83.0), &SizeGuide::new(Vec::new()));
        assert!(matches!(result, Err(Error::EmptySizeGuide)));
    }

    #[test]
    fn guide_from_json() {
        let json = r#"{"sizes": [
            {"label": "14", "ranges": {"chest": {"min": 90.0, "max": 96.0}}},
            {"label": "OS", "ranges": {"chest": {"min": 96.0, "max": 130.0}}}
        ]}"#;
        let guide = SizeGuide::from_json(json).unwrap();
        assert_eq!(guide.sizes.len(), 2);

        let m = Measurements::from_values([(MeasurementKind::Chest, 92.0)]);
        let est = estimate_size(&m, &guide).unwrap();
        assert_eq!(est.label, "14");
        assert_eq!(est.regional_label, "10");

        let m = Measurements::from_values([(MeasurementKind::Chest, 120.0)]);
        assert_eq!(estimate_size(&m, &guide).unwrap().regional_label, "OS");
    }

    #[test]
    fn gender_parsing() {
        assert_eq!("Male".parse::<Gender>().unwrap(), Gender::Male);
        assert_eq!("f".parse::<Gender>().unwrap(), Gender::Female);
        assert!(matches!("other".parse::<Gender>(), Err(Error::UnknownGender(_))));
    }
}
