use crate::domain::errors::ArtifactError;
use crate::domain::solar::WeatherRecord;
use std::collections::HashSet;

/// Canonical feature names, in the order the training notebooks produced them.
/// Artifacts carry their own ordered list; this one is used when none is given.
pub const FEATURE_NAMES: &[&str] = &[
    "tilt",
    "tilt2",
    "tilt_sin",
    "tilt_cos",
    "GHI_kWh_per_m2_day",
    "AvgTemp_C",
    "ClearnessIndex",
    "Precip_mm_per_day",
    "tilt_x_GHI",
    "temp_sq",
    "clear_x_tiltcos",
    "precip_x_clear",
    "BuildingType",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Feature {
    Tilt,
    Tilt2,
    TiltSin,
    TiltCos,
    Ghi,
    Temp,
    Clearness,
    Precip,
    TiltXGhi,
    TempSq,
    ClearXTiltCos,
    PrecipXClear,
    BuildingType,
}

impl Feature {
    pub const ALL: [Feature; 13] = [
        Feature::Tilt,
        Feature::Tilt2,
        Feature::TiltSin,
        Feature::TiltCos,
        Feature::Ghi,
        Feature::Temp,
        Feature::Clearness,
        Feature::Precip,
        Feature::TiltXGhi,
        Feature::TempSq,
        Feature::ClearXTiltCos,
        Feature::PrecipXClear,
        Feature::BuildingType,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Feature::Tilt => "tilt",
            Feature::Tilt2 => "tilt2",
            Feature::TiltSin => "tilt_sin",
            Feature::TiltCos => "tilt_cos",
            Feature::Ghi => "GHI_kWh_per_m2_day",
            Feature::Temp => "AvgTemp_C",
            Feature::Clearness => "ClearnessIndex",
            Feature::Precip => "Precip_mm_per_day",
            Feature::TiltXGhi => "tilt_x_GHI",
            Feature::TempSq => "temp_sq",
            Feature::ClearXTiltCos => "clear_x_tiltcos",
            Feature::PrecipXClear => "precip_x_clear",
            Feature::BuildingType => "BuildingType",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Feature::ALL.into_iter().find(|f| f.name() == name)
    }

    pub fn is_categorical(&self) -> bool {
        matches!(self, Feature::BuildingType)
    }
}

/// How the building-type column is presented to a model family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    /// Kept as a category; only categorical splits may read it.
    Categorical,
    /// Replaced by its integer code and read as a plain number.
    Encoded,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FeatureValue {
    Numeric(f64),
    Category(u32),
}

impl FeatureValue {
    pub fn as_numeric(&self) -> Option<f64> {
        match self {
            FeatureValue::Numeric(v) => Some(*v),
            FeatureValue::Category(_) => None,
        }
    }
}

/// All derived inputs for one prediction. Built once per call, read-only.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector {
    pub tilt: f64,
    pub tilt2: f64,
    pub tilt_sin: f64,
    pub tilt_cos: f64,
    pub ghi: f64,
    pub temp: f64,
    pub clearness: f64,
    pub precip: f64,
    pub tilt_x_ghi: f64,
    pub temp_sq: f64,
    pub clear_x_tiltcos: f64,
    pub precip_x_clear: f64,
    pub building_type_code: u32,
}

impl FeatureVector {
    pub fn new(weather: &WeatherRecord, tilt: f64, building_type_code: u32) -> Self {
        let radians = tilt.to_radians();
        let tilt_sin = radians.sin();
        let tilt_cos = radians.cos();

        Self {
            tilt,
            tilt2: tilt * tilt,
            tilt_sin,
            tilt_cos,
            ghi: weather.avg_ghi,
            temp: weather.avg_temp,
            clearness: weather.clearness_index,
            precip: weather.avg_precip,
            tilt_x_ghi: tilt * weather.avg_ghi,
            temp_sq: weather.avg_temp * weather.avg_temp,
            clear_x_tiltcos: weather.clearness_index * tilt_cos,
            precip_x_clear: weather.avg_precip * (1.0 - weather.clearness_index),
            building_type_code,
        }
    }

    pub fn value(&self, feature: Feature, encoding: Encoding) -> FeatureValue {
        let v = match feature {
            Feature::Tilt => self.tilt,
            Feature::Tilt2 => self.tilt2,
            Feature::TiltSin => self.tilt_sin,
            Feature::TiltCos => self.tilt_cos,
            Feature::Ghi => self.ghi,
            Feature::Temp => self.temp,
            Feature::Clearness => self.clearness,
            Feature::Precip => self.precip,
            Feature::TiltXGhi => self.tilt_x_ghi,
            Feature::TempSq => self.temp_sq,
            Feature::ClearXTiltCos => self.clear_x_tiltcos,
            Feature::PrecipXClear => self.precip_x_clear,
            Feature::BuildingType => match encoding {
                Encoding::Categorical => return FeatureValue::Category(self.building_type_code),
                Encoding::Encoded => self.building_type_code as f64,
            },
        };
        FeatureValue::Numeric(v)
    }
}

/// Ordered column layout the artifacts were fitted against.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureColumns {
    columns: Vec<Feature>,
}

impl FeatureColumns {
    pub fn from_names<S: AsRef<str>>(names: &[S]) -> Result<Self, ArtifactError> {
        let mut seen = HashSet::new();
        let mut columns = Vec::with_capacity(names.len());

        for name in names {
            let name = name.as_ref();
            let feature = Feature::from_name(name).ok_or_else(|| ArtifactError::UnknownFeature {
                name: name.to_string(),
            })?;
            if !seen.insert(feature) {
                return Err(ArtifactError::DuplicateFeature {
                    name: name.to_string(),
                });
            }
            columns.push(feature);
        }

        Ok(Self { columns })
    }

    pub fn canonical() -> Self {
        Self {
            columns: Feature::ALL.to_vec(),
        }
    }

    pub fn columns(&self) -> &[Feature] {
        &self.columns
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.columns.iter().map(Feature::name).collect()
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn row(&self, features: &FeatureVector, encoding: Encoding) -> FeatureRow {
        FeatureRow {
            encoding,
            values: self
                .columns
                .iter()
                .map(|&f| features.value(f, encoding))
                .collect(),
        }
    }
}

/// One encoded input row, column-aligned with [`FeatureColumns`].
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureRow {
    encoding: Encoding,
    values: Vec<FeatureValue>,
}

impl FeatureRow {
    pub fn encoding(&self) -> Encoding {
        self.encoding
    }

    pub fn values(&self) -> &[FeatureValue] {
        &self.values
    }

    pub fn get(&self, index: usize) -> Option<FeatureValue> {
        self.values.get(index).copied()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Plain numeric view for models without categorical support.
    pub fn to_dense(&self) -> Result<Vec<f64>, String> {
        self.values
            .iter()
            .enumerate()
            .map(|(i, v)| {
                v.as_numeric()
                    .ok_or_else(|| format!("Column {} is categorical; model expects numbers", i))
            })
            .collect()
    }
}
