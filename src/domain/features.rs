//! Feature vector types for lifestyle and clinical risk scenarios.
//!
//! A [`FeatureVector`] holds one scenario's inputs. Scoring never uses the
//! record directly: it is first projected onto the canonical list of derived
//! features ([`DERIVED_FEATURES`]), which is shared by the scorer, the
//! importance decomposer and the timeline interpolator so they cannot drift
//! apart on which features exist or their order.

use serde::{Deserialize, Serialize};

use super::RiskError;

/// Number of derived features used by every disease model.
pub const FEATURE_COUNT: usize = 12;

/// Biological sex as used by the models (only `male` carries a coefficient).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sex {
    Male,
    Female,
}

impl std::fmt::Display for Sex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Male => write!(f, "male"),
            Self::Female => write!(f, "female"),
        }
    }
}

impl std::str::FromStr for Sex {
    type Err = RiskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "male" | "m" => Ok(Self::Male),
            "female" | "f" => Ok(Self::Female),
            other => Err(RiskError::InvalidArgument(format!(
                "sex must be male or female, got {other:?}"
            ))),
        }
    }
}

/// One scenario's full set of health and lifestyle inputs.
///
/// The serialized form is a flat record of exactly twelve fields; the names
/// are part of the persisted profile format and must not change.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FeatureVector {
    /// Age in years (non-negative)
    pub age: f64,

    pub sex: Sex,

    /// Body mass index (kg/m²)
    pub bmi: f64,

    /// Systolic blood pressure in mmHg
    pub systolic: f64,

    /// Diastolic blood pressure in mmHg
    pub diastolic: f64,

    /// Total cholesterol in mg/dL
    pub cholesterol: f64,

    /// Fasting glucose in mg/dL
    pub glucose: f64,

    pub smoker: bool,

    /// Exercise in hours per week (non-negative)
    pub exercise: f64,

    /// Sleep in hours per night
    pub sleep: f64,

    /// Family history of the disease
    #[serde(rename = "familyHx")]
    pub family_hx: bool,

    /// Self-reported stress, 0 to 10
    pub stress: u8,
}

impl Default for FeatureVector {
    fn default() -> Self {
        Self {
            age: 28.0,
            sex: Sex::Male,
            bmi: 24.0,
            systolic: 118.0,
            diastolic: 76.0,
            cholesterol: 170.0,
            glucose: 92.0,
            smoker: false,
            exercise: 3.0,
            sleep: 7.0,
            family_hx: false,
            stress: 3,
        }
    }
}

/// Serialized field names, in record order.
pub const FIELD_NAMES: [&str; 12] = [
    "age",
    "sex",
    "bmi",
    "systolic",
    "diastolic",
    "cholesterol",
    "glucose",
    "smoker",
    "exercise",
    "sleep",
    "familyHx",
    "stress",
];

impl FeatureVector {
    /// Check the record invariants: finite numbers, non-negative age and
    /// exercise, stress within 0..=10.
    ///
    /// # Errors
    /// Returns `RiskError::InvalidArgument` naming every offending field.
    pub fn validate(&self) -> Result<(), RiskError> {
        let mut errors = Vec::new();

        let numeric = [
            ("age", self.age),
            ("bmi", self.bmi),
            ("systolic", self.systolic),
            ("diastolic", self.diastolic),
            ("cholesterol", self.cholesterol),
            ("glucose", self.glucose),
            ("exercise", self.exercise),
            ("sleep", self.sleep),
        ];
        for (name, value) in numeric {
            if !value.is_finite() {
                errors.push(format!("{name} must be finite, got {value}"));
            }
        }

        if self.age < 0.0 {
            errors.push(format!("age {} must be non-negative", self.age));
        }
        if self.exercise < 0.0 {
            errors.push(format!("exercise {} must be non-negative", self.exercise));
        }
        if self.stress > 10 {
            errors.push(format!("stress {} out of range [0, 10]", self.stress));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(RiskError::InvalidArgument(errors.join("; ")))
        }
    }

    /// Set a single field from its textual value.
    ///
    /// `name` is the serialized field name (`familyHx`, not `family_hx`).
    /// The updated record is validated before it replaces `self`, so a
    /// rejected value leaves the vector unchanged.
    ///
    /// # Errors
    /// Returns `RiskError::InvalidArgument` for unknown names, unparsable
    /// values, or values that break the record invariants.
    pub fn set_field(&mut self, name: &str, raw: &str) -> Result<(), RiskError> {
        let mut next = *self;
        let raw = raw.trim();

        match name {
            "age" => next.age = parse_number(name, raw)?,
            "sex" => next.sex = raw.parse()?,
            "bmi" => next.bmi = parse_number(name, raw)?,
            "systolic" => next.systolic = parse_number(name, raw)?,
            "diastolic" => next.diastolic = parse_number(name, raw)?,
            "cholesterol" => next.cholesterol = parse_number(name, raw)?,
            "glucose" => next.glucose = parse_number(name, raw)?,
            "smoker" => next.smoker = parse_flag(name, raw)?,
            "exercise" => next.exercise = parse_number(name, raw)?,
            "sleep" => next.sleep = parse_number(name, raw)?,
            "familyHx" => next.family_hx = parse_flag(name, raw)?,
            "stress" => {
                next.stress = raw.parse::<u8>().map_err(|_| {
                    RiskError::InvalidArgument(format!(
                        "stress must be an integer 0-10, got {raw:?}"
                    ))
                })?;
            }
            other => {
                return Err(RiskError::InvalidArgument(format!(
                    "unknown feature field {other:?} (expected one of {})",
                    FIELD_NAMES.join(", ")
                )))
            }
        }

        next.validate()?;
        *self = next;
        Ok(())
    }

    /// Project the record onto the derived numeric features, in canonical order.
    #[must_use]
    pub fn derive(&self) -> DerivedVector {
        let mut values = [0.0; FEATURE_COUNT];
        for (slot, feature) in values.iter_mut().zip(DERIVED_FEATURES.iter()) {
            *slot = (feature.extract)(self);
        }
        DerivedVector(values)
    }
}

fn parse_number(name: &str, raw: &str) -> Result<f64, RiskError> {
    let value: f64 = raw
        .parse()
        .map_err(|_| RiskError::InvalidArgument(format!("{name} must be a number, got {raw:?}")))?;
    if !value.is_finite() {
        return Err(RiskError::InvalidArgument(format!(
            "{name} must be finite, got {raw:?}"
        )));
    }
    Ok(value)
}

fn parse_flag(name: &str, raw: &str) -> Result<bool, RiskError> {
    match raw.to_ascii_lowercase().as_str() {
        "true" | "yes" | "y" | "1" => Ok(true),
        "false" | "no" | "n" | "0" => Ok(false),
        _ => Err(RiskError::InvalidArgument(format!(
            "{name} must be true or false, got {raw:?}"
        ))),
    }
}

fn flag(value: bool) -> f64 {
    if value {
        1.0
    } else {
        0.0
    }
}

/// A named derived feature and how to read it from a [`FeatureVector`].
#[derive(Clone, Copy)]
pub struct DerivedFeature {
    pub name: &'static str,
    pub extract: fn(&FeatureVector) -> f64,
}

impl std::fmt::Debug for DerivedFeature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("DerivedFeature").field(&self.name).finish()
    }
}

/// Canonical derived features. Every disease model carries one weight per
/// entry, and every per-feature output follows this order.
pub const DERIVED_FEATURES: [DerivedFeature; FEATURE_COUNT] = [
    DerivedFeature { name: "age", extract: |f| f.age },
    DerivedFeature {
        name: "sexIsMale",
        extract: |f| flag(f.sex == Sex::Male),
    },
    DerivedFeature { name: "bmi", extract: |f| f.bmi },
    DerivedFeature { name: "systolic", extract: |f| f.systolic },
    DerivedFeature { name: "diastolic", extract: |f| f.diastolic },
    DerivedFeature { name: "cholesterol", extract: |f| f.cholesterol },
    DerivedFeature { name: "glucose", extract: |f| f.glucose },
    DerivedFeature { name: "smoker", extract: |f| flag(f.smoker) },
    DerivedFeature { name: "exercise", extract: |f| f.exercise },
    DerivedFeature { name: "sleep", extract: |f| f.sleep },
    DerivedFeature { name: "familyHx", extract: |f| flag(f.family_hx) },
    DerivedFeature {
        name: "stress",
        extract: |f| f64::from(f.stress),
    },
];

/// Position of a derived feature in the canonical order.
#[must_use]
pub fn feature_index(name: &str) -> Option<usize> {
    DERIVED_FEATURES.iter().position(|f| f.name == name)
}

/// Derived feature values in canonical order.
///
/// Unlike [`FeatureVector`], this may hold fractional values for `sexIsMale`,
/// `smoker` and `familyHx` (produced by timeline blending). Such a vector is
/// only meaningful as scoring input, never as a real scenario.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DerivedVector(pub [f64; FEATURE_COUNT]);

impl DerivedVector {
    /// Linear blend `(1 - t) * from + t * to`, applied to every feature.
    #[must_use]
    pub fn lerp(from: &Self, to: &Self, t: f64) -> Self {
        let mut values = [0.0; FEATURE_COUNT];
        for (i, slot) in values.iter_mut().enumerate() {
            *slot = (1.0 - t) * from.0[i] + t * to.0[i];
        }
        Self(values)
    }

    #[must_use]
    pub fn values(&self) -> &[f64; FEATURE_COUNT] {
        &self.0
    }
}

/// Named starting scenarios.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preset {
    Default,
    Active,
    Sedentary,
    HighRisk,
}

impl Preset {
    pub const ALL: [Preset; 4] = [
        Preset::Default,
        Preset::Active,
        Preset::Sedentary,
        Preset::HighRisk,
    ];

    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Active => "active",
            Self::Sedentary => "sedentary",
            Self::HighRisk => "high-risk",
        }
    }

    #[must_use]
    pub fn features(&self) -> FeatureVector {
        match self {
            Self::Default => FeatureVector::default(),
            Self::Active => FeatureVector {
                age: 32.0,
                sex: Sex::Female,
                bmi: 21.5,
                systolic: 110.0,
                diastolic: 70.0,
                cholesterol: 160.0,
                glucose: 85.0,
                smoker: false,
                exercise: 7.0,
                sleep: 8.0,
                family_hx: false,
                stress: 2,
            },
            Self::Sedentary => FeatureVector {
                age: 46.0,
                sex: Sex::Male,
                bmi: 29.0,
                systolic: 132.0,
                diastolic: 85.0,
                cholesterol: 210.0,
                glucose: 105.0,
                smoker: false,
                exercise: 0.5,
                sleep: 6.0,
                family_hx: false,
                stress: 6,
            },
            Self::HighRisk => FeatureVector {
                age: 62.0,
                sex: Sex::Male,
                bmi: 33.0,
                systolic: 155.0,
                diastolic: 95.0,
                cholesterol: 260.0,
                glucose: 140.0,
                smoker: true,
                exercise: 0.0,
                sleep: 5.0,
                family_hx: true,
                stress: 8,
            },
        }
    }
}

impl std::str::FromStr for Preset {
    type Err = RiskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|p| p.name() == s.trim())
            .ok_or_else(|| {
                let names: Vec<_> = Self::ALL.iter().map(Preset::name).collect();
                RiskError::InvalidArgument(format!(
                    "unknown preset {s:?} (expected one of {})",
                    names.join(", ")
                ))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derive_follows_canonical_order() {
        let derived = FeatureVector::default().derive();
        let v = derived.values();

        assert_eq!(v.len(), FEATURE_COUNT);
        assert!((v[0] - 28.0).abs() < f64::EPSILON);
        assert!((v[1] - 1.0).abs() < f64::EPSILON); // male
        assert!((v[7] - 0.0).abs() < f64::EPSILON); // non-smoker
        assert!((v[11] - 3.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_derived_booleans_and_sex() {
        let features = FeatureVector {
            sex: Sex::Female,
            smoker: true,
            family_hx: true,
            ..FeatureVector::default()
        };
        let v = *features.derive().values();

        assert_eq!(v[feature_index("sexIsMale").expect("known feature")], 0.0);
        assert_eq!(v[feature_index("smoker").expect("known feature")], 1.0);
        assert_eq!(v[feature_index("familyHx").expect("known feature")], 1.0);
    }

    #[test]
    fn test_feature_names_are_unique() {
        for (i, a) in DERIVED_FEATURES.iter().enumerate() {
            for b in &DERIVED_FEATURES[i + 1..] {
                assert_ne!(a.name, b.name);
            }
        }
        assert!(feature_index("bloodType").is_none());
    }

    #[test]
    fn test_validation() {
        assert!(FeatureVector::default().validate().is_ok());

        let invalid = FeatureVector {
            age: -1.0,
            bmi: f64::NAN,
            stress: 11,
            ..FeatureVector::default()
        };
        let err = invalid.validate().expect_err("Should reject");
        let msg = err.to_string();
        assert!(msg.contains("age"));
        assert!(msg.contains("bmi"));
        assert!(msg.contains("stress"));
    }

    #[test]
    fn test_set_field() {
        let mut features = FeatureVector::default();
        features.set_field("bmi", "27.5").expect("Should set bmi");
        features.set_field("sex", "F").expect("Should set sex");
        features.set_field("familyHx", "yes").expect("Should set familyHx");
        features.set_field("stress", "9").expect("Should set stress");

        assert!((features.bmi - 27.5).abs() < f64::EPSILON);
        assert_eq!(features.sex, Sex::Female);
        assert!(features.family_hx);
        assert_eq!(features.stress, 9);
    }

    #[test]
    fn test_set_field_rejects_bad_input_without_mutating() {
        let mut features = FeatureVector::default();

        assert!(features.set_field("weight", "80").is_err());
        assert!(features.set_field("glucose", "high").is_err());
        assert!(features.set_field("glucose", "inf").is_err());
        assert!(features.set_field("stress", "12").is_err());
        assert!(features.set_field("smoker", "sometimes").is_err());
        assert!(features.set_field("age", "-4").is_err());

        assert_eq!(features, FeatureVector::default());
    }

    #[test]
    fn test_serialized_field_names() {
        let json = serde_json::to_value(FeatureVector::default()).expect("Should serialize");
        let obj = json.as_object().expect("Should be an object");

        assert_eq!(obj.len(), FIELD_NAMES.len());
        for name in FIELD_NAMES {
            assert!(obj.contains_key(name), "missing {name}");
        }
        assert_eq!(obj["sex"], "male");
        assert_eq!(obj["stress"], 3);
    }

    #[test]
    fn test_deserialize_rejects_unknown_fields() {
        let mut json = serde_json::to_value(FeatureVector::default()).expect("Should serialize");
        json["weight"] = serde_json::json!(80);
        assert!(serde_json::from_value::<FeatureVector>(json).is_err());
    }

    #[test]
    fn test_lerp_endpoints() {
        let a = FeatureVector::default().derive();
        let b = Preset::HighRisk.features().derive();

        assert_eq!(DerivedVector::lerp(&a, &b, 0.0), a);
        assert_eq!(DerivedVector::lerp(&a, &b, 1.0), b);

        let mid = DerivedVector::lerp(&a, &b, 0.5);
        let smoker = feature_index("smoker").expect("known feature");
        assert!((mid.values()[smoker] - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_presets_are_valid() {
        for preset in Preset::ALL {
            preset.features().validate().expect("Preset should be valid");
            assert_eq!(preset.name().parse::<Preset>().expect("Should parse"), preset);
        }
        assert_eq!(Preset::Default.features(), FeatureVector::default());
        assert!("athlete".parse::<Preset>().is_err());
    }
}
