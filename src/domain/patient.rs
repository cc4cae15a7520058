//! Patient attribute types for lung cancer survival prediction.
//!
//! Every categorical attribute is a closed enum whose integer code matches the
//! encoding used when the scaler and classifier were trained.

use std::ops::RangeInclusive;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::LungsurvError;

/// Accepted age in years (slider bounds).
pub const AGE_RANGE: RangeInclusive<u32> = 10..=100;

/// Accepted body-mass index (number input bounds).
pub const BMI_RANGE: RangeInclusive<f64> = 10.0..=60.0;

/// Accepted total cholesterol in mg/dL (number input bounds).
pub const CHOLESTEROL_RANGE: RangeInclusive<u32> = 100..=400;

/// A closed set of labelled options with a fixed integer encoding.
pub trait Category: Copy + PartialEq + Sized + 'static {
    /// Form label of the attribute, used in error messages.
    const FIELD: &'static str;

    /// All options in display order.
    const ALL: &'static [Self];

    /// Display label, also the serialized form.
    fn label(self) -> &'static str;

    /// Integer code fed to the model.
    fn code(self) -> u8;

    /// Parse a display label.
    ///
    /// # Errors
    /// Returns `LungsurvError::InvalidCategory` if the label is not one of `ALL`.
    fn parse_label(value: &str) -> Result<Self, LungsurvError> {
        let trimmed = value.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|option| option.label() == trimmed)
            .ok_or_else(|| LungsurvError::InvalidCategory {
                field: Self::FIELD,
                value: value.to_string(),
            })
    }

    /// Next option, wrapping around.
    #[must_use]
    fn next(self) -> Self {
        let idx = Self::ALL.iter().position(|o| *o == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }

    /// Previous option, wrapping around.
    #[must_use]
    fn prev(self) -> Self {
        let idx = Self::ALL.iter().position(|o| *o == self).unwrap_or(0);
        Self::ALL[(idx + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

macro_rules! category {
    (
        $(#[$meta:meta])*
        $name:ident, $field:literal {
            $( $(#[$vmeta:meta])* $variant:ident => ($label:literal, $code:literal) ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $( $(#[$vmeta])* $variant ),+
        }

        impl Category for $name {
            const FIELD: &'static str = $field;
            const ALL: &'static [Self] = &[$(Self::$variant),+];

            fn label(self) -> &'static str {
                match self {
                    $(Self::$variant => $label),+
                }
            }

            fn code(self) -> u8 {
                match self {
                    $(Self::$variant => $code),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.label())
            }
        }

        impl std::str::FromStr for $name {
            type Err = LungsurvError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::parse_label(s)
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.label())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let raw = String::deserialize(deserializer)?;
                Self::parse_label(&raw).map_err(serde::de::Error::custom)
            }
        }
    };
}

category! {
    /// Biological sex as recorded on the form.
    Gender, "Gender" {
        Male => ("Male", 1),
        Female => ("Female", 0),
    }
}

category! {
    /// Country of treatment.
    Country, "Country" {
        India => ("India", 0),
        Usa => ("USA", 1),
        Uk => ("UK", 2),
        Other => ("Other", 3),
    }
}

category! {
    /// Cancer stage at diagnosis.
    CancerStage, "Cancer Stage" {
        StageI => ("Stage I", 0),
        StageII => ("Stage II", 1),
        StageIII => ("Stage III", 2),
        StageIV => ("Stage IV", 3),
    }
}

category! {
    /// Yes/No answer used by family history and comorbidity fields.
    YesNo, "Yes/No" {
        Yes => ("Yes", 1),
        No => ("No", 0),
    }
}

category! {
    SmokingStatus, "Smoking Status" {
        NeverSmoked => ("Never Smoked", 0),
        FormerSmoker => ("Former Smoker", 1),
        CurrentSmoker => ("Current Smoker", 2),
        PassiveSmoker => ("Passive Smoker", 3),
    }
}

category! {
    TreatmentType, "Treatment Type" {
        Surgery => ("Surgery", 0),
        Chemotherapy => ("Chemotherapy", 1),
        Radiation => ("Radiation", 2),
        Combined => ("Combined", 3),
    }
}

/// Patient attributes collected by the form.
///
/// Built fresh for every prediction request and never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PatientAttributes {
    /// Age in years
    pub age: u32,
    pub gender: Gender,
    pub country: Country,
    pub cancer_stage: CancerStage,
    /// Family history of cancer
    pub family_history: YesNo,
    pub smoking_status: SmokingStatus,
    /// Body-mass index
    pub bmi: f64,
    /// Total cholesterol in mg/dL
    pub cholesterol: u32,
    pub hypertension: YesNo,
    pub asthma: YesNo,
    pub cirrhosis: YesNo,
    /// History of another cancer
    pub other_cancer: YesNo,
    pub treatment_type: TreatmentType,
}

impl Default for PatientAttributes {
    /// Initial form state: slider and number defaults, first option of each select.
    fn default() -> Self {
        Self {
            age: 60,
            gender: Gender::Male,
            country: Country::India,
            cancer_stage: CancerStage::StageI,
            family_history: YesNo::Yes,
            smoking_status: SmokingStatus::NeverSmoked,
            bmi: 22.0,
            cholesterol: 200,
            hypertension: YesNo::Yes,
            asthma: YesNo::Yes,
            cirrhosis: YesNo::Yes,
            other_cancer: YesNo::Yes,
            treatment_type: TreatmentType::Surgery,
        }
    }
}

/// Patient attributes as text labels, e.g. from a script or another frontend.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawPatientInput {
    pub age: u32,
    pub gender: String,
    pub country: String,
    pub cancer_stage: String,
    pub family_history: String,
    pub smoking_status: String,
    pub bmi: f64,
    pub cholesterol: u32,
    pub hypertension: String,
    pub asthma: String,
    pub cirrhosis: String,
    pub other_cancer: String,
    pub treatment_type: String,
}

impl PatientAttributes {
    /// Parse labelled input into typed attributes.
    ///
    /// # Errors
    /// Returns `LungsurvError::InvalidCategory` for the first label that is not
    /// a member of its option set.
    pub fn from_labels(raw: &RawPatientInput) -> Result<Self, LungsurvError> {
        Ok(Self {
            age: raw.age,
            gender: raw.gender.parse()?,
            country: raw.country.parse()?,
            cancer_stage: raw.cancer_stage.parse()?,
            family_history: parse_yes_no("Family History", &raw.family_history)?,
            smoking_status: raw.smoking_status.parse()?,
            bmi: raw.bmi,
            cholesterol: raw.cholesterol,
            hypertension: parse_yes_no("Hypertension", &raw.hypertension)?,
            asthma: parse_yes_no("Asthma", &raw.asthma)?,
            cirrhosis: parse_yes_no("Cirrhosis", &raw.cirrhosis)?,
            other_cancer: parse_yes_no("Other Cancer History", &raw.other_cancer)?,
            treatment_type: raw.treatment_type.parse()?,
        })
    }
}

/// Parse a Yes/No label, naming the concrete field on failure.
fn parse_yes_no(field: &'static str, value: &str) -> Result<YesNo, LungsurvError> {
    YesNo::parse_label(value).map_err(|_| LungsurvError::InvalidCategory {
        field,
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_raw() -> RawPatientInput {
        RawPatientInput {
            age: 60,
            gender: "Male".into(),
            country: "India".into(),
            cancer_stage: "Stage I".into(),
            family_history: "No".into(),
            smoking_status: "Never Smoked".into(),
            bmi: 22.0,
            cholesterol: 200,
            hypertension: "No".into(),
            asthma: "No".into(),
            cirrhosis: "No".into(),
            other_cancer: "No".into(),
            treatment_type: "Surgery".into(),
        }
    }

    #[test]
    fn test_codes_match_training_maps() {
        assert_eq!(Gender::Male.code(), 1);
        assert_eq!(Gender::Female.code(), 0);
        assert_eq!(
            Country::ALL.iter().map(|c| c.code()).collect::<Vec<_>>(),
            vec![0, 1, 2, 3]
        );
        assert_eq!(CancerStage::StageIV.code(), 3);
        assert_eq!(YesNo::Yes.code(), 1);
        assert_eq!(YesNo::No.code(), 0);
        assert_eq!(SmokingStatus::PassiveSmoker.code(), 3);
        assert_eq!(TreatmentType::Chemotherapy.code(), 1);
        assert_eq!(TreatmentType::Combined.code(), 3);
    }

    #[test]
    fn test_labels_round_trip_through_from_str() {
        for stage in CancerStage::ALL {
            let parsed: CancerStage = stage.label().parse().expect("Should parse");
            assert_eq!(parsed, *stage);
        }
        for smoking in SmokingStatus::ALL {
            let parsed: SmokingStatus = smoking.to_string().parse().expect("Should parse");
            assert_eq!(parsed, *smoking);
        }
    }

    #[test]
    fn test_unknown_label_is_invalid_category() {
        let err = "Stage V".parse::<CancerStage>().expect_err("must fail");
        match err {
            LungsurvError::InvalidCategory { field, value } => {
                assert_eq!(field, "Cancer Stage");
                assert_eq!(value, "Stage V");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_cycling_wraps() {
        assert_eq!(Country::Other.next(), Country::India);
        assert_eq!(Country::India.prev(), Country::Other);
        assert_eq!(YesNo::Yes.next(), YesNo::No);
    }

    #[test]
    fn test_from_labels() {
        let attrs = PatientAttributes::from_labels(&sample_raw()).expect("Should parse");
        assert_eq!(attrs.gender, Gender::Male);
        assert_eq!(attrs.family_history, YesNo::No);
        assert_eq!(attrs.treatment_type, TreatmentType::Surgery);
    }

    #[test]
    fn test_from_labels_names_yes_no_field() {
        let mut raw = sample_raw();
        raw.cirrhosis = "Maybe".into();
        let err = PatientAttributes::from_labels(&raw).expect_err("must fail");
        assert!(err.to_string().contains("Cirrhosis"));
    }

    #[test]
    fn test_serde_uses_labels() {
        let json = serde_json::to_string(&SmokingStatus::FormerSmoker).expect("serialize");
        assert_eq!(json, "\"Former Smoker\"");
        let back: Country = serde_json::from_str("\"UK\"").expect("deserialize");
        assert_eq!(back, Country::Uk);
        assert!(serde_json::from_str::<Country>("\"France\"").is_err());
    }

    #[test]
    fn test_default_matches_form() {
        let attrs = PatientAttributes::default();
        assert_eq!(attrs.age, 60);
        assert!((attrs.bmi - 22.0).abs() < f64::EPSILON);
        assert_eq!(attrs.cholesterol, 200);
        assert!(AGE_RANGE.contains(&attrs.age));
        assert!(BMI_RANGE.contains(&attrs.bmi));
        assert!(CHOLESTEROL_RANGE.contains(&attrs.cholesterol));

        // Selects start on their first option
        assert_eq!(attrs.family_history, YesNo::Yes);
        assert_eq!(attrs.hypertension, YesNo::Yes);
        assert_eq!(attrs.asthma, YesNo::Yes);
        assert_eq!(attrs.cirrhosis, YesNo::Yes);
        assert_eq!(attrs.other_cancer, YesNo::Yes);
        assert_eq!(attrs.gender, Gender::Male);
        assert_eq!(attrs.treatment_type, TreatmentType::Surgery);
    }
}
