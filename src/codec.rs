//! Categorical label codec.
//!
//! The classifier works on integer codes; clients and responses use the
//! human-readable labels. Each domain (soil, crop, fertilizer) is a closed
//! enum whose discriminant *is* the code the classifier was trained with, so
//! the label/code mapping is a fixed bijection by construction.
//!
//! Unrecognized labels encode to `None` and unrecognized codes decode to
//! [`FertilizerPrediction::Unknown`]. Neither path panics or clamps to a
//! default value.

use serde::{Serialize, Serializer};

// ---

/// Declare a closed categorical domain with a label for every variant.
///
/// Variants are listed in code order starting at zero.
macro_rules! categorical {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $label:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            /// Every variant, in code order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Human-readable label.
            pub fn label(self) -> &'static str {
                match self {
                    $($name::$variant => $label),+
                }
            }

            /// Integer code expected (or returned) by the classifier.
            pub fn code(self) -> u8 {
                self as u8
            }

            /// Exact, case-sensitive label lookup.
            pub fn from_label(label: &str) -> Option<Self> {
                Self::ALL.iter().copied().find(|v| v.label() == label)
            }

            /// Code lookup; anything outside the enumeration is `None`.
            pub fn from_code(code: i64) -> Option<Self> {
                usize::try_from(code)
                    .ok()
                    .and_then(|idx| Self::ALL.get(idx))
                    .copied()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.label())
            }
        }
    };
}

categorical!(
    /// Soil classes known to the classifier.
    SoilType {
        Sandy => "Sandy",
        Loamy => "Loamy",
        Clayey => "Clayey",
        Peaty => "Peaty",
        Saline => "Saline",
        Chalky => "Chalky",
        Silty => "Silty",
    }
);

categorical!(
    /// Crop classes known to the classifier.
    CropType {
        Wheat => "Wheat",
        Rice => "Rice",
        Maize => "Maize",
        Barley => "Barley",
        Sugarcane => "Sugarcane",
        Cotton => "Cotton",
        Vegetables => "Vegetables",
    }
);

categorical!(
    /// Fertilizer classes the classifier can predict.
    #[allow(non_camel_case_types)]
    FertilizerType {
        F10_26_26 => "10-26-26",
        F14_35_14 => "14-35-14",
        F17_17_17 => "17-17-17",
        F20_20 => "20-20",
        F28_28 => "28-28",
        Dap => "DAP",
        Urea => "Urea",
    }
);

/// Label rendered for a predicted code outside [`FertilizerType`].
pub const UNKNOWN_LABEL: &str = "Unknown";

/// A decoded classifier output.
///
/// `Unknown` is a normal outcome (a stale or mismatched artifact), not an
/// error; it is rendered to clients as [`UNKNOWN_LABEL`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FertilizerPrediction {
    Known(FertilizerType),
    Unknown,
}

impl FertilizerPrediction {
    pub fn label(self) -> &'static str {
        match self {
            FertilizerPrediction::Known(f) => f.label(),
            FertilizerPrediction::Unknown => UNKNOWN_LABEL,
        }
    }
}

impl Serialize for FertilizerPrediction {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

// ---

/// Encode a soil label to its classifier code.
pub fn encode_soil(label: &str) -> Option<u8> {
    SoilType::from_label(label).map(SoilType::code)
}

/// Encode a crop label to its classifier code.
pub fn encode_crop(label: &str) -> Option<u8> {
    CropType::from_label(label).map(CropType::code)
}

/// Decode a classifier output code to a fertilizer label.
pub fn decode_fertilizer(code: i64) -> FertilizerPrediction {
    match FertilizerType::from_code(code) {
        Some(f) => FertilizerPrediction::Known(f),
        None => FertilizerPrediction::Unknown,
    }
}
