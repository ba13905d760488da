use serde::{Deserialize, Serialize};

use super::ModelError;

/// Macro to generate enum with as_str + std::str::FromStr pattern
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $s)] $variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = ModelError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(ModelError::InvalidEnum {
                        field: stringify!($name).into(),
                        value: s.into(),
                    }),
                }
            }
        }
    };
}

str_enum!(TestType {
    Fasting => "fasting",
    Postprandial => "postprandial",
    Random => "random",
});

str_enum!(GlucoseStatus {
    Normal => "normal",
    Prediabetic => "prediabetic",
    Diabetic => "diabetic",
    Error => "error",
});

str_enum!(DiabetesRisk {
    Low => "low",
    Moderate => "moderate",
    High => "high",
    Unknown => "unknown",
});

impl TestType {
    /// Lenient mapping used at the form boundary: anything that is not an
    /// explicit fasting or post-meal reading is treated as random.
    pub fn from_loose(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "fasting" => Self::Fasting,
            "postprandial" | "post-meal" | "post_meal" => Self::Postprandial,
            _ => Self::Random,
        }
    }
}

impl Default for TestType {
    fn default() -> Self {
        Self::Random
    }
}
