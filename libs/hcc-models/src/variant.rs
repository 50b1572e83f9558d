//! Model variant identifiers
//!
//! CMS publishes several HCC model families; each variant selects which
//! reference tables load and which interaction rules run. The set is closed:
//! behavior is chosen at load time from the tag, never patched at runtime.

use crate::error::Error;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The closed set of supported CMS risk adjustment model variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ModelVariant {
    /// CMS-HCC Model V22 (payment years through 2021, still published)
    V22,
    /// CMS-HCC Model V24
    V24,
    /// CMS-HCC Model V28
    V28,
    /// CMS-HCC ESRD Model V21 (dialysis / transplant populations)
    EsrdV21,
    /// CMS-HCC ESRD Model V24
    EsrdV24,
    /// RxHCC Model V08 (Part D drug cost)
    RxHccV08,
}

impl ModelVariant {
    /// Every supported variant, in table order.
    pub const ALL: [ModelVariant; 6] = [
        ModelVariant::V22,
        ModelVariant::V24,
        ModelVariant::V28,
        ModelVariant::EsrdV21,
        ModelVariant::EsrdV24,
        ModelVariant::RxHccV08,
    ];

    /// Canonical model name, used as the `model_name` key in reference CSVs.
    pub fn label(&self) -> &'static str {
        match self {
            ModelVariant::V22 => "CMS-HCC Model V22",
            ModelVariant::V24 => "CMS-HCC Model V24",
            ModelVariant::V28 => "CMS-HCC Model V28",
            ModelVariant::EsrdV21 => "CMS-HCC ESRD Model V21",
            ModelVariant::EsrdV24 => "CMS-HCC ESRD Model V24",
            ModelVariant::RxHccV08 => "RxHCC Model V08",
        }
    }

    /// File stem for per-variant reference tables
    /// (e.g. `ra_hierarchies_v28.csv`).
    pub fn table_stem(&self) -> &'static str {
        match self {
            ModelVariant::V22 => "v22",
            ModelVariant::V24 => "v24",
            ModelVariant::V28 => "v28",
            ModelVariant::EsrdV21 => "esrd_v21",
            ModelVariant::EsrdV24 => "esrd_v24",
            ModelVariant::RxHccV08 => "rxhcc_v08",
        }
    }

    /// ESRD variants use dialysis / post-graft segments and require the
    /// beneficiary ESRD flag.
    pub fn is_esrd(&self) -> bool {
        matches!(self, ModelVariant::EsrdV21 | ModelVariant::EsrdV24)
    }

    /// RxHCC variants score Part D drug cost rather than Part C medical cost.
    pub fn is_rx(&self) -> bool {
        matches!(self, ModelVariant::RxHccV08)
    }
}

impl fmt::Display for ModelVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ModelVariant {
    type Err = Error;

    /// Accepts the canonical label (`"CMS-HCC Model V28"`) or the short tag
    /// (`"V28"`, `"ESRD_V21"`, case-insensitive).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        for variant in ModelVariant::ALL {
            if s == variant.label() {
                return Ok(variant);
            }
        }
        match s.to_ascii_uppercase().as_str() {
            "V22" => Ok(ModelVariant::V22),
            "V24" => Ok(ModelVariant::V24),
            "V28" => Ok(ModelVariant::V28),
            "ESRD_V21" | "ESRDV21" => Ok(ModelVariant::EsrdV21),
            "ESRD_V24" | "ESRDV24" => Ok(ModelVariant::EsrdV24),
            "RXHCC_V08" | "RXHCCV08" => Ok(ModelVariant::RxHccV08),
            _ => Err(Error::UnknownModel(s.to_string())),
        }
    }
}
