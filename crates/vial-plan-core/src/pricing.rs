//! Price-field selection.
//!
//! The catalog stores one price column per (market, care setting) pair. The
//! mapping is total over the four legal pairs; anything else is rejected.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Price selection errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PricingError {
    #[error("Invalid price selector: market={market:?}, setting={setting:?}")]
    InvalidPriceSelector { market: String, setting: String },

    #[error("Unknown market category: {0:?}")]
    UnknownMarket(String),

    #[error("Unknown care setting: {0:?}")]
    UnknownCareSetting(String),
}

pub type PricingResult<T> = Result<T, PricingError>;

/// Patient market category (nationality).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum MarketCategory {
    Thai,
    International,
}

/// Care setting the dose is administered in.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum CareSetting {
    /// OPD
    Outpatient,
    /// IPD
    Inpatient,
}

/// Catalog price column.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum PriceField {
    OpdThai,
    IpdThai,
    OpdInternational,
    IpdInternational,
}

impl MarketCategory {
    pub fn label(&self) -> &'static str {
        match self {
            MarketCategory::Thai => "Thai",
            MarketCategory::International => "International",
        }
    }
}

impl CareSetting {
    pub fn label(&self) -> &'static str {
        match self {
            CareSetting::Outpatient => "OPD",
            CareSetting::Inpatient => "IPD",
        }
    }
}

impl PriceField {
    /// Market this column prices for.
    pub fn market(&self) -> MarketCategory {
        match self {
            PriceField::OpdThai | PriceField::IpdThai => MarketCategory::Thai,
            PriceField::OpdInternational | PriceField::IpdInternational => {
                MarketCategory::International
            }
        }
    }

    /// Care setting this column prices for.
    pub fn care_setting(&self) -> CareSetting {
        match self {
            PriceField::OpdThai | PriceField::OpdInternational => CareSetting::Outpatient,
            PriceField::IpdThai | PriceField::IpdInternational => CareSetting::Inpatient,
        }
    }

    /// Column name as used by the catalog spreadsheet export.
    pub fn column_name(&self) -> &'static str {
        match self {
            PriceField::OpdThai => "OPD_Thai_Price",
            PriceField::IpdThai => "IPD_Thai_Price",
            PriceField::OpdInternational => "OPD_Inter_Price",
            PriceField::IpdInternational => "IPD_Inter_Price",
        }
    }
}

impl fmt::Display for PriceField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column_name())
    }
}

impl FromStr for MarketCategory {
    type Err = PricingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "thai" | "domestic" => Ok(MarketCategory::Thai),
            "international" | "inter" | "foreign" => Ok(MarketCategory::International),
            _ => Err(PricingError::UnknownMarket(s.to_string())),
        }
    }
}

impl FromStr for CareSetting {
    type Err = PricingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "opd" | "outpatient" => Ok(CareSetting::Outpatient),
            "ipd" | "inpatient" => Ok(CareSetting::Inpatient),
            _ => Err(PricingError::UnknownCareSetting(s.to_string())),
        }
    }
}

/// Map a (market, care setting) pair to the price column to use.
pub fn select_price_field(market: MarketCategory, setting: CareSetting) -> PriceField {
    match (market, setting) {
        (MarketCategory::Thai, CareSetting::Outpatient) => PriceField::OpdThai,
        (MarketCategory::Thai, CareSetting::Inpatient) => PriceField::IpdThai,
        (MarketCategory::International, CareSetting::Outpatient) => PriceField::OpdInternational,
        (MarketCategory::International, CareSetting::Inpatient) => PriceField::IpdInternational,
    }
}

/// Select a price column from user-facing labels.
///
/// Fails with [`PricingError::InvalidPriceSelector`] unless both labels
/// name a known category.
pub fn select_price_field_by_name(market: &str, setting: &str) -> PricingResult<PriceField> {
    let invalid = || PricingError::InvalidPriceSelector {
        market: market.to_string(),
        setting: setting.to_string(),
    };
    let market_category = market.parse::<MarketCategory>().map_err(|_| invalid())?;
    let care_setting = setting.parse::<CareSetting>().map_err(|_| invalid())?;
    Ok(select_price_field(market_category, care_setting))
}
