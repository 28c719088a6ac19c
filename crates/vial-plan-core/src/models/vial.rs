//! Catalog vial models.

use serde::{Deserialize, Serialize};

use crate::pricing::PriceField;

/// A single purchasable vial as stored in the catalog.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CatalogVial {
    /// Catalog code - unique identifier
    pub code: String,
    /// Drug this vial belongs to
    pub drug: String,
    /// Strength of one vial in mg
    pub strength_mg: f64,
    /// Whether this vial is the originator brand
    pub original_brand: bool,
    /// Free-text product description (brand, manufacturer, ...)
    #[serde(default)]
    pub description: Option<String>,
    /// Unit prices per market/care-setting column
    #[serde(default)]
    pub prices: VialPrices,
}

/// Unit prices for one vial, one optional column per price field.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct VialPrices {
    pub opd_thai: Option<f64>,
    pub ipd_thai: Option<f64>,
    pub opd_international: Option<f64>,
    pub ipd_international: Option<f64>,
}

impl VialPrices {
    /// Get the price stored under a price field.
    pub fn get(&self, field: PriceField) -> Option<f64> {
        match field {
            PriceField::OpdThai => self.opd_thai,
            PriceField::IpdThai => self.ipd_thai,
            PriceField::OpdInternational => self.opd_international,
            PriceField::IpdInternational => self.ipd_international,
        }
    }

    /// Set the price stored under a price field.
    pub fn set(&mut self, field: PriceField, price: Option<f64>) {
        let slot = match field {
            PriceField::OpdThai => &mut self.opd_thai,
            PriceField::IpdThai => &mut self.ipd_thai,
            PriceField::OpdInternational => &mut self.opd_international,
            PriceField::IpdInternational => &mut self.ipd_international,
        };
        *slot = price;
    }
}

impl CatalogVial {
    /// Create a new catalog vial with no prices.
    pub fn new(code: String, drug: String, strength_mg: f64, original_brand: bool) -> Self {
        Self {
            code,
            drug,
            strength_mg,
            original_brand,
            description: None,
            prices: VialPrices::default(),
        }
    }

    /// Builder-style price setter.
    pub fn with_price(mut self, field: PriceField, price: f64) -> Self {
        self.prices.set(field, Some(price));
        self
    }

    /// Project this row onto a price field.
    ///
    /// Returns `None` when the selected price column is empty for this vial.
    pub fn to_option(&self, field: PriceField) -> Option<VialOption> {
        let price = self.prices.get(field)?;
        Some(VialOption {
            code: self.code.clone(),
            strength_mg: self.strength_mg,
            price,
            original_brand: self.original_brand,
        })
    }
}

/// A vial priced under one price field, as consumed by the optimizer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VialOption {
    /// Catalog code
    pub code: String,
    /// Strength of one vial in mg
    pub strength_mg: f64,
    /// Unit price in currency units
    pub price: f64,
    /// Whether this vial is the originator brand
    pub original_brand: bool,
}

impl VialOption {
    pub fn new(code: impl Into<String>, strength_mg: f64, price: f64, original_brand: bool) -> Self {
        Self {
            code: code.into(),
            strength_mg,
            price,
            original_brand,
        }
    }

    /// Check the optimizer preconditions for this option.
    ///
    /// Strength must be finite and positive, price finite and non-negative.
    pub fn validate(&self) -> Result<(), String> {
        if !self.strength_mg.is_finite() || self.strength_mg <= 0.0 {
            return Err(format!(
                "vial {} has invalid strength {}",
                self.code, self.strength_mg
            ));
        }
        if !self.price.is_finite() || self.price < 0.0 {
            return Err(format!("vial {} has invalid price {}", self.code, self.price));
        }
        Ok(())
    }
}
