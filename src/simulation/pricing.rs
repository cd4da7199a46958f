//! Time-of-use grid tariff.
//!
//! A single partition of the day drives both the price and its label:
//! peak 16:00-20:59, standard 09:00-15:59, off-peak otherwise.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum PriceTier {
    OffPeak,
    Standard,
    Peak,
}

impl PriceTier {
    pub fn for_hour(hour: u32) -> Self {
        match hour % 24 {
            16..=20 => PriceTier::Peak,
            9..=15 => PriceTier::Standard,
            _ => PriceTier::OffPeak,
        }
    }
}

/// Tier prices in $/kWh
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TariffConfig {
    pub off_peak: f64,
    pub standard: f64,
    pub peak: f64,
}

impl Default for TariffConfig {
    fn default() -> Self {
        Self {
            off_peak: 0.12,
            standard: 0.15,
            peak: 0.25,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct PricingModel {
    tariff: TariffConfig,
}

impl PricingModel {
    pub fn new(tariff: TariffConfig) -> Self {
        Self { tariff }
    }

    pub fn tier(&self, hour: u32) -> PriceTier {
        PriceTier::for_hour(hour)
    }

    pub fn price_for_tier(&self, tier: PriceTier) -> f64 {
        match tier {
            PriceTier::OffPeak => self.tariff.off_peak,
            PriceTier::Standard => self.tariff.standard,
            PriceTier::Peak => self.tariff.peak,
        }
    }

    /// Grid price in $/kWh for an hour of day
    pub fn price(&self, hour: u32) -> f64 {
        self.price_for_tier(self.tier(hour))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;

    #[rstest]
    #[case(0, PriceTier::OffPeak, 0.12)]
    #[case(8, PriceTier::OffPeak, 0.12)]
    #[case(9, PriceTier::Standard, 0.15)]
    #[case(15, PriceTier::Standard, 0.15)]
    #[case(16, PriceTier::Peak, 0.25)]
    #[case(19, PriceTier::Peak, 0.25)]
    #[case(20, PriceTier::Peak, 0.25)]
    #[case(21, PriceTier::OffPeak, 0.12)]
    #[case(23, PriceTier::OffPeak, 0.12)]
    fn tariff_bands(#[case] hour: u32, #[case] tier: PriceTier, #[case] price: f64) {
        let model = PricingModel::default();
        assert_eq!(model.tier(hour), tier);
        assert_eq!(model.price(hour), price);
    }

    #[test]
    fn tier_labels() {
        assert_eq!(PriceTier::OffPeak.to_string(), "off-peak");
        assert_eq!(PriceTier::Standard.as_ref(), "standard");
        assert_eq!("peak".parse::<PriceTier>().unwrap(), PriceTier::Peak);
    }

    proptest! {
        #[test]
        fn price_is_one_of_the_tiers(hour in 0u32..24) {
            let price = PricingModel::default().price(hour);
            prop_assert!([0.12, 0.15, 0.25].contains(&price));
        }
    }
}
