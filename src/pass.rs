use serde::{Deserialize, Serialize};

/// Subscription pass as offered by the pricing service.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PassOption {
    #[serde(rename = "numDays")]
    pub num_days: u32,
    #[serde(rename = "priceSATS")]
    pub price_sats: u64,
    #[serde(rename = "priceUSD", default, skip_serializing_if = "Option::is_none")]
    pub price_usd: Option<f64>,
}

impl PassOption {
    /// Cheapest of `options`, the price subscriptions start at.
    pub fn starting_at(options: &[PassOption]) -> Option<&PassOption> {
        options.iter().min_by_key(|o| o.price_sats)
    }
}
