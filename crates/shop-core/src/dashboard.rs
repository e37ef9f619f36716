//! # Customer Dashboard Types
//!
//! Shapes returned by the customer and gateway endpoints. Each type is the
//! validate-or-fail boundary for its response: anything that does not decode
//! into it is rejected with [`ApiError::Schema`].

use crate::catalog::Price;
use crate::error::{ApiError, ApiResult};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Decode a response body into `T`, reporting a schema error on mismatch
pub fn parse<T: DeserializeOwned>(value: serde_json::Value) -> ApiResult<T> {
    serde_json::from_value(value).map_err(|e| ApiError::Schema(e.to_string()))
}

/// `{ "data": ... }` wrapper used by several endpoints
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub data: T,
}

/// Number of rows per page for paginated endpoints
pub const PAGE_SIZE: u32 = 10;

/// One page of a paginated list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub list: Vec<T>,
    pub total_count: u64,
}

impl<T> Page<T> {
    pub fn page_count(&self) -> u64 {
        self.total_count.div_ceil(PAGE_SIZE as u64)
    }
}

// =============================================================================
// Gateways
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethod {
    BankCard,
    BankTransfer,
    #[serde(rename = "PAYPAL")]
    PayPal,
    #[serde(rename = "CASHAPP")]
    CashApp,
    Crypto,
    AppleAndGooglePay,
    Custom,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayDetail {
    pub name: String,
    pub display_name: String,
    pub logo_cf_image_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub powered_by_image_cf_image_id: Option<String>,
    pub payment_methods: Vec<PaymentMethod>,
}

// =============================================================================
// Balance
// =============================================================================

/// Raw balance as reported by the customer API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceReport {
    pub currency: String,
    pub manual_balance: f64,
    pub real_balance: f64,
}

impl BalanceReport {
    /// Spendable balance: real plus manually credited funds
    pub fn total(&self) -> Price {
        Price::new(self.real_balance + self.manual_balance, self.currency.clone())
    }
}

/// Bonus credited on top-ups above a threshold
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum TopUpBonus {
    Enabled {
        minimum_top_up_for_bonus: f64,
        bonus_percent: i64,
    },
    Disabled,
}

/// Cashback credited on purchases
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Cashback {
    Enabled { cashback_percent: i64 },
    Disabled,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopUpSettings {
    pub gateways: Vec<String>,
    pub currency: String,
    pub bonus: TopUpBonus,
    pub cashback: Cashback,
}

/// Whether customers may top up their balance, and on which terms
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawBalanceSettings", into = "RawBalanceSettings")]
pub enum BalanceTopUpSettings {
    Disabled,
    Enabled(TopUpSettings),
}

impl BalanceTopUpSettings {
    /// Gateways to fetch details for, if top-ups are enabled
    pub fn gateways(&self) -> &[String] {
        match self {
            BalanceTopUpSettings::Enabled(settings) => &settings.gateways,
            BalanceTopUpSettings::Disabled => &[],
        }
    }
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawBalanceSettings {
    is_enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    top_up_settings: Option<RawTopUpSettings>,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawTopUpSettings {
    gateways: Vec<String>,
    currency: String,
    top_up_bonus_enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    minimum_top_up_for_bonus: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    bonus_percent: Option<i64>,
    cashback_enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    cashback_percent: Option<i64>,
}

impl From<BalanceTopUpSettings> for RawBalanceSettings {
    fn from(settings: BalanceTopUpSettings) -> Self {
        let TopUpSettings {
            gateways,
            currency,
            bonus,
            cashback,
        } = match settings {
            BalanceTopUpSettings::Disabled => {
                return Self {
                    is_enabled: false,
                    top_up_settings: None,
                }
            }
            BalanceTopUpSettings::Enabled(settings) => settings,
        };

        let (minimum_top_up_for_bonus, bonus_percent) = match bonus {
            TopUpBonus::Enabled {
                minimum_top_up_for_bonus,
                bonus_percent,
            } => (Some(minimum_top_up_for_bonus), Some(bonus_percent)),
            TopUpBonus::Disabled => (None, None),
        };
        let cashback_percent = match cashback {
            Cashback::Enabled { cashback_percent } => Some(cashback_percent),
            Cashback::Disabled => None,
        };

        Self {
            is_enabled: true,
            top_up_settings: Some(RawTopUpSettings {
                gateways,
                currency,
                top_up_bonus_enabled: minimum_top_up_for_bonus.is_some(),
                minimum_top_up_for_bonus,
                bonus_percent,
                cashback_enabled: cashback_percent.is_some(),
                cashback_percent,
            }),
        }
    }
}

impl TryFrom<RawBalanceSettings> for BalanceTopUpSettings {
    type Error = String;

    fn try_from(raw: RawBalanceSettings) -> Result<Self, Self::Error> {
        if !raw.is_enabled {
            return Ok(BalanceTopUpSettings::Disabled);
        }

        let settings = raw
            .top_up_settings
            .ok_or("topUpSettings is required when isEnabled is true")?;

        let bonus = match (
            settings.top_up_bonus_enabled,
            settings.minimum_top_up_for_bonus,
            settings.bonus_percent,
        ) {
            (false, _, _) => TopUpBonus::Disabled,
            (true, Some(minimum_top_up_for_bonus), Some(bonus_percent)) => TopUpBonus::Enabled {
                minimum_top_up_for_bonus,
                bonus_percent,
            },
            (true, _, _) => {
                return Err(
                    "minimumTopUpForBonus and bonusPercent are required when topUpBonusEnabled is true"
                        .to_string(),
                )
            }
        };

        let cashback = match (settings.cashback_enabled, settings.cashback_percent) {
            (false, _) => Cashback::Disabled,
            (true, Some(cashback_percent)) => Cashback::Enabled { cashback_percent },
            (true, None) => {
                return Err("cashbackPercent is required when cashbackEnabled is true".to_string())
            }
        };

        Ok(BalanceTopUpSettings::Enabled(TopUpSettings {
            gateways: settings.gateways,
            currency: settings.currency,
            bonus,
            cashback,
        }))
    }
}

/// Body of a balance top-up request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopUpRequest {
    pub customer_email: String,
    pub price: Price,
    pub gateway: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopUpCharge {
    pub charge_id: String,
}

// =============================================================================
// Transactions & orders
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionStatus {
    Added,
    Removed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: Uuid,
    pub price: Price,
    pub created_at: DateTime<Utc>,
    pub description: String,
    pub status: TransactionStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    New,
    Pending,
    Completed,
    Cancelled,
    Expired,
    FullDeliveryFailure,
    PartiallyDelivered,
    Refunded,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OrderReview {
    pub rating: u8,
}

/// Row of the customer's order history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderSummary {
    pub id: String,
    pub status: OrderStatus,
    pub price: Price,
    pub gateway_name: String,
    pub time: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub review: Option<OrderReview>,
}

// =============================================================================
// Customer profile & referrals
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashInfo {
    pub email: String,
    /// Fields the checkout core does not interpret
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferralInfo {
    pub referral_code: String,
    pub total_referrals: u64,
    pub total_revenue_usd: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Referral {
    pub is_available: bool,
    pub is_activated: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub earn_percent: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub info: Option<ReferralInfo>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferralCode {
    pub referral_code: String,
}

// =============================================================================
// Store metadata
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetadataParams {
    pub product_path: String,
}

/// Body of the store `get-metadata` call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetadataRequest {
    pub route_name: String,
    pub params: MetadataParams,
}
