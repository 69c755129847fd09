//! # Payment Tiers
//!
//! Fixed-price tiers gated by the paywall.
//! Tiers are loaded from `config/tiers.toml`, falling back to the built-in set.

use crate::error::{PaywallError, PaywallResult};
use crate::network::{Network, USDC_DECIMALS};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// PAYX tokens granted per whole USDC paid
pub const TOKENS_PER_USDC: u64 = 5_000;

/// Route prefix shared by every gated tier
pub const PAYMENT_ROUTE_PREFIX: &str = "/payment/";

const ATOMIC_PER_USDC: u64 = 10_u64.pow(USDC_DECIMALS);

/// A USD price held in USDC atomic units (10^-6 USDC).
///
/// Parsed from decimal strings such as `"$1"` or `"0.01"` without
/// going through floating point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Price {
    atomic: u64,
}

impl Price {
    /// Create a price from atomic units
    pub fn from_atomic(atomic: u64) -> Self {
        Self { atomic }
    }

    /// Create a price from whole USDC
    pub fn from_usdc(whole: u64) -> Self {
        Self {
            atomic: whole.saturating_mul(ATOMIC_PER_USDC),
        }
    }

    /// Amount in atomic units
    pub fn atomic(&self) -> u64 {
        self.atomic
    }

    /// Decimal USDC amount without trailing zeros (e.g. "1", "0.01")
    pub fn decimal(&self) -> String {
        let whole = self.atomic / ATOMIC_PER_USDC;
        let frac = self.atomic % ATOMIC_PER_USDC;
        if frac == 0 {
            return whole.to_string();
        }
        let frac = format!("{:0width$}", frac, width = USDC_DECIMALS as usize);
        format!("{}.{}", whole, frac.trim_end_matches('0'))
    }

    /// Format for display (e.g. "$0.01")
    pub fn display(&self) -> String {
        format!("${}", self.decimal())
    }

    /// Tokens owed at `rate` tokens per whole USDC, or `None` when the
    /// product is not a whole number of tokens.
    pub fn tokens_at_rate(&self, rate: u64) -> Option<u64> {
        let scaled = (self.atomic as u128) * (rate as u128);
        let per = ATOMIC_PER_USDC as u128;
        if scaled % per != 0 {
            return None;
        }
        u64::try_from(scaled / per).ok()
    }
}

impl FromStr for Price {
    type Err = PaywallError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |message: &str| PaywallError::InvalidPrice {
            message: format!("{} ({:?})", message, s),
        };

        let trimmed = s.trim();
        let digits = trimmed.strip_prefix('$').unwrap_or(trimmed).trim();
        if digits.is_empty() {
            return Err(invalid("empty price"));
        }
        if digits.starts_with('-') {
            return Err(invalid("price must not be negative"));
        }

        let (whole, frac) = match digits.split_once('.') {
            Some((w, f)) => (w, f),
            None => (digits, ""),
        };
        if whole.is_empty() && frac.is_empty() {
            return Err(invalid("no digits"));
        }
        if !whole.chars().all(|c| c.is_ascii_digit()) || !frac.chars().all(|c| c.is_ascii_digit())
        {
            return Err(invalid("not a decimal number"));
        }
        if frac.len() > USDC_DECIMALS as usize {
            return Err(invalid("more than 6 fractional digits"));
        }

        let whole: u64 = if whole.is_empty() {
            0
        } else {
            whole.parse().map_err(|_| invalid("amount too large"))?
        };
        let frac_atomic: u64 = if frac.is_empty() {
            0
        } else {
            let padded = format!("{:0<width$}", frac, width = USDC_DECIMALS as usize);
            padded.parse().map_err(|_| invalid("not a decimal number"))?
        };

        whole
            .checked_mul(ATOMIC_PER_USDC)
            .and_then(|w| w.checked_add(frac_atomic))
            .map(Price::from_atomic)
            .ok_or_else(|| invalid("amount too large"))
    }
}

impl TryFrom<String> for Price {
    type Error = PaywallError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Price> for String {
    fn from(price: Price) -> Self {
        price.display()
    }
}

impl std::fmt::Display for Price {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.display())
    }
}

/// Format an integer with thousands separators ("500000" -> "500,000")
pub fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// A gated payment tier
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentTier {
    /// Tier identifier, also the last route segment (e.g. "5usdc")
    pub id: String,

    /// Price in USD, paid in USDC
    pub price: Price,

    /// PAYX tokens promised for this tier
    pub tokens: u64,

    /// Network override; the server's configured network applies otherwise
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network: Option<Network>,

    /// Text shown by wallets and paywalls
    #[serde(default)]
    pub description: String,

    /// Promotional tiers are exempt from the standard token rate
    #[serde(default)]
    pub promotional: bool,

    /// Whether this tier is served
    #[serde(default = "default_true")]
    pub active: bool,
}

fn default_true() -> bool {
    true
}

impl PaymentTier {
    /// Create a tier paying the standard rate
    pub fn standard(id: impl Into<String>, price: Price) -> Self {
        let tokens = price.tokens_at_rate(TOKENS_PER_USDC).unwrap_or(0);
        Self {
            id: id.into(),
            price,
            tokens,
            network: None,
            description: String::new(),
            promotional: false,
            active: true,
        }
    }

    /// Create a promotional tier with an explicit token amount
    pub fn promotional(id: impl Into<String>, price: Price, tokens: u64) -> Self {
        Self {
            tokens,
            promotional: true,
            ..Self::standard(id, price)
        }
    }

    /// Builder: set description
    pub fn with_description(mut self, desc: impl Into<String>) -> Self {
        self.description = desc.into();
        self
    }

    /// Gated route for this tier
    pub fn route(&self) -> String {
        format!("{}{}", PAYMENT_ROUTE_PREFIX, self.id)
    }

    /// Network this tier charges on
    pub fn network_or(&self, default: Network) -> Network {
        self.network.unwrap_or(default)
    }

    /// "5 USDC"
    pub fn amount_label(&self) -> String {
        format!("{} USDC", self.price.decimal())
    }

    /// "25,000 PAYX"
    pub fn tokens_label(&self) -> String {
        format!("{} PAYX", group_thousands(self.tokens))
    }

    /// Configured description, or the standard one
    pub fn description(&self) -> String {
        if self.description.is_empty() {
            format!(
                "Pay {} → Get {} tokens",
                self.amount_label(),
                self.tokens_label()
            )
        } else {
            self.description.clone()
        }
    }

    /// Whether the token amount matches `price × TOKENS_PER_USDC`
    pub fn follows_standard_rate(&self) -> bool {
        self.price.tokens_at_rate(TOKENS_PER_USDC) == Some(self.tokens)
    }
}

/// Tier catalog (loaded from config)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TierCatalog {
    #[serde(default)]
    pub tiers: Vec<PaymentTier>,
}

impl TierCatalog {
    /// Create an empty catalog
    pub fn new() -> Self {
        Self { tiers: Vec::new() }
    }

    /// The tiers the service ships with
    pub fn builtin() -> Self {
        let mut catalog = Self::new();
        catalog.add(PaymentTier::promotional(
            "test",
            Price::from_atomic(10_000),
            50,
        ));
        for whole in [1, 5, 10, 100] {
            catalog.add(PaymentTier::standard(
                format!("{}usdc", whole),
                Price::from_usdc(whole),
            ));
        }
        catalog
    }

    /// Add a tier to the catalog
    pub fn add(&mut self, tier: PaymentTier) {
        self.tiers.push(tier);
    }

    /// Find an active tier by ID
    pub fn get(&self, id: &str) -> Option<&PaymentTier> {
        self.tiers.iter().find(|t| t.id == id && t.active)
    }

    /// Find an active tier by request path (e.g. "/payment/5usdc")
    pub fn by_route(&self, path: &str) -> Option<&PaymentTier> {
        path.strip_prefix(PAYMENT_ROUTE_PREFIX)
            .map(|id| id.trim_end_matches('/'))
            .and_then(|id| self.get(id))
    }

    /// Get all active tiers
    pub fn active_tiers(&self) -> impl Iterator<Item = &PaymentTier> {
        self.tiers.iter().filter(|t| t.active)
    }

    /// Check ids are unique, well-formed and priced, and that non-promotional
    /// tiers pay the standard token rate.
    pub fn validate(&self) -> PaywallResult<()> {
        let mut seen = std::collections::HashSet::new();
        for tier in &self.tiers {
            if tier.id.is_empty()
                || !tier
                    .id
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
            {
                return Err(PaywallError::Configuration(format!(
                    "invalid tier id: {:?}",
                    tier.id
                )));
            }
            if !seen.insert(tier.id.as_str()) {
                return Err(PaywallError::Configuration(format!(
                    "duplicate tier id: {}",
                    tier.id
                )));
            }
            if tier.price.atomic() == 0 {
                return Err(PaywallError::InvalidPrice {
                    message: format!("tier {} has a zero price", tier.id),
                });
            }
            if !tier.promotional && !tier.follows_standard_rate() {
                return Err(PaywallError::Configuration(format!(
                    "tier {} grants {} PAYX for {}, expected {} PAYX per USDC",
                    tier.id,
                    tier.tokens,
                    tier.price.display(),
                    TOKENS_PER_USDC
                )));
            }
        }
        Ok(())
    }

    /// Load catalog from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(toml_str)
    }
}
