use std::env;

use log::*;
use provider_tools::ProviderConfig;
use settlement_engine::fees::{CommissionPolicy, CommissionTier};
use sps_common::Money;

const DEFAULT_SPS_HOST: &str = "127.0.0.1";
const DEFAULT_SPS_PORT: u16 = 8360;

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    /// The fee policy applied to every checkout. Loaded once at startup; fee figures sent by clients are ignored.
    pub commission_policy: CommissionPolicy,
    /// The merchant identity embedded in every generated Pix payload.
    pub merchant: MerchantConfig,
    pub provider: ProviderConfig,
}

#[derive(Clone, Debug, Default)]
pub struct MerchantConfig {
    pub pix_key: String,
    pub name: String,
    pub city: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_SPS_HOST.to_string(),
            port: DEFAULT_SPS_PORT,
            database_url: String::default(),
            commission_policy: default_commission_policy(),
            merchant: MerchantConfig::default(),
            provider: ProviderConfig::default(),
        }
    }
}

/// No commission, free delivery, no minimum. Only suitable for local development.
fn default_commission_policy() -> CommissionPolicy {
    CommissionPolicy::fixed(Money::from_cents(0), Money::from_cents(0), Money::from_cents(0))
}

impl ServerConfig {
    pub fn new(host: &str, port: u16) -> Self {
        Self { host: host.to_string(), port, ..Default::default() }
    }

    pub fn from_env_or_default() -> Self {
        let host = env::var("SPS_HOST").ok().unwrap_or_else(|| DEFAULT_SPS_HOST.into());
        let port = env::var("SPS_PORT")
            .map(|s| {
                s.parse::<u16>().unwrap_or_else(|e| {
                    error!(
                        "🪛️ {s} is not a valid port for SPS_PORT. {e} Using the default, {DEFAULT_SPS_PORT}, instead."
                    );
                    DEFAULT_SPS_PORT
                })
            })
            .ok()
            .unwrap_or(DEFAULT_SPS_PORT);
        let database_url = env::var("SPS_DATABASE_URL").unwrap_or_else(|_| {
            warn!("🪛️ SPS_DATABASE_URL is not set. Using the default sqlite database.");
            "sqlite://data/settlement.db".to_string()
        });
        let commission_policy = commission_policy_from_env();
        let merchant = MerchantConfig {
            pix_key: env::var("SPS_PIX_KEY").unwrap_or_else(|_| {
                warn!("🪛️ SPS_PIX_KEY not set. Generated Pix payloads will be rejected.");
                String::default()
            }),
            name: env::var("SPS_MERCHANT_NAME").unwrap_or_default(),
            city: env::var("SPS_MERCHANT_CITY").unwrap_or_default(),
        };
        let provider = ProviderConfig::new_from_env_or_default();
        Self { host, port, database_url, commission_policy, merchant, provider }
    }
}

/// Builds the commission policy from `SPS_COMMISSION_MODE` and friends. All monetary values are given in reais,
/// e.g. `SPS_COMMISSION_TIERS="50:10,100:8"` reads as "10% up to R$50, 8% up to R$100".
fn commission_policy_from_env() -> CommissionPolicy {
    let delivery_fee = money_from_env("SPS_DELIVERY_FEE");
    let min_order_value = money_from_env("SPS_MIN_ORDER_VALUE");
    let mode = env::var("SPS_COMMISSION_MODE").unwrap_or_else(|_| "tiers".to_string());
    match mode.to_lowercase().as_str() {
        "fixed" => {
            let fee = money_from_env("SPS_FIXED_COMMISSION");
            CommissionPolicy::fixed(fee, delivery_fee, min_order_value)
        },
        "tiers" => match parse_tiers(env::var("SPS_COMMISSION_TIERS").unwrap_or_default().as_str()) {
            Some(tiers) => CommissionPolicy::tiered(tiers, delivery_fee, min_order_value).unwrap_or_else(|e| {
                error!("🪛️ SPS_COMMISSION_TIERS is not a valid tier table. {e}. Using a zero fixed commission.");
                CommissionPolicy::fixed(Money::from_cents(0), delivery_fee, min_order_value)
            }),
            None => {
                warn!("🪛️ SPS_COMMISSION_TIERS is not set or malformed. Using a zero fixed commission.");
                CommissionPolicy::fixed(Money::from_cents(0), delivery_fee, min_order_value)
            },
        },
        other => {
            error!("🪛️ {other} is not a valid SPS_COMMISSION_MODE. Using a zero fixed commission.");
            CommissionPolicy::fixed(Money::from_cents(0), delivery_fee, min_order_value)
        },
    }
}

fn money_from_env(var: &str) -> Money {
    env::var(var)
        .ok()
        .and_then(|v| v.parse::<f64>().ok())
        .and_then(|v| Money::try_from_reais(v).ok())
        .unwrap_or_else(|| Money::from_cents(0))
}

/// Parses a `max_reais:percent` comma-separated tier table. Returns `None` when any entry fails to parse.
fn parse_tiers(src: &str) -> Option<Vec<CommissionTier>> {
    if src.trim().is_empty() {
        return None;
    }
    src.split(',')
        .map(|entry| {
            let (max, percent) = entry.split_once(':')?;
            let max_subtotal = Money::try_from_reais(max.trim().parse::<f64>().ok()?).ok()?;
            let percent = percent.trim().parse::<f64>().ok()?;
            Some(CommissionTier { max_subtotal, percent })
        })
        .collect()
}

#[cfg(test)]
mod test {
    use sps_common::Money;

    use super::parse_tiers;

    #[test]
    fn tier_tables_parse() {
        let tiers = parse_tiers("50:10, 100:8").unwrap();
        assert_eq!(tiers.len(), 2);
        assert_eq!(tiers[0].max_subtotal, Money::from_cents(5000));
        assert_eq!(tiers[0].percent, 10.0);
        assert_eq!(tiers[1].max_subtotal, Money::from_cents(10000));
        assert_eq!(tiers[1].percent, 8.0);
    }

    #[test]
    fn malformed_tier_tables_are_rejected() {
        assert!(parse_tiers("").is_none());
        assert!(parse_tiers("50").is_none());
        assert!(parse_tiers("50:ten").is_none());
        assert!(parse_tiers("50:10,nope").is_none());
    }
}
