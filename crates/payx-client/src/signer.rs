//! # Local Signer
//!
//! `WalletSigner` holding a private key in process. Signs the EIP-3009
//! authorization an `exact` requirement asks for.

use alloy_primitives::B256;
use alloy_signer::Signer;
use alloy_signer_local::PrivateKeySigner;
use async_trait::async_trait;
use payx_core::{
    protocol::EXACT_SCHEME, token_domain, ExactEvmAuthorization, ExactEvmPayload,
    PaymentPayload, PaymentRequirements, PaywallError, PaywallResult, WalletSigner,
};
use tracing::debug;

/// Wallet backed by a local secp256k1 key
#[derive(Debug, Clone)]
pub struct LocalWalletSigner {
    signer: PrivateKeySigner,
}

impl LocalWalletSigner {
    pub fn new(signer: PrivateKeySigner) -> Self {
        Self { signer }
    }

    /// Parse a hex private key, with or without `0x`
    pub fn from_private_key(key: &str) -> PaywallResult<Self> {
        let signer = key.trim().parse::<PrivateKeySigner>().map_err(|e| {
            PaywallError::Configuration(format!("PAYX_PRIVATE_KEY is not a private key: {}", e))
        })?;
        Ok(Self::new(signer))
    }

    /// Load from `PAYX_PRIVATE_KEY`, if set
    pub fn from_env() -> PaywallResult<Option<Self>> {
        match std::env::var("PAYX_PRIVATE_KEY") {
            Ok(key) if !key.trim().is_empty() => Self::from_private_key(&key).map(Some),
            _ => Ok(None),
        }
    }
}

#[async_trait]
impl WalletSigner for LocalWalletSigner {
    fn address(&self) -> Option<String> {
        Some(self.signer.address().to_string())
    }

    async fn sign(&self, requirements: &PaymentRequirements) -> PaywallResult<PaymentPayload> {
        if requirements.scheme != EXACT_SCHEME {
            return Err(PaywallError::SigningFailed(format!(
                "cannot sign scheme {}",
                requirements.scheme
            )));
        }

        let now = chrono::Utc::now().timestamp().max(0) as u64;
        let authorization = ExactEvmAuthorization::for_requirements(
            self.signer.address(),
            requirements,
            now,
            B256::random(),
        )?;
        let hash = authorization.signing_hash(&token_domain(requirements)?)?;

        let signature = self
            .signer
            .sign_hash(&hash)
            .await
            .map_err(|e| PaywallError::SigningFailed(e.to_string()))?;
        debug!(
            "Signed {} atomic units to {} on {}",
            authorization.value, authorization.to, requirements.network
        );

        PaymentPayload::exact_evm(
            requirements.network,
            &ExactEvmPayload {
                signature: signature.to_string(),
                authorization,
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use payx_core::{Network, TierCatalog};

    const PAY_TO: &str = "0xda8d766bc482a7953b72283f56c12ce00da6a86a";

    // Anvil's first development account
    const DEV_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
    const DEV_ADDRESS: &str = "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266";

    fn requirements(tier_id: &str) -> PaymentRequirements {
        let catalog = TierCatalog::builtin();
        PaymentRequirements::exact_for_tier(
            catalog.get(tier_id).unwrap(),
            Network::BaseSepolia,
            format!("https://payx.example/payment/{}", tier_id),
            PAY_TO,
        )
    }

    #[test]
    fn test_address_from_private_key() {
        let wallet = LocalWalletSigner::from_private_key(DEV_KEY).unwrap();
        assert_eq!(wallet.address().as_deref(), Some(DEV_ADDRESS));
        assert!(wallet.is_ready());

        assert!(matches!(
            LocalWalletSigner::from_private_key("0x1234"),
            Err(PaywallError::Configuration(_))
        ));
    }

    #[tokio::test]
    async fn test_signature_recovers_to_wallet() {
        let wallet = LocalWalletSigner::new(PrivateKeySigner::random());
        let req = requirements("10usdc");

        let payload = wallet.sign(&req).await.unwrap();
        assert!(payload.matches(&req));
        assert_eq!(payload.payer(), wallet.address().as_deref());

        let body = payload.as_exact_evm().unwrap();
        assert_eq!(body.authorization.value, "10000000");
        assert_eq!(body.authorization.to.to_string().to_lowercase(), PAY_TO);

        let signer = body.recover_signer(&token_domain(&req).unwrap()).unwrap();
        assert_eq!(Some(signer.to_string()), wallet.address());
    }

    #[tokio::test]
    async fn test_each_payment_gets_a_fresh_nonce() {
        let wallet = LocalWalletSigner::from_private_key(DEV_KEY).unwrap();
        let req = requirements("1usdc");

        let first = wallet.sign(&req).await.unwrap().as_exact_evm().unwrap();
        let second = wallet.sign(&req).await.unwrap().as_exact_evm().unwrap();
        assert_ne!(first.authorization.nonce, second.authorization.nonce);
    }

    #[tokio::test]
    async fn test_other_schemes_are_refused() {
        let wallet = LocalWalletSigner::new(PrivateKeySigner::random());
        let mut req = requirements("1usdc");
        req.scheme = "upto".to_string();

        assert!(matches!(
            wallet.sign(&req).await,
            Err(PaywallError::SigningFailed(_))
        ));
    }
}
