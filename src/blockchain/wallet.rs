//! Accounts and local transaction signing.
//!
//! # Security
//! - Private keys come from configuration only
//! - Keys are never logged, serialized or included in error messages
//! - Signing happens in-process; only signed bytes leave this module

use alloy::eips::eip2718::Encodable2718;
use alloy::network::{EthereumWallet, TransactionBuilder};
use alloy::primitives::{Address, Bytes};
use alloy::rpc::types::TransactionRequest;
use alloy::signers::local::PrivateKeySigner;

use crate::blockchain::types::{LedgerError, LedgerResult};
use crate::config::ClientConfig;

/// A signing account: a private key and the address derived from it.
#[derive(Clone)]
pub struct Account {
    signer: PrivateKeySigner,
}

impl Account {
    /// Create an account from a hex-encoded private key string.
    ///
    /// Accepts the key with or without `0x` prefix. The parse error is
    /// reported without echoing the input.
    pub fn from_private_key(private_key_hex: &str) -> LedgerResult<Self> {
        let key_hex = private_key_hex.trim();
        let key_hex = key_hex.strip_prefix("0x").unwrap_or(key_hex);

        let signer: PrivateKeySigner = key_hex
            .parse()
            .map_err(|e| LedgerError::Wallet(format!("Invalid private key format: {}", e)))?;

        tracing::debug!(address = %signer.address(), "Account loaded");

        Ok(Self { signer })
    }

    /// The account's public address.
    pub fn address(&self) -> Address {
        self.signer.address()
    }

    /// Sign a fully populated request and return the EIP-2718 encoded bytes.
    ///
    /// The request must carry nonce, gas limit, gas price and chain id.
    pub async fn sign(&self, request: TransactionRequest) -> LedgerResult<Bytes> {
        let wallet = EthereumWallet::from(self.signer.clone());
        let envelope = request
            .build(&wallet)
            .await
            .map_err(|e| LedgerError::Signing(e.to_string()))?;
        Ok(envelope.encoded_2718().into())
    }
}

impl std::fmt::Debug for Account {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Account")
            .field("address", &self.address())
            .finish_non_exhaustive()
    }
}

impl std::fmt::Display for Account {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.address())
    }
}

/// Build one account per configured private key, in configuration order.
pub fn load_accounts(config: &ClientConfig) -> LedgerResult<Vec<Account>> {
    let accounts = config
        .private_keys
        .iter()
        .enumerate()
        .map(|(index, key)| parse_indexed(index, key))
        .collect::<LedgerResult<Vec<_>>>()?;

    tracing::info!(count = accounts.len(), "Accounts loaded");
    Ok(accounts)
}

/// Parse only the configured key at `index`; other entries are not read.
pub fn load_account(config: &ClientConfig, index: usize) -> LedgerResult<Account> {
    let key = config.private_keys.get(index).ok_or_else(|| {
        LedgerError::Wallet(format!(
            "account #{index} not configured ({} accounts available, set PRIVATE_KEY)",
            config.private_keys.len()
        ))
    })?;
    parse_indexed(index, key)
}

fn parse_indexed(index: usize, key: &str) -> LedgerResult<Account> {
    Account::from_private_key(key)
        .map_err(|e| LedgerError::Wallet(format!("private key #{index}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::consensus::{Transaction, TxEnvelope};
    use alloy::eips::eip2718::Decodable2718;
    use alloy::primitives::U256;

    // Well-known test private key (Anvil's first account)
    const TEST_PRIVATE_KEY: &str = "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
    const TEST_ADDRESS: &str = "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266";

    #[test]
    fn test_account_from_private_key() {
        let account = Account::from_private_key(TEST_PRIVATE_KEY).unwrap();
        assert_eq!(account.address().to_string().to_lowercase(), TEST_ADDRESS);
    }

    #[test]
    fn test_account_with_0x_prefix() {
        let account = Account::from_private_key(&format!("0x{}", TEST_PRIVATE_KEY)).unwrap();
        assert_eq!(account.address().to_string().to_lowercase(), TEST_ADDRESS);
    }

    #[test]
    fn test_invalid_private_key() {
        let result = Account::from_private_key("invalid_key");
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Invalid private key"));
    }

    #[test]
    fn test_debug_and_display_hide_key() {
        let account = Account::from_private_key(TEST_PRIVATE_KEY).unwrap();
        let debug = format!("{:?}", account);
        let display = account.to_string();
        assert!(!debug.contains(TEST_PRIVATE_KEY));
        assert!(!display.contains(TEST_PRIVATE_KEY));
        assert_eq!(display.to_lowercase(), TEST_ADDRESS);
    }

    #[test]
    fn test_load_accounts_keeps_order() {
        let config = ClientConfig {
            private_keys: vec![
                TEST_PRIVATE_KEY.to_string(),
                // Anvil's second account
                "59c6995e998f97a5a0044966f0945389dc9e86dae88c7a8412f4603b6b78690d".to_string(),
            ],
            ..ClientConfig::default()
        };
        let accounts = load_accounts(&config).unwrap();
        assert_eq!(accounts.len(), 2);
        assert_eq!(accounts[0].address().to_string().to_lowercase(), TEST_ADDRESS);
        assert_eq!(
            accounts[1].address().to_string().to_lowercase(),
            "0x70997970c51812dc3a010c7d01b50e0d17dc79c8"
        );
    }

    #[test]
    fn test_load_accounts_reports_bad_key_index() {
        let config = ClientConfig {
            private_keys: vec![TEST_PRIVATE_KEY.to_string(), "nope".to_string()],
            ..ClientConfig::default()
        };
        let err = load_accounts(&config).unwrap_err();
        assert!(err.to_string().contains("#1"));
        assert!(!err.to_string().contains("nope"));
    }

    #[test]
    fn test_load_account_ignores_other_entries() {
        let config = ClientConfig {
            private_keys: vec![TEST_PRIVATE_KEY.to_string(), "nope".to_string()],
            ..ClientConfig::default()
        };

        let account = load_account(&config, 0).unwrap();
        assert_eq!(account.address().to_string().to_lowercase(), TEST_ADDRESS);

        let err = load_account(&config, 1).unwrap_err();
        assert!(err.to_string().contains("#1"));

        let err = load_account(&config, 2).unwrap_err();
        assert!(err.to_string().contains("2 accounts available"));
    }

    #[tokio::test]
    async fn test_sign_produces_decodable_envelope() {
        let account = Account::from_private_key(TEST_PRIVATE_KEY).unwrap();
        let request = TransactionRequest::default()
            .with_from(account.address())
            .with_to(Address::repeat_byte(0x11))
            .with_value(U256::from(7u64))
            .with_nonce(3)
            .with_gas_price(1_000_000_000)
            .with_gas_limit(21_000)
            .with_chain_id(31337);

        let raw = account.sign(request).await.unwrap();
        let envelope = TxEnvelope::decode_2718(&mut raw.as_ref()).unwrap();

        assert_eq!(envelope.nonce(), 3);
        assert_eq!(envelope.value(), U256::from(7u64));
        assert_eq!(envelope.chain_id(), Some(31337));
        assert_eq!(envelope.to(), Some(Address::repeat_byte(0x11)));
    }

    #[tokio::test]
    async fn test_sign_rejects_incomplete_request() {
        let account = Account::from_private_key(TEST_PRIVATE_KEY).unwrap();
        let request = TransactionRequest::default().with_to(Address::ZERO);
        let result = account.sign(request).await;
        assert!(matches!(result, Err(LedgerError::Signing(_))));
    }
}
