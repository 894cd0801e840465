//! # ウォレット
//!
//! 送信元ウォレットの接続と署名を抽象化する。
//! ブラウザ拡張等の外部ウォレットと同じく、署名は非同期で拒否され得る。

use std::path::Path;

use base58::FromBase58;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::{read_keypair_file, Keypair};
use solana_sdk::signer::Signer;
use solana_sdk::transaction::Transaction;

use crate::config::{Config, WalletSource};
use crate::error::{MultisendError, Result};

/// 接続済みウォレット。
#[async_trait::async_trait]
pub trait Wallet: Send + Sync {
    /// ウォレットの公開鍵。
    fn pubkey(&self) -> Pubkey;

    /// トランザクションに署名して返す。拒否された場合は`SignatureRejected`。
    async fn sign_transaction(&self, tx: Transaction) -> Result<Transaction>;
}

/// ローカルキーペアによるウォレット。
pub struct KeypairWallet {
    keypair: Keypair,
}

impl KeypairWallet {
    pub fn new(keypair: Keypair) -> Self {
        Self { keypair }
    }

    /// Solana CLI形式（64バイトのJSON配列）のキーペアファイルから接続する。
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let keypair = read_keypair_file(path).map_err(|e| {
            MultisendError::Wallet(format!("キーペアファイルの読み込みに失敗 ({}): {e}", path.display()))
        })?;
        Ok(Self::new(keypair))
    }

    /// Base58エンコードされた64バイトの秘密鍵から接続する。
    pub fn from_base58(secret: &str) -> Result<Self> {
        let bytes = secret
            .trim()
            .from_base58()
            .map_err(|e| MultisendError::Wallet(format!("秘密鍵のBase58デコードに失敗: {e:?}")))?;
        if bytes.len() != 64 {
            return Err(MultisendError::Wallet(format!(
                "秘密鍵は64バイトである必要があります: {} bytes",
                bytes.len()
            )));
        }
        let keypair = Keypair::try_from(bytes.as_slice())
            .map_err(|e| MultisendError::Wallet(format!("キーペアの構築に失敗: {e}")))?;
        Ok(Self::new(keypair))
    }
}

/// 設定された読み込み元からウォレットを接続する。
pub fn connect_wallet(config: &Config) -> Result<KeypairWallet> {
    let wallet = match &config.wallet {
        WalletSource::KeypairFile(path) => KeypairWallet::from_file(path)?,
        WalletSource::SecretKey(secret) => KeypairWallet::from_base58(secret)?,
    };
    tracing::debug!(source = ?config.wallet, owner = %wallet.pubkey(), "ウォレットを読み込み");
    Ok(wallet)
}

#[async_trait::async_trait]
impl Wallet for KeypairWallet {
    fn pubkey(&self) -> Pubkey {
        self.keypair.pubkey()
    }

    async fn sign_transaction(&self, mut tx: Transaction) -> Result<Transaction> {
        let blockhash = tx.message.recent_blockhash;
        tx.try_sign(&[&self.keypair], blockhash)
            .map_err(|e| MultisendError::SignatureRejected(e.to_string()))?;
        Ok(tx)
    }
}
