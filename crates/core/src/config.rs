//! # Multi Send 設定
//!
//! 環境変数からの設定読み込み。CLIフラグはこの値を上書きする。
//!
//! | 環境変数 | デフォルト |
//! |---|---|
//! | `SOLANA_RPC_URL` | `https://api.mainnet-beta.solana.com` |
//! | `MULTISEND_GRAPHQL_URL` | `https://graph.holaplex.com/v1` |
//! | `MULTISEND_KEYPAIR` | `$HOME/.config/solana/id.json` |
//! | `MULTISEND_SECRET_KEY` | なし（設定時は`MULTISEND_KEYPAIR`より優先） |
//! | `MULTISEND_COMMITMENT` | `confirmed` |
//! | `MULTISEND_FETCH_LIMIT` | `200` |
//! | `MULTISEND_CONFIRM_TIMEOUT_SECS` | `60` |

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use solana_sdk::commitment_config::CommitmentConfig;

use crate::error::{MultisendError, Result};

pub const DEFAULT_RPC_URL: &str = "https://api.mainnet-beta.solana.com";
pub const DEFAULT_GRAPHQL_URL: &str = "https://graph.holaplex.com/v1";
pub const DEFAULT_FETCH_LIMIT: u32 = 200;
pub const DEFAULT_CONFIRM_TIMEOUT_SECS: u64 = 60;

/// 送信元ウォレットの読み込み元。
#[derive(Clone, PartialEq, Eq)]
pub enum WalletSource {
    /// Solana CLI形式のキーペアファイル
    KeypairFile(PathBuf),
    /// Base58エンコードされた64バイトの秘密鍵
    SecretKey(String),
}

// 秘密鍵をログに出さない
impl std::fmt::Debug for WalletSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::KeypairFile(path) => f.debug_tuple("KeypairFile").field(path).finish(),
            Self::SecretKey(_) => f.write_str("SecretKey(***)"),
        }
    }
}

/// Multi Sendの実行設定。
#[derive(Debug, Clone)]
pub struct Config {
    /// Solana RPC URL
    pub rpc_url: String,
    /// NFTインデクサー（GraphQL）のエンドポイント
    pub graphql_url: String,
    /// 送信元ウォレットの読み込み元
    pub wallet: WalletSource,
    /// 確認待ち・アカウント照会に使うコミットメント
    pub commitment: CommitmentConfig,
    /// NFT一覧の取得件数上限
    pub fetch_limit: u32,
    /// 送信後の確認待ちタイムアウト
    pub confirm_timeout: Duration,
}

impl Config {
    /// 環境変数から構築する。
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// 任意の参照関数から構築する。未設定のキーはデフォルト値を使う。
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let rpc_url = lookup("SOLANA_RPC_URL").unwrap_or_else(|| DEFAULT_RPC_URL.to_string());
        let graphql_url =
            lookup("MULTISEND_GRAPHQL_URL").unwrap_or_else(|| DEFAULT_GRAPHQL_URL.to_string());

        let wallet = match (lookup("MULTISEND_SECRET_KEY"), lookup("MULTISEND_KEYPAIR")) {
            (Some(secret), _) => WalletSource::SecretKey(secret),
            (None, Some(path)) => WalletSource::KeypairFile(PathBuf::from(path)),
            (None, None) => {
                let home = lookup("HOME").ok_or_else(|| {
                    MultisendError::Config(
                        "MULTISEND_SECRET_KEY・MULTISEND_KEYPAIR・HOMEのいずれも設定されていません"
                            .to_string(),
                    )
                })?;
                WalletSource::KeypairFile(PathBuf::from(home).join(".config/solana/id.json"))
            }
        };

        let commitment = match lookup("MULTISEND_COMMITMENT") {
            Some(level) => parse_commitment(&level)?,
            None => CommitmentConfig::confirmed(),
        };

        let fetch_limit = match lookup("MULTISEND_FETCH_LIMIT") {
            Some(v) => v.parse::<u32>().map_err(|e| {
                MultisendError::Config(format!("MULTISEND_FETCH_LIMITのパースに失敗 ({v}): {e}"))
            })?,
            None => DEFAULT_FETCH_LIMIT,
        };

        let confirm_timeout_secs = match lookup("MULTISEND_CONFIRM_TIMEOUT_SECS") {
            Some(v) => v.parse::<u64>().map_err(|e| {
                MultisendError::Config(format!(
                    "MULTISEND_CONFIRM_TIMEOUT_SECSのパースに失敗 ({v}): {e}"
                ))
            })?,
            None => DEFAULT_CONFIRM_TIMEOUT_SECS,
        };

        Ok(Self {
            rpc_url,
            graphql_url,
            wallet,
            commitment,
            fetch_limit,
            confirm_timeout: Duration::from_secs(confirm_timeout_secs),
        })
    }
}

/// コミットメント名（processed / confirmed / finalized）をパースする。
pub fn parse_commitment(level: &str) -> Result<CommitmentConfig> {
    CommitmentConfig::from_str(level)
        .map_err(|e| MultisendError::Config(format!("コミットメントが不正です ({level}): {e}")))
}
