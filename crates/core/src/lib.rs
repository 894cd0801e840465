//! # Multi Send Core
//!
//! 接続ウォレットが保有するNFTを取得し、選択したNFTを1つのトランザクションで
//! 送信先ウォレットへ一括送信する。
//!
//! ## 構成
//! - `indexer`: GraphQLインデクサーからの保有NFT取得
//! - `chain`: Solana RPC（アカウント照会・blockhash・ブロードキャスト・確認）
//! - `wallet`: 送信元ウォレットの接続と署名
//! - `transfer`: 一括送信トランザクションの構築と送信
//! - `session`: 選択状態・送信状態などの画面状態
//!
//! ウォレット、RPCクライアント、SPL Tokenバインディング、インデクサー自体は
//! 外部ライブラリ・外部サービスをそのまま使う。

pub mod chain;
pub mod config;
pub mod error;
pub mod indexer;
pub mod session;
pub mod transfer;
pub mod wallet;

pub use chain::{ChainClient, RpcChainClient};
pub use config::{Config, WalletSource};
pub use error::{MultisendError, Result};
pub use indexer::{GraphQlIndexer, NftIndexer};
pub use session::Session;
pub use transfer::{mass_send, plan_transfer, SendOptions, StatusSink, TransferPlan};
pub use wallet::{connect_wallet, KeypairWallet, Wallet};
