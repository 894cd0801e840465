//! # Multi Send エラー型
//!
//! インデクサー・チェーン・ウォレット・送信処理で共通のエラー型。

/// Multi Sendエラー型。
#[derive(Debug, thiserror::Error)]
pub enum MultisendError {
    /// 設定値が不正（環境変数のパース失敗等）
    #[error("設定が不正です: {0}")]
    Config(String),
    /// 送信先アドレスが公開鍵として不正
    #[error("送信先アドレスが不正です: {0}")]
    InvalidDestination(String),
    /// ミントアドレスが公開鍵として不正
    #[error("ミントアドレスが不正です: {0}")]
    InvalidMint(String),
    /// 取得済みNFTに含まれないミントを選択しようとした
    #[error("保有していないNFTです: {0}")]
    NotOwned(String),
    /// インデクサー（GraphQL）通信失敗
    #[error("NFT一覧の取得に失敗: {0}")]
    Indexer(String),
    /// Solana RPC エラー
    #[error("Solana RPC エラー: {0}")]
    Rpc(String),
    /// ウォレットの読み込み・接続失敗
    #[error("ウォレットの接続に失敗: {0}")]
    Wallet(String),
    /// ウォレットが署名を拒否・失敗した
    #[error("署名が拒否されました: {0}")]
    SignatureRejected(String),
    /// シリアライズ失敗
    #[error("シリアライズに失敗: {0}")]
    Serialization(String),
    /// 命令の構築失敗
    #[error("命令の構築に失敗: {0}")]
    Instruction(String),
    /// トランザクションが1パケットに収まらない
    #[error("トランザクションサイズが上限を超えています: {size} > {max} bytes（選択数を減らしてください）")]
    TransactionTooLarge {
        /// シリアライズ後のサイズ
        size: usize,
        /// 上限値
        max: usize,
    },
    /// トランザクションがオンチェーンで失敗した
    #[error("トランザクションが失敗しました: {0}")]
    TransactionFailed(String),
    /// 確認待ちがタイムアウトした
    #[error("トランザクションの確認がタイムアウトしました: {0}")]
    ConfirmationTimeout(String),
}

/// Multi Send共通のResult型。
pub type Result<T, E = MultisendError> = std::result::Result<T, E>;
