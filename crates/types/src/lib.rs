//! # Multi Send 共有型定義
//!
//! インデクサー（GraphQL）とのやり取りに使うデータ構造と、
//! 画面状態（送信状態・トースト通知）をRust構造体として提供する。
//!
//! ## エンコーディング規則
//! - Base58: Solanaアドレス、ミントアドレス
//! - JSONフィールド名: インデクサーに合わせてcamelCase

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// NFT
// ---------------------------------------------------------------------------

/// ウォレットが保有するNFT。インデクサーの`nfts`クエリ結果の1要素。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Nft {
    /// 表示名
    pub name: String,
    /// Base58エンコードされたメタデータアカウントアドレス
    pub address: String,
    /// 説明文
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// 画像URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// Base58エンコードされたミントアドレス（送信対象の識別子）
    pub mint_address: String,
    /// 現在の保有者情報
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<NftOwner>,
}

/// NFTの保有者情報。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NftOwner {
    /// Base58エンコードされた保有者ウォレットアドレス
    pub address: String,
    /// 保有者の関連トークンアカウント（ATA）アドレス
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub associated_token_account_address: Option<String>,
}

// ---------------------------------------------------------------------------
// 画面状態
// ---------------------------------------------------------------------------

/// 一括送信トランザクションの状態。どの表示ブロックを出すかの切り替えにのみ使う。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionState {
    /// 未送信。送信フォームを表示する。
    #[default]
    None,
    /// ブロードキャスト済み、確認待ち。
    Sending,
    /// 確認完了。
    Done,
}

/// トースト通知の種別。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ToastLevel {
    /// 装飾なしの通知（署名拒否など）
    Info,
    /// 成功
    Success,
    /// エラー
    Error,
}

/// トースト通知。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Toast {
    /// 通知の種別
    pub level: ToastLevel,
    /// 表示メッセージ
    pub message: String,
}

impl Toast {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: ToastLevel::Info,
            message: message.into(),
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: ToastLevel::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: ToastLevel::Error,
            message: message.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// GraphQL エンベロープ
// ---------------------------------------------------------------------------

/// GraphQL リクエスト。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphQlRequest<V> {
    /// クエリ文字列
    pub query: String,
    /// クエリ変数
    pub variables: V,
}

/// GraphQL レスポンス。`data`と`errors`は同時に存在し得る。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct GraphQlResponse<T> {
    /// 結果データ
    #[serde(default)]
    pub data: Option<T>,
    /// エラー一覧
    #[serde(default)]
    pub errors: Option<Vec<GraphQlError>>,
}

/// GraphQL エラー要素。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphQlError {
    /// エラーメッセージ
    pub message: String,
}

/// `GetNfts`クエリの変数。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetNftsVariables {
    /// Base58エンコードされた保有者アドレス一覧
    pub owners: Vec<String>,
    /// 取得件数の上限
    pub limit: u32,
    /// 取得開始位置
    pub offset: u32,
}

/// `GetNfts`クエリの結果。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetNftsData {
    pub nfts: Vec<Nft>,
}
