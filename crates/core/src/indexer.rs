//! # NFTインデクサー
//!
//! ウォレットが保有するNFT一覧をGraphQLインデクサーから取得する。
//! 取得方法はトレイトで抽象化し、テストではモックサーバーを使う。

use multisend_types::{GetNftsData, GetNftsVariables, GraphQlRequest, GraphQlResponse, Nft};
use solana_sdk::pubkey::Pubkey;

use crate::error::{MultisendError, Result};

/// 保有NFT取得クエリ。
pub const GET_NFTS_QUERY: &str = r#"
query GetNfts($owners: [PublicKey!], $limit: Int!, $offset: Int!) {
  nfts(owners: $owners, limit: $limit, offset: $offset) {
    address
    mintAddress
    name
    description
    image
    owner {
      address
      associatedTokenAccountAddress
    }
  }
}
"#;

/// 保有NFTを取得するインターフェース。
#[async_trait::async_trait]
pub trait NftIndexer: Send + Sync {
    /// `owner`が保有するNFTを`offset`から最大`limit`件取得する。
    async fn fetch_nfts(&self, owner: &Pubkey, limit: u32, offset: u32) -> Result<Vec<Nft>>;
}

/// GraphQLエンドポイントに問い合わせるインデクサー実装。
pub struct GraphQlIndexer {
    endpoint: String,
    http_client: reqwest::Client,
}

impl GraphQlIndexer {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            http_client: reqwest::Client::new(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait::async_trait]
impl NftIndexer for GraphQlIndexer {
    async fn fetch_nfts(&self, owner: &Pubkey, limit: u32, offset: u32) -> Result<Vec<Nft>> {
        let request = GraphQlRequest {
            query: GET_NFTS_QUERY.to_string(),
            variables: GetNftsVariables {
                owners: vec![owner.to_string()],
                limit,
                offset,
            },
        };

        tracing::debug!(endpoint = %self.endpoint, %owner, limit, offset, "NFT一覧を取得中");

        let response = self
            .http_client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|e| MultisendError::Indexer(format!("HTTP送信失敗: {e}")))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| MultisendError::Indexer(format!("レスポンス読み取り失敗: {e}")))?;

        if !status.is_success() {
            return Err(MultisendError::Indexer(format!(
                "インデクサーがエラーを返しました: HTTP {status} - {body}"
            )));
        }

        let parsed: GraphQlResponse<GetNftsData> = serde_json::from_str(&body)
            .map_err(|e| MultisendError::Indexer(format!("レスポンスのパースに失敗: {e}")))?;

        if let Some(errors) = parsed.errors.filter(|errors| !errors.is_empty()) {
            let messages: Vec<String> = errors.into_iter().map(|e| e.message).collect();
            return Err(MultisendError::Indexer(messages.join("; ")));
        }

        let data = parsed
            .data
            .ok_or_else(|| MultisendError::Indexer("レスポンスにdataがありません".to_string()))?;

        tracing::info!(%owner, count = data.nfts.len(), "NFT一覧を取得");
        Ok(data.nfts)
    }
}
