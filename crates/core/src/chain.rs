//! # Solanaチェーンクライアント
//!
//! 一括送信に必要なRPC操作だけをトレイトにまとめる。
//! 本番実装は`solana-client`の非同期`RpcClient`に委譲する。

use solana_client::nonblocking::rpc_client::RpcClient;
use solana_sdk::commitment_config::CommitmentConfig;
use solana_sdk::hash::Hash;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Signature;
use solana_sdk::transaction::Transaction;

use crate::error::{MultisendError, Result};

/// 一括送信で使うチェーン操作。
#[async_trait::async_trait]
pub trait ChainClient: Send + Sync {
    /// アカウントがオンチェーンに存在するか。
    async fn account_exists(&self, address: &Pubkey) -> Result<bool>;

    /// 最新のblockhashを取得する。
    async fn latest_blockhash(&self) -> Result<Hash>;

    /// 署名済みトランザクションをブロードキャストする。
    async fn send_transaction(&self, tx: &Transaction) -> Result<Signature>;

    /// 署名のステータスを取得する。
    ///
    /// 設定したコミットメントに未到達なら`None`、到達済みなら実行結果を返す。
    async fn signature_status(
        &self,
        signature: &Signature,
    ) -> Result<Option<std::result::Result<(), String>>>;
}

/// `solana-client`によるRPC実装。
pub struct RpcChainClient {
    rpc: RpcClient,
    commitment: CommitmentConfig,
}

impl RpcChainClient {
    pub fn new(rpc_url: impl Into<String>, commitment: CommitmentConfig) -> Self {
        Self {
            rpc: RpcClient::new_with_commitment(rpc_url.into(), commitment),
            commitment,
        }
    }

    pub fn url(&self) -> String {
        self.rpc.url()
    }
}

#[async_trait::async_trait]
impl ChainClient for RpcChainClient {
    async fn account_exists(&self, address: &Pubkey) -> Result<bool> {
        let response = self
            .rpc
            .get_account_with_commitment(address, self.commitment)
            .await
            .map_err(|e| MultisendError::Rpc(format!("アカウント取得失敗 ({address}): {e}")))?;
        Ok(response.value.is_some())
    }

    async fn latest_blockhash(&self) -> Result<Hash> {
        self.rpc
            .get_latest_blockhash()
            .await
            .map_err(|e| MultisendError::Rpc(format!("blockhash取得失敗: {e}")))
    }

    async fn send_transaction(&self, tx: &Transaction) -> Result<Signature> {
        self.rpc
            .send_transaction(tx)
            .await
            .map_err(|e| MultisendError::Rpc(format!("トランザクションのブロードキャストに失敗: {e}")))
    }

    async fn signature_status(
        &self,
        signature: &Signature,
    ) -> Result<Option<std::result::Result<(), String>>> {
        let status = self
            .rpc
            .get_signature_status_with_commitment(signature, self.commitment)
            .await
            .map_err(|e| MultisendError::Rpc(format!("署名ステータス取得失敗 ({signature}): {e}")))?;
        Ok(status.map(|result| result.map_err(|e| e.to_string())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::Json;
    use base64::Engine;
    use multisend_types::{Nft, Toast, TransactionState};
    use solana_sdk::signature::Keypair;
    use solana_sdk::signer::Signer;

    use crate::transfer::{mass_send, SendOptions, StatusSink};
    use crate::wallet::KeypairWallet;

    const EXISTING: &str = "SysvarC1ock11111111111111111111111111111111";

    fn mock_blockhash() -> Hash {
        Hash::new_from_array([7u8; 32])
    }

    /// JSON-RPCメソッド名で応答を切り替えるモックRPCサーバー。
    ///
    /// `sendTransaction`は受け取ったトランザクションをデコードし、その署名を返す。
    async fn start_mock_rpc(signature_status: serde_json::Value) -> String {
        let mock = axum::Router::new().route(
            "/",
            axum::routing::post(move |Json(body): Json<serde_json::Value>| {
                let signature_status = signature_status.clone();
                async move {
                    let method = body["method"].as_str().unwrap_or_default().to_string();
                    let result = match method.as_str() {
                        "getVersion" => serde_json::json!({
                            "solana-core": "2.0.0",
                            "feature-set": 1
                        }),
                        "getAccountInfo" => {
                            let value = if body["params"][0] == EXISTING {
                                serde_json::json!({
                                    "lamports": 1_000_000,
                                    "data": ["", "base64"],
                                    "owner": "11111111111111111111111111111111",
                                    "executable": false,
                                    "rentEpoch": 0,
                                    "space": 0
                                })
                            } else {
                                serde_json::Value::Null
                            };
                            serde_json::json!({"context": {"slot": 1}, "value": value})
                        }
                        "getLatestBlockhash" => serde_json::json!({
                            "context": {"slot": 1},
                            "value": {
                                "blockhash": mock_blockhash().to_string(),
                                "lastValidBlockHeight": 100
                            }
                        }),
                        "sendTransaction" => {
                            let encoded = body["params"][0].as_str().unwrap();
                            let bytes = base64::engine::general_purpose::STANDARD
                                .decode(encoded)
                                .unwrap();
                            let tx: Transaction = bincode::deserialize(&bytes).unwrap();
                            assert!(tx.verify().is_ok(), "署名が検証できない");
                            serde_json::json!(tx.signatures[0].to_string())
                        }
                        "getSignatureStatuses" => serde_json::json!({
                            "context": {"slot": 1},
                            "value": [signature_status]
                        }),
                        other => panic!("想定外のRPCメソッド: {other}"),
                    };
                    Json(serde_json::json!({
                        "jsonrpc": "2.0",
                        "id": body["id"],
                        "result": result
                    }))
                }
            }),
        );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        tokio::spawn(async move {
            axum::serve(listener, mock).await.unwrap();
        });
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        format!("http://127.0.0.1:{port}")
    }

    fn confirmed_status() -> serde_json::Value {
        serde_json::json!({
            "slot": 1,
            "confirmations": 3,
            "status": {"Ok": null},
            "err": null,
            "confirmationStatus": "confirmed"
        })
    }

    fn failed_status() -> serde_json::Value {
        serde_json::json!({
            "slot": 1,
            "confirmations": 3,
            "status": {"Err": {"InstructionError": [0, {"Custom": 1}]}},
            "err": {"InstructionError": [0, {"Custom": 1}]},
            "confirmationStatus": "confirmed"
        })
    }

    #[tokio::test]
    async fn test_account_exists() {
        let url = start_mock_rpc(serde_json::Value::Null).await;
        let chain = RpcChainClient::new(url, CommitmentConfig::confirmed());

        let existing: Pubkey = EXISTING.parse().unwrap();
        assert!(chain.account_exists(&existing).await.unwrap());
        assert!(!chain.account_exists(&Pubkey::new_unique()).await.unwrap());
    }

    #[tokio::test]
    async fn test_latest_blockhash() {
        let url = start_mock_rpc(serde_json::Value::Null).await;
        let chain = RpcChainClient::new(url, CommitmentConfig::confirmed());

        let blockhash = chain.latest_blockhash().await.unwrap();
        assert_eq!(blockhash, mock_blockhash());
    }

    #[tokio::test]
    async fn test_send_transaction() {
        let url = start_mock_rpc(serde_json::Value::Null).await;
        let chain = RpcChainClient::new(url, CommitmentConfig::confirmed());

        let payer = Keypair::new();
        #[allow(deprecated)]
        let ix = solana_sdk::system_instruction::transfer(&payer.pubkey(), &Pubkey::new_unique(), 1);
        let tx = Transaction::new_signed_with_payer(
            &[ix],
            Some(&payer.pubkey()),
            &[&payer],
            mock_blockhash(),
        );

        let signature = chain.send_transaction(&tx).await.unwrap();
        assert_eq!(signature, tx.signatures[0]);
    }

    #[tokio::test]
    async fn test_signature_status_pending() {
        let url = start_mock_rpc(serde_json::Value::Null).await;
        let chain = RpcChainClient::new(url, CommitmentConfig::confirmed());

        let status = chain.signature_status(&Signature::default()).await.unwrap();
        assert!(status.is_none());
    }

    #[tokio::test]
    async fn test_signature_status_confirmed() {
        let url = start_mock_rpc(confirmed_status()).await;
        let chain = RpcChainClient::new(url, CommitmentConfig::confirmed());

        let status = chain.signature_status(&Signature::default()).await.unwrap();
        assert_eq!(status, Some(Ok(())));
    }

    #[tokio::test]
    async fn test_signature_status_failed() {
        let url = start_mock_rpc(failed_status()).await;
        let chain = RpcChainClient::new(url, CommitmentConfig::confirmed());

        let status = chain.signature_status(&Signature::default()).await.unwrap();
        assert!(matches!(status, Some(Err(_))));
    }

    #[test]
    fn test_url() {
        let chain = RpcChainClient::new("http://127.0.0.1:8899", CommitmentConfig::confirmed());
        assert_eq!(chain.url(), "http://127.0.0.1:8899");
    }

    #[tokio::test]
    async fn test_rpc_unreachable() {
        // 何も待ち受けていないポート
        let chain = RpcChainClient::new("http://127.0.0.1:1", CommitmentConfig::confirmed());
        let result = chain.latest_blockhash().await;
        assert!(matches!(result, Err(MultisendError::Rpc(_))));
    }

    /// 状態変化とトーストを記録するシンク。
    #[derive(Default)]
    struct Recorder {
        states: Vec<TransactionState>,
        toasts: Vec<Toast>,
    }

    impl StatusSink for Recorder {
        fn set_state(&mut self, state: TransactionState) {
            self.states.push(state);
        }

        fn toast(&mut self, toast: Toast) {
            self.toasts.push(toast);
        }
    }

    fn items(count: usize) -> Vec<Nft> {
        (0..count)
            .map(|i| Nft {
                name: format!("NFT #{i}"),
                address: Pubkey::new_unique().to_string(),
                description: None,
                image: None,
                mint_address: Pubkey::new_unique().to_string(),
                owner: None,
            })
            .collect()
    }

    fn fast_options() -> SendOptions {
        SendOptions {
            confirm_timeout: std::time::Duration::from_secs(5),
            poll_interval: std::time::Duration::from_millis(10),
        }
    }

    #[tokio::test]
    async fn test_mass_send_over_rpc() {
        let url = start_mock_rpc(confirmed_status()).await;
        let chain = RpcChainClient::new(url, CommitmentConfig::confirmed());
        let wallet = KeypairWallet::new(Keypair::new());
        let mut sink = Recorder::default();

        let signature = mass_send(
            &chain,
            &wallet,
            &items(2),
            &Pubkey::new_unique().to_string(),
            &fast_options(),
            &mut sink,
        )
        .await
        .unwrap()
        .expect("署名が返るはず");

        assert_ne!(signature, Signature::default());
        assert_eq!(
            sink.states,
            vec![TransactionState::Sending, TransactionState::Done]
        );
        assert_eq!(sink.toasts.len(), 1);
        assert_eq!(sink.toasts[0].level, multisend_types::ToastLevel::Success);
    }

    #[tokio::test]
    async fn test_mass_send_over_rpc_failed_on_chain() {
        let url = start_mock_rpc(failed_status()).await;
        let chain = RpcChainClient::new(url, CommitmentConfig::confirmed());
        let wallet = KeypairWallet::new(Keypair::new());
        let mut sink = Recorder::default();

        let result = mass_send(
            &chain,
            &wallet,
            &items(1),
            &Pubkey::new_unique().to_string(),
            &fast_options(),
            &mut sink,
        )
        .await;

        assert!(matches!(result, Err(MultisendError::TransactionFailed(_))));
        assert_eq!(sink.states, vec![TransactionState::Sending]);
        assert_eq!(sink.toasts[0].level, multisend_types::ToastLevel::Error);
    }
}
