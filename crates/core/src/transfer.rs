//! # NFT一括送信
//!
//! 選択したNFTのミント一覧と送信先公開鍵から、1つの署名済みトランザクションを
//! 構築・ブロードキャストし、確認まで待つ。
//!
//! ## 処理フロー
//! 1. 送信先アドレスを検証する
//! 2. ミントごとに送信元・送信先の関連トークンアカウント（ATA）を導出する
//! 3. 送信先ATAが未作成ならATA作成命令を追加する
//! 4. 数量1の転送命令を追加する
//! 5. recent blockhashとfee payer（接続ウォレット）を設定する
//! 6. ウォレットに署名を要求する
//! 7. ブロードキャストし、確認を待つ
//!
//! 状態変化とトースト通知は`StatusSink`に反映する。失敗時はトーストを出して中断し、
//! リトライはしない。

use std::collections::HashSet;
use std::str::FromStr;
use std::time::Duration;

use multisend_types::{Nft, Toast, TransactionState};
use solana_sdk::hash::Hash;
use solana_sdk::instruction::Instruction;
use solana_sdk::message::Message;
use solana_sdk::packet::PACKET_DATA_SIZE;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Signature;
use solana_sdk::transaction::Transaction;
use spl_associated_token_account::get_associated_token_address;
use spl_associated_token_account::instruction::create_associated_token_account;

use crate::chain::ChainClient;
use crate::error::{MultisendError, Result};
use crate::wallet::Wallet;

/// NFT1枚あたりの転送数量。
pub const NFT_AMOUNT: u64 = 1;

/// 一括送信の状態とトースト通知の反映先。
pub trait StatusSink: Send {
    /// 送信状態を更新する。
    fn set_state(&mut self, state: TransactionState);

    /// トースト通知を出す。
    fn toast(&mut self, toast: Toast);
}

/// 確認待ちの設定。
#[derive(Debug, Clone)]
pub struct SendOptions {
    /// 確認待ちの上限時間
    pub confirm_timeout: Duration,
    /// 署名ステータスのポーリング間隔
    pub poll_interval: Duration,
}

impl Default for SendOptions {
    fn default() -> Self {
        Self {
            confirm_timeout: Duration::from_secs(60),
            poll_interval: Duration::from_millis(500),
        }
    }
}

/// 一括送信の計画（署名前）。
#[derive(Debug, Clone, Default)]
pub struct TransferPlan {
    /// 送信するミント（重複除去済み、選択順）
    pub mints: Vec<Pubkey>,
    /// 新規作成される送信先ATA
    pub created_accounts: Vec<Pubkey>,
    /// トランザクションに含める命令
    pub instructions: Vec<Instruction>,
}

// ---------------------------------------------------------------------------
// 命令構築
// ---------------------------------------------------------------------------

/// NFT1枚分の命令を構築する。
///
/// `create_destination_account`がtrueの場合、ATA作成命令（payer = owner）を先頭に置く。
pub fn transfer_instructions(
    owner: &Pubkey,
    destination: &Pubkey,
    mint: &Pubkey,
    create_destination_account: bool,
) -> Result<Vec<Instruction>> {
    let source_ata = get_associated_token_address(owner, mint);
    let destination_ata = get_associated_token_address(destination, mint);

    let mut instructions = Vec::with_capacity(2);
    if create_destination_account {
        instructions.push(create_associated_token_account(
            owner,
            destination,
            mint,
            &spl_token::id(),
        ));
    }

    let transfer_ix = spl_token::instruction::transfer(
        &spl_token::id(),
        &source_ata,
        &destination_ata,
        owner,
        &[],
        NFT_AMOUNT,
    )
    .map_err(|e| MultisendError::Instruction(format!("転送命令 ({mint}): {e}")))?;
    instructions.push(transfer_ix);

    Ok(instructions)
}

/// 選択したミントの一括送信計画を立てる。
///
/// 送信先ATAの存在はチェーンに問い合わせる。同じミントが複数回含まれる場合は最初の1回のみ扱う。
pub async fn plan_transfer<C>(
    chain: &C,
    owner: &Pubkey,
    destination: &Pubkey,
    mints: &[Pubkey],
) -> Result<TransferPlan>
where
    C: ChainClient + ?Sized,
{
    let mut plan = TransferPlan::default();
    let mut seen = HashSet::new();

    for mint in mints {
        if !seen.insert(*mint) {
            tracing::warn!(%mint, "重複したミントを除外");
            continue;
        }

        let destination_ata = get_associated_token_address(destination, mint);
        let exists = chain.account_exists(&destination_ata).await?;
        if !exists {
            tracing::debug!(%mint, ata = %destination_ata, "送信先ATAを作成");
            plan.created_accounts.push(destination_ata);
        }

        plan.instructions
            .extend(transfer_instructions(owner, destination, mint, !exists)?);
        plan.mints.push(*mint);
    }

    Ok(plan)
}

/// 計画から未署名トランザクションを構築する。
///
/// シリアライズ後のサイズが1パケット（`PACKET_DATA_SIZE`）を超える場合はエラー。
pub fn build_transaction(
    plan: &TransferPlan,
    fee_payer: &Pubkey,
    blockhash: &Hash,
) -> Result<Transaction> {
    let message = Message::new_with_blockhash(&plan.instructions, Some(fee_payer), blockhash);
    let tx = Transaction::new_unsigned(message);

    let size = serialize_transaction(&tx)?.len();
    if size > PACKET_DATA_SIZE {
        return Err(MultisendError::TransactionTooLarge {
            size,
            max: PACKET_DATA_SIZE,
        });
    }

    Ok(tx)
}

/// トランザクションをバイナリにシリアライズする。
pub fn serialize_transaction(tx: &Transaction) -> Result<Vec<u8>> {
    bincode::serialize(tx)
        .map_err(|e| MultisendError::Serialization(format!("トランザクション: {e}")))
}

// ---------------------------------------------------------------------------
// 確認待ち
// ---------------------------------------------------------------------------

async fn poll_signature<C>(chain: &C, signature: &Signature, poll_interval: Duration) -> Result<()>
where
    C: ChainClient + ?Sized,
{
    loop {
        match chain.signature_status(signature).await? {
            Some(Ok(())) => return Ok(()),
            Some(Err(e)) => return Err(MultisendError::TransactionFailed(e)),
            None => tokio::time::sleep(poll_interval).await,
        }
    }
}

/// 署名がコミットメントに到達するまで待つ。
pub async fn await_confirmation<C>(
    chain: &C,
    signature: &Signature,
    timeout: Duration,
    poll_interval: Duration,
) -> Result<()>
where
    C: ChainClient + ?Sized,
{
    tokio::time::timeout(timeout, poll_signature(chain, signature, poll_interval))
        .await
        .map_err(|_| {
            MultisendError::ConfirmationTimeout(format!("{signature} ({}ms)", timeout.as_millis()))
        })?
}

// ---------------------------------------------------------------------------
// 一括送信
// ---------------------------------------------------------------------------

/// エラーをトーストに出してそのまま返す。
fn report<T, S>(sink: &mut S, result: Result<T>) -> Result<T>
where
    S: StatusSink + ?Sized,
{
    result.map_err(|e| {
        tracing::warn!(error = %e, "一括送信を中断");
        sink.toast(Toast::error(e.to_string()));
        e
    })
}

/// 選択したNFTを`to`へ1トランザクションで一括送信する。
///
/// 送信先が空、または選択が空の場合は何もせず`Ok(None)`を返す。
/// 確認まで完了した場合は署名を返す。
pub async fn mass_send<C, W, S>(
    chain: &C,
    wallet: &W,
    items: &[Nft],
    to: &str,
    options: &SendOptions,
    sink: &mut S,
) -> Result<Option<Signature>>
where
    C: ChainClient + ?Sized,
    W: Wallet + ?Sized,
    S: StatusSink + ?Sized,
{
    let to = to.trim();
    if to.is_empty() {
        tracing::info!("送信先が未入力のため中断");
        return Ok(None);
    }

    let destination = report(
        sink,
        Pubkey::from_str(to).map_err(|e| MultisendError::InvalidDestination(format!("{to}: {e}"))),
    )?;
    tracing::info!(%destination, "送信先アドレスを確認");

    if items.is_empty() {
        tracing::info!("送信するNFTが選択されていません");
        return Ok(None);
    }

    let mints = report(
        sink,
        items
            .iter()
            .map(|nft| {
                Pubkey::from_str(&nft.mint_address).map_err(|e| {
                    MultisendError::InvalidMint(format!("{} ({}): {e}", nft.mint_address, nft.name))
                })
            })
            .collect::<Result<Vec<_>>>(),
    )?;

    let owner = wallet.pubkey();
    tracing::info!(count = mints.len(), %owner, %destination, "NFTの一括送信を開始");

    let plan = report(sink, plan_transfer(chain, &owner, &destination, &mints).await)?;
    let blockhash = report(sink, chain.latest_blockhash().await)?;
    let tx = report(sink, build_transaction(&plan, &owner, &blockhash))?;

    let signed = match wallet.sign_transaction(tx).await {
        Ok(tx) => tx,
        Err(e) => {
            tracing::info!(error = %e, "署名されませんでした");
            sink.toast(Toast::info(e.to_string()));
            return Err(e);
        }
    };

    let signature = report(sink, chain.send_transaction(&signed).await)?;
    sink.set_state(TransactionState::Sending);
    tracing::info!(%signature, "トランザクションを送信、確認待ち");

    report(
        sink,
        await_confirmation(chain, &signature, options.confirm_timeout, options.poll_interval).await,
    )?;
    sink.set_state(TransactionState::Done);
    sink.toast(Toast::success("トランザクションが完了しました"));
    tracing::info!(%signature, count = plan.mints.len(), "一括送信が完了");

    Ok(Some(signature))
}
