//! # 画面状態
//!
//! 接続中ウォレットの保有NFT、選択中のNFT、送信先、送信状態をまとめて保持する。
//! 選択中のNFTは常に保有NFT一覧の部分集合である。

use multisend_types::{Nft, Toast, TransactionState};
use solana_sdk::pubkey::Pubkey;

use crate::error::{MultisendError, Result};
use crate::transfer::StatusSink;

/// 1画面分の状態。
#[derive(Debug, Default)]
pub struct Session {
    owner: Option<Pubkey>,
    nfts: Vec<Nft>,
    /// 選択中のミントアドレス（選択順）
    selected: Vec<String>,
    destination: String,
    tx_state: TransactionState,
    toasts: Vec<Toast>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// ウォレット接続後、取得したNFT一覧で状態を置き換える。
    pub fn connect(&mut self, owner: Pubkey, nfts: Vec<Nft>) {
        tracing::debug!(%owner, count = nfts.len(), "ウォレットを接続");
        self.owner = Some(owner);
        self.nfts = nfts;
        self.selected.clear();
        self.destination.clear();
        self.tx_state = TransactionState::None;
    }

    /// ウォレット切断。一覧・選択・送信先をクリアする。
    pub fn disconnect(&mut self) {
        self.owner = None;
        self.nfts.clear();
        self.selected.clear();
        self.destination.clear();
    }

    pub fn owner(&self) -> Option<&Pubkey> {
        self.owner.as_ref()
    }

    pub fn nfts(&self) -> &[Nft] {
        &self.nfts
    }

    /// ミントアドレスでNFTを選択する。二重選択は無視する。
    pub fn select(&mut self, mint_address: &str) -> Result<()> {
        if !self.nfts.iter().any(|n| n.mint_address == mint_address) {
            return Err(MultisendError::NotOwned(mint_address.to_string()));
        }
        if !self.is_selected(mint_address) {
            self.selected.push(mint_address.to_string());
        }
        Ok(())
    }

    /// 保有NFTをすべて選択する。
    pub fn select_all(&mut self) {
        self.selected = self.nfts.iter().map(|n| n.mint_address.clone()).collect();
    }

    pub fn unselect(&mut self, mint_address: &str) {
        self.selected.retain(|m| m != mint_address);
    }

    pub fn is_selected(&self, mint_address: &str) -> bool {
        self.selected.iter().any(|m| m == mint_address)
    }

    /// 選択数（ナビバーのバッジ表示用）。
    pub fn selected_count(&self) -> usize {
        self.selected.len()
    }

    /// 選択中のNFT（選択順）。
    pub fn selected_items(&self) -> Vec<Nft> {
        self.selected
            .iter()
            .filter_map(|mint| self.nfts.iter().find(|n| &n.mint_address == mint))
            .cloned()
            .collect()
    }

    pub fn set_destination(&mut self, destination: impl Into<String>) {
        self.destination = destination.into();
    }

    pub fn destination(&self) -> &str {
        &self.destination
    }

    pub fn tx_state(&self) -> TransactionState {
        self.tx_state
    }

    pub fn toasts(&self) -> &[Toast] {
        &self.toasts
    }

    /// 溜まったトーストを取り出す。
    pub fn take_toasts(&mut self) -> Vec<Toast> {
        std::mem::take(&mut self.toasts)
    }

    /// 送信完了後、送信したNFTを一覧から外し選択をクリアする。
    ///
    /// インデクサーへの再取得は行わない。
    pub fn complete_transfer(&mut self, sent_mints: &[String]) {
        self.nfts.retain(|n| !sent_mints.contains(&n.mint_address));
        self.selected.clear();
        tracing::debug!(removed = sent_mints.len(), remaining = self.nfts.len(), "送信済みNFTを一覧から除外");
    }
}

impl StatusSink for Session {
    fn set_state(&mut self, state: TransactionState) {
        self.tx_state = state;
    }

    fn toast(&mut self, toast: Toast) {
        self.toasts.push(toast);
    }
}
