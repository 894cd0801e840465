//! # 端末表示
//!
//! NFTカード・ナビバー・送信状態・トーストを端末向けの文字列にする。

use multisend_core::{Session, StatusSink};
use multisend_types::{Nft, Toast, ToastLevel, TransactionState};
use solana_sdk::pubkey::Pubkey;

/// NFTカード1枚分。選択中なら`[x]`、未選択なら`[+]`。
pub fn render_card(nft: &Nft, selected: bool) -> String {
    let marker = if selected { "[x]" } else { "[+]" };
    let mut out = format!("{marker} {}\n    mint:  {}", nft.name, nft.mint_address);
    if let Some(image) = &nft.image {
        out.push_str(&format!("\n    image: {image}"));
    }
    out
}

/// ナビバー。接続中ウォレットと選択数を表示する。
pub fn render_navbar(owner: Option<&Pubkey>, selected: usize) -> String {
    let wallet = match owner {
        Some(pubkey) => short_address(&pubkey.to_string()),
        None => "未接続".to_string(),
    };
    format!("Multi Send | wallet: {wallet} | selected: {selected}")
}

/// 送信状態の表示。`None`は何も出さない。
pub fn render_tx_state(state: TransactionState) -> Option<&'static str> {
    match state {
        TransactionState::None => None,
        TransactionState::Sending => Some("送信中..."),
        TransactionState::Done => Some("完了!"),
    }
}

pub fn render_toast(toast: &Toast) -> String {
    let tag = match toast.level {
        ToastLevel::Info => "info",
        ToastLevel::Success => "success",
        ToastLevel::Error => "error",
    };
    format!("[{tag}] {}", toast.message)
}

/// `AbCd...WxYz`形式に短縮する。
fn short_address(address: &str) -> String {
    if address.len() <= 10 {
        return address.to_string();
    }
    format!("{}...{}", &address[..4], &address[address.len() - 4..])
}

/// 溜まったトーストを取り出して表示する。表示した件数を返す。
pub fn print_toasts(session: &mut Session) -> usize {
    let toasts = session.take_toasts();
    for toast in &toasts {
        let line = render_toast(toast);
        match toast.level {
            ToastLevel::Error => eprintln!("{line}"),
            ToastLevel::Info | ToastLevel::Success => println!("{line}"),
        }
    }
    toasts.len()
}

/// 画面状態を更新するシンク。送信状態は変化のたびに表示し、
/// トーストは`print_toasts`で後からまとめて表示する。
pub struct ConsoleSink<'a> {
    session: &'a mut Session,
}

impl<'a> ConsoleSink<'a> {
    pub fn new(session: &'a mut Session) -> Self {
        Self { session }
    }
}

impl StatusSink for ConsoleSink<'_> {
    fn set_state(&mut self, state: TransactionState) {
        self.session.set_state(state);
        if let Some(line) = render_tx_state(state) {
            println!("{line}");
        }
    }

    fn toast(&mut self, toast: Toast) {
        self.session.toast(toast);
    }
}
