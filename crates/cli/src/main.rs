//! # Multi Send CLI
//!
//! 接続ウォレットのNFTを一覧し、選択したNFTを1トランザクションで一括送信する。
//!
//! ## コマンド
//! - `multisend address` — 接続ウォレットの公開鍵を表示
//! - `multisend list` — 保有NFTの一覧
//! - `multisend send --to <PUBKEY> (--mint <MINT>... | --all)` — 一括送信
//!
//! 設定は環境変数から読み込み、グローバルフラグで上書きする。

mod render;

use std::path::PathBuf;
use std::str::FromStr;

use base64::Engine;
use clap::{Args, Parser, Subcommand};
use multisend_core::config::parse_commitment;
use multisend_core::transfer::{build_transaction, serialize_transaction};
use multisend_core::{
    connect_wallet, mass_send, plan_transfer, ChainClient, Config, GraphQlIndexer, KeypairWallet,
    NftIndexer, RpcChainClient, SendOptions, Session, TransferPlan, Wallet, WalletSource,
};
use solana_sdk::pubkey::Pubkey;
use solana_sdk::transaction::Transaction;

use crate::render::{print_toasts, render_card, render_navbar, ConsoleSink};

#[derive(Debug, Parser)]
#[command(name = "multisend", version, about = "Send multiple NFTs at once")]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,
    #[command(subcommand)]
    command: Command,
}

/// 環境変数を上書きするフラグ。
#[derive(Debug, Args)]
struct GlobalArgs {
    /// Solana RPC URL (SOLANA_RPC_URL)
    #[arg(long, global = true)]
    rpc_url: Option<String>,
    /// NFTインデクサーのGraphQLエンドポイント (MULTISEND_GRAPHQL_URL)
    #[arg(long, global = true)]
    graphql_url: Option<String>,
    /// 送信元キーペアファイル (MULTISEND_KEYPAIR)
    #[arg(long, global = true, conflicts_with = "secret_key")]
    keypair: Option<PathBuf>,
    /// Base58の秘密鍵 (MULTISEND_SECRET_KEY)
    #[arg(long, global = true)]
    secret_key: Option<String>,
    /// processed / confirmed / finalized (MULTISEND_COMMITMENT)
    #[arg(long, global = true)]
    commitment: Option<String>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// 接続ウォレットの公開鍵を表示する
    Address,
    /// 保有NFTを一覧する
    List {
        /// 一覧するウォレット（省略時は接続ウォレット）
        #[arg(long)]
        owner: Option<String>,
        #[command(flatten)]
        page: PageArgs,
    },
    /// 選択したNFTを一括送信する
    Send {
        /// 送信先ウォレットアドレス
        #[arg(long)]
        to: String,
        /// 送信するNFTのミントアドレス（複数指定可）
        #[arg(long = "mint", required_unless_present = "all", conflicts_with = "all")]
        mints: Vec<String>,
        /// 保有NFTをすべて送信する
        #[arg(long)]
        all: bool,
        /// 署名・送信せず、未署名トランザクションを表示する
        #[arg(long)]
        dry_run: bool,
        #[command(flatten)]
        page: PageArgs,
    },
}

#[derive(Debug, Args)]
struct PageArgs {
    /// 取得件数の上限 (MULTISEND_FETCH_LIMIT)
    #[arg(long)]
    limit: Option<u32>,
    /// 取得開始位置
    #[arg(long, default_value_t = 0)]
    offset: u32,
}

/// フラグで設定を上書きする。
fn apply_overrides(mut config: Config, args: &GlobalArgs) -> anyhow::Result<Config> {
    if let Some(url) = &args.rpc_url {
        config.rpc_url = url.clone();
    }
    if let Some(url) = &args.graphql_url {
        config.graphql_url = url.clone();
    }
    if let Some(path) = &args.keypair {
        config.wallet = WalletSource::KeypairFile(path.clone());
    }
    if let Some(secret) = &args.secret_key {
        config.wallet = WalletSource::SecretKey(secret.clone());
    }
    if let Some(level) = &args.commitment {
        config.commitment = parse_commitment(level)?;
    }
    Ok(config)
}

/// ウォレットを接続し、保有NFTを取得した画面状態を作る。
async fn connect(config: &Config, page: &PageArgs) -> anyhow::Result<(KeypairWallet, Session)> {
    let wallet = connect_wallet(config)?;
    let owner = wallet.pubkey();
    tracing::info!(%owner, "ウォレットを接続");

    let indexer = GraphQlIndexer::new(config.graphql_url.clone());
    tracing::info!(endpoint = indexer.endpoint(), "保有NFTを取得");
    let nfts = indexer
        .fetch_nfts(&owner, page.limit.unwrap_or(config.fetch_limit), page.offset)
        .await?;

    let mut session = Session::new();
    session.connect(owner, nfts);
    Ok((wallet, session))
}

async fn run_list(config: &Config, owner: Option<&str>, page: &PageArgs) -> anyhow::Result<()> {
    let owner = match owner {
        Some(address) => Pubkey::from_str(address)
            .map_err(|e| anyhow::anyhow!("ownerが公開鍵として不正です ({address}): {e}"))?,
        None => connect_wallet(config)?.pubkey(),
    };

    let indexer = GraphQlIndexer::new(config.graphql_url.clone());
    tracing::info!(endpoint = indexer.endpoint(), %owner, "保有NFTを取得");
    let nfts = indexer
        .fetch_nfts(&owner, page.limit.unwrap_or(config.fetch_limit), page.offset)
        .await?;

    println!("{}", render_navbar(Some(&owner), 0));
    if nfts.is_empty() {
        println!("NFTが見つかりません");
    }
    for nft in &nfts {
        println!("{}", render_card(nft, false));
    }
    println!("{} 件", nfts.len());
    Ok(())
}

async fn run_send(
    config: &Config,
    to: &str,
    mints: &[String],
    all: bool,
    dry_run: bool,
    page: &PageArgs,
) -> anyhow::Result<()> {
    let (wallet, mut session) = connect(config, page).await?;

    if all {
        session.select_all();
    } else {
        for mint in mints {
            session.select(mint)?;
        }
    }
    session.set_destination(to);

    println!("{}", render_navbar(session.owner(), session.selected_count()));
    let items = session.selected_items();
    if items.is_empty() {
        println!("送信するNFTを選択してください");
    }
    for nft in &items {
        println!("{}", render_card(nft, true));
    }

    let chain = RpcChainClient::new(config.rpc_url.clone(), config.commitment);
    tracing::info!(rpc = %chain.url(), "RPCに接続");

    if dry_run {
        return print_dry_run(&chain, &wallet, &session).await;
    }

    let options = SendOptions {
        confirm_timeout: config.confirm_timeout,
        ..SendOptions::default()
    };
    let destination = session.destination().to_string();

    let result = {
        let mut sink = ConsoleSink::new(&mut session);
        mass_send(&chain, &wallet, &items, &destination, &options, &mut sink).await
    };
    print_toasts(&mut session);

    match result? {
        Some(signature) => {
            println!("signature: {signature}");
            let sent: Vec<String> = items.into_iter().map(|n| n.mint_address).collect();
            session.complete_transfer(&sent);
            println!("{}", render_navbar(session.owner(), session.selected_count()));
            println!("残り {} 件", session.nfts().len());
        }
        None => tracing::info!("送信は行われませんでした"),
    }
    Ok(())
}

/// 署名・送信せずに計画と未署名トランザクションを作る。
///
/// 送信先が空、または選択が空の場合は`mass_send`と同じく何もせず`None`を返す。
async fn plan_dry_run<C: ChainClient>(
    chain: &C,
    owner: &Pubkey,
    session: &Session,
) -> anyhow::Result<Option<(Pubkey, TransferPlan, Transaction)>> {
    let to = session.destination().trim();
    if to.is_empty() {
        tracing::info!("送信先が未入力のため中断");
        return Ok(None);
    }
    let destination =
        Pubkey::from_str(to).map_err(|e| anyhow::anyhow!("送信先アドレスが不正です ({to}): {e}"))?;

    let items = session.selected_items();
    if items.is_empty() {
        tracing::info!("送信するNFTが選択されていません");
        return Ok(None);
    }
    let mints = items
        .iter()
        .map(|n| Pubkey::from_str(&n.mint_address))
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| anyhow::anyhow!("ミントアドレスが不正です: {e}"))?;

    let plan = plan_transfer(chain, owner, &destination, &mints).await?;
    let blockhash = chain.latest_blockhash().await?;
    let tx = build_transaction(&plan, owner, &blockhash)?;
    Ok(Some((destination, plan, tx)))
}

/// 計画と未署名トランザクション（Base64）を表示する。
async fn print_dry_run<C: ChainClient>(
    chain: &C,
    wallet: &KeypairWallet,
    session: &Session,
) -> anyhow::Result<()> {
    let Some((destination, plan, tx)) = plan_dry_run(chain, &wallet.pubkey(), session).await?
    else {
        return Ok(());
    };
    let bytes = serialize_transaction(&tx)?;

    println!("送信先: {destination}");
    println!("命令数: {}", plan.instructions.len());
    for account in &plan.created_accounts {
        println!("作成されるATA: {account}");
    }
    println!("サイズ: {} bytes", bytes.len());
    println!(
        "{}",
        base64::engine::general_purpose::STANDARD.encode(&bytes)
    );
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let config = apply_overrides(Config::from_env()?, &cli.global)?;

    match &cli.command {
        Command::Address => {
            let wallet = connect_wallet(&config)?;
            println!("{}", wallet.pubkey());
        }
        Command::List { owner, page } => {
            run_list(&config, owner.as_deref(), page).await?;
        }
        Command::Send {
            to,
            mints,
            all,
            dry_run,
            page,
        } => {
            run_send(&config, to, mints, *all, *dry_run, page).await?;
        }
    }

    Ok(())
}
