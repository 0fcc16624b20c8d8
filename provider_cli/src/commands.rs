use crate::config::{CliCommand, GlobalOptions, WalletOptions};
use crate::error::CliError;
use futures::StreamExt;
use libprovider::{BtcNetwork, BtcProvider, ProviderError, ProviderEvent, Transport};
use log::*;
use provider_bridge::mock_wallet::USER_REJECTED_CODE;
use provider_bridge::{start_provider, MockWallet, RunningBridge};
use serde_json::{json, Value};

/// An unsigned PSBT skeleton used by the demo.
pub const DEMO_PSBT: &str = "70736274ff01000a0200000000000000000000";

pub struct CommandOutput {
    pub result: Value,
    /// Every notification the provider published while the command ran.
    pub events: Vec<ProviderEvent>,
}

pub fn mock_wallet(options: &WalletOptions, network: BtcNetwork) -> MockWallet {
    let error = json!({ "code": USER_REJECTED_CODE, "message": "User rejected the request." });
    options
        .reject
        .iter()
        .fold(MockWallet::new(options.addresses.clone()).on_network(network), |wallet, method| {
            wallet.reject(method, error.clone())
        })
}

pub fn describe(event: &ProviderEvent) -> String {
    match event {
        ProviderEvent::Connect | ProviderEvent::Disconnect => event.name().to_string(),
        ProviderEvent::AccountsChanged(accounts) => format!("{}: [{}]", event.name(), accounts.join(", ")),
        ProviderEvent::NetworkChanged(network) => format!("{}: {network}", event.name()),
    }
}

/// Run a single command against a provider wired to the mock wallet, then shut the bridge down.
pub async fn run(options: GlobalOptions, command: CliCommand) -> Result<CommandOutput, CliError> {
    let config = options.provider_config()?;
    let wallet = mock_wallet(&options.wallet, config.network());
    let RunningBridge { provider, extension, pump } = start_provider(&config, wallet, false);
    let events = provider.subscribe();

    let result = exec_command(&*provider, command).await;

    // Dropping the provider closes the bridge, which stops both tasks and ends the event stream
    drop(provider);
    let wallet = extension.await?;
    let settled = pump.await?;
    debug!("Wallet saw {} requests; {settled} replies were delivered", wallet.requests_seen());
    let events = events.collect::<Vec<_>>().await;
    Ok(CommandOutput { result: result?, events })
}

pub async fn exec_command<T: Transport>(provider: &BtcProvider<T>, cmd: CliCommand) -> Result<Value, ProviderError> {
    match cmd {
        CliCommand::Connect => Ok(json!(provider.connect().await?)),
        CliCommand::Accounts => Ok(json!(provider.get_accounts().await?)),
        CliCommand::Network => Ok(json!(provider.get_network())),
        CliCommand::SwitchNetwork { network } => Ok(json!(provider.switch_network(&network).await?)),
        CliCommand::SignMessage { message, scheme } => provider.sign_message(&message, scheme.as_deref()).await,
        CliCommand::SignPsbt { psbt_hex } => provider.sign_psbt(&psbt_hex).await,
        CliCommand::PushPsbt { psbt_hex } => provider.push_psbt(&psbt_hex).await,
        CliCommand::PushTx { signed_tx_hex } => provider.push_tx(&signed_tx_hex).await,
        CliCommand::Demo => run_demo(provider).await,
    }
}

async fn run_demo<T: Transport>(provider: &BtcProvider<T>) -> Result<Value, ProviderError> {
    let accounts = provider.connect().await?;
    info!("Connected with {} accounts", accounts.len());
    let target = match provider.network() {
        BtcNetwork::Testnet => BtcNetwork::Segnet,
        _ => BtcNetwork::Testnet,
    };
    let network = provider.switch_network(target.wire_name()).await?;
    let signature = provider.sign_message("Hello from btc-provider", None).await?;
    let signed_psbt = provider.sign_psbt(DEMO_PSBT).await?;
    let txid = provider.push_psbt(signed_psbt.as_str().unwrap_or(DEMO_PSBT)).await?;
    provider.disconnect();
    Ok(json!({
        "accounts": accounts,
        "network": network,
        "signature": signature,
        "signed_psbt": signed_psbt,
        "txid": txid,
    }))
}
