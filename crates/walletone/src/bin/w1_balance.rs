use std::path::PathBuf;

use masking::Secret;
use walletone::{configs::Settings, errors::OpenApiError, OpenApiClient};

/// Prints the balance of a WalletOne merchant wallet to the log.
#[derive(clap::Parser, Debug)]
#[command(version)]
struct CmdLineConf {
    /// Directory holding `<env>.toml` settings files.
    #[arg(short = 'f', long, value_name = "DIR")]
    config_path: Option<PathBuf>,

    /// ISO 4217 numeric code of the currency, every currency when omitted.
    #[arg(short, long)]
    currency_id: Option<u16>,

    /// Open API bearer token, `open_api.api_token` from the settings when omitted.
    #[arg(long, env = "W1_OPEN_API_TOKEN", hide_env_values = true)]
    token: Option<String>,
}

#[tokio::main]
async fn main() -> error_stack::Result<(), OpenApiError> {
    let cmd_line = <CmdLineConf as clap::Parser>::parse();

    #[allow(clippy::expect_used)]
    let conf = Settings::with_config_path(router_env::which(), cmd_line.config_path)
        .expect("Unable to construct application configuration");

    let _guard = router_env::setup(
        &conf.log,
        router_env::service_name!(),
        [router_env::service_name!(), "walletone"],
    );

    #[allow(clippy::expect_used)]
    let token = cmd_line
        .token
        .map(Secret::new)
        .or_else(|| conf.open_api.api_token.clone())
        .expect("No Open API token in the command line or the settings");

    let client = OpenApiClient::new(&conf.open_api, token)?;
    match client.get_balance(cmd_line.currency_id).await? {
        Some(balance) => {
            for balance in balance.into_vec() {
                router_env::logger::info!(?balance, "Balance");
            }
        }
        None => router_env::logger::warn!("No balance returned"),
    }

    Ok(())
}
