// src/bin/enroll.rs
//
// Provisions the wallet without starting the API server. Every organization is
// attempted; the exit status is non-zero if any of them failed.
//
//   enroll                  enroll admin and application user through each CA
//   enroll --import <user>  copy <user>'s cryptogen MSP material into the wallet

use anyhow::{bail, Context};
use battery_passport_gateway::{init_tracing, AppContext, Settings};
use tracing::{error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    init_tracing("info");

    let args: Vec<String> = std::env::args().skip(1).collect();
    let import_user = match args.as_slice() {
        [] => None,
        [flag, user] if flag == "--import" => Some(user.clone()),
        _ => bail!("usage: enroll [--import <user>]"),
    };

    let settings = Settings::from_env().context("invalid configuration")?;
    let context = AppContext::build(settings).context("failed to initialize enrollment")?;

    let mut failed = Vec::new();
    for org in context.settings.org_ids() {
        let outcome = match &import_user {
            Some(user) => context.enroller.import_msp_identity(org, user).await.map(|_| ()),
            None => context.enroller.enroll_org(org).await,
        };
        match outcome {
            Ok(()) => info!(%org, "organization provisioned"),
            Err(e) => {
                error!(%org, error = %e, "provisioning failed");
                failed.push(org.to_string());
            }
        }
    }

    if !failed.is_empty() {
        bail!("provisioning failed for {}", failed.join(", "));
    }
    info!(wallet = %context.settings.wallet_dir.display(), "wallet is up to date");
    Ok(())
}
