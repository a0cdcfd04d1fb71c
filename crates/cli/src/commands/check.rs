// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::path::PathBuf;

use clap::Args;

use crate::exit_error::ExitError;

#[derive(Args)]
pub struct CheckArgs {
    /// Collector config (TOML)
    #[arg(long, short)]
    pub config: PathBuf,
}

pub async fn handle(args: CheckArgs) -> anyhow::Result<()> {
    let (config, collector) = super::start(&args.config).await?;
    let result = collector.check().await;
    collector.cleanup().await;
    match result {
        Ok(()) => {
            println!("ok: {}", config.jmx_url);
            Ok(())
        }
        Err(e) => Err(ExitError::new(1, format!("check failed: {e}")).into()),
    }
}
