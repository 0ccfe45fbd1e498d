//! Serve command - run the HTTP API

use super::DatabaseArgs;
use clap::Args;
use incometax::api::{self, AdminCredentials, AppState};
use std::sync::Arc;

#[derive(Args, Debug)]
pub struct ServeCommand {
    /// Port to listen on
    #[arg(long, env = "PORT", default_value_t = 8080)]
    port: u16,

    #[command(flatten)]
    database: DatabaseArgs,

    /// Username for the admin routes
    #[arg(long, env = "ADMIN_USERNAME", default_value = "adminTax")]
    admin_username: String,

    /// Password for the admin routes
    #[arg(
        long,
        env = "ADMIN_PASSWORD",
        default_value = "admin!",
        hide_env_values = true,
        hide_default_value = true
    )]
    admin_password: String,
}

impl ServeCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        let store = self.database.open()?;
        let state = AppState::new(
            Arc::new(store),
            AdminCredentials::new(&self.admin_username, &self.admin_password),
        );

        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()?;
        runtime.block_on(api::run_http_server(self.port, state))?;
        Ok(())
    }
}
