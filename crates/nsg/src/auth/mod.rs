use std::path::Path;

use clap::{Args, Subcommand};
use color_eyre::eyre::{eyre, Result};
use netschool_cli::text_prompt_when_none;
use netschool_core::{regions, Client, ClientSettings};

use crate::{command::URL_ENV, render::CommandResult};

mod login;
pub(crate) mod state;

#[derive(Args, Clone)]
pub struct LoginArgs {
    #[command(subcommand)]
    pub command: LoginCommands,

    #[arg(short = 'u', long, global = true, env = URL_ENV, help = "Portal URL or region name")]
    pub url: Option<String>,

    #[arg(
        short = 's',
        long,
        global = true,
        env = "NS_SCHOOL",
        help = "School id or name; for broker logins, part of the organization name"
    )]
    pub school: Option<String>,
}

#[derive(Subcommand, Clone)]
pub enum LoginCommands {
    #[command(long_about = "Portal user name and password.")]
    Password {
        #[arg(short = 'l', long, env = "NS_LOGIN", help = "Portal user name")]
        login: Option<String>,
        #[arg(long, env = "NS_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },
    #[command(long_about = "Access token copied from a browser.")]
    Token { token: Option<String> },
    #[command(long_about = "The `session-store` value of a browser's local storage.")]
    SessionStore { value: Option<String> },
    #[command(long_about = "Browser cookies: an NSSESSIONID value or a full Cookie header.")]
    Cookies { cookies: Option<String> },
    #[command(long_about = "Gosuslugi login and password.")]
    Broker {
        #[arg(short = 'l', long, env = "NS_LOGIN", help = "Phone, e-mail or SNILS")]
        login: Option<String>,
        #[arg(long, env = "NS_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },
    #[command(long_about = "QR code scanned with the Gosuslugi app.")]
    BrokerQr,
}

/// A client for the portal at `url_or_region`. Background keep-alive is off, commands are short.
pub(crate) fn portal_client(url_or_region: &str) -> Result<Client> {
    let url = regions::resolve_url(url_or_region)
        .ok_or_else(|| eyre!("Unknown region {url_or_region:?}, see `nsg regions`"))?;
    Ok(Client::new(ClientSettings {
        keepalive_interval: 0,
        ..ClientSettings::for_url(url)
    })?)
}

impl LoginArgs {
    pub async fn run(self, session_file: &Path) -> CommandResult {
        let url = text_prompt_when_none("Portal URL or region", self.url)?;
        let client = portal_client(&url)?;
        let school = self.school;

        match self.command {
            LoginCommands::Password { login, password } => {
                login::login_password(&client, login, password, school).await?
            }
            LoginCommands::Token { token } => login::login_token(&client, token, school).await?,
            LoginCommands::SessionStore { value } => {
                login::login_session_store(&client, value, school).await?
            }
            LoginCommands::Cookies { cookies } => {
                login::login_cookies(&client, cookies, school).await?
            }
            LoginCommands::Broker { login, password } => {
                login::login_broker(&client, login, password, school).await?
            }
            LoginCommands::BrokerQr => login::login_broker_qr(&client, school).await?,
        }

        state::save(&client, session_file).await?;
        Ok("Successfully logged in!".into())
    }
}

pub(crate) async fn logout(session_file: &Path) -> CommandResult {
    let client = state::restore(session_file).await?;
    client.auth().logout().await?;
    state::delete(session_file)?;
    Ok("Logged out".into())
}
