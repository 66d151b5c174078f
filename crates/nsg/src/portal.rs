use std::{collections::BTreeMap, path::Path};

use chrono::NaiveDate;
use clap::{Subcommand, ValueEnum};
use netschool_core::{
    models::MailFolder,
    portal::{get_login_methods, search_schools},
    regions,
};

use crate::{
    auth::state,
    render::{CommandOutput, CommandResult},
};

pub(crate) async fn diary(
    session_file: &Path,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> CommandResult {
    let client = state::restore(session_file).await?;
    let diary = client.portal().diary(start, end).await?;
    Ok(CommandOutput::object(diary))
}

pub(crate) async fn overdue(
    session_file: &Path,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> CommandResult {
    let client = state::restore(session_file).await?;
    let assignments = client.portal().overdue(start, end).await?;
    Ok(CommandOutput::object(assignments))
}

pub(crate) async fn announcements(session_file: &Path, take: i64) -> CommandResult {
    let client = state::restore(session_file).await?;
    let announcements = client.portal().announcements(take).await?;
    Ok(CommandOutput::object(announcements))
}

pub(crate) async fn school(session_file: &Path) -> CommandResult {
    let client = state::restore(session_file).await?;
    let school = client.portal().school_info().await?;
    Ok(CommandOutput::object(school))
}

pub(crate) async fn schools(url_or_region: &str, query: Option<&str>) -> CommandResult {
    let schools = search_schools(url_or_region, query.unwrap_or_default()).await?;
    Ok(CommandOutput::object(schools))
}

pub(crate) async fn methods(url_or_region: &str) -> CommandResult {
    let methods = get_login_methods(url_or_region).await?;
    Ok(CommandOutput::object(methods))
}

pub(crate) fn regions() -> CommandOutput {
    let regions: BTreeMap<&str, &str> = regions::list_regions()
        .into_iter()
        .filter_map(|name| Some((name, regions::get_url(name)?)))
        .collect();
    CommandOutput::object(regions)
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum, Debug, Default)]
pub enum Folder {
    #[default]
    Inbox,
    Sent,
    Draft,
    Deleted,
}

impl From<Folder> for MailFolder {
    fn from(folder: Folder) -> Self {
        match folder {
            Folder::Inbox => MailFolder::Inbox,
            Folder::Sent => MailFolder::Sent,
            Folder::Draft => MailFolder::Draft,
            Folder::Deleted => MailFolder::Deleted,
        }
    }
}

#[derive(Subcommand, Clone)]
pub enum MailCommands {
    #[command(long_about = "A page of a mail folder, newest first.")]
    List {
        #[arg(long, value_enum, default_value_t = Folder::Inbox)]
        folder: Folder,
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long, default_value_t = 20)]
        page_size: u32,
    },
    #[command(long_about = "Ids of unread messages.")]
    Unread,
    #[command(long_about = "A single message.")]
    Read { id: i64 },
    #[command(long_about = "People who can receive mail.")]
    Recipients,
    #[command(long_about = "Send a message. Recipients are ids from `nsg mail recipients`.")]
    Send {
        #[arg(long)]
        subject: String,
        #[arg(long)]
        text: String,
        #[arg(long = "to", required = true)]
        to: Vec<String>,
    },
}

impl MailCommands {
    pub async fn run(self, session_file: &Path) -> CommandResult {
        let client = state::restore(session_file).await?;
        let portal = client.portal();

        Ok(match self {
            MailCommands::List {
                folder,
                page,
                page_size,
            } => CommandOutput::object(portal.mail_list(folder.into(), page, page_size).await?),
            MailCommands::Unread => CommandOutput::object(portal.mail_unread().await?),
            MailCommands::Read { id } => CommandOutput::object(portal.mail_read(id).await?),
            MailCommands::Recipients => CommandOutput::object(portal.mail_recipients().await?),
            MailCommands::Send { subject, text, to } => {
                portal.mail_send(&subject, &text, &to).await?;
                "Message sent".into()
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_folder_maps_to_portal_folder() {
        assert_eq!(MailFolder::from(Folder::Sent).as_str(), "Sent");
        assert_eq!(MailFolder::from(Folder::default()), MailFolder::Inbox);
    }
}
