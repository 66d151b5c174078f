//! Typed records returned by the portal accessors.
//!
//! Field names follow the portal's JSON where they are deserialized directly; records the portal
//! nests or names inconsistently are flattened through private raw shapes.

mod announcement;
mod attachment;
mod diary;
mod login_methods;
mod mail;
pub(crate) mod parse;
mod school;

pub use announcement::{Announcement, Author};
pub use attachment::Attachment;
pub use diary::{Assignment, Day, Diary, Lesson};
pub use login_methods::LoginMethods;
pub use mail::{MailEntry, MailFolder, MailPage, MailRecipient, Message};
pub use school::{School, ShortSchool};
