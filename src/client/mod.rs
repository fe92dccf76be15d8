pub mod smtp;

use crate::error::NotifyError;
use std::future::Future;

pub use smtp::SmtpRelay;

/// A fully addressed notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertMail {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// Store-and-forward transport used to deliver alert mails.
pub trait MailRelay {
    fn send(&self, mail: &AlertMail) -> impl Future<Output = Result<(), NotifyError>> + Send;
}
