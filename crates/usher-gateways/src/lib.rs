pub mod directory;
pub mod error;
pub mod events;
pub mod mailer;

pub use directory::{
    create_directory, DirectorySettings, DynUserDirectory, HttpUserDirectory, UserDirectory,
};
pub use error::{DirectoryError, MailerError, PublishError};
pub use events::{
    create_publisher, DynEventPublisher, EventPublisher, EventsSettings, LogOnlyPublisher,
    WebhookPublisher, SIGNUP_TOPIC,
};
pub use mailer::{
    create_mailer, welcome_body, DynWelcomeMailer, MailSettings, NoopMailer, SmtpMailer,
    WelcomeMailer, WELCOME_SUBJECT,
};
