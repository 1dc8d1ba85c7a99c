pub mod scheduled_notification;
