//! 具体渠道实现

pub mod console;
pub mod webhook;
pub mod whatsapp;

pub use console::ConsoleChannel;
pub use webhook::WebhookChannel;
pub use whatsapp::WhatsAppChannel;
