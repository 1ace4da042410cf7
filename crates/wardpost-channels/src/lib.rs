//! # Wardpost Channels
//! `Messenger` implementations.

pub mod console;
pub mod whatsapp;

pub use console::ConsoleMessenger;
pub use whatsapp::WhatsAppMessenger;
