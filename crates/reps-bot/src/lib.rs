//! Chat bot answering fixed keywords with information from the site
//! configuration.

pub mod relay;
pub mod responder;

pub use relay::{ChatMessage, Transport, WsTransport, run};
pub use responder::KeywordResponder;
