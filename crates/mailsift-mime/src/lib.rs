//! # mailsift-mime
//!
//! Decoding side of MIME for fetched mail. Nothing here builds messages.
//!
//! ## Features
//!
//! - **Bodies**: one level of `multipart/*`, quoted-printable and base64
//!   transfer decoding, ISO-8859-1 conversion, HTML/text classification
//! - **Subjects**: RFC 2047 encoded words after source-charset conversion
//! - **Addresses**: `From`/`To` parsing with encoded display names
//! - **Visible text**: readable HTML text, tokenized with html5ever
//!
//! ## Quick Start
//!
//! ```
//! use mailsift_mime::{Message, visible_text, DEFAULT_HEADER_CHARSET};
//!
//! let header = b"Subject: =?UTF-8?B?5rWL6K+V?=\r\nContent-Type: text/html\r\n";
//! let raw = b"Subject: =?UTF-8?B?5rWL6K+V?=\r\nContent-Type: text/html\r\n\r\n\
//!             <p>hello<script>x()</script>world</p>";
//!
//! let message = Message::decode(header, raw, DEFAULT_HEADER_CHARSET)?;
//! assert_eq!(message.subject, "测试");
//! assert_eq!(visible_text(&message.body.html_text()), ["hello", "world"]);
//! # Ok::<(), mailsift_mime::Error>(())
//! ```

#![forbid(unsafe_code)]

mod address;
mod content_type;
mod decode;
mod error;
mod header;
mod message;
mod multipart;
mod subject;

pub mod encoding;
pub mod visible;

pub use address::{Address, UNKNOWN_SENDER, parse_address_list};
pub use content_type::ContentType;
pub use decode::{DecodedBody, decode_body, html_text};
pub use error::{Error, Result};
pub use header::{Headers, split_header_body};
pub use message::Message;
pub use multipart::{Part, split_parts};
pub use subject::{
    DEFAULT_HEADER_CHARSET, decode_header_value, decode_subject, has_encoding, is_encoded_word,
};
pub use visible::visible_text;
