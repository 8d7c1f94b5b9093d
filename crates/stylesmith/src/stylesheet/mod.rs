//! YAML stylesheet loading.
//!
//! This module turns YAML text into a [`StyleTree`](crate::StyleTree). It is
//! the default front end of the pipeline; anything implementing
//! [`StyleParser`] can replace it.
//!
//! # YAML Schema
//!
//! The document is a mapping of top-level selectors. Inside a selector,
//! scalar values are declarations and mappings are nested selectors:
//!
//! ```yaml
//! .card:
//!   padding: 4px
//!   font-family: [Inter, sans-serif]   # lists become comma lists
//!
//!   "&:hover":                         # fused onto the parent: .card:hover
//!     color: blue
//!
//!   "&__title":                        # fused: .card__title
//!     font-weight: bold
//!
//!   .icon:                             # descendant: .card .icon
//!     width: 16px
//! ```
//!
//! `&` starts an anchor and `#` starts a comment in YAML, so keys beginning
//! with either must be quoted (`"&:hover"`, `"#main"`).
//!
//! Document order is preserved for both declarations and children.

mod error;
mod parser;

pub use error::StylesheetError;
pub use parser::{parse_stylesheet, parse_stylesheet_file, StyleParser, YamlStyleParser};
