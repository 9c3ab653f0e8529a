//! # Tagjson Core
//!
//! `tagjson-core` is a compact, lossless JSON representation for values that do not fit the JSON
//! type system. It is meant to serialize session data into an opaque payload (e.g. for a signed
//! cookie) and get back exactly the values that went in.
//!
//! ## Key Components
//!
//! * **[`Value`]:** The value graph: JSON scalars, arrays and objects, plus tuples, bytes,
//!   [`Markup`](value::Markup), UUIDs, UTC timestamps and application [`Extension`](value::Extension)s.
//! * **[`JsonTag`]:** A rule converting one kind of value to JSON and back. Tags with a key wrap
//!   their output as `{"<key>": <body>}`.
//! * **[`TaggedJsonSerializer`]:** The ordered registry of tags, with `dumps`/`loads`.
//!
//! ## Wire format
//!
//! ```text
//! (1, "a", true)                       {" t":[1,"a",true]}
//! b"\x00\x01"                          {" b":"AAE="}
//! {"x": (1, 2)}                        {"x":{" t":[1,2]}}
//! {" t": [1, 2, 3]}  (a plain object)  {" di":{" t__":[1,2,3]}}
//! ```
//!
//! Keys start with a space, which is valid in JSON but rarely used by applications. The last
//! line shows the guard for the rare object that does collide with a key.
//!
//! See [`tag`] for writing and registering application tags.
pub mod serializer;
pub mod tag;
pub mod value;

pub use serializer::{LoadError, RegisterError, RegisterOptions, TaggedJsonSerializer};
pub use tag::{JsonTag, TagError};
pub use value::Value;

/// Type alias for the standard boxed error carried by application tag failures.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;
