//! # ldap-core
//!
//! The data-plane core of an LDAP ([RFC4511]) implementation: parsing
//! and comparing Distinguished Names ([RFC4514]), parsing and
//! evaluating search filters ([RFC4515]), and modeling, parsing, and
//! rendering directory schema ([RFC4512]) — independent of any wire
//! protocol codec or network transport.
//!
//! It is written in pure Rust. A lot of care is taken to ensure
//! security and safety of this crate, including design (no unbounded
//! recursion, defensive programming) and tests. It also aims to be
//! panic-free outside of programmer-error conditions.
//!
//! [RFC4511]: https://datatracker.ietf.org/doc/html/rfc4511
//! [RFC4512]: https://datatracker.ietf.org/doc/html/rfc4512
//! [RFC4514]: https://datatracker.ietf.org/doc/html/rfc4514
//! [RFC4515]: https://datatracker.ietf.org/doc/html/rfc4515

#![deny(/*missing_docs,*/
        unstable_features,
        unused_import_braces, unused_qualifications)]
#![warn(
    missing_debug_implementations,
    /* missing_docs,
    rust_2018_idioms,*/
    unreachable_pub
)]
#![forbid(unsafe_code)]
#![deny(broken_intra_doc_links)]
#![doc(test(
    no_crate_inject,
    attr(deny(warnings, rust_2018_idioms), allow(dead_code, unused_variables))
))]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod cursor;
pub mod dn;
pub mod error;
pub mod filter;
pub mod lexer;
pub mod matching;
pub mod oid;
pub mod schema;
pub mod value;

pub use cursor::Cursor;
pub use dn::{Ava, Dn, Rdn};
pub use error::{Error, Result};
pub use filter::Filter;
pub use value::Value;

#[cfg(test)]
mod send_sync_tests {
    use super::*;

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn immutable_public_types_are_send_and_sync() {
        assert_send_sync::<Dn>();
        assert_send_sync::<Rdn>();
        assert_send_sync::<Ava>();
        assert_send_sync::<Filter>();
    }
}
