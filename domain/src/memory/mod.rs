//! Memory entries kept by the memory store.

pub mod entities;
