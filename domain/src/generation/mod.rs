//! Generation domain: the shape of a streamed backend reply.

pub mod stream;
