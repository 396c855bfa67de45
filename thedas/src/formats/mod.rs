//! File format decoders
//!
//! Everything here is a pure function of its input bytes (plus, for the
//! skeleton-dependent steps, a previously decoded model): no hidden I/O,
//! no shared state, no ordering constraints beyond "resolve the skeleton
//! before binding collision shapes".

pub mod ani;
pub mod gff;
pub mod mao;
pub mod mmh;
pub mod msh;
pub mod phy;
