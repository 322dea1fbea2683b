//! Classification behaviour over generated archives.

mod limits;
mod properties;
