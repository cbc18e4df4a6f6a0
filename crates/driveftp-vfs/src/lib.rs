//! driveftp-vfs: the hierarchical FTP view over a flat, id-addressed store
//!
//! The remote drive knows nothing about paths: objects have opaque ids,
//! names that may repeat inside one folder, and possibly several parents.
//! This crate synthesizes a collision-free virtual namespace on top of it:
//!
//! - [`codec::NameCodec`] sanitizes illegal characters and embeds object
//!   ids into filenames when two siblings would otherwise be
//!   indistinguishable;
//! - [`resolver::PathResolver`] turns FTP path strings into
//!   [`node::VirtualNode`]s;
//! - [`view::SessionView`] carries per-connection navigation state and the
//!   listing pass that disambiguates duplicate names;
//! - [`throttle::RequestThrottle`] spots burst re-listings of one folder
//!   and asks for a synchronous metadata refresh;
//! - [`gateway::Gateway`] issues the actual mutations and transfers
//!   through the collaborator traits.

pub mod codec;
pub mod commands;
pub mod gateway;
pub mod node;
pub mod path;
pub mod resolver;
pub mod throttle;
pub mod view;

pub use codec::NameCodec;
pub use gateway::Gateway;
pub use node::VirtualNode;
pub use resolver::PathResolver;
pub use throttle::RequestThrottle;
pub use view::{FileSystemView, SessionView};
