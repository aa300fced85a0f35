//! DSM-CC Object Carousel messages and their nested BIOP/CORBA structures
//! (spec §3, §4.4, §4.5).

pub mod biop;
pub mod compatibility;
pub mod ddb;
pub mod ior;
pub mod lite_component;
pub mod message;
pub mod tagged_profile;
pub mod tap;
pub mod user_to_network;

pub use biop::BiopMessageHeader;
pub use compatibility::CompatibilityDescriptor;
pub use ddb::DownloadDataMessage;
pub use ior::Ior;
pub use lite_component::{LiteComponent, LiteComponentBody};
pub use message::DsmccMessageHeader;
pub use tagged_profile::{TaggedProfile, TaggedProfileBody};
pub use tap::Tap;
pub use user_to_network::{DiiModule, UserToNetworkMessage, TID_DSMCC_UNM};
