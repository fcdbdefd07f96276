pub mod follower;
pub mod log;
pub mod media;
pub mod profile;
pub mod user;
pub mod vehicle;

pub use follower::Follower;
pub use log::{Log, NewLog};
pub use media::{Media, MediaItem, MediaParent};
pub use profile::{NewProfile, Profile, ProfileChanges};
pub use user::{NewUser, User};
pub use vehicle::{normalize_registration, NewVehicle, Vehicle, VehiclePatch};
