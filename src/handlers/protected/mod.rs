// handlers/protected/mod.rs - Protected handlers (bearer token required)
//
// Every route returned here is wrapped by `require_auth` in `app()`, so each
// handler can take `Extension<AuthUser>` and trust it.
//
// Route groups:
//   profile  - /self, /self/avatar, /user/:id
//   follower - /follow, /unfollow
//   garage   - /garage, /garage/vehicle/...
//   logbook  - /log, /log/:id, /log/:id/media
//   vehicle  - /vehicle/lookup/:registration

pub mod follower;
pub mod garage;
pub mod logbook;
pub mod profile;
pub mod vehicle;

pub use follower::follower_routes;
pub use garage::garage_routes;
pub use logbook::logbook_routes;
pub use profile::profile_routes;
pub use vehicle::vehicle_routes;
