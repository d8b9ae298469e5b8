// ── Reactive fleet store ──
//
// Lock-free entity storage with push-based change notification.

mod collection;
mod fleet;

pub use fleet::FleetStore;
