// Store surfaces -- typed inherent methods on [`SyncClient`](crate::SyncClient).
//
// One file per top-level node of the database: strips (desired configs),
// checkin (device telemetry), globals, firmware metadata, and the log.

mod checkin;
mod firmware;
mod globals;
mod log;
mod strips;
