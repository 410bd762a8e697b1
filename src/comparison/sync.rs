//! Playback position synchronization of the surface pair.
//!
//! The background surface is the timing leader. Only its position reports
//! trigger a correction, and only the foreground is ever seeked. A one way
//! correction cannot oscillate between two clocks.

/// Maximum tolerated drift in seconds before the follower is seeked.
pub const SYNC_TOLERANCE_SECS: f64 = 0.1;

/// Target position for the follower, if it drifted too far from the leader.
pub fn correction(leader: f64, follower: Option<f64>) -> Option<f64> {
    let follower = follower.filter(|f| f.is_finite())?;
    if !leader.is_finite() || (leader - follower).abs() <= SYNC_TOLERANCE_SECS {
        return None;
    }
    Some(leader)
}
