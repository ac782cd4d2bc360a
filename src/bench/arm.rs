//! Arm actuation contract and simulated implementation
//!
//! The real bench drives a 6-axis arm through a fixed set of taught
//! positions. Only waypoint moves and gripper actions cross this
//! boundary; trajectory details stay inside the arm.

use std::fmt;
use std::thread;
use std::time::Duration;

use super::BenchError;

/// Named arm positions on the bench
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Waypoint {
    Home,
    /// Raised position next to home, used when entering/leaving the bed
    OffsetHome,
    /// Gripping height at bed slot `n`
    BedSlot(u8),
    /// Travel height above bed slot `n`
    BedSlotAbove(u8),
    MeasurementStation,
    UserArea,
}

impl fmt::Display for Waypoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Waypoint::Home => write!(f, "home"),
            Waypoint::OffsetHome => write!(f, "offsethome"),
            Waypoint::BedSlot(n) => write!(f, "bed[{}]", n),
            Waypoint::BedSlotAbove(n) => write!(f, "bed[{}]+z", n),
            Waypoint::MeasurementStation => write!(f, "measurementstation"),
            Waypoint::UserArea => write!(f, "userarea"),
        }
    }
}

/// Narrow imperative contract for the arm
///
/// Every operation is synchronous and returns a descriptive error on
/// failure. Implementations must refuse motion while disconnected.
pub trait Arm {
    fn connect(&mut self) -> Result<(), BenchError>;
    fn is_connected(&self) -> bool;
    fn move_to(&mut self, waypoint: Waypoint) -> Result<(), BenchError>;
    fn gripper_open(&mut self) -> Result<(), BenchError>;
    fn gripper_close(&mut self) -> Result<(), BenchError>;
}

/// Software stand-in for the physical arm
///
/// Tracks pose, gripper and connection state, optionally pacing each
/// move so console sessions resemble real motion.
pub struct SimulatedArm {
    connected: bool,
    pose: Waypoint,
    gripper_open: bool,
    move_delay: Duration,
}

impl SimulatedArm {
    pub fn new(move_delay: Duration) -> Self {
        Self {
            connected: false,
            pose: Waypoint::Home,
            gripper_open: false,
            move_delay,
        }
    }

    pub fn pose(&self) -> Waypoint {
        self.pose
    }

    fn ensure(&self) -> Result<(), BenchError> {
        if self.connected {
            Ok(())
        } else {
            Err(BenchError::NotConnected)
        }
    }
}

impl Arm for SimulatedArm {
    fn connect(&mut self) -> Result<(), BenchError> {
        self.connected = true;
        tracing::info!("simulated arm connected");
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.connected
    }

    fn move_to(&mut self, waypoint: Waypoint) -> Result<(), BenchError> {
        self.ensure()?;
        if !self.move_delay.is_zero() {
            thread::sleep(self.move_delay);
        }
        tracing::debug!(from = %self.pose, to = %waypoint, "arm move");
        self.pose = waypoint;
        Ok(())
    }

    fn gripper_open(&mut self) -> Result<(), BenchError> {
        self.ensure()?;
        self.gripper_open = true;
        tracing::debug!("gripper open");
        Ok(())
    }

    fn gripper_close(&mut self) -> Result<(), BenchError> {
        self.ensure()?;
        self.gripper_open = false;
        tracing::debug!("gripper close");
        Ok(())
    }
}
