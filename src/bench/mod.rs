//! Workbench collaborators: arm actuation and measurement instruments
//!
//! The command engine only sees the narrow contracts in this module.
//! Pick/place sequences are composed here from waypoint moves and
//! gripper actions, the way the physical bench is driven.

pub mod arm;
pub mod instruments;

pub use arm::{Arm, SimulatedArm, Waypoint};
pub use instruments::{Feature, Potentiostat, SimulatedPotentiostat};

use thiserror::Error;

/// Failure raised by an arm or instrument operation
#[derive(Error, Debug)]
pub enum BenchError {
    #[error("Arm not connected")]
    NotConnected,

    #[error("Motion failed: {0}")]
    Motion(String),

    #[error("Gripper failed: {0}")]
    Gripper(String),

    #[error("Instrument failed: {0}")]
    Instrument(String),
}

/// The physical workbench: one arm and one potentiostat.
///
/// Owned together so pick/place sequences and measurements share a
/// single connection lifecycle. The execution engine holds the only
/// handle; the arm connection is not reentrant.
pub struct Workbench {
    arm: Box<dyn Arm>,
    cell: Box<dyn Potentiostat>,
}

impl Workbench {
    pub fn new(arm: Box<dyn Arm>, cell: Box<dyn Potentiostat>) -> Self {
        Self { arm, cell }
    }

    /// Lazily establish the arm connection. Idempotent; no-op when
    /// already connected.
    pub fn ensure_connected(&mut self) -> Result<(), BenchError> {
        if !self.arm.is_connected() {
            tracing::info!("connecting to arm");
            self.arm.connect()?;
        }
        Ok(())
    }

    /// Bring the bench to a known idle state: offset position, then
    /// home, gripper closed.
    pub fn park(&mut self) -> Result<(), BenchError> {
        self.arm.move_to(Waypoint::OffsetHome)?;
        self.arm.move_to(Waypoint::Home)?;
        self.arm.gripper_close()
    }

    /// Grab the sample sitting in bed slot `slot`
    pub fn pick_from_bed(&mut self, slot: u8) -> Result<(), BenchError> {
        self.arm.move_to(Waypoint::BedSlotAbove(slot))?;
        self.arm.gripper_open()?;
        self.arm.move_to(Waypoint::BedSlot(slot))?;
        self.arm.gripper_close()?;
        self.arm.move_to(Waypoint::BedSlotAbove(slot))
    }

    /// Return the held sample to bed slot `slot`
    pub fn place_to_bed(&mut self, slot: u8) -> Result<(), BenchError> {
        self.arm.move_to(Waypoint::BedSlotAbove(slot))?;
        self.arm.move_to(Waypoint::BedSlot(slot))?;
        self.arm.gripper_open()?;
        self.arm.move_to(Waypoint::BedSlotAbove(slot))
    }

    /// Set the held sample down at the measurement station
    pub fn place_to_station(&mut self) -> Result<(), BenchError> {
        self.arm.move_to(Waypoint::MeasurementStation)?;
        self.arm.gripper_open()
    }

    /// Retrieve the sample from the measurement station
    pub fn pick_from_station(&mut self) -> Result<(), BenchError> {
        self.arm.move_to(Waypoint::MeasurementStation)?;
        self.arm.gripper_close()
    }

    /// Hand the held sample over at the user area
    pub fn place_to_user(&mut self) -> Result<(), BenchError> {
        self.arm.move_to(Waypoint::UserArea)?;
        self.arm.gripper_open()
    }

    /// Take a sample back from the user area
    pub fn pick_from_user(&mut self) -> Result<(), BenchError> {
        self.arm.move_to(Waypoint::UserArea)?;
        self.arm.gripper_close()
    }

    pub fn go_home(&mut self) -> Result<(), BenchError> {
        self.arm.move_to(Waypoint::Home)
    }

    pub fn measure(&mut self, feature: Feature) -> Result<f64, BenchError> {
        self.cell.measure(feature)
    }
}
