//! The concrete cut library and the standard selections built from it,
//! grouped by detector subsystem.

pub mod daq;
pub mod fiducial;
pub mod misc;
pub mod s1;
pub mod s2;
pub mod selections;

pub use selections::{
    Collaborators, all_energy, low_energy_ambe, low_energy_background, low_energy_rn220,
};
