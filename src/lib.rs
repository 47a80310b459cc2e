//! Sonoform library - audio-reactive procedural simulation
//!
//! Turns a stream of three-band audio energies into evolving point sets: a
//! particle swarm, a modal string or a harmonic wave line, each with a
//! fading motion trail.

pub mod audio;
pub mod cli;
pub mod error;
pub mod frame;
pub mod model;
pub mod noise;
pub mod params;
pub mod snapshot;
pub mod swarm;
pub mod trail;
pub mod wave;
