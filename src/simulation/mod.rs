// src/simulation/mod.rs
//! Synthetic ECG records for testing, benchmarking and demos

pub mod config;
pub mod noise_models;
pub mod signal_generator;

pub use config::{Deflection, NoiseConfig, SynthesisConfig, WaveMorphology};
pub use noise_models::NoiseModel;
pub use signal_generator::EcgSynthesizer;
