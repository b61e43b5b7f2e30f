//! Trellis Core
//!
//! Core types and abstractions for the Trellis venture pipeline.
//!
//! This crate contains:
//! - Domain types: Core business entities (Job, PipelineDefinition, stage payloads)
//! - DTOs: Data transfer objects for inter-service communication
//! - Scoring: the weighted multi-factor scoring engine shared by every stage

pub mod domain;
pub mod dto;
pub mod scoring;
