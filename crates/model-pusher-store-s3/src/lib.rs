// model-pusher-store-s3/src/lib.rs
// ============================================================================
// Module: Model Pusher S3 Store Library
// Description: S3-backed model store implementation.
// Purpose: Expose the S3 adapter behind the core store interface.
// Dependencies: crate::store
// ============================================================================

//! ## Overview
//! This crate implements the [`model_pusher_core::ModelStore`] capability
//! over Amazon S3 (or any S3-compatible endpoint). The publish stage is
//! synchronous, so the adapter owns a Tokio runtime and blocks on SDK
//! futures internally.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod store;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use store::S3ModelStore;
