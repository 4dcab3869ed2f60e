#![doc = "media-bucket-core: core pipeline library for media-bucket."]

//! This crate contains the data model, collaborator contracts and pipelines that move
//! media-library resources into an object-storage bucket.
//! Destination clients and terminal interaction live in the `media-bucket` CLI crate.
//!
//! # Usage
//! Build a [`config::MigrateConfig`], provide implementations of the [`contract`] traits
//! and call [`migrate::migrate`].

pub mod config;
pub mod contract;
pub mod error;
pub mod filter;
pub mod listing;
pub mod mapper;
pub mod migrate;
pub mod source;
pub mod transfer;
