//! Careerlens - Guided Experience Extraction and Job Matching
//!
//! This crate implements the conversational core that helps a job seeker
//! articulate work experience through guided AI dialogue, and the matching
//! core that scores that experience against analyzed job postings.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
