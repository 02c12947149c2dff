//! Integration tests for the listing harvester
//!
//! Listing pages are scripted in memory so the full traversal and harvest
//! cycle runs without a browser.

mod harvest_tests;
mod support;
