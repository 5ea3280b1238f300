//! Property-based tests for ConnBar core library

mod config_tests;
mod directory_tests;
mod grouping_tests;
mod launcher_tests;
mod normalization_tests;
