//! Integration tests against an in-process fake of the inventory API

mod api_tests;
mod dashboard_flow;
