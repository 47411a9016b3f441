#![allow(dead_code)]

pub mod batch;
pub mod engine;
pub mod helmert;
pub mod params;
pub mod registry;
pub mod report;
pub mod route;
