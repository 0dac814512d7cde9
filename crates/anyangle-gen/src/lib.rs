//! Map generation for any-angle pathfinding: random block and tile maps.

pub mod mapgen;

pub use mapgen::MapGen;
