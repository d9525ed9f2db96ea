// Domain layer - Core segment types and rules

pub mod model;
pub mod rules;
