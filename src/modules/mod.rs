// Module exports for pure logic
pub mod load_state;
pub mod surface;
pub mod deadline;     // Per-navigation timeout tickets
pub mod controller;   // Load lifecycle owner
pub mod overlay;      // Presentation model
