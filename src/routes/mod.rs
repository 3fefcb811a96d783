pub mod classes;

pub mod motifs;

pub mod system;

pub use classes::configure_classes_routes;
pub use motifs::configure_motifs_routes;
pub use system::configure_system_routes;
