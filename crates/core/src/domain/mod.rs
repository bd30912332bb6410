pub mod show;
pub mod venue;
