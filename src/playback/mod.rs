pub(crate) mod controller;
pub(crate) mod graph;
pub(crate) mod transport;
