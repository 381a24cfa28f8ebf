pub(crate) mod encoder;
pub(crate) mod profile;
pub(crate) mod session;
pub(crate) mod settings;
