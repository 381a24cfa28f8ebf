pub(crate) mod analyser;
pub(crate) mod beat;
pub(crate) mod input;
pub(crate) mod track;
