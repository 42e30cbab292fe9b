pub(crate) mod interactive;
pub(crate) mod protocol;
