pub(crate) mod caption;
pub(crate) mod composite;
pub(crate) mod crop;
pub(crate) mod grid;
pub(crate) mod output;
pub(crate) mod pipeline;
