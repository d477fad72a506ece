pub(crate) mod builtin;
pub(crate) mod catalog;
pub(crate) mod color;
pub(crate) mod keyword;
pub(crate) mod model;
