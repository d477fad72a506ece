pub(crate) mod headless;
pub(crate) mod materializer;
pub(crate) mod surface;
