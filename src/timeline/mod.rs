pub(crate) mod builder;
pub(crate) mod machine;
pub(crate) mod phase;
pub(crate) mod stagger;
