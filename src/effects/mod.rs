pub(crate) mod particles;
