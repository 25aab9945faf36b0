pub(crate) mod rename;
