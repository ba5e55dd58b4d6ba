pub(crate) mod futures;
