mod common;
mod compile;
mod fetch;
mod request;
