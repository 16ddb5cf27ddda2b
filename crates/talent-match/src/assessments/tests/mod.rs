mod common;
mod coordinator;
mod routing;
