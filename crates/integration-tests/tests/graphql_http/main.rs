#![allow(unused_crate_dependencies)]

mod body;
mod graphiql;
mod options;
mod pipeline;
mod protocol;
