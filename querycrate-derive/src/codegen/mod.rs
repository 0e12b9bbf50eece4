//! Code generation for `#[derive(Query)]`
//!
//! - query_impl: the `querycrate::Query` implementation (template, sort options, criteria, parameters)

pub mod query_impl;

pub(crate) use query_impl::generate_query_impl;
