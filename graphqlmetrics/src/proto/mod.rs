// Generated by proto_generator. Checked in so nobody needs protoc to build.
#[allow(clippy::all)]
#[rustfmt::skip]
pub mod graphqlmetrics {
    include!("wg.cosmo.graphqlmetrics.v1.rs");
}
