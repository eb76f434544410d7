//! Build-only member. Its build script regenerates `graphqlmetrics/src/proto`.
